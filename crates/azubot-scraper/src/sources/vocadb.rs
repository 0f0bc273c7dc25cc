//! `VocaDB` top-rated songs API.

use serde::Deserialize;

use azubot_core::VocaloidEntry;

use crate::enrich::{enrich, EnrichOptions, EnrichReport};
use crate::error::ScraperError;
use crate::fetch::{FetchOptions, Fetcher};

pub const VOCADB_BASE_URL: &str = "https://vocadb.net";

/// PV hosts in order of preference.
const PV_SERVICE_PRIORITY: [&str; 3] = ["Youtube", "NicoNicoDouga", "Bandcamp"];

#[derive(Debug, Deserialize)]
struct TopRatedSong {
    id: i64,
    #[serde(default)]
    name: String,
    #[serde(rename = "artistString", default)]
    artist_string: String,
}

#[derive(Debug, Deserialize)]
struct SongWithRating {
    song: SongPvs,
}

#[derive(Debug, Deserialize)]
struct SongPvs {
    #[serde(default)]
    pvs: Vec<Pv>,
}

/// One promotional video attached to a song.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Pv {
    pub service: String,
    pub url: String,
}

/// Picks the most preferred PV link, or `None` if no supported host is listed.
#[must_use]
pub fn choose_pv(pvs: &[Pv]) -> Option<String> {
    PV_SERVICE_PRIORITY.iter().find_map(|service| {
        pvs.iter()
            .find(|pv| pv.service == *service && !pv.url.is_empty())
            .map(|pv| pv.url.clone())
    })
}

/// Client for the `VocaDB` public API.
pub struct VocaDb<'f> {
    fetcher: &'f Fetcher,
    base_url: String,
}

impl<'f> VocaDb<'f> {
    #[must_use]
    pub fn new(fetcher: &'f Fetcher) -> Self {
        Self::with_base_url(fetcher, VOCADB_BASE_URL)
    }

    #[must_use]
    pub fn with_base_url(fetcher: &'f Fetcher, base_url: &str) -> Self {
        Self {
            fetcher,
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    /// Songs created in the last 24 hours, best rated first. PV links are
    /// left empty for [`VocaDb::pv_link`] to fill.
    ///
    /// # Errors
    ///
    /// Returns any fetch or decode error from the list endpoint.
    pub async fn top_rated(&self) -> Result<Vec<VocaloidEntry>, ScraperError> {
        let mut url = reqwest::Url::parse(&format!("{}/api/songs/top-rated", self.base_url))
            .map_err(|e| ScraperError::InvalidUrl {
                url: self.base_url.clone(),
                reason: e.to_string(),
            })?;
        url.query_pairs_mut()
            .append_pair("durationHours", "24")
            .append_pair("filterBy", "CreateDate");

        let songs: Vec<TopRatedSong> = self
            .fetcher
            .get_json(url.as_str(), &FetchOptions::new())
            .await?;
        tracing::info!(count = songs.len(), "vocadb top-rated songs fetched");

        Ok(songs
            .into_iter()
            .map(|song| VocaloidEntry {
                id: song.id,
                name: song.name,
                artist: song.artist_string,
                pv_url: None,
            })
            .collect())
    }

    /// Preferred PV link for one song.
    ///
    /// # Errors
    ///
    /// Returns a fetch or decode error, or [`ScraperError::Extraction`] when
    /// the song has no PV on a supported host.
    pub async fn pv_link(&self, song_id: i64) -> Result<String, ScraperError> {
        let url = format!("{}/api/songs/{song_id}/with-rating", self.base_url);
        let detail: SongWithRating = self.fetcher.get_json(&url, &FetchOptions::new()).await?;
        choose_pv(&detail.song.pvs).ok_or_else(|| ScraperError::Extraction {
            context: format!("vocadb song {song_id}"),
            reason: "no PV on a supported service".to_owned(),
        })
    }

    /// Fills `pv_url` on each entry from its detail endpoint. Songs without
    /// a usable PV keep `None`.
    pub async fn attach_pv_links(
        &self,
        entries: &mut [VocaloidEntry],
        options: EnrichOptions,
    ) -> EnrichReport {
        enrich(entries, options, |key| async move {
            let id = key.parse::<i64>().map_err(|e| ScraperError::Extraction {
                context: format!("vocadb song key {key}"),
                reason: e.to_string(),
            })?;
            self.pv_link(id).await
        })
        .await
    }
}
