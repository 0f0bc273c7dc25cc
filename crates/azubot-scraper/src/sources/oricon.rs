//! Oricon daily/weekly chart scraper.
//!
//! The rank page carries four boards in one section, each addressed by its
//! position among the section's children.

use std::sync::LazyLock;

use reqwest::Url;
use scraper::{ElementRef, Selector};

use azubot_core::{BoardKind, RankBoard, RankEntry, RankSnapshot, Trend};

use crate::error::ScraperError;
use crate::fetch::{Collector, FetchOptions, Fetcher};
use crate::pattern::{element_text, last_attr, last_text};

pub const ORICON_RANK_URL: &str = "https://www.oricon.co.jp/rank/";

const RANK_SECTION: &str = "#content-main > div.content-main-inner > div.content-rank-main > div > article > section:nth-child(2)";

struct BoardSelectors {
    heading: Selector,
    entries: Selector,
}

static BOARD_SELECTORS: LazyLock<[BoardSelectors; 4]> = LazyLock::new(|| {
    BoardKind::ALL.map(|kind| {
        let n = board_position(kind);
        BoardSelectors {
            heading: Selector::parse(&format!("div:nth-child({n}) > h3")).expect("valid selector"),
            entries: Selector::parse(&format!("div:nth-child({n}) > div > div"))
                .expect("valid selector"),
        }
    })
});

static ENTRY: LazyLock<Selector> = LazyLock::new(|| Selector::parse("dl").expect("valid selector"));
static LINK: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").expect("valid selector"));
static TITLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h4").expect("valid selector"));
static PARAGRAPH: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("p").expect("valid selector"));

/// Child position of each board inside the rank section.
fn board_position(kind: BoardKind) -> usize {
    match kind {
        BoardKind::DailySingle => 2,
        BoardKind::WeeklySingle => 4,
        BoardKind::DailyAlbum => 6,
        BoardKind::WeeklyAlbum => 7,
    }
}

fn board_index(kind: BoardKind) -> usize {
    BoardKind::ALL
        .iter()
        .position(|k| *k == kind)
        .unwrap_or_default()
}

/// Maps the status class on an entry's trend marker.
#[must_use]
pub fn decode_trend(class: &str) -> Trend {
    let normalized = class.split_whitespace().collect::<Vec<_>>().join(" ");
    match normalized.as_str() {
        "status new" => Trend::New,
        "status up" => Trend::Up,
        "status down" => Trend::Down,
        "status stay" => Trend::Stay,
        _ => Trend::Unknown,
    }
}

fn extract_entry(dl: ElementRef<'_>, base: &Url) -> RankEntry {
    let mut entry = RankEntry {
        title: last_text(dl, &TITLE).unwrap_or_default(),
        link: last_attr(dl, &LINK, "href")
            .filter(|href| !href.is_empty())
            .and_then(|href| base.join(&href).ok())
            .map(String::from),
        ..RankEntry::default()
    };

    for p in dl.select(&PARAGRAPH) {
        if p.value().classes().any(|c| c == "name") {
            entry.artist = element_text(p);
        } else if let Some(class) = p.value().attr("class") {
            entry.trend = decode_trend(class);
        }
    }
    entry
}

fn extract_boards(boards: &mut [RankBoard; 4], section: ElementRef<'_>, base: &Url) {
    for kind in BoardKind::ALL {
        let idx = board_index(kind);
        let selectors = &BOARD_SELECTORS[idx];
        let board = &mut boards[idx];

        if let Some(heading) = last_text(section, &selectors.heading) {
            board.rule = heading;
        }
        for group in section.select(&selectors.entries) {
            board
                .entries
                .extend(group.select(&ENTRY).map(|dl| extract_entry(dl, base)));
        }
    }
}

/// Scraper for the Oricon rank page.
pub struct OriconRanking<'f> {
    fetcher: &'f Fetcher,
    page_url: String,
    base_url: Url,
    allowed_host: String,
}

impl<'f> OriconRanking<'f> {
    /// # Errors
    ///
    /// Never fails for the built-in URL; see [`OriconRanking::with_page_url`].
    pub fn new(fetcher: &'f Fetcher) -> Result<Self, ScraperError> {
        Self::with_page_url(fetcher, ORICON_RANK_URL)
    }

    /// Points the scraper at another copy of the rank page. Fetches are
    /// restricted to that page's host; relative entry links resolve against it.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidUrl`] if `page_url` has no host.
    pub fn with_page_url(fetcher: &'f Fetcher, page_url: &str) -> Result<Self, ScraperError> {
        let invalid = |reason: &str| ScraperError::InvalidUrl {
            url: page_url.to_owned(),
            reason: reason.to_owned(),
        };
        let base_url = Url::parse(page_url).map_err(|e| invalid(&e.to_string()))?;
        let allowed_host = base_url
            .host_str()
            .ok_or_else(|| invalid("missing host"))?
            .to_owned();
        Ok(Self {
            fetcher,
            page_url: page_url.to_owned(),
            base_url,
            allowed_host,
        })
    }

    /// Fetches the rank page and returns all four boards in fixed order.
    ///
    /// Boards that the page does not carry come back empty.
    ///
    /// # Errors
    ///
    /// Returns any fetch error; nothing is partially returned.
    pub async fn fetch_snapshot(&self) -> Result<RankSnapshot, ScraperError> {
        let options = FetchOptions::new().allow_domain(&self.allowed_host);
        let mut collector = Collector::new(self.fetcher, options);
        let base = self.base_url.clone();
        collector.on_html(RANK_SECTION, move |boards: &mut [RankBoard; 4], section| {
            extract_boards(boards, section, &base);
        })?;

        let mut boards = BoardKind::ALL.map(RankBoard::empty);
        collector.visit(&self.page_url, &mut boards).await?;

        let snapshot = RankSnapshot::build(|kind| {
            std::mem::replace(&mut boards[board_index(kind)], RankBoard::empty(kind))
        });
        tracing::info!(entries = snapshot.entry_count(), "oricon ranking scraped");
        Ok(snapshot)
    }
}
