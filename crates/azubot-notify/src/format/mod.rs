//! Turns harvested records into Markdown message bodies.
//!
//! Every formatter is pure: the same input always yields the same chunk
//! sequence. Each chunk is meant to be delivered as one chat message.

mod creator;

pub use creator::{creator_chunks, CONTENT_ITEMS_PER_CHUNK};

use azubot_core::{RankSnapshot, Trend, TrendingEntry, VocaloidEntry};

/// Trending repositories shown per run, however many were scraped.
pub const TRENDING_DISPLAY_LIMIT: usize = 6;

pub const VOCALOID_ENTRIES_PER_CHUNK: usize = 10;

#[must_use]
pub fn trend_emoji(trend: Trend) -> &'static str {
    match trend {
        Trend::New => "🆕",
        Trend::Up => "🔼",
        Trend::Down => "🔻",
        Trend::Stay => "▶️",
        Trend::Unknown => "",
    }
}

/// One chunk per board, in snapshot order. Boards with no entries are
/// skipped.
#[must_use]
pub fn ranking_chunks(snapshot: &RankSnapshot) -> Vec<String> {
    snapshot
        .boards()
        .iter()
        .filter(|board| !board.entries.is_empty())
        .map(|board| {
            let mut chunk = format!("### {}\n", board.label());
            for entry in &board.entries {
                let line = match entry.link.as_deref() {
                    Some(link) => format!("[{}](<{link}>) - {}", entry.title, entry.artist),
                    None => format!("{} - {}", entry.title, entry.artist),
                };
                chunk.push_str(&line);
                let emoji = trend_emoji(entry.trend);
                if !emoji.is_empty() {
                    chunk.push(' ');
                    chunk.push_str(emoji);
                }
                chunk.push('\n');
            }
            chunk
        })
        .collect()
}

/// A single chunk with the first [`TRENDING_DISPLAY_LIMIT`] repositories.
#[must_use]
pub fn trending_chunks(entries: &[TrendingEntry]) -> Vec<String> {
    if entries.is_empty() {
        return Vec::new();
    }

    let mut chunk = String::new();
    for (idx, entry) in entries.iter().take(TRENDING_DISPLAY_LIMIT).enumerate() {
        let language = entry
            .language
            .as_deref()
            .map(|lang| format!("**{lang}** - "))
            .unwrap_or_default();
        chunk.push_str(&format!(
            "## \\#{}  [{}]({})\n{language}⭐ {}\n",
            idx + 1,
            entry.title,
            entry.link,
            entry.stars
        ));
        chunk.push_str(entry.description.as_deref().unwrap_or_default());
        chunk.push_str("\n\n");
    }
    vec![chunk]
}

/// Numbered song list, [`VOCALOID_ENTRIES_PER_CHUNK`] songs per chunk.
/// Numbering continues across chunks.
#[must_use]
pub fn vocaloid_chunks(entries: &[VocaloidEntry]) -> Vec<String> {
    entries
        .chunks(VOCALOID_ENTRIES_PER_CHUNK)
        .enumerate()
        .map(|(chunk_idx, songs)| {
            let mut chunk = String::new();
            for (offset, song) in songs.iter().enumerate() {
                let rank = chunk_idx * VOCALOID_ENTRIES_PER_CHUNK + offset + 1;
                let line = match song.pv_url.as_deref() {
                    Some(url) => format!("{rank}. [{}](<{url}>) - {}\n", song.name, song.artist),
                    None => format!("{rank}. {} - {}\n", song.name, song.artist),
                };
                chunk.push_str(&line);
            }
            chunk
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use azubot_core::{BoardKind, RankBoard, RankEntry};

    fn entry(title: &str, link: Option<&str>, trend: Trend) -> RankEntry {
        RankEntry {
            title: title.to_owned(),
            artist: "Artist".to_owned(),
            link: link.map(str::to_owned),
            trend,
        }
    }

    #[test]
    fn ranking_renders_one_chunk_per_populated_board() {
        let snapshot = RankSnapshot::build(|kind| match kind {
            BoardKind::DailySingle => RankBoard {
                kind,
                rule: "デイリー シングルランキング".to_owned(),
                entries: vec![
                    entry("Song", Some("https://www.oricon.co.jp/prof/1/"), Trend::New),
                    entry("Plain", None, Trend::Unknown),
                ],
            },
            BoardKind::WeeklyAlbum => RankBoard {
                kind,
                rule: String::new(),
                entries: vec![entry("Album", None, Trend::Stay)],
            },
            _ => RankBoard::empty(kind),
        });

        let chunks = ranking_chunks(&snapshot);
        assert_eq!(chunks.len(), 2);
        assert_eq!(
            chunks[0],
            "### デイリー シングルランキング\n\
             [Song](<https://www.oricon.co.jp/prof/1/>) - Artist 🆕\n\
             Plain - Artist\n"
        );
        assert_eq!(chunks[1], "### Weekly Albums\nAlbum - Artist ▶️\n");
    }

    #[test]
    fn empty_snapshot_yields_nothing() {
        let snapshot = RankSnapshot::build(RankBoard::empty);
        assert!(ranking_chunks(&snapshot).is_empty());
    }

    #[test]
    fn trend_emojis() {
        assert_eq!(trend_emoji(Trend::Up), "🔼");
        assert_eq!(trend_emoji(Trend::Down), "🔻");
        assert_eq!(trend_emoji(Trend::Unknown), "");
    }

    fn repo(n: usize, language: Option<&str>) -> TrendingEntry {
        TrendingEntry {
            title: format!("owner/repo{n}"),
            link: format!("https://github.com/owner/repo{n}"),
            stars: "1,234".to_owned(),
            language: language.map(str::to_owned),
            description: Some(format!("repo number {n}")),
        }
    }

    #[test]
    fn trending_is_capped_and_numbered() {
        let entries: Vec<_> = (1..=9).map(|n| repo(n, Some("Rust"))).collect();
        let chunks = trending_chunks(&entries);
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].starts_with(
            "## \\#1  [owner/repo1](https://github.com/owner/repo1)\n**Rust** - ⭐ 1,234\nrepo number 1\n\n"
        ));
        assert!(chunks[0].contains("\\#6  "));
        assert!(!chunks[0].contains("\\#7  "));
    }

    #[test]
    fn trending_without_language_or_description() {
        let mut entry = repo(1, None);
        entry.description = None;
        assert_eq!(
            trending_chunks(&[entry]),
            vec!["## \\#1  [owner/repo1](https://github.com/owner/repo1)\n⭐ 1,234\n\n\n".to_owned()]
        );
        assert!(trending_chunks(&[]).is_empty());
    }

    #[test]
    fn vocaloid_chunks_of_ten() {
        let songs: Vec<_> = (1..=12)
            .map(|id| VocaloidEntry {
                id,
                name: format!("song{id}"),
                artist: "P".to_owned(),
                pv_url: (id % 2 == 0).then(|| format!("https://yt.test/{id}")),
            })
            .collect();
        let chunks = vocaloid_chunks(&songs);
        assert_eq!(chunks.len(), 2);
        assert!(chunks[0].starts_with("1. song1 - P\n2. [song2](<https://yt.test/2>) - P\n"));
        assert_eq!(chunks[0].lines().count(), 10);
        assert_eq!(
            chunks[1],
            "11. song11 - P\n12. [song12](<https://yt.test/12>) - P\n"
        );
    }
}
