//! Chart ranking records.

/// Chart movement since the previous period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Trend {
    New,
    Up,
    Down,
    Stay,
    #[default]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RankEntry {
    pub title: String,
    pub artist: String,
    /// Absolute URL of the entry's detail page, when the chart links one.
    pub link: Option<String>,
    pub trend: Trend,
}

/// The four boards published on the ranking page, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardKind {
    DailySingle,
    DailyAlbum,
    WeeklySingle,
    WeeklyAlbum,
}

impl BoardKind {
    pub const ALL: [BoardKind; 4] = [
        BoardKind::DailySingle,
        BoardKind::DailyAlbum,
        BoardKind::WeeklySingle,
        BoardKind::WeeklyAlbum,
    ];

    /// Label used when the page does not provide a heading for the board.
    #[must_use]
    pub fn fallback_label(self) -> &'static str {
        match self {
            BoardKind::DailySingle => "Daily Singles",
            BoardKind::DailyAlbum => "Daily Albums",
            BoardKind::WeeklySingle => "Weekly Singles",
            BoardKind::WeeklyAlbum => "Weekly Albums",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankBoard {
    pub kind: BoardKind,
    /// Heading text scraped from the page (e.g. "デイリー シングルランキング").
    pub rule: String,
    pub entries: Vec<RankEntry>,
}

impl RankBoard {
    #[must_use]
    pub fn empty(kind: BoardKind) -> Self {
        Self {
            kind,
            rule: String::new(),
            entries: Vec::new(),
        }
    }

    /// Scraped heading, or the board's fallback label when none was found.
    #[must_use]
    pub fn label(&self) -> &str {
        let rule = self.rule.trim();
        if rule.is_empty() {
            self.kind.fallback_label()
        } else {
            rule
        }
    }
}

/// One fetch of the ranking page: always exactly four boards in
/// [`BoardKind::ALL`] order, some possibly empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankSnapshot {
    boards: [RankBoard; 4],
}

impl RankSnapshot {
    /// Builds a snapshot, filling each slot via `board_for` in fixed order.
    pub fn build(mut board_for: impl FnMut(BoardKind) -> RankBoard) -> Self {
        let boards = BoardKind::ALL.map(|kind| {
            let mut board = board_for(kind);
            board.kind = kind;
            board
        });
        Self { boards }
    }

    #[must_use]
    pub fn boards(&self) -> &[RankBoard; 4] {
        &self.boards
    }

    #[must_use]
    pub fn board(&self, kind: BoardKind) -> &RankBoard {
        let idx = BoardKind::ALL
            .iter()
            .position(|k| *k == kind)
            .unwrap_or_default();
        &self.boards[idx]
    }

    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.boards.iter().map(|b| b.entries.len()).sum()
    }
}
