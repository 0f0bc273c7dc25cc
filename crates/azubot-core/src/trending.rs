/// One repository from the trending listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrendingEntry {
    /// `owner/name`, derived from the repository path.
    pub title: String,
    pub link: String,
    /// Star count exactly as displayed (e.g. "12,345").
    pub stars: String,
    pub language: Option<String>,
    pub description: Option<String>,
}
