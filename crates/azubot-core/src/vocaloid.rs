/// One song from the daily top-rated list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VocaloidEntry {
    pub id: i64,
    pub name: String,
    pub artist: String,
    /// Preferred promotional video link, filled by enrichment.
    pub pv_url: Option<String>,
}
