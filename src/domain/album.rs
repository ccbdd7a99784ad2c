/// Public projection of a catalog album.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Album {
    pub id: i64,
    pub title: String,
    pub cover_art_url: Option<String>,
}
