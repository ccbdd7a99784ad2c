/// Public projection of a catalog song.
///
/// The storage key of the audio object is deliberately not representable
/// here; it never leaves the catalog layer except as input to the signer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Song {
    pub id: i64,
    pub title: String,
    pub artist: String,
    pub cover_art_url: Option<String>,
}

/// Song as listed under an album. The album carries the cover art.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumSong {
    pub id: i64,
    pub title: String,
    pub artist: String,
}
