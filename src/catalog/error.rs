use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("song {0} not found")]
    SongNotFound(i64),

    #[error("no songs for album {0}")]
    NoSongsForAlbum(i64),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl CatalogError {
    /// true for "the thing you asked for is absent", as opposed to the
    /// store itself failing
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CatalogError::SongNotFound(_) | CatalogError::NoSongsForAlbum(_)
        )
    }
}
