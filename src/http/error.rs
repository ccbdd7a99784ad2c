use rouille::Response;
use serde::Serialize;

use crate::{catalog::error::CatalogError, signer::SignerError};

/// Client-facing error. Bodies are generic on purpose: raw store or signer
/// error text can contain storage keys or connection details and must never
/// reach the caller.
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::SongNotFound(_) => ApiError::NotFound("Song not found".into()),

            CatalogError::NoSongsForAlbum(_) => ApiError::NotFound("Album not found".into()),

            CatalogError::Database(_) | CatalogError::Pool(_) | CatalogError::Internal(_) => {
                ApiError::Internal("Internal server error".into())
            }
        }
    }
}

impl From<SignerError> for ApiError {
    fn from(err: SignerError) -> Self {
        match err {
            SignerError::Backend(_) => ApiError::Internal("Could not generate stream URL".into()),
        }
    }
}

impl ApiError {
    pub fn into_response(self) -> Response {
        let (message, status) = match self {
            ApiError::NotFound(message) => (message, 404),
            ApiError::Internal(message) => (message, 500),
        };

        Response::json(&ErrorBody { error: message }).with_status_code(status)
    }
}
