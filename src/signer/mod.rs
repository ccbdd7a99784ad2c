use thiserror::Error;

pub mod s3;

pub use s3::S3UrlSigner;

#[derive(Debug, Error)]
pub enum SignerError {
    #[error("object store signing failed: {0}")]
    Backend(String),
}

/// Issues short-lived signed GET URLs for objects in the private bucket.
///
/// A trait so request handlers can run against a substitute implementation
/// in tests. Implementations must not keep or log the key-to-URL mapping;
/// a capability exists only inside the request that asked for it.
pub trait UrlSigner: Send + Sync {
    /// Returns a URL granting read access to `object_key` for `ttl_secs`
    /// seconds from now. Every call produces a fresh URL; nothing is cached
    /// or deduplicated.
    fn sign_get(&self, object_key: &str, ttl_secs: u32) -> Result<String, SignerError>;
}
