use s3::{Bucket, Region, creds::Credentials};

use crate::{
    config::ObjectStore,
    signer::{SignerError, UrlSigner},
};

/// Signer over a single S3-compatible bucket (R2, MinIO, AWS).
///
/// Presigning is local SigV4 computation; issuing a capability makes no
/// network round trip. Expiry is enforced by the object store when the URL
/// is used, not by this service.
pub struct S3UrlSigner {
    bucket: Bucket,
}

impl S3UrlSigner {
    pub fn new(config: &ObjectStore) -> Result<Self, SignerError> {
        let region = Region::Custom {
            region: config.region.clone(),
            endpoint: config.endpoint.clone(),
        };

        let credentials = Credentials::new(
            Some(&config.access_key),
            Some(&config.secret_key),
            None,
            None,
            None,
        )
        .map_err(|e| SignerError::Backend(format!("invalid object store credentials: {e}")))?;

        // path-style addressing works across R2 and MinIO
        let bucket = Bucket::new(&config.bucket, region, credentials)
            .map_err(|e| SignerError::Backend(format!("bucket setup failed: {e}")))?
            .with_path_style();

        Ok(Self { bucket: *bucket })
    }
}

impl UrlSigner for S3UrlSigner {
    fn sign_get(&self, object_key: &str, ttl_secs: u32) -> Result<String, SignerError> {
        self.bucket
            .presign_get(object_key, ttl_secs, None)
            .map_err(|e| SignerError::Backend(format!("presign GET failed: {e}")))
    }
}
