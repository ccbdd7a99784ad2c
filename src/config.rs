use anyhow::Context;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Validity window of issued stream URLs. Expiry is the only way a leaked
/// URL stops working, so this is the security policy knob of the service:
/// short enough to limit exposure, long enough to cover playback start.
pub const DEFAULT_STREAM_TTL_SECS: u32 = 300;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub version: u32,
    pub database: Database,
    pub object_store: ObjectStore,
    pub http: HttpConfig,
    #[serde(default)]
    pub stream: Stream,
}

impl Config {
    pub fn load(path: &Path) -> anyhow::Result<Config> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.to_string_lossy()))?;
        toml::from_str(&contents).with_context(|| "Failed to parse config TOML")
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub bind_addr: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct Database {
    #[serde(default)]
    pub in_memory: bool,
    pub path: Option<PathBuf>,
}

/// Connection details of the private bucket holding the audio objects.
/// Any S3-compatible endpoint works (R2, MinIO, AWS).
#[derive(Debug, Deserialize)]
pub struct ObjectStore {
    pub endpoint: String,
    #[serde(default = "default_region")]
    pub region: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
}

fn default_region() -> String {
    "auto".to_string()
}

#[derive(Debug, Deserialize)]
pub struct Stream {
    #[serde(default = "default_stream_ttl")]
    pub url_ttl_secs: u32,
}

impl Default for Stream {
    fn default() -> Self {
        Self {
            url_ttl_secs: DEFAULT_STREAM_TTL_SECS,
        }
    }
}

fn default_stream_ttl() -> u32 {
    DEFAULT_STREAM_TTL_SECS
}
