use anyhow::Result;
use std::time::Duration;

/// Default expiry for the put-capable upload URL (15 minutes)
const DEFAULT_UPLOAD_URL_EXPIRY_SECS: u64 = 15 * 60;
/// Default expiry for get-capable gallery URLs (1 hour)
const DEFAULT_READ_URL_EXPIRY_SECS: u64 = 60 * 60;

/// Configuration for the gallery server
#[derive(Debug, Clone)]
pub struct Config {
    /// S3 bucket holding the uploaded images
    pub bucket: String,
    /// Port the HTTP server listens on
    pub port: u16,
    /// Expiry for the put-capable upload URL issued per render
    pub upload_url_expiry: Duration,
    /// Expiry for the get-capable URLs attached to gallery entries
    pub read_url_expiry: Duration,
}

impl Config {
    pub fn new(bucket: String) -> Result<Self> {
        if bucket.trim().is_empty() {
            anyhow::bail!("Bucket name must not be empty");
        }

        Ok(Config {
            bucket,
            port: 3000,
            upload_url_expiry: Duration::from_secs(DEFAULT_UPLOAD_URL_EXPIRY_SECS),
            read_url_expiry: Duration::from_secs(DEFAULT_READ_URL_EXPIRY_SECS),
        })
    }

    /// Build the configuration from environment variables.
    /// `GALLERY_BUCKET` is required; `PORT`, `GALLERY_UPLOAD_URL_EXPIRY_SECS`
    /// and `GALLERY_READ_URL_EXPIRY_SECS` override the defaults.
    pub fn from_env() -> Result<Self> {
        let bucket = std::env::var("GALLERY_BUCKET")
            .map_err(|_| anyhow::anyhow!("GALLERY_BUCKET environment variable must be set"))?;

        let mut config = Config::new(bucket)?;

        if let Some(port) = std::env::var("PORT").ok().and_then(|p| p.parse().ok()) {
            config.port = port;
        }
        if let Some(secs) = std::env::var("GALLERY_UPLOAD_URL_EXPIRY_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
        {
            config.upload_url_expiry = Duration::from_secs(secs);
        }
        if let Some(secs) = std::env::var("GALLERY_READ_URL_EXPIRY_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
        {
            config.read_url_expiry = Duration::from_secs(secs);
        }

        Ok(config)
    }
}
