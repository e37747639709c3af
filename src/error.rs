//! Domain errors for configuration loading and layout uploads.
//!
//! Engine setup keeps using `anyhow::Result`; everything a user can trigger at
//! runtime (reading a config file, posting a layout) is reported through
//! [`PlacerError`] so callers can log or count failures without panicking.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum PlacerError {
    #[error("could not read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    ConfigParse(#[from] toml::de::Error),
    #[error("invalid config value for {field}: {reason}")]
    InvalidConfig { field: &'static str, reason: String },
    #[error("invalid upload url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("upload request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("upload rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

pub type Result<T> = std::result::Result<T, PlacerError>;
