//! Error types for giftbox.

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum GiftError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Project file (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Config file could not be parsed.
    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Config could not be serialized.
    #[error("config write error: {0}")]
    ConfigWrite(#[from] toml::ser::Error),

    /// Video metadata lookup failed.
    #[error("lookup error: {0}")]
    Lookup(String),

    /// Playback widget failure.
    #[error("player error: {0}")]
    Player(String),

    /// A catalog entry that does not name a video.
    #[error("not a video reference: {0}")]
    InvalidReference(String),
}

impl From<reqwest::Error> for GiftError {
    fn from(e: reqwest::Error) -> Self {
        Self::Lookup(e.to_string())
    }
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, GiftError>;
