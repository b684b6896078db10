//! Error types for the tab strip

use thiserror::Error;

/// Result type alias for tab strip operations
pub type TabStripResult<T> = Result<T, TabStripError>;

/// Main error type for the tab strip
#[derive(Error, Debug)]
pub enum TabStripError {
    #[error("Tab index {index} out of range for {count} tabs")]
    IndexOutOfRange { index: usize, count: usize },

    #[error("Tab strip is empty")]
    Empty,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Script error: {0}")]
    Script(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TabStripError {
    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new script error
    pub fn script(msg: impl Into<String>) -> Self {
        Self::Script(msg.into())
    }
}
