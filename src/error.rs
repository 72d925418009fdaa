use thiserror::Error;

/// Central error type for the stem-splitter-server crate.
#[derive(Debug, Error)]
pub enum StemError {
    // Generic fallback (wraps anyhow)
    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),

    // Domain-specific variants
    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    #[error("File type not allowed: {0}")]
    DisallowedExtension(String),

    #[error("Not found: {path}")]
    NotFound { path: String },

    #[error("Separation command is empty")]
    EmptyCommand,

    #[error("Failed to spawn `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Config error: {0}")]
    Config(String),
}

// --- Implement From conversions for common errors ---
impl From<std::io::Error> for StemError {
    fn from(e: std::io::Error) -> Self {
        StemError::Anyhow(e.into())
    }
}

impl From<serde_json::Error> for StemError {
    fn from(e: serde_json::Error) -> Self {
        StemError::Anyhow(e.into())
    }
}

impl From<globset::Error> for StemError {
    fn from(e: globset::Error) -> Self {
        StemError::Anyhow(e.into())
    }
}

pub type Result<T> = std::result::Result<T, StemError>;
