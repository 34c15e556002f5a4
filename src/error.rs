use thiserror::Error;

/// Result type alias for kiosk operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Catalog failed validation
    #[error("catalog error: {0}")]
    Catalog(String),

    /// Speech capture could not be (re)started
    #[error("capture error: {0}")]
    Capture(String),

    /// Capture kept failing after every allowed restart
    #[error("capture gave up after {attempts} attempts: {last_error}")]
    RetriesExhausted { attempts: u32, last_error: String },

    /// Settings or catalog path problem
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
