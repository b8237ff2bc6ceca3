//! Error types for tfbridge

/// Error type for tfbridge operations
#[derive(Debug, thiserror::Error)]
pub enum TfbridgeError {
    #[error("Resource type not found: {0}")]
    ResourceNotFound(String),

    #[error("Data source type not found: {0}")]
    DataSourceNotFound(String),

    #[error("Provider not configured")]
    ProviderNotConfigured,

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),

    #[error("Decoding error: {0}")]
    DecodingError(String),

    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    #[error("Import failed: {0}")]
    ImportFailed(String),

    #[error("{0}")]
    Custom(String),
}

/// Result type alias for tfbridge operations
pub type Result<T> = std::result::Result<T, TfbridgeError>;

impl From<String> for TfbridgeError {
    fn from(s: String) -> Self {
        TfbridgeError::Custom(s)
    }
}

impl From<&str> for TfbridgeError {
    fn from(s: &str) -> Self {
        TfbridgeError::Custom(s.to_string())
    }
}
