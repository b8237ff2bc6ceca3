use thiserror::Error;

/// Error taxonomy for the ECR adapter layer.
///
/// Errors are reported upward unchanged; the host framework and the AWS SDK
/// transport own transient-fault retry, so nothing here is retried.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Neither a profile nor an access key pair was supplied; detected
    /// before any network call
    #[error("authentication is not configured: {0}")]
    AuthenticationConfiguration(String),

    /// Credential/config construction failed
    #[error("failed to resolve AWS configuration: {0}")]
    Configuration(String),

    /// The named repository does not exist remotely
    #[error("repository '{name}' not found")]
    NotFound { name: String },

    /// Any other failure from the ECR API (permissions, throttling,
    /// server-side validation)
    #[error("ECR API error: {0}")]
    Remote(String),
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound { .. })
    }
}
