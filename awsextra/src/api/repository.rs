//! Domain model and operation trait for the ECR repository API
//!
//! The trait is the seam between resource code and the AWS SDK: resources
//! hold an `Arc<dyn EcrApi>`, the provider wires in the SDK-backed client,
//! and tests substitute a recording fake.

use super::error::ApiError;
use async_trait::async_trait;

/// Tag mutability values accepted by the service
pub const TAG_MUTABILITY_VALUES: &[&str] = &["MUTABLE", "IMMUTABLE", "IMMUTABLE_WITH_EXCLUSION"];

/// Encryption types accepted by the service
pub const ENCRYPTION_TYPE_VALUES: &[&str] = &["AES256", "KMS"];

/// An ECR repository as reported by the service
#[derive(Debug, Clone, PartialEq)]
pub struct Repository {
    pub name: String,
    pub arn: String,
    pub registry_id: String,
    pub repository_url: String,
    pub image_tag_mutability: String,
    pub image_scanning_configuration: Option<ImageScanningConfiguration>,
    pub encryption_configuration: Option<EncryptionConfiguration>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageScanningConfiguration {
    pub scan_on_push: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EncryptionConfiguration {
    pub encryption_type: String,
}

/// Request body for repository creation. Optional sub-structs left as None
/// are omitted from the API call, deferring to server-side defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateRepositoryRequest {
    pub name: String,
    pub image_tag_mutability: String,
    pub image_scanning_configuration: Option<ImageScanningConfiguration>,
    pub encryption_configuration: Option<EncryptionConfiguration>,
}

/// The five typed request/response exchanges this provider performs.
/// No batching, pagination, or streaming; one call per method.
#[async_trait]
pub trait EcrApi: Send + Sync {
    /// Describe a single repository by exact name
    async fn describe_repository(&self, name: &str) -> Result<Repository, ApiError>;

    /// Create a repository and return the server's view of it
    async fn create_repository(
        &self,
        request: &CreateRepositoryRequest,
    ) -> Result<Repository, ApiError>;

    /// Update tag mutability in place
    async fn put_image_tag_mutability(
        &self,
        registry_id: Option<&str>,
        name: &str,
        image_tag_mutability: &str,
    ) -> Result<(), ApiError>;

    /// Update the scanning configuration in place
    async fn put_image_scanning_configuration(
        &self,
        registry_id: Option<&str>,
        name: &str,
        scan_on_push: bool,
    ) -> Result<(), ApiError>;

    /// Delete a repository; `force` cascades to contained images
    async fn delete_repository(
        &self,
        registry_id: Option<&str>,
        name: &str,
        force: bool,
    ) -> Result<(), ApiError>;
}
