pub mod client;
pub mod error;
pub mod repository;

pub use client::{resolve_config, Ecr};
pub use error::ApiError;
pub use repository::{
    CreateRepositoryRequest, EcrApi, EncryptionConfiguration, ImageScanningConfiguration,
    Repository, ENCRYPTION_TYPE_VALUES, TAG_MUTABILITY_VALUES,
};
