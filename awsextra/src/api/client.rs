//! Credential resolution and the SDK-backed ECR client

use super::error::ApiError;
use super::repository::{
    CreateRepositoryRequest, EcrApi, EncryptionConfiguration, ImageScanningConfiguration,
    Repository,
};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_ecr::config::Credentials;
use aws_sdk_ecr::error::DisplayErrorContext;
use aws_sdk_ecr::types as ecr_types;
use tracing::debug;

/// Build an SDK configuration from provider settings.
///
/// A non-empty profile selects the shared-config credential chain and any
/// static keys are ignored. Otherwise the static keys are used directly,
/// with the session token attached when present.
pub async fn resolve_config(
    region: &str,
    profile: &str,
    access_key: &str,
    secret_key: &str,
    token: &str,
) -> Result<SdkConfig, ApiError> {
    if region.is_empty() {
        return Err(ApiError::Configuration("region must be set".to_string()));
    }

    let loader = aws_config::defaults(BehaviorVersion::latest()).region(Region::new(region.to_string()));

    let config = if !profile.is_empty() {
        debug!(profile = %profile, region = %region, "resolving credentials from profile");
        loader.profile_name(profile).load().await
    } else {
        debug!(region = %region, "resolving static credentials");
        let session_token = (!token.is_empty()).then(|| token.to_string());
        let credentials = Credentials::new(access_key, secret_key, session_token, None, "static");
        loader.credentials_provider(credentials).load().await
    };

    Ok(config)
}

/// ECR client backed by the AWS SDK
pub struct Ecr {
    client: aws_sdk_ecr::Client,
}

impl Ecr {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: aws_sdk_ecr::Client::new(config),
        }
    }
}

fn from_sdk_repository(repo: &ecr_types::Repository) -> Repository {
    Repository {
        name: repo.repository_name().unwrap_or_default().to_string(),
        arn: repo.repository_arn().unwrap_or_default().to_string(),
        registry_id: repo.registry_id().unwrap_or_default().to_string(),
        repository_url: repo.repository_uri().unwrap_or_default().to_string(),
        image_tag_mutability: repo
            .image_tag_mutability()
            .map(|m| m.as_str().to_string())
            .unwrap_or_default(),
        image_scanning_configuration: repo.image_scanning_configuration().map(|c| {
            ImageScanningConfiguration {
                scan_on_push: c.scan_on_push(),
            }
        }),
        encryption_configuration: repo.encryption_configuration().map(|c| {
            EncryptionConfiguration {
                encryption_type: c.encryption_type().as_str().to_string(),
            }
        }),
    }
}

fn remote_error<E: std::error::Error>(err: &E) -> ApiError {
    ApiError::Remote(format!("{}", DisplayErrorContext(err)))
}

#[async_trait]
impl EcrApi for Ecr {
    async fn describe_repository(&self, name: &str) -> Result<Repository, ApiError> {
        debug!(name = %name, "describing repository");
        let output = self
            .client
            .describe_repositories()
            .repository_names(name)
            .send()
            .await
            .map_err(|err| {
                let not_found = err
                    .as_service_error()
                    .map(|e| e.is_repository_not_found_exception())
                    .unwrap_or(false);
                if not_found {
                    ApiError::NotFound {
                        name: name.to_string(),
                    }
                } else {
                    remote_error(&err)
                }
            })?;

        output
            .repositories()
            .first()
            .map(from_sdk_repository)
            .ok_or_else(|| ApiError::NotFound {
                name: name.to_string(),
            })
    }

    async fn create_repository(
        &self,
        request: &CreateRepositoryRequest,
    ) -> Result<Repository, ApiError> {
        debug!(name = %request.name, "creating repository");
        let mut builder = self
            .client
            .create_repository()
            .repository_name(&request.name)
            .image_tag_mutability(ecr_types::ImageTagMutability::from(
                request.image_tag_mutability.as_str(),
            ));

        if let Some(scanning) = &request.image_scanning_configuration {
            builder = builder.image_scanning_configuration(
                ecr_types::ImageScanningConfiguration::builder()
                    .scan_on_push(scanning.scan_on_push)
                    .build(),
            );
        }

        if let Some(encryption) = &request.encryption_configuration {
            let config = ecr_types::EncryptionConfiguration::builder()
                .encryption_type(ecr_types::EncryptionType::from(
                    encryption.encryption_type.as_str(),
                ))
                .build()
                .map_err(|err| ApiError::Configuration(err.to_string()))?;
            builder = builder.encryption_configuration(config);
        }

        let output = builder.send().await.map_err(|err| remote_error(&err))?;

        output
            .repository()
            .map(from_sdk_repository)
            .ok_or_else(|| ApiError::Remote("create response carried no repository".to_string()))
    }

    async fn put_image_tag_mutability(
        &self,
        registry_id: Option<&str>,
        name: &str,
        image_tag_mutability: &str,
    ) -> Result<(), ApiError> {
        debug!(name = %name, mutability = %image_tag_mutability, "updating tag mutability");
        let mut builder = self
            .client
            .put_image_tag_mutability()
            .repository_name(name)
            .image_tag_mutability(ecr_types::ImageTagMutability::from(image_tag_mutability));
        if let Some(registry_id) = registry_id {
            builder = builder.registry_id(registry_id);
        }
        builder.send().await.map_err(|err| remote_error(&err))?;
        Ok(())
    }

    async fn put_image_scanning_configuration(
        &self,
        registry_id: Option<&str>,
        name: &str,
        scan_on_push: bool,
    ) -> Result<(), ApiError> {
        debug!(name = %name, scan_on_push, "updating scanning configuration");
        let mut builder = self
            .client
            .put_image_scanning_configuration()
            .repository_name(name)
            .image_scanning_configuration(
                ecr_types::ImageScanningConfiguration::builder()
                    .scan_on_push(scan_on_push)
                    .build(),
            );
        if let Some(registry_id) = registry_id {
            builder = builder.registry_id(registry_id);
        }
        builder.send().await.map_err(|err| remote_error(&err))?;
        Ok(())
    }

    async fn delete_repository(
        &self,
        registry_id: Option<&str>,
        name: &str,
        force: bool,
    ) -> Result<(), ApiError> {
        debug!(name = %name, force, "deleting repository");
        let mut builder = self
            .client
            .delete_repository()
            .repository_name(name)
            .force(force);
        if let Some(registry_id) = registry_id {
            builder = builder.registry_id(registry_id);
        }
        builder.send().await.map_err(|err| remote_error(&err))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_region_is_rejected() {
        let err = resolve_config("", "", "AKIA", "secret", "")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Configuration(_)));
    }

    #[tokio::test]
    async fn static_credentials_resolve() {
        let config = resolve_config("eu-central-1", "", "AKIA", "secret", "")
            .await
            .unwrap();
        assert_eq!(config.region().map(|r| r.as_ref()), Some("eu-central-1"));
    }

    #[tokio::test]
    async fn profile_wins_over_static_keys() {
        // Credential resolution is lazy, so loading succeeds even when the
        // profile does not exist; the point is that the static keys are
        // never consulted.
        let config = resolve_config("eu-west-1", "nonexistent-profile", "AKIA", "secret", "tok")
            .await
            .unwrap();
        assert_eq!(config.region().map(|r| r.as_ref()), Some("eu-west-1"));
    }

    #[tokio::test]
    async fn session_token_is_accepted() {
        let config = resolve_config("us-east-1", "", "AKIA", "secret", "session")
            .await
            .unwrap();
        assert_eq!(config.region().map(|r| r.as_ref()), Some("us-east-1"));
    }
}
