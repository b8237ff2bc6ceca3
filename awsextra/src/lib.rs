//! Terraform provider for AWS resources beyond the mainline provider's
//! coverage, currently ECR repositories.
//!
//! The provider resolves credentials from configuration or the usual AWS
//! environment variables, builds one ECR client, and hands it to every
//! resource and data source instance through provider data.

pub mod api;
pub mod data_sources;
pub mod provider_data;
pub mod resources;

use crate::api::{resolve_config, Ecr, EcrApi};
use crate::data_sources::ecr_repository::EcrRepositoryDataSource;
use crate::provider_data::AwsProviderData;
use crate::resources::ecr::repository::EcrRepositoryResource;
use async_trait::async_trait;
use std::env;
use std::sync::Arc;
use tfbridge::defaults::EnvChainDefault;
use tfbridge::provider::{
    ConfigureProviderRequest, ConfigureProviderResponse, ProviderSchemaRequest,
    ProviderSchemaResponse,
};
use tfbridge::{
    AttributeBuilder, AttributePath, AttributeType, Context, DataSourceWithConfigure, Diagnostic,
    Provider, ResourceWithConfigure, SchemaBuilder, TfbridgeError,
};
use tracing::info;

const ECR_REPOSITORY: &str = "awsextra_ecr_repository";

pub struct AwsExtraProvider {
    api_override: Option<Arc<dyn EcrApi>>,
}

impl AwsExtraProvider {
    pub fn new() -> Self {
        Self { api_override: None }
    }

    /// Substitute the ECR client; used by tests to avoid real API calls
    pub fn with_api(api: Arc<dyn EcrApi>) -> Self {
        Self {
            api_override: Some(api),
        }
    }
}

impl Default for AwsExtraProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn config_or_env(
    config: &tfbridge::DynamicValue,
    name: &str,
    env_vars: &[&str],
) -> String {
    let value = config
        .get_string(&AttributePath::new(name))
        .unwrap_or_default();
    if !value.is_empty() {
        return value;
    }
    env_vars
        .iter()
        .find_map(|var| env::var(var).ok().filter(|v| !v.is_empty()))
        .unwrap_or_default()
}

#[async_trait]
impl Provider for AwsExtraProvider {
    fn type_name(&self) -> &str {
        "awsextra"
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: ProviderSchemaRequest,
    ) -> ProviderSchemaResponse {
        let schema = SchemaBuilder::new()
            .version(1)
            .description("AWS provider for resources outside mainline coverage")
            .attribute(
                AttributeBuilder::new("region", AttributeType::String)
                    .required()
                    .description("AWS region for all API calls")
                    .default(EnvChainDefault::create(&[
                        "AWS_REGION",
                        "AWS_DEFAULT_REGION",
                    ]))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("profile", AttributeType::String)
                    .optional()
                    .description("Shared-config profile to resolve credentials from")
                    .conflicts_with(&["access_key", "secret_key", "token"])
                    .default(EnvChainDefault::create(&[
                        "AWS_PROFILE",
                        "AWS_DEFAULT_PROFILE",
                    ]))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("access_key", AttributeType::String)
                    .optional()
                    .sensitive()
                    .description("Static access key ID")
                    .conflicts_with(&["profile"])
                    .required_with(&["secret_key"])
                    .default(EnvChainDefault::create(&["AWS_ACCESS_KEY_ID"]))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("secret_key", AttributeType::String)
                    .optional()
                    .sensitive()
                    .description("Static secret access key")
                    .conflicts_with(&["profile"])
                    .required_with(&["access_key"])
                    .default(EnvChainDefault::create(&["AWS_SECRET_ACCESS_KEY"]))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("token", AttributeType::String)
                    .optional()
                    .sensitive()
                    .description("Session token for temporary credentials")
                    .conflicts_with(&["profile"])
                    .default(EnvChainDefault::create(&["AWS_SESSION_TOKEN"]))
                    .build(),
            )
            .build();

        ProviderSchemaResponse {
            schema,
            diagnostics: vec![],
        }
    }

    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureProviderRequest,
    ) -> ConfigureProviderResponse {
        let region = config_or_env(&request.config, "region", &["AWS_REGION", "AWS_DEFAULT_REGION"]);
        let profile = config_or_env(
            &request.config,
            "profile",
            &["AWS_PROFILE", "AWS_DEFAULT_PROFILE"],
        );
        let access_key = config_or_env(&request.config, "access_key", &["AWS_ACCESS_KEY_ID"]);
        let secret_key = config_or_env(&request.config, "secret_key", &["AWS_SECRET_ACCESS_KEY"]);
        let token = config_or_env(&request.config, "token", &["AWS_SESSION_TOKEN"]);

        if let Some(api) = &self.api_override {
            return ConfigureProviderResponse {
                provider_data: Some(Arc::new(AwsProviderData::new(api.clone()))),
                diagnostics: vec![],
            };
        }

        if profile.is_empty() && access_key.is_empty() && secret_key.is_empty() && token.is_empty()
        {
            let err = api::ApiError::AuthenticationConfiguration(
                "must specify either profile or access_key/secret_key".to_string(),
            );
            return ConfigureProviderResponse {
                provider_data: None,
                diagnostics: vec![Diagnostic::error(
                    "Missing authentication configuration",
                    err.to_string(),
                )],
            };
        }

        let config = match resolve_config(&region, &profile, &access_key, &secret_key, &token).await
        {
            Ok(config) => config,
            Err(err) => {
                return ConfigureProviderResponse {
                    provider_data: None,
                    diagnostics: vec![Diagnostic::error(
                        "Failed to resolve AWS configuration",
                        err.to_string(),
                    )],
                }
            }
        };

        info!(region = %region, "provider configured");

        let ecr: Arc<dyn EcrApi> = Arc::new(Ecr::new(&config));
        ConfigureProviderResponse {
            provider_data: Some(Arc::new(AwsProviderData::new(ecr))),
            diagnostics: vec![],
        }
    }

    async fn create_resource(
        &self,
        type_name: &str,
    ) -> tfbridge::Result<Box<dyn ResourceWithConfigure>> {
        match type_name {
            ECR_REPOSITORY => Ok(Box::new(EcrRepositoryResource::new())),
            _ => Err(TfbridgeError::ResourceNotFound(type_name.to_string())),
        }
    }

    async fn create_data_source(
        &self,
        type_name: &str,
    ) -> tfbridge::Result<Box<dyn DataSourceWithConfigure>> {
        match type_name {
            ECR_REPOSITORY => Ok(Box::new(EcrRepositoryDataSource::new())),
            _ => Err(TfbridgeError::DataSourceNotFound(type_name.to_string())),
        }
    }

    fn resource_type_names(&self) -> Vec<&'static str> {
        vec![ECR_REPOSITORY]
    }

    fn data_source_type_names(&self) -> Vec<&'static str> {
        vec![ECR_REPOSITORY]
    }
}
