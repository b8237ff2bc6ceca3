//! ECR repository data source, looking up a repository by exact name

use crate::provider_data::AwsProviderData;
use async_trait::async_trait;
use tfbridge::data_source::{
    ConfigureDataSourceRequest, ConfigureDataSourceResponse, DataSourceSchemaRequest,
    DataSourceSchemaResponse, ReadDataSourceRequest, ReadDataSourceResponse,
    ValidateDataSourceConfigRequest, ValidateDataSourceConfigResponse,
};
use tfbridge::{
    AttributeBuilder, AttributePath, AttributeType, Context, DataSource, DataSourceWithConfigure,
    Diagnostic, DynamicValue, SchemaBuilder,
};
use tracing::debug;

pub struct EcrRepositoryDataSource {
    provider_data: Option<AwsProviderData>,
}

impl EcrRepositoryDataSource {
    pub fn new() -> Self {
        Self {
            provider_data: None,
        }
    }
}

impl Default for EcrRepositoryDataSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DataSource for EcrRepositoryDataSource {
    fn type_name(&self) -> &str {
        "awsextra_ecr_repository"
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: DataSourceSchemaRequest,
    ) -> DataSourceSchemaResponse {
        let schema = SchemaBuilder::new()
            .version(1)
            .description("Looks up an existing ECR repository by name")
            .attribute(
                AttributeBuilder::new("id", AttributeType::String)
                    .computed()
                    .description("ARN of the repository")
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("name", AttributeType::String)
                    .required()
                    .description("Exact name of the repository to look up")
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("arn", AttributeType::String)
                    .computed()
                    .description("Full ARN of the repository")
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("registry_id", AttributeType::String)
                    .computed()
                    .description("Registry ID where the repository lives")
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("repository_url", AttributeType::String)
                    .computed()
                    .description("URL of the repository")
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("image_tag_mutability", AttributeType::String)
                    .computed()
                    .description("Tag mutability setting of the repository")
                    .build(),
            )
            .build();

        DataSourceSchemaResponse {
            schema,
            diagnostics: vec![],
        }
    }

    async fn validate(
        &self,
        _ctx: Context,
        _request: ValidateDataSourceConfigRequest,
    ) -> ValidateDataSourceConfigResponse {
        ValidateDataSourceConfigResponse {
            diagnostics: vec![],
        }
    }

    async fn read(&self, _ctx: Context, request: ReadDataSourceRequest) -> ReadDataSourceResponse {
        let Some(data) = self.provider_data.as_ref() else {
            return ReadDataSourceResponse {
                state: DynamicValue::null(),
                diagnostics: vec![Diagnostic::error(
                    "Data source not configured",
                    "Provider data was not set before use",
                )],
            };
        };

        let name = request
            .config
            .get_string(&AttributePath::new("name"))
            .unwrap_or_default();

        debug!(name = %name, "looking up repository");

        // Unlike the resource's refresh, a missing repository is an error
        // here: the lookup exists to reference a repository that must exist.
        match data.ecr.describe_repository(&name).await {
            Ok(repo) => {
                let mut state = request.config.clone();
                let _ = state.set_string(&AttributePath::new("id"), repo.arn.clone());
                let _ = state.set_string(&AttributePath::new("name"), repo.name.clone());
                let _ = state.set_string(&AttributePath::new("arn"), repo.arn.clone());
                let _ = state.set_string(
                    &AttributePath::new("registry_id"),
                    repo.registry_id.clone(),
                );
                let _ = state.set_string(
                    &AttributePath::new("repository_url"),
                    repo.repository_url.clone(),
                );
                let _ = state.set_string(
                    &AttributePath::new("image_tag_mutability"),
                    repo.image_tag_mutability.clone(),
                );
                ReadDataSourceResponse {
                    state,
                    diagnostics: vec![],
                }
            }
            Err(err) => ReadDataSourceResponse {
                state: DynamicValue::null(),
                diagnostics: vec![Diagnostic::error(
                    format!("Failed to look up ECR repository '{}'", name),
                    err.to_string(),
                )],
            },
        }
    }
}

#[async_trait]
impl DataSourceWithConfigure for EcrRepositoryDataSource {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureDataSourceRequest,
    ) -> ConfigureDataSourceResponse {
        let mut diagnostics = vec![];

        if let Some(data) = request.provider_data {
            match data.downcast_ref::<AwsProviderData>() {
                Some(data) => self.provider_data = Some(data.clone()),
                None => diagnostics.push(Diagnostic::error(
                    "Invalid provider data",
                    "Expected AwsProviderData",
                )),
            }
        }

        ConfigureDataSourceResponse { diagnostics }
    }
}
