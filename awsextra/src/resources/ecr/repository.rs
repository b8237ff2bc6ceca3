//! ECR repository resource

use crate::api::TAG_MUTABILITY_VALUES;
use crate::provider_data::AwsProviderData;
use crate::resources::ecr::mapper;
use async_trait::async_trait;
use tfbridge::defaults::StaticDefault;
use tfbridge::diff::{SuppressIf, SuppressMissingBlock};
use tfbridge::resource::{
    ConfigureResourceRequest, ConfigureResourceResponse, CreateResourceRequest,
    CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse,
    ImportResourceStateRequest, ImportResourceStateResponse, ReadResourceRequest,
    ReadResourceResponse, ResourceSchemaRequest, ResourceSchemaResponse, UpdateResourceRequest,
    UpdateResourceResponse, ValidateResourceConfigRequest, ValidateResourceConfigResponse,
};
use tfbridge::validator::{OneOfValidator, PatternValidator, StringLengthValidator};
use tfbridge::{
    import_state_passthrough_id, AttributeBuilder, AttributePath, AttributeType, Context,
    Diagnostic, Dynamic, Resource, ResourceWithConfigure, SchemaBuilder,
};
use tracing::{debug, warn};

// Repository naming rules enforced by the service
const NAME_PATTERN: &str =
    r"^(?:[a-z0-9]+(?:[._-][a-z0-9]+)*/)*[a-z0-9]+(?:[._-][a-z0-9]+)*$";

pub struct EcrRepositoryResource {
    provider_data: Option<AwsProviderData>,
}

impl EcrRepositoryResource {
    pub fn new() -> Self {
        Self {
            provider_data: None,
        }
    }

    fn data(&self) -> Result<&AwsProviderData, Diagnostic> {
        self.provider_data.as_ref().ok_or_else(|| {
            Diagnostic::error(
                "Resource not configured",
                "Provider data was not set before use",
            )
        })
    }
}

impl Default for EcrRepositoryResource {
    fn default() -> Self {
        Self::new()
    }
}

fn scanning_object_type() -> AttributeType {
    let mut fields = std::collections::HashMap::new();
    fields.insert("scan_on_push".to_string(), AttributeType::Bool);
    AttributeType::Object(fields)
}

fn encryption_object_type() -> AttributeType {
    let mut fields = std::collections::HashMap::new();
    fields.insert("encryption_type".to_string(), AttributeType::String);
    AttributeType::Object(fields)
}

#[async_trait]
impl Resource for EcrRepositoryResource {
    fn type_name(&self) -> &str {
        "awsextra_ecr_repository"
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: ResourceSchemaRequest,
    ) -> ResourceSchemaResponse {
        let schema = SchemaBuilder::new()
            .version(1)
            .description("Manages an ECR container image repository")
            .attribute(
                AttributeBuilder::new("id", AttributeType::String)
                    .computed()
                    .description("Repository name, doubling as the resource identity")
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("name", AttributeType::String)
                    .required()
                    .force_new()
                    .description("Name of the repository")
                    .validator(StringLengthValidator::create(Some(2), Some(256)))
                    .validator(PatternValidator::create(
                        NAME_PATTERN,
                        "lowercase repository name segments separated by '.', '_', '-' or '/'",
                    ))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("image_tag_mutability", AttributeType::String)
                    .optional()
                    .description("Tag mutability setting for the repository")
                    .default(StaticDefault::string("MUTABLE"))
                    .validator(OneOfValidator::create(TAG_MUTABILITY_VALUES))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new(
                    "image_scanning_configuration",
                    AttributeType::List(Box::new(scanning_object_type())),
                )
                .optional()
                .max_items(1)
                .description("Image scanning configuration block")
                .diff_suppress(SuppressMissingBlock::create())
                .build(),
            )
            .attribute(
                AttributeBuilder::new(
                    "encryption_configuration",
                    AttributeType::List(Box::new(encryption_object_type())),
                )
                .optional()
                .force_new()
                .max_items(1)
                .description("Encryption configuration block")
                .diff_suppress(SuppressMissingBlock::create())
                .build(),
            )
            .attribute(
                AttributeBuilder::new("force_delete", AttributeType::Bool)
                    .optional()
                    .description("Delete the repository even when it still contains images")
                    .default(StaticDefault::bool(false))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("use_existing", AttributeType::Bool)
                    .optional()
                    .description("Adopt a repository with this name when one already exists")
                    .default(StaticDefault::bool(false))
                    .diff_suppress(SuppressIf::create(
                        |req| {
                            req.state
                                .get_string(&AttributePath::new("id"))
                                .map(|id| !id.is_empty())
                                .unwrap_or(false)
                        },
                        "irrelevant once the repository is under management",
                    ))
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
                    .description("Registry ID where the repository was created")
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("repository_url", AttributeType::String)
                    .computed()
                    .description("URL of the repository")
                    .build(),
            );

        ResourceSchemaResponse {
            schema: schema.build(),
            diagnostics: vec![],
        }
    }

    async fn validate(
        &self,
        _ctx: Context,
        request: ValidateResourceConfigRequest,
    ) -> ValidateResourceConfigResponse {
        let mut diagnostics = vec![];

        // Block contents are opaque to the declarative schema checks, so
        // the shape of each group is validated here.
        let scanning = request
            .config
            .get_raw(&AttributePath::new("image_scanning_configuration"));
        if let Dynamic::List(items) = &scanning {
            for (idx, item) in items.iter().enumerate() {
                let path = AttributePath::new("image_scanning_configuration")
                    .index(idx as i64)
                    .attribute("scan_on_push");
                match item {
                    Dynamic::Map(block) => match block.get("scan_on_push") {
                        Some(Dynamic::Bool(_)) => {}
                        _ => diagnostics.push(
                            Diagnostic::error(
                                "Invalid image_scanning_configuration block",
                                "scan_on_push must be set to a boolean value",
                            )
                            .with_attribute(path),
                        ),
                    },
                    _ => diagnostics.push(
                        Diagnostic::error(
                            "Invalid image_scanning_configuration block",
                            "Each block must be an object",
                        )
                        .with_attribute(path),
                    ),
                }
            }
        }

        let encryption = request
            .config
            .get_raw(&AttributePath::new("encryption_configuration"));
        if let Dynamic::List(items) = &encryption {
            for (idx, item) in items.iter().enumerate() {
                let path = AttributePath::new("encryption_configuration")
                    .index(idx as i64)
                    .attribute("encryption_type");
                if let Dynamic::Map(block) = item {
                    match block.get("encryption_type") {
                        None | Some(Dynamic::Null) => {}
                        Some(Dynamic::String(s))
                            if crate::api::ENCRYPTION_TYPE_VALUES.contains(&s.as_str()) => {}
                        Some(Dynamic::String(s)) => diagnostics.push(
                            Diagnostic::error(
                                "Invalid encryption_type",
                                format!(
                                    "'{}' is not one of {:?}",
                                    s,
                                    crate::api::ENCRYPTION_TYPE_VALUES
                                ),
                            )
                            .with_attribute(path),
                        ),
                        Some(_) => diagnostics.push(
                            Diagnostic::error(
                                "Invalid encryption_type",
                                "encryption_type must be a string",
                            )
                            .with_attribute(path),
                        ),
                    }
                }
            }
        }

        ValidateResourceConfigResponse { diagnostics }
    }

    async fn create(&self, _ctx: Context, request: CreateResourceRequest) -> CreateResourceResponse {
        let data = match self.data() {
            Ok(data) => data,
            Err(diag) => {
                return CreateResourceResponse {
                    new_state: tfbridge::DynamicValue::null(),
                    diagnostics: vec![diag],
                }
            }
        };

        let name = request
            .planned_state
            .get_string(&AttributePath::new("name"))
            .unwrap_or_default();
        let use_existing = request
            .planned_state
            .get_bool(&AttributePath::new("use_existing"))
            .unwrap_or(false);

        let mut new_state = request.planned_state.clone();

        let repo = if use_existing {
            debug!(name = %name, "checking for existing repository to adopt");
            match data.ecr.describe_repository(&name).await {
                Ok(repo) => {
                    debug!(name = %name, "adopting existing repository");
                    Some(repo)
                }
                Err(err) if err.is_not_found() => None,
                Err(err) => {
                    return CreateResourceResponse {
                        new_state: tfbridge::DynamicValue::null(),
                        diagnostics: vec![Diagnostic::error(
                            "Failed to look up existing repository",
                            err.to_string(),
                        )],
                    }
                }
            }
        } else {
            None
        };

        let repo = match repo {
            Some(repo) => repo,
            None => {
                let create_request = mapper::expand_create_request(&request.planned_state);
                match data.ecr.create_repository(&create_request).await {
                    Ok(repo) => repo,
                    Err(err) => {
                        return CreateResourceResponse {
                            new_state: tfbridge::DynamicValue::null(),
                            diagnostics: vec![Diagnostic::error(
                                "Failed to create ECR repository",
                                err.to_string(),
                            )],
                        }
                    }
                }
            }
        };

        mapper::flatten_repository(&repo, &mut new_state);
        let _ = new_state.set_string(&AttributePath::new("id"), repo.name.clone());

        CreateResourceResponse {
            new_state,
            diagnostics: vec![],
        }
    }

    async fn read(&self, _ctx: Context, request: ReadResourceRequest) -> ReadResourceResponse {
        let data = match self.data() {
            Ok(data) => data,
            Err(diag) => {
                return ReadResourceResponse {
                    new_state: None,
                    diagnostics: vec![diag],
                }
            }
        };

        let id = request
            .current_state
            .get_string(&AttributePath::new("id"))
            .unwrap_or_default();

        match data.ecr.describe_repository(&id).await {
            Ok(repo) => {
                let mut new_state = request.current_state.clone();
                mapper::flatten_repository(&repo, &mut new_state);
                ReadResourceResponse {
                    new_state: Some(new_state),
                    diagnostics: vec![],
                }
            }
            Err(err) if err.is_not_found() => {
                warn!(id = %id, "repository no longer exists, clearing identity");
                ReadResourceResponse {
                    new_state: None,
                    diagnostics: vec![],
                }
            }
            Err(err) => ReadResourceResponse {
                new_state: None,
                diagnostics: vec![Diagnostic::error(
                    "Failed to read ECR repository",
                    err.to_string(),
                )],
            },
        }
    }

    async fn update(&self, _ctx: Context, request: UpdateResourceRequest) -> UpdateResourceResponse {
        let data = match self.data() {
            Ok(data) => data,
            Err(diag) => {
                return UpdateResourceResponse {
                    new_state: request.prior_state,
                    diagnostics: vec![diag],
                }
            }
        };

        let name = request
            .prior_state
            .get_string(&AttributePath::new("id"))
            .unwrap_or_default();
        let registry_id = request
            .prior_state
            .get_string(&AttributePath::new("registry_id"))
            .ok();
        let registry_id = registry_id.as_deref().filter(|s| !s.is_empty());

        // Each mutable group is updated independently; unchanged groups
        // produce no API call.
        let mutability_path = AttributePath::new("image_tag_mutability");
        if request
            .prior_state
            .differs_at(&request.planned_state, &mutability_path)
        {
            let mutability = request
                .planned_state
                .get_string(&mutability_path)
                .unwrap_or_default();
            if let Err(err) = data
                .ecr
                .put_image_tag_mutability(registry_id, &name, &mutability)
                .await
            {
                return UpdateResourceResponse {
                    new_state: request.prior_state,
                    diagnostics: vec![Diagnostic::error(
                        "Failed to update image tag mutability",
                        err.to_string(),
                    )],
                };
            }
        }

        let scanning_path = AttributePath::new("image_scanning_configuration");
        if request
            .prior_state
            .differs_at(&request.planned_state, &scanning_path)
        {
            let scan_on_push = mapper::scan_on_push_value(&request.planned_state);
            if let Err(err) = data
                .ecr
                .put_image_scanning_configuration(registry_id, &name, scan_on_push)
                .await
            {
                return UpdateResourceResponse {
                    new_state: request.prior_state,
                    diagnostics: vec![Diagnostic::error(
                        "Failed to update image scanning configuration",
                        err.to_string(),
                    )],
                };
            }
        }

        let mut new_state = request.planned_state;
        let _ = new_state.set_string(&AttributePath::new("id"), name);

        UpdateResourceResponse {
            new_state,
            diagnostics: vec![],
        }
    }

    async fn delete(&self, _ctx: Context, request: DeleteResourceRequest) -> DeleteResourceResponse {
        let data = match self.data() {
            Ok(data) => data,
            Err(diag) => {
                return DeleteResourceResponse {
                    diagnostics: vec![diag],
                }
            }
        };

        let name = request
            .prior_state
            .get_string(&AttributePath::new("id"))
            .unwrap_or_default();
        let registry_id = request
            .prior_state
            .get_string(&AttributePath::new("registry_id"))
            .ok();
        let registry_id = registry_id.as_deref().filter(|s| !s.is_empty());
        let force = request
            .prior_state
            .get_bool(&AttributePath::new("force_delete"))
            .unwrap_or(false);

        // Identity implies prior existence, so a missing repository is an
        // error here rather than a tolerated race.
        match data.ecr.delete_repository(registry_id, &name, force).await {
            Ok(()) => DeleteResourceResponse {
                diagnostics: vec![],
            },
            Err(err) => DeleteResourceResponse {
                diagnostics: vec![Diagnostic::error(
                    "Failed to delete ECR repository",
                    err.to_string(),
                )],
            },
        }
    }

    async fn import_state(
        &self,
        _ctx: Context,
        request: ImportResourceStateRequest,
    ) -> ImportResourceStateResponse {
        let mut response = ImportResourceStateResponse {
            imported_resources: vec![],
            diagnostics: vec![],
        };
        import_state_passthrough_id(AttributePath::new("id"), &request, &mut response);
        response
    }
}

#[async_trait]
impl ResourceWithConfigure for EcrRepositoryResource {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureResourceRequest,
    ) -> ConfigureResourceResponse {
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

        ConfigureResourceResponse { diagnostics }
    }
}
