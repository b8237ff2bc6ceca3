//! Dispatch table routing named lifecycle operations to provider instances
//!
//! The host process owns scheduling, state storage, and plan computation;
//! this dispatcher is the seam it drives. Each operation configures the
//! provider-supplied instance with the provider data captured during
//! `configure`, applies schema defaults, runs declarative validation, and
//! invokes exactly one lifecycle verb.

use crate::context::Context;
use crate::data_source::{
    DataSourceSchemaRequest, ReadDataSourceRequest, ReadDataSourceResponse,
    ValidateDataSourceConfigRequest,
};
use crate::data_source::{ConfigureDataSourceRequest, DataSourceWithConfigure};
use crate::error::{Result, TfbridgeError};
use crate::provider::{ConfigureProviderRequest, Provider, ProviderSchemaRequest};
use crate::resource::{
    ConfigureResourceRequest, CreateResourceRequest, CreateResourceResponse,
    DeleteResourceRequest, DeleteResourceResponse, ImportResourceStateRequest,
    ImportResourceStateResponse, ReadResourceRequest, ReadResourceResponse,
    ResourceSchemaRequest, ResourceWithConfigure, UpdateResourceRequest, UpdateResourceResponse,
    ValidateResourceConfigRequest,
};
use crate::types::{has_errors, AttributePath, Diagnostic, Dynamic, DynamicValue};
use std::any::Any;
use std::sync::Arc;

pub struct Dispatcher<P: Provider> {
    provider: P,
    provider_data: Option<Arc<dyn Any + Send + Sync>>,
    configured: bool,
}

impl<P: Provider> Dispatcher<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            provider_data: None,
            configured: false,
        }
    }

    /// Validates the provider configuration against the provider schema
    /// (applying env/static defaults first) and hands it to the provider
    pub async fn configure(&mut self, ctx: Context, config: DynamicValue) -> Vec<Diagnostic> {
        let schema_response = self
            .provider
            .schema(ctx.clone(), ProviderSchemaRequest)
            .await;
        let mut diagnostics = schema_response.diagnostics;

        let mut config = config;
        schema_response.schema.apply_defaults(&mut config);
        diagnostics.extend(schema_response.schema.validate_config(&config));
        if has_errors(&diagnostics) {
            return diagnostics;
        }

        tracing::debug!(provider = self.provider.type_name(), "configuring provider");
        let response = self
            .provider
            .configure(ctx, ConfigureProviderRequest { config })
            .await;
        diagnostics.extend(response.diagnostics);

        if !has_errors(&diagnostics) {
            self.provider_data = response.provider_data;
            self.configured = true;
        }
        diagnostics
    }

    pub async fn create(
        &self,
        ctx: Context,
        type_name: &str,
        config: DynamicValue,
    ) -> CreateResourceResponse {
        let mut resource = match self.resource_instance(ctx.clone(), type_name).await {
            Ok(resource) => resource,
            Err(diagnostics) => {
                return CreateResourceResponse {
                    new_state: DynamicValue::null(),
                    diagnostics,
                }
            }
        };

        let schema_response = resource.schema(ctx.clone(), ResourceSchemaRequest).await;
        let mut diagnostics = schema_response.diagnostics;

        let mut config = config;
        schema_response.schema.apply_defaults(&mut config);
        diagnostics.extend(schema_response.schema.validate_config(&config));

        let validate_response = resource
            .validate(
                ctx.clone(),
                ValidateResourceConfigRequest {
                    type_name: type_name.to_string(),
                    config: config.clone(),
                },
            )
            .await;
        diagnostics.extend(validate_response.diagnostics);

        if has_errors(&diagnostics) {
            return CreateResourceResponse {
                new_state: DynamicValue::null(),
                diagnostics,
            };
        }

        tracing::debug!(type_name, "dispatching create");
        let mut response = resource
            .create(
                ctx,
                CreateResourceRequest {
                    type_name: type_name.to_string(),
                    planned_state: config.clone(),
                    config,
                },
            )
            .await;
        diagnostics.append(&mut response.diagnostics);
        CreateResourceResponse {
            new_state: response.new_state,
            diagnostics,
        }
    }

    pub async fn read(
        &self,
        ctx: Context,
        type_name: &str,
        current_state: DynamicValue,
    ) -> ReadResourceResponse {
        let resource = match self.resource_instance(ctx.clone(), type_name).await {
            Ok(resource) => resource,
            Err(diagnostics) => {
                return ReadResourceResponse {
                    new_state: None,
                    diagnostics,
                }
            }
        };

        tracing::debug!(type_name, "dispatching read");
        resource
            .read(
                ctx,
                ReadResourceRequest {
                    type_name: type_name.to_string(),
                    current_state,
                },
            )
            .await
    }

    pub async fn update(
        &self,
        ctx: Context,
        type_name: &str,
        prior_state: DynamicValue,
        config: DynamicValue,
    ) -> UpdateResourceResponse {
        let resource = match self.resource_instance(ctx.clone(), type_name).await {
            Ok(resource) => resource,
            Err(diagnostics) => {
                return UpdateResourceResponse {
                    new_state: prior_state,
                    diagnostics,
                }
            }
        };

        let schema_response = resource.schema(ctx.clone(), ResourceSchemaRequest).await;
        let mut diagnostics = schema_response.diagnostics;

        let mut planned_state = config.clone();
        schema_response.schema.apply_defaults(&mut planned_state);
        diagnostics.extend(schema_response.schema.validate_config(&planned_state));
        if has_errors(&diagnostics) {
            return UpdateResourceResponse {
                new_state: prior_state,
                diagnostics,
            };
        }

        // Computed attributes are server-owned and absent from config;
        // carry them forward from prior state so they survive the update.
        for attr in &schema_response.schema.attributes {
            if !attr.computed || attr.optional || attr.required {
                continue;
            }
            let path = AttributePath::new(&attr.name);
            if matches!(planned_state.get_raw(&path), Dynamic::Null) {
                let _ = planned_state.set_raw(&path, prior_state.get_raw(&path));
            }
        }

        // Consult per-attribute diff suppressors; a suppressed difference
        // keeps the prior value so the resource sees no change.
        for attr in &schema_response.schema.attributes {
            let path = AttributePath::new(&attr.name);
            let prior = prior_state.get_raw(&path);
            let planned = planned_state.get_raw(&path);
            if prior == planned {
                continue;
            }
            if schema_response
                .schema
                .suppress_diff(&attr.name, prior.clone(), planned, &prior_state)
            {
                let _ = planned_state.set_raw(&path, prior);
            }
        }

        tracing::debug!(type_name, "dispatching update");
        let mut response = resource
            .update(
                ctx,
                UpdateResourceRequest {
                    type_name: type_name.to_string(),
                    config,
                    prior_state,
                    planned_state,
                },
            )
            .await;
        diagnostics.append(&mut response.diagnostics);
        UpdateResourceResponse {
            new_state: response.new_state,
            diagnostics,
        }
    }

    pub async fn delete(
        &self,
        ctx: Context,
        type_name: &str,
        prior_state: DynamicValue,
    ) -> DeleteResourceResponse {
        let resource = match self.resource_instance(ctx.clone(), type_name).await {
            Ok(resource) => resource,
            Err(diagnostics) => return DeleteResourceResponse { diagnostics },
        };

        tracing::debug!(type_name, "dispatching delete");
        resource
            .delete(
                ctx,
                DeleteResourceRequest {
                    type_name: type_name.to_string(),
                    prior_state,
                },
            )
            .await
    }

    pub async fn import(
        &self,
        ctx: Context,
        type_name: &str,
        id: String,
    ) -> ImportResourceStateResponse {
        let resource = match self.resource_instance(ctx.clone(), type_name).await {
            Ok(resource) => resource,
            Err(diagnostics) => {
                return ImportResourceStateResponse {
                    imported_resources: vec![],
                    diagnostics,
                }
            }
        };

        tracing::debug!(type_name, id, "dispatching import");
        resource
            .import_state(
                ctx,
                ImportResourceStateRequest {
                    type_name: type_name.to_string(),
                    id,
                },
            )
            .await
    }

    /// Lookup operation: the single read of a data source
    pub async fn read_data_source(
        &self,
        ctx: Context,
        type_name: &str,
        config: DynamicValue,
    ) -> ReadDataSourceResponse {
        let data_source = match self.data_source_instance(ctx.clone(), type_name).await {
            Ok(data_source) => data_source,
            Err(diagnostics) => {
                return ReadDataSourceResponse {
                    state: DynamicValue::null(),
                    diagnostics,
                }
            }
        };

        let schema_response = data_source
            .schema(ctx.clone(), DataSourceSchemaRequest)
            .await;
        let mut diagnostics = schema_response.diagnostics;

        let mut config = config;
        schema_response.schema.apply_defaults(&mut config);
        diagnostics.extend(schema_response.schema.validate_config(&config));

        let validate_response = data_source
            .validate(
                ctx.clone(),
                ValidateDataSourceConfigRequest {
                    type_name: type_name.to_string(),
                    config: config.clone(),
                },
            )
            .await;
        diagnostics.extend(validate_response.diagnostics);

        if has_errors(&diagnostics) {
            return ReadDataSourceResponse {
                state: DynamicValue::null(),
                diagnostics,
            };
        }

        tracing::debug!(type_name, "dispatching data source read");
        let mut response = data_source
            .read(
                ctx,
                ReadDataSourceRequest {
                    type_name: type_name.to_string(),
                    config,
                },
            )
            .await;
        diagnostics.append(&mut response.diagnostics);
        ReadDataSourceResponse {
            state: response.state,
            diagnostics,
        }
    }

    async fn resource_instance(
        &self,
        ctx: Context,
        type_name: &str,
    ) -> std::result::Result<Box<dyn ResourceWithConfigure>, Vec<Diagnostic>> {
        let mut resource = self
            .checked(self.provider.create_resource(type_name).await)
            .map_err(|d| vec![d])?;

        let response = resource
            .configure(
                ctx,
                ConfigureResourceRequest {
                    provider_data: self.provider_data.clone(),
                },
            )
            .await;
        if has_errors(&response.diagnostics) {
            return Err(response.diagnostics);
        }
        Ok(resource)
    }

    async fn data_source_instance(
        &self,
        ctx: Context,
        type_name: &str,
    ) -> std::result::Result<Box<dyn DataSourceWithConfigure>, Vec<Diagnostic>> {
        let mut data_source = self
            .checked(self.provider.create_data_source(type_name).await)
            .map_err(|d| vec![d])?;

        let response = data_source
            .configure(
                ctx,
                ConfigureDataSourceRequest {
                    provider_data: self.provider_data.clone(),
                },
            )
            .await;
        if has_errors(&response.diagnostics) {
            return Err(response.diagnostics);
        }
        Ok(data_source)
    }

    fn checked<T>(&self, result: Result<T>) -> std::result::Result<T, Diagnostic> {
        if !self.configured {
            return Err(Diagnostic::error(
                "Provider not configured",
                TfbridgeError::ProviderNotConfigured.to_string(),
            ));
        }
        result.map_err(|e| Diagnostic::error("Failed to instantiate type", e.to_string()))
    }
}
