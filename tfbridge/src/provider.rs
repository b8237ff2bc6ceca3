//! Provider trait and related types
//!
//! A provider declares its connection schema, configures shared state
//! (clients, credentials) once, and acts as a factory for resource and
//! data source instances. Factories return fresh instances so each
//! operation runs in isolation.

use crate::context::Context;
use crate::data_source::DataSourceWithConfigure;
use crate::error::Result;
use crate::resource::ResourceWithConfigure;
use crate::schema::Schema;
use crate::types::{Diagnostic, DynamicValue};
use async_trait::async_trait;
use std::any::Any;
use std::sync::Arc;

#[async_trait]
pub trait Provider: Send + Sync {
    /// Provider type name (e.g., "awsextra")
    fn type_name(&self) -> &str;

    /// Called to get the provider's connection schema
    async fn schema(&self, ctx: Context, request: ProviderSchemaRequest) -> ProviderSchemaResponse;

    /// Called once with the resolved provider configuration
    /// On success the response carries the provider data handed to every
    /// resource and data source instance
    async fn configure(
        &mut self,
        ctx: Context,
        request: ConfigureProviderRequest,
    ) -> ConfigureProviderResponse;

    /// Create a resource instance for the given type name
    async fn create_resource(&self, type_name: &str) -> Result<Box<dyn ResourceWithConfigure>>;

    /// Create a data source instance for the given type name
    async fn create_data_source(&self, type_name: &str)
        -> Result<Box<dyn DataSourceWithConfigure>>;

    /// Registered resource type names
    fn resource_type_names(&self) -> Vec<&'static str>;

    /// Registered data source type names
    fn data_source_type_names(&self) -> Vec<&'static str>;
}

pub struct ProviderSchemaRequest;

pub struct ProviderSchemaResponse {
    pub schema: Schema,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct ConfigureProviderRequest {
    pub config: DynamicValue,
}

pub struct ConfigureProviderResponse {
    pub provider_data: Option<Arc<dyn Any + Send + Sync>>,
    pub diagnostics: Vec<Diagnostic>,
}
