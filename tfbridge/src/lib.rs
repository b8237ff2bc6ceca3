//! tfbridge - Terraform provider framework surface for Rust
//!
//! Providers built on this crate declare schemas, implement the lifecycle
//! traits, and are driven through the dispatch table by the orchestrating
//! host process. The host owns state storage, plan/diff computation, and
//! the plugin wire protocol; this crate owns the provider-facing surface.

// Core modules
pub mod context;
pub mod error;
pub mod schema;
pub mod types;

// Provider API modules
pub mod data_source;
pub mod provider;
pub mod resource;

// Helper modules
pub mod defaults;
pub mod diff;
pub mod import;
pub mod validator;

// Dispatch table
pub mod dispatch;

// Re-exports for convenience
pub use context::Context;
pub use data_source::{DataSource, DataSourceWithConfigure};
pub use dispatch::Dispatcher;
pub use error::{Result, TfbridgeError};
pub use import::import_state_passthrough_id;
pub use provider::Provider;
pub use resource::{Resource, ResourceWithConfigure};
pub use schema::{AttributeBuilder, AttributeType, Schema, SchemaBuilder};
pub use types::{AttributePath, Diagnostic, DiagnosticSeverity, Dynamic, DynamicValue};
