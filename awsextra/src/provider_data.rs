//! Shared state handed from the configured provider to resources and
//! data sources

use crate::api::EcrApi;
use std::sync::Arc;

/// Configured API client, cloned into each resource and data source
/// through the configure step.
#[derive(Clone)]
pub struct AwsProviderData {
    pub ecr: Arc<dyn EcrApi>,
}

impl AwsProviderData {
    pub fn new(ecr: Arc<dyn EcrApi>) -> Self {
        Self { ecr }
    }
}
