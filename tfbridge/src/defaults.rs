//! Default value providers for attributes
//!
//! Default providers run when an optional attribute is not set in
//! configuration. `EnvChainDefault` mirrors the common provider pattern of
//! sourcing connection settings from environment variables.

use crate::schema::Default;
use crate::types::Dynamic;
use std::env;

/// StaticDefault provides a static default value
pub struct StaticDefault {
    value: Dynamic,
}

impl StaticDefault {
    pub fn create(value: Dynamic) -> Box<dyn Default> {
        Box::new(Self { value })
    }

    pub fn string(value: &str) -> Box<dyn Default> {
        Self::create(Dynamic::String(value.to_string()))
    }

    pub fn number(value: f64) -> Box<dyn Default> {
        Self::create(Dynamic::Number(value))
    }

    pub fn bool(value: bool) -> Box<dyn Default> {
        Self::create(Dynamic::Bool(value))
    }
}

impl Default for StaticDefault {
    fn description(&self) -> String {
        format!("static default value: {:?}", self.value)
    }

    fn default_value(&self) -> Option<Dynamic> {
        Some(self.value.clone())
    }
}

/// EnvChainDefault reads the first set variable from an ordered list of
/// environment variables, with an optional static fallback
pub struct EnvChainDefault {
    env_vars: Vec<String>,
    fallback: Option<String>,
}

impl EnvChainDefault {
    pub fn create(env_vars: &[&str]) -> Box<dyn Default> {
        Box::new(Self {
            env_vars: env_vars.iter().map(|s| s.to_string()).collect(),
            fallback: None,
        })
    }

    pub fn with_fallback(env_vars: &[&str], fallback: &str) -> Box<dyn Default> {
        Box::new(Self {
            env_vars: env_vars.iter().map(|s| s.to_string()).collect(),
            fallback: Some(fallback.to_string()),
        })
    }
}

impl Default for EnvChainDefault {
    fn description(&self) -> String {
        format!("default from environment variables {:?}", self.env_vars)
    }

    fn default_value(&self) -> Option<Dynamic> {
        for var in &self.env_vars {
            if let Ok(value) = env::var(var) {
                if !value.is_empty() {
                    return Some(Dynamic::String(value));
                }
            }
        }
        self.fallback
            .as_ref()
            .map(|f| Dynamic::String(f.clone()))
    }
}
