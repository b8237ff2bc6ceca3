//! Schema types and builders for tfbridge
//!
//! Schemas declare the configuration surface a provider, resource, or data
//! source consumes: attribute types, required/optional/computed/sensitive
//! flags, force-new markers, defaults, validators, and the declarative
//! conflict/co-requirement constraints between attributes.

use crate::diff::{DiffSuppress, DiffSuppressRequest};
use crate::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};
use std::collections::HashMap;

/// AttributeType defines the type system for Terraform attributes
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeType {
    String,
    Number, // Always f64
    Bool,
    List(Box<AttributeType>),
    Object(HashMap<String, AttributeType>),
}

/// Schema is returned by providers/resources/data sources
/// Version is used for state migration
pub struct Schema {
    pub version: i64,
    pub description: String,
    pub attributes: Vec<Attribute>,
}

/// Attribute represents a single configuration attribute
pub struct Attribute {
    pub name: String,
    pub r#type: AttributeType,
    pub description: String,
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    pub sensitive: bool,
    /// Changing this attribute forces replacement of the resource
    pub force_new: bool,
    /// Maximum number of elements for list-typed block attributes
    pub max_items: Option<usize>,
    /// Attributes that must not be set together with this one
    pub conflicts_with: Vec<String>,
    /// Attributes that must be set whenever this one is set
    pub required_with: Vec<String>,
    pub validators: Vec<Box<dyn Validator>>,
    pub default: Option<Box<dyn Default>>,
    pub diff_suppress: Option<Box<dyn DiffSuppress>>,
}

// Manual Debug implementation since the trait objects don't implement Debug
impl std::fmt::Debug for Attribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Attribute")
            .field("name", &self.name)
            .field("type", &self.r#type)
            .field("required", &self.required)
            .field("optional", &self.optional)
            .field("computed", &self.computed)
            .field("sensitive", &self.sensitive)
            .field("force_new", &self.force_new)
            .field("max_items", &self.max_items)
            .field("conflicts_with", &self.conflicts_with)
            .field("required_with", &self.required_with)
            .field(
                "validators",
                &format!("{} validators", self.validators.len()),
            )
            .field("default", &self.default.is_some())
            .field("diff_suppress", &self.diff_suppress.is_some())
            .finish()
    }
}

/// Validator performs validation on attribute values during planning
pub trait Validator: Send + Sync {
    /// Human-readable description
    fn description(&self) -> String;
    /// Perform validation
    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse;
}

/// Request for validators
pub struct ValidatorRequest {
    pub value: Dynamic,
    pub path: AttributePath,
}

/// Response from validators
pub struct ValidatorResponse {
    pub diagnostics: Vec<Diagnostic>,
}

/// Default provides default values for optional attributes
/// Called when the attribute is not set in configuration
pub trait Default: Send + Sync {
    /// Human-readable description
    fn description(&self) -> String;
    /// Provide the default value, or None when no default applies
    /// (e.g., an unset environment variable without a fallback)
    fn default_value(&self) -> Option<Dynamic>;
}

impl Schema {
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Fills defaults into `config` for optional attributes that are absent
    /// or null. Computed attributes are left alone.
    pub fn apply_defaults(&self, config: &mut DynamicValue) {
        for attr in &self.attributes {
            let Some(default) = &attr.default else {
                continue;
            };
            if !attr.optional && !attr.required {
                continue;
            }
            let path = AttributePath::new(&attr.name);
            if matches!(config.get_raw(&path), Dynamic::Null) {
                if let Some(value) = default.default_value() {
                    let _ = config.set_raw(&path, value);
                }
            }
        }
    }

    /// Checks `config` against the declarative constraints: required
    /// attributes, conflicts_with, required_with, max_items, and any
    /// per-attribute validators. Returns the collected diagnostics.
    pub fn validate_config(&self, config: &DynamicValue) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();

        for attr in &self.attributes {
            let path = AttributePath::new(&attr.name);
            let value = config.get_raw(&path);
            let present = is_present(&value);

            if attr.required && !present {
                diagnostics.push(
                    Diagnostic::error(
                        format!("Missing required attribute: {}", attr.name),
                        format!("The attribute '{}' must be set", attr.name),
                    )
                    .with_attribute(path.clone()),
                );
                continue;
            }

            if !present {
                continue;
            }

            for other in &attr.conflicts_with {
                if is_present(&config.get_raw(&AttributePath::new(other))) {
                    diagnostics.push(
                        Diagnostic::error(
                            format!("Conflicting attributes: {} and {}", attr.name, other),
                            format!(
                                "'{}' cannot be set when '{}' is set",
                                attr.name, other
                            ),
                        )
                        .with_attribute(path.clone()),
                    );
                }
            }

            for other in &attr.required_with {
                if !is_present(&config.get_raw(&AttributePath::new(other))) {
                    diagnostics.push(
                        Diagnostic::error(
                            format!("Missing companion attribute: {}", other),
                            format!("'{}' must be set when '{}' is set", other, attr.name),
                        )
                        .with_attribute(path.clone()),
                    );
                }
            }

            if let (Some(max), Dynamic::List(items)) = (attr.max_items, &value) {
                if items.len() > max {
                    diagnostics.push(
                        Diagnostic::error(
                            format!("Too many {} blocks", attr.name),
                            format!("At most {} block(s) allowed, got {}", max, items.len()),
                        )
                        .with_attribute(path.clone()),
                    );
                }
            }

            for validator in &attr.validators {
                let response = validator.validate(ValidatorRequest {
                    value: value.clone(),
                    path: path.clone(),
                });
                diagnostics.extend(response.diagnostics);
            }
        }

        diagnostics
    }

    /// Consults the attribute's diff suppressor, if any. Returns true when
    /// the host should ignore the difference between prior and planned.
    pub fn suppress_diff(
        &self,
        name: &str,
        prior: Dynamic,
        planned: Dynamic,
        state: &DynamicValue,
    ) -> bool {
        self.attribute(name)
            .and_then(|a| a.diff_suppress.as_ref())
            .map(|s| {
                s.suppress(DiffSuppressRequest {
                    prior,
                    planned,
                    state: state.clone(),
                })
            })
            .unwrap_or(false)
    }
}

fn is_present(value: &Dynamic) -> bool {
    !matches!(value, Dynamic::Null)
}

/// AttributeBuilder provides a fluent API for building attributes
/// ALWAYS use this instead of constructing Attribute directly
pub struct AttributeBuilder {
    attribute: Attribute,
}

impl AttributeBuilder {
    pub fn new(name: &str, type_: AttributeType) -> Self {
        Self {
            attribute: Attribute {
                name: name.to_string(),
                r#type: type_,
                description: String::new(),
                required: false,
                optional: false,
                computed: false,
                sensitive: false,
                force_new: false,
                max_items: None,
                conflicts_with: Vec::new(),
                required_with: Vec::new(),
                validators: Vec::new(),
                default: None,
                diff_suppress: None,
            },
        }
    }

    pub fn description(mut self, desc: &str) -> Self {
        self.attribute.description = desc.to_string();
        self
    }

    pub fn required(mut self) -> Self {
        self.attribute.required = true;
        self.attribute.optional = false;
        self
    }

    pub fn optional(mut self) -> Self {
        self.attribute.optional = true;
        self.attribute.required = false;
        self
    }

    pub fn computed(mut self) -> Self {
        self.attribute.computed = true;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.attribute.sensitive = true;
        self
    }

    /// Changing this attribute requires replacing the resource
    pub fn force_new(mut self) -> Self {
        self.attribute.force_new = true;
        self
    }

    pub fn max_items(mut self, max: usize) -> Self {
        self.attribute.max_items = Some(max);
        self
    }

    pub fn conflicts_with(mut self, names: &[&str]) -> Self {
        self.attribute.conflicts_with = names.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn required_with(mut self, names: &[&str]) -> Self {
        self.attribute.required_with = names.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn validator(mut self, validator: Box<dyn Validator>) -> Self {
        self.attribute.validators.push(validator);
        self
    }

    pub fn default(mut self, default: Box<dyn Default>) -> Self {
        self.attribute.default = Some(default);
        self
    }

    pub fn diff_suppress(mut self, suppress: Box<dyn DiffSuppress>) -> Self {
        self.attribute.diff_suppress = Some(suppress);
        self
    }

    pub fn build(self) -> Attribute {
        self.attribute
    }
}

/// SchemaBuilder provides a fluent API for building schemas
pub struct SchemaBuilder {
    schema: Schema,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self {
            schema: Schema {
                version: 0,
                description: String::new(),
                attributes: Vec::new(),
            },
        }
    }

    pub fn version(mut self, version: i64) -> Self {
        self.schema.version = version;
        self
    }

    pub fn description(mut self, desc: &str) -> Self {
        self.schema.description = desc.to_string();
        self
    }

    pub fn attribute(mut self, attr: Attribute) -> Self {
        self.schema.attributes.push(attr);
        self
    }

    pub fn build(self) -> Schema {
        self.schema
    }
}

impl std::default::Default for SchemaBuilder {
    fn default() -> Self {
        Self::new()
    }
}
