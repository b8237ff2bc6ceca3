//! Stock validators for common schema constraints

use crate::schema::{Validator, ValidatorRequest, ValidatorResponse};
use crate::types::{Diagnostic, Dynamic};

/// Validates that a string value is one of a fixed set of allowed values
pub struct OneOfValidator {
    allowed: Vec<String>,
}

impl OneOfValidator {
    pub fn create(allowed: &[&str]) -> Box<dyn Validator> {
        Box::new(Self {
            allowed: allowed.iter().map(|s| s.to_string()).collect(),
        })
    }
}

impl Validator for OneOfValidator {
    fn description(&self) -> String {
        format!("value must be one of {:?}", self.allowed)
    }

    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse {
        let mut diagnostics = vec![];

        if let Dynamic::String(s) = &request.value {
            if !self.allowed.iter().any(|a| a == s) {
                diagnostics.push(
                    Diagnostic::error(
                        "Invalid value",
                        format!("'{}' is not one of {:?}", s, self.allowed),
                    )
                    .with_attribute(request.path),
                );
            }
        }

        ValidatorResponse { diagnostics }
    }
}

/// Validates that a string value matches a regular expression
pub struct PatternValidator {
    pattern: regex::Regex,
    description: String,
}

impl PatternValidator {
    pub fn create(pattern: &str, description: &str) -> Box<dyn Validator> {
        Box::new(Self {
            // Patterns are compile-time constants in schema declarations
            pattern: regex::Regex::new(pattern).expect("invalid validator pattern"),
            description: description.to_string(),
        })
    }
}

impl Validator for PatternValidator {
    fn description(&self) -> String {
        self.description.clone()
    }

    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse {
        let mut diagnostics = vec![];

        if let Dynamic::String(s) = &request.value {
            if !self.pattern.is_match(s) {
                diagnostics.push(
                    Diagnostic::error(
                        format!("Value must match {}", self.description),
                        format!("'{}' does not match the required pattern", s),
                    )
                    .with_attribute(request.path),
                );
            }
        }

        ValidatorResponse { diagnostics }
    }
}

/// Validates string length bounds
pub struct StringLengthValidator {
    min: Option<usize>,
    max: Option<usize>,
}

impl StringLengthValidator {
    pub fn create(min: Option<usize>, max: Option<usize>) -> Box<dyn Validator> {
        Box::new(Self { min, max })
    }
}

impl Validator for StringLengthValidator {
    fn description(&self) -> String {
        format!("string length within [{:?}, {:?}]", self.min, self.max)
    }

    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse {
        let mut diagnostics = vec![];

        if let Dynamic::String(s) = &request.value {
            if let Some(min) = self.min {
                if s.len() < min {
                    diagnostics.push(
                        Diagnostic::error(
                            format!("Value must be at least {} characters", min),
                            format!("Got {} characters", s.len()),
                        )
                        .with_attribute(request.path.clone()),
                    );
                }
            }
            if let Some(max) = self.max {
                if s.len() > max {
                    diagnostics.push(
                        Diagnostic::error(
                            format!("Value must be at most {} characters", max),
                            format!("Got {} characters", s.len()),
                        )
                        .with_attribute(request.path),
                    );
                }
            }
        }

        ValidatorResponse { diagnostics }
    }
}
