//! Core type system for tfbridge
//!
//! This module provides the types shared by every provider built on the
//! framework: Dynamic values, attribute paths, and diagnostics.

use crate::error::{Result, TfbridgeError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Dynamic represents Terraform values that can be of any type
/// This is the core type for all configuration and state data
/// IMPORTANT: Always use the type-safe accessors on DynamicValue instead
/// of matching directly
#[derive(Debug, Clone, PartialEq)]
pub enum Dynamic {
    /// Explicit null value
    Null,
    /// Boolean value
    Bool(bool),
    /// Number value (all numbers are f64 to match Terraform)
    Number(f64),
    /// String value
    String(String),
    /// List of values (ordered, allows duplicates)
    List(Vec<Dynamic>),
    /// Map of string keys to values (objects are represented as Maps)
    Map(HashMap<String, Dynamic>),
    /// Value not yet known (during planning)
    Unknown,
}

impl Serialize for Dynamic {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Dynamic::Null => serializer.serialize_unit(),
            Dynamic::Bool(b) => serializer.serialize_bool(*b),
            Dynamic::Number(n) => serializer.serialize_f64(*n),
            Dynamic::String(s) => serializer.serialize_str(s),
            Dynamic::List(l) => l.serialize(serializer),
            Dynamic::Map(m) => m.serialize(serializer),
            Dynamic::Unknown => serializer.serialize_str("__unknown__"),
        }
    }
}

impl<'de> Deserialize<'de> for Dynamic {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::{self, Visitor};
        use std::fmt;

        struct DynamicVisitor;

        impl<'de> Visitor<'de> for DynamicVisitor {
            type Value = Dynamic;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a valid Dynamic value")
            }

            fn visit_unit<E>(self) -> std::result::Result<Dynamic, E>
            where
                E: de::Error,
            {
                Ok(Dynamic::Null)
            }

            fn visit_bool<E>(self, value: bool) -> std::result::Result<Dynamic, E>
            where
                E: de::Error,
            {
                Ok(Dynamic::Bool(value))
            }

            fn visit_i64<E>(self, value: i64) -> std::result::Result<Dynamic, E>
            where
                E: de::Error,
            {
                Ok(Dynamic::Number(value as f64))
            }

            fn visit_u64<E>(self, value: u64) -> std::result::Result<Dynamic, E>
            where
                E: de::Error,
            {
                Ok(Dynamic::Number(value as f64))
            }

            fn visit_f64<E>(self, value: f64) -> std::result::Result<Dynamic, E>
            where
                E: de::Error,
            {
                Ok(Dynamic::Number(value))
            }

            fn visit_str<E>(self, value: &str) -> std::result::Result<Dynamic, E>
            where
                E: de::Error,
            {
                if value == "__unknown__" {
                    Ok(Dynamic::Unknown)
                } else {
                    Ok(Dynamic::String(value.to_string()))
                }
            }

            fn visit_string<E>(self, value: String) -> std::result::Result<Dynamic, E>
            where
                E: de::Error,
            {
                if value == "__unknown__" {
                    Ok(Dynamic::Unknown)
                } else {
                    Ok(Dynamic::String(value))
                }
            }

            fn visit_seq<V>(self, mut seq: V) -> std::result::Result<Dynamic, V::Error>
            where
                V: de::SeqAccess<'de>,
            {
                let mut vec = Vec::new();
                while let Some(elem) = seq.next_element()? {
                    vec.push(elem);
                }
                Ok(Dynamic::List(vec))
            }

            fn visit_map<V>(self, mut map: V) -> std::result::Result<Dynamic, V::Error>
            where
                V: de::MapAccess<'de>,
            {
                let mut hashmap = HashMap::new();
                while let Some((key, value)) = map.next_entry()? {
                    hashmap.insert(key, value);
                }
                Ok(Dynamic::Map(hashmap))
            }
        }

        deserializer.deserialize_any(DynamicVisitor)
    }
}

/// DynamicValue wraps Dynamic and provides encoding/decoding capabilities
/// This is what gets passed between the host and the provider
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicValue {
    pub value: Dynamic,
}

impl DynamicValue {
    pub fn new(value: Dynamic) -> Self {
        Self { value }
    }

    pub fn null() -> Self {
        Self {
            value: Dynamic::Null,
        }
    }

    pub fn empty_object() -> Self {
        Self {
            value: Dynamic::Map(HashMap::new()),
        }
    }

    /// Encoding/decoding for the host boundary - Terraform uses msgpack by default
    pub fn encode_msgpack(&self) -> Result<Vec<u8>> {
        match &self.value {
            Dynamic::Null => Ok(vec![]),
            Dynamic::Map(map) => rmp_serde::encode::to_vec(map)
                .map_err(|e| TfbridgeError::EncodingError(format!("msgpack encoding failed: {}", e))),
            _ => rmp_serde::encode::to_vec(&self.value)
                .map_err(|e| TfbridgeError::EncodingError(format!("msgpack encoding failed: {}", e))),
        }
    }

    pub fn decode_msgpack(data: &[u8]) -> Result<Self> {
        if data.is_empty() {
            return Ok(Self::null());
        }

        match rmp_serde::decode::from_slice::<HashMap<String, Dynamic>>(data) {
            Ok(map) => Ok(Self {
                value: Dynamic::Map(map),
            }),
            Err(_) => match rmp_serde::decode::from_slice::<Dynamic>(data) {
                Ok(value) => Ok(Self { value }),
                Err(e) => Err(TfbridgeError::DecodingError(format!(
                    "msgpack decoding failed: {}",
                    e
                ))),
            },
        }
    }

    pub fn encode_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(&self.value)
            .map_err(|e| TfbridgeError::EncodingError(format!("json encoding failed: {}", e)))
    }

    pub fn decode_json(data: &[u8]) -> Result<Self> {
        let value = serde_json::from_slice(data)
            .map_err(|e| TfbridgeError::DecodingError(format!("json decoding failed: {}", e)))?;
        Ok(Self { value })
    }

    /// Type-safe accessors - ALWAYS use these instead of pattern matching
    pub fn get_string(&self, path: &AttributePath) -> Result<String> {
        let value = self.navigate_path(path)?;
        match value {
            Dynamic::String(s) => Ok(s.clone()),
            _ => Err(TfbridgeError::TypeMismatch {
                expected: "string".to_string(),
                actual: type_name(value),
            }),
        }
    }

    pub fn get_number(&self, path: &AttributePath) -> Result<f64> {
        let value = self.navigate_path(path)?;
        match value {
            Dynamic::Number(n) => Ok(*n),
            _ => Err(TfbridgeError::TypeMismatch {
                expected: "number".to_string(),
                actual: type_name(value),
            }),
        }
    }

    pub fn get_bool(&self, path: &AttributePath) -> Result<bool> {
        let value = self.navigate_path(path)?;
        match value {
            Dynamic::Bool(b) => Ok(*b),
            _ => Err(TfbridgeError::TypeMismatch {
                expected: "bool".to_string(),
                actual: type_name(value),
            }),
        }
    }

    pub fn get_list(&self, path: &AttributePath) -> Result<Vec<Dynamic>> {
        let value = self.navigate_path(path)?;
        match value {
            Dynamic::List(l) => Ok(l.clone()),
            _ => Err(TfbridgeError::TypeMismatch {
                expected: "list".to_string(),
                actual: type_name(value),
            }),
        }
    }

    pub fn get_map(&self, path: &AttributePath) -> Result<HashMap<String, Dynamic>> {
        let value = self.navigate_path(path)?;
        match value {
            Dynamic::Map(m) => Ok(m.clone()),
            _ => Err(TfbridgeError::TypeMismatch {
                expected: "map".to_string(),
                actual: type_name(value),
            }),
        }
    }

    /// Returns the raw value at path, or Null when the path is absent
    pub fn get_raw(&self, path: &AttributePath) -> Dynamic {
        self.navigate_path(path)
            .map(|v| v.clone())
            .unwrap_or(Dynamic::Null)
    }

    /// Type-safe setters - use for building state/config objects
    pub fn set_string(&mut self, path: &AttributePath, value: String) -> Result<()> {
        self.set_value(path, Dynamic::String(value))
    }

    pub fn set_number(&mut self, path: &AttributePath, value: f64) -> Result<()> {
        self.set_value(path, Dynamic::Number(value))
    }

    pub fn set_bool(&mut self, path: &AttributePath, value: bool) -> Result<()> {
        self.set_value(path, Dynamic::Bool(value))
    }

    pub fn set_list(&mut self, path: &AttributePath, value: Vec<Dynamic>) -> Result<()> {
        self.set_value(path, Dynamic::List(value))
    }

    pub fn set_raw(&mut self, path: &AttributePath, value: Dynamic) -> Result<()> {
        self.set_value(path, value)
    }

    pub fn is_null(&self) -> bool {
        matches!(self.value, Dynamic::Null)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self.value, Dynamic::Unknown)
    }

    /// Mark computed values as unknown during planning
    pub fn mark_unknown(&mut self, path: &AttributePath) -> Result<()> {
        self.set_value(path, Dynamic::Unknown)
    }

    /// Reports whether this value and `other` differ at `path`.
    ///
    /// Absent attributes compare as Null, and an empty block list compares
    /// equal to an absent block, matching how the host treats optional
    /// configuration blocks.
    pub fn differs_at(&self, other: &DynamicValue, path: &AttributePath) -> bool {
        let a = normalize(self.get_raw(path));
        let b = normalize(other.get_raw(path));
        a != b
    }

    fn navigate_path<'a>(&'a self, path: &AttributePath) -> Result<&'a Dynamic> {
        let mut current = &self.value;

        for step in &path.steps {
            current = match (current, step) {
                (Dynamic::Map(m), AttributePathStep::AttributeName(name)) => {
                    m.get(name).ok_or_else(|| {
                        TfbridgeError::Custom(format!("attribute '{}' not found", name))
                    })?
                }
                (Dynamic::List(l), AttributePathStep::ElementKeyInt(idx)) => {
                    let idx = *idx as usize;
                    l.get(idx).ok_or_else(|| {
                        TfbridgeError::Custom(format!("list index {} out of bounds", idx))
                    })?
                }
                _ => return Err(TfbridgeError::Custom("invalid path navigation".to_string())),
            };
        }

        Ok(current)
    }

    fn set_value(&mut self, path: &AttributePath, new_value: Dynamic) -> Result<()> {
        if path.steps.is_empty() {
            self.value = new_value;
            return Ok(());
        }

        // Non-empty paths require a map at the root
        if !matches!(self.value, Dynamic::Map(_)) {
            self.value = Dynamic::Map(HashMap::new());
        }

        let mut current = &mut self.value;
        let last_idx = path.steps.len() - 1;

        for (idx, step) in path.steps.iter().enumerate() {
            if idx == last_idx {
                match (current, step) {
                    (Dynamic::Map(m), AttributePathStep::AttributeName(name)) => {
                        m.insert(name.clone(), new_value);
                        return Ok(());
                    }
                    (Dynamic::List(l), AttributePathStep::ElementKeyInt(idx)) => {
                        let idx = *idx as usize;
                        if idx < l.len() {
                            l[idx] = new_value;
                            return Ok(());
                        }
                        return Err(TfbridgeError::Custom(format!(
                            "list index {} out of bounds",
                            idx
                        )));
                    }
                    _ => return Err(TfbridgeError::Custom("invalid path navigation".to_string())),
                }
            } else {
                current = match (current, step) {
                    (Dynamic::Map(m), AttributePathStep::AttributeName(name)) => {
                        m.entry(name.clone()).or_insert_with(|| {
                            match path.steps.get(idx + 1) {
                                Some(AttributePathStep::ElementKeyInt(_)) => {
                                    Dynamic::List(Vec::new())
                                }
                                _ => Dynamic::Map(HashMap::new()),
                            }
                        })
                    }
                    (Dynamic::List(l), AttributePathStep::ElementKeyInt(idx)) => {
                        let idx = *idx as usize;
                        if idx >= l.len() {
                            return Err(TfbridgeError::Custom(format!(
                                "list index {} out of bounds",
                                idx
                            )));
                        }
                        &mut l[idx]
                    }
                    _ => return Err(TfbridgeError::Custom("invalid path navigation".to_string())),
                };
            }
        }

        Err(TfbridgeError::Custom("failed to set value".to_string()))
    }
}

fn normalize(value: Dynamic) -> Dynamic {
    match value {
        Dynamic::List(ref l) if l.is_empty() => Dynamic::Null,
        other => other,
    }
}

fn type_name(value: &Dynamic) -> String {
    match value {
        Dynamic::Null => "null".to_string(),
        Dynamic::Bool(_) => "bool".to_string(),
        Dynamic::Number(_) => "number".to_string(),
        Dynamic::String(_) => "string".to_string(),
        Dynamic::List(_) => "list".to_string(),
        Dynamic::Map(_) => "map".to_string(),
        Dynamic::Unknown => "unknown".to_string(),
    }
}

/// AttributePath represents a path to an attribute within a DynamicValue
#[derive(Debug, Clone, PartialEq)]
pub struct AttributePath {
    pub steps: Vec<AttributePathStep>,
}

impl AttributePath {
    pub fn new(name: &str) -> Self {
        Self {
            steps: vec![AttributePathStep::AttributeName(name.to_string())],
        }
    }

    pub fn root() -> Self {
        Self { steps: Vec::new() }
    }

    pub fn attribute(mut self, name: &str) -> Self {
        self.steps
            .push(AttributePathStep::AttributeName(name.to_string()));
        self
    }

    pub fn index(mut self, idx: i64) -> Self {
        self.steps.push(AttributePathStep::ElementKeyInt(idx));
        self
    }
}

/// Individual step in an AttributePath
#[derive(Debug, Clone, PartialEq)]
pub enum AttributePathStep {
    /// Access attribute by name in object/map
    AttributeName(String),
    /// Access element by integer index (for lists)
    ElementKeyInt(i64),
}

/// Diagnostic represents a warning or error surfaced to the host
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: DiagnosticSeverity,
    pub summary: String,
    pub detail: String,
    pub attribute: Option<AttributePath>,
}

impl Diagnostic {
    pub fn error(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Error,
            summary: summary.into(),
            detail: detail.into(),
            attribute: None,
        }
    }

    pub fn warning(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Warning,
            summary: summary.into(),
            detail: detail.into(),
            attribute: None,
        }
    }

    pub fn with_attribute(mut self, path: AttributePath) -> Self {
        self.attribute = Some(path);
        self
    }
}

/// Severity level for diagnostics
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DiagnosticSeverity {
    Error,
    Warning,
}

/// Returns true when any diagnostic in the slice is an error
pub fn has_errors(diagnostics: &[Diagnostic]) -> bool {
    diagnostics
        .iter()
        .any(|d| d.severity == DiagnosticSeverity::Error)
}
