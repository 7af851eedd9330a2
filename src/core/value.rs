//! Closed value type for free-form configuration fields and action parameters

use serde::{Deserialize, Serialize};
use std::fmt;

/// A loosely-typed config value decoded once into a closed set of shapes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Int(i64),
    Real(f64),
    Bool(bool),
    Text(String),
    TextList(Vec<String>),
}

impl ConfigValue {
    /// Numeric view (integers widen to f64)
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ConfigValue::Int(v) => Some(*v as f64),
            ConfigValue::Real(v) => Some(*v),
            _ => None,
        }
    }

    /// List view; a single text value is treated as a one-element list
    pub fn as_text_list(&self) -> Option<Vec<String>> {
        match self {
            ConfigValue::Text(v) => Some(vec![v.clone()]),
            ConfigValue::TextList(v) => Some(v.clone()),
            _ => None,
        }
    }

    /// Key used to identify items and similar references in action params
    pub fn as_key(&self) -> Option<String> {
        match self {
            ConfigValue::Int(v) => Some(v.to_string()),
            ConfigValue::Text(v) => Some(v.clone()),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            ConfigValue::Int(_) => "integer",
            ConfigValue::Real(_) => "real",
            ConfigValue::Bool(_) => "boolean",
            ConfigValue::Text(_) => "text",
            ConfigValue::TextList(_) => "list",
        }
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Int(v) => write!(f, "{}", v),
            ConfigValue::Real(v) => write!(f, "{}", v),
            ConfigValue::Bool(v) => write!(f, "{}", v),
            ConfigValue::Text(v) => f.write_str(v),
            ConfigValue::TextList(v) => write!(f, "[{}]", v.join(", ")),
        }
    }
}

impl From<i64> for ConfigValue {
    fn from(v: i64) -> Self {
        ConfigValue::Int(v)
    }
}

impl From<f64> for ConfigValue {
    fn from(v: f64) -> Self {
        ConfigValue::Real(v)
    }
}

impl From<&str> for ConfigValue {
    fn from(v: &str) -> Self {
        ConfigValue::Text(v.to_string())
    }
}
