//! Runtime parameter descriptions for console operations.
//!
//! Console input is untyped text, so operations declare their parameters as
//! data. The type tags serialize to the short names shown in `__describe__`
//! output (`"string"`, `"string[]"`, `"any"`, ...).

use crate::Error;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// The runtime type tag of an operation parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParamType {
    #[serde(rename = "string")]
    String,
    #[serde(rename = "number")]
    Number,
    #[serde(rename = "integer")]
    Integer,
    #[serde(rename = "boolean")]
    Boolean,
    #[serde(rename = "object")]
    Object,
    #[serde(rename = "array")]
    Array,
    #[serde(rename = "string[]")]
    StringArray,
    #[serde(rename = "number[]")]
    NumberArray,
    #[serde(rename = "any")]
    Any,
}

impl ParamType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Number => "number",
            ParamType::Integer => "integer",
            ParamType::Boolean => "boolean",
            ParamType::Object => "object",
            ParamType::Array => "array",
            ParamType::StringArray => "string[]",
            ParamType::NumberArray => "number[]",
            ParamType::Any => "any",
        }
    }

    /// True if `value` carries this type tag.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            ParamType::String => value.is_string(),
            ParamType::Number => value.is_number(),
            ParamType::Integer => value.is_i64() || value.is_u64(),
            ParamType::Boolean => value.is_boolean(),
            ParamType::Object => value.is_object(),
            ParamType::Array => value.is_array(),
            ParamType::StringArray => value
                .as_array()
                .is_some_and(|items| items.iter().all(Value::is_string)),
            ParamType::NumberArray => value
                .as_array()
                .is_some_and(|items| items.iter().all(Value::is_number)),
            ParamType::Any => true,
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParamType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" => Ok(ParamType::String),
            "number" => Ok(ParamType::Number),
            "integer" => Ok(ParamType::Integer),
            "boolean" => Ok(ParamType::Boolean),
            "object" => Ok(ParamType::Object),
            "array" => Ok(ParamType::Array),
            "string[]" => Ok(ParamType::StringArray),
            "number[]" => Ok(ParamType::NumberArray),
            "any" => Ok(ParamType::Any),
            other => Err(Error::UnknownParamType(other.to_string())),
        }
    }
}

/// Optional value constraints checked after the type tag matches.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParamConstraints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Minimum length of a string (in chars) or array.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    /// Maximum length of a string (in chars) or array.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub one_of: Option<Vec<Value>>,
}

impl ParamConstraints {
    /// Shorthand for a numeric range.
    pub fn range(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
            ..Default::default()
        }
    }

    /// Shorthand for a fixed set of allowed values.
    pub fn one_of(values: Vec<Value>) -> Self {
        Self {
            one_of: Some(values),
            ..Default::default()
        }
    }

    /// Checks `value` against every configured constraint.
    /// Returns the first violation as a human-readable reason.
    pub fn check(&self, value: &Value) -> Result<(), String> {
        if let Some(n) = value.as_f64() {
            if let Some(min) = self.min {
                if n < min {
                    return Err(format!("must be >= {min}, got {n}"));
                }
            }
            if let Some(max) = self.max {
                if n > max {
                    return Err(format!("must be <= {max}, got {n}"));
                }
            }
        }

        let len = match value {
            Value::String(s) => Some(s.chars().count()),
            Value::Array(items) => Some(items.len()),
            _ => None,
        };
        if let Some(len) = len {
            if let Some(min_len) = self.min_length {
                if len < min_len {
                    return Err(format!("length must be >= {min_len}, got {len}"));
                }
            }
            if let Some(max_len) = self.max_length {
                if len > max_len {
                    return Err(format!("length must be <= {max_len}, got {len}"));
                }
            }
        }

        if let Some(allowed) = &self.one_of {
            if !allowed.contains(value) {
                let list: Vec<String> = allowed.iter().map(Value::to_string).collect();
                return Err(format!("must be one of [{}], got {}", list.join(", "), value));
            }
        }

        Ok(())
    }
}

/// Declaration of a single operation parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: ParamType,
    pub required: bool,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<ParamConstraints>,
    /// Filled in for an omitted optional argument before the operation runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl ParamSpec {
    fn new(name: &str, param_type: ParamType, required: bool, description: &str) -> Self {
        Self {
            name: name.into(),
            param_type,
            required,
            description: description.into(),
            constraints: None,
            default: None,
        }
    }

    /// Shorthand for a required parameter.
    pub fn required(name: &str, param_type: ParamType, description: &str) -> Self {
        Self::new(name, param_type, true, description)
    }

    /// Shorthand for an optional parameter.
    pub fn optional(name: &str, param_type: ParamType, description: &str) -> Self {
        Self::new(name, param_type, false, description)
    }

    #[must_use]
    pub fn with_constraints(mut self, constraints: ParamConstraints) -> Self {
        self.constraints = Some(constraints);
        self
    }

    #[must_use]
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    /// One-line signature fragment, e.g. `zoom: number` or `tags?: string[]`.
    pub fn signature(&self) -> String {
        let marker = if self.required { "" } else { "?" };
        format!("{}{}: {}", self.name, marker, self.param_type)
    }
}
