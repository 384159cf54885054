//! Parameter descriptors and typed values.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{HandError, Result};

/// Collected parameter values of one hand invocation, keyed by parameter name.
pub type Params = BTreeMap<String, ParamValue>;

/// Where a parameter lands in the outgoing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParamDestination {
    /// Substituted into the URL template.
    #[serde(rename = "URL", alias = "url")]
    UrlPlaced,
    /// Appended as a query string pair.
    #[serde(rename = "query")]
    QueryPlaced,
}

impl fmt::Display for ParamDestination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamDestination::UrlPlaced => f.write_str("URL Param"),
            ParamDestination::QueryPlaced => f.write_str("Query Param"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    Integer,
    String,
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamType::Integer => f.write_str("Integer"),
            ParamType::String => f.write_str("String"),
        }
    }
}

/// A parsed parameter value. Serializes as a bare number or string so templates see plain values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Integer(i64),
    String(String),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Integer(v) => write!(f, "{}", v),
            ParamValue::String(v) => f.write_str(v),
        }
    }
}

/// Description of a single hand parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub help: String,
    pub destination: ParamDestination,
    #[serde(rename = "type")]
    pub param_type: ParamType,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub default_value: Option<ParamValue>,
}

impl ParamInfo {
    /// A parameter is required iff it is URL-placed without a default, or query-placed, not
    /// optional and without a default.
    pub fn is_required(&self) -> bool {
        if self.default_value.is_some() {
            return false;
        }
        match self.destination {
            ParamDestination::UrlPlaced => true,
            ParamDestination::QueryPlaced => !self.optional,
        }
    }

    /// Parses raw user input. Integers use plain base-10 parsing; strings are taken as is.
    pub fn parse_value(&self, raw: &str) -> Result<ParamValue> {
        match self.param_type {
            ParamType::Integer => raw
                .parse::<i64>()
                .map(ParamValue::Integer)
                .map_err(|_| HandError::InvalidValue {
                    value: raw.to_string(),
                    expected: "integer",
                }),
            ParamType::String => Ok(ParamValue::String(raw.to_string())),
        }
    }

    /// `name(Type)\tDestination\n\thelp\n`
    pub fn help_text(&self) -> String {
        format!(
            "{}({})\t{}\n\t{}\n",
            self.name, self.param_type, self.destination, self.help
        )
    }

    /// Load-time checks; returns one message per violation. Normalizes the default value to the
    /// parameter's type.
    pub(crate) fn validate(&mut self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.destination == ParamDestination::UrlPlaced
            && self.optional
            && self.default_value.is_none()
        {
            errors.push("URL placed param can't be marked as optional without a default value".to_string());
        }
        if let Some(default) = self.default_value.take() {
            match self.parse_value(&default.to_string()) {
                Ok(value) => self.default_value = Some(value),
                Err(e) => {
                    errors.push(format!("Error on default value: {}", e));
                    self.default_value = Some(default);
                }
            }
        }
        errors
    }
}
