//! Tool schemas and argument validation.
//!
//! Every tool declares an ordered list of [`ParameterSpec`]s. Raw JSON
//! arguments are checked against that list by [`ToolSpec::validate`], which
//! yields [`ValidatedArgs`]: typed values with defaults filled in. Handlers
//! then decode the validated arguments into their own parameter structs.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use super::error::{HandlerError, ToolError};

/// JSON type a parameter accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Integer,
    Number,
    Boolean,
}

impl ParamType {
    /// JSON Schema name of the type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
        }
    }

    /// Convert a raw JSON value if it has this type.
    ///
    /// Integers accept floats with no fractional part (`3.0`), mirroring JSON
    /// Schema's notion of an integer.
    fn coerce(&self, raw: &Value) -> Option<ArgValue> {
        match (self, raw) {
            (Self::String, Value::String(s)) => Some(ArgValue::String(s.clone())),
            (Self::Boolean, Value::Bool(b)) => Some(ArgValue::Boolean(*b)),
            (Self::Number, Value::Number(n)) => n.as_f64().map(ArgValue::Number),
            (Self::Integer, Value::Number(n)) => n
                .as_i64()
                .or_else(|| {
                    n.as_f64()
                        .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                        .map(|f| f as i64)
                })
                .map(ArgValue::Integer),
            _ => None,
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let article = match self {
            Self::Integer => "an",
            _ => "a",
        };
        write!(f, "{} {}", article, self.as_str())
    }
}

/// Name of a JSON value's type, for error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// A validated, typed argument value.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    String(String),
    Integer(i64),
    Number(f64),
    Boolean(bool),
}

impl ArgValue {
    fn to_json(&self) -> Value {
        match self {
            Self::String(s) => Value::String(s.clone()),
            Self::Integer(i) => Value::from(*i),
            Self::Number(n) => serde_json::Number::from_f64(*n)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Self::Boolean(b) => Value::Bool(*b),
        }
    }
}

/// Declaration of a single tool parameter.
#[derive(Debug, Clone)]
pub struct ParameterSpec {
    pub name: &'static str,
    pub param_type: ParamType,
    pub description: &'static str,
    pub required: bool,
    /// Enumeration constraint for string parameters.
    pub allowed_values: Option<&'static [&'static str]>,
    /// Substituted when an optional parameter is absent.
    pub default: Option<ArgValue>,
    /// Inclusive bounds for integer parameters.
    pub range: Option<(i64, i64)>,
}

impl ParameterSpec {
    fn new(name: &'static str, param_type: ParamType, description: &'static str) -> Self {
        Self {
            name,
            param_type,
            description,
            required: false,
            allowed_values: None,
            default: None,
            range: None,
        }
    }

    /// An optional string parameter.
    pub fn string(name: &'static str, description: &'static str) -> Self {
        Self::new(name, ParamType::String, description)
    }

    /// An optional integer parameter.
    pub fn integer(name: &'static str, description: &'static str) -> Self {
        Self::new(name, ParamType::Integer, description)
    }

    /// An optional number parameter.
    pub fn number(name: &'static str, description: &'static str) -> Self {
        Self::new(name, ParamType::Number, description)
    }

    /// An optional boolean parameter.
    pub fn boolean(name: &'static str, description: &'static str) -> Self {
        Self::new(name, ParamType::Boolean, description)
    }

    /// Mark the parameter as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Restrict the parameter to a fixed set of strings.
    pub fn one_of(mut self, values: &'static [&'static str]) -> Self {
        self.allowed_values = Some(values);
        self
    }

    /// Value used when the parameter is omitted.
    pub fn with_default(mut self, value: ArgValue) -> Self {
        self.default = Some(value);
        self
    }

    /// Inclusive bounds for an integer parameter.
    pub fn range(mut self, min: i64, max: i64) -> Self {
        self.range = Some((min, max));
        self
    }

    fn check_constraints(&self, value: &ArgValue) -> Result<(), ToolError> {
        if let (Some(allowed), ArgValue::String(s)) = (self.allowed_values, value) {
            if !allowed.contains(&s.as_str()) {
                return Err(ToolError::invalid_value(
                    self.name,
                    format!("'{}' is not one of: {}", s, allowed.join(", ")),
                ));
            }
        }

        if let (Some((min, max)), ArgValue::Integer(i)) = (self.range, value) {
            if !(min..=max).contains(i) {
                return Err(ToolError::invalid_value(
                    self.name,
                    format!("{i} is outside the allowed range {min}..={max}"),
                ));
            }
        }

        Ok(())
    }

    fn json_schema(&self) -> Value {
        let mut schema = Map::new();
        schema.insert("type".into(), json!(self.param_type.as_str()));
        schema.insert("description".into(), json!(self.description));
        if let Some(allowed) = self.allowed_values {
            schema.insert("enum".into(), json!(allowed));
        }
        if let Some((min, max)) = self.range {
            schema.insert("minimum".into(), json!(min));
            schema.insert("maximum".into(), json!(max));
        }
        if let Some(default) = &self.default {
            schema.insert("default".into(), default.to_json());
        }
        Value::Object(schema)
    }
}

/// Declaration of a tool: name, description and parameters.
#[derive(Debug, Clone)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Vec<ParameterSpec>,
}

impl ToolSpec {
    /// Create a tool spec.
    pub fn new(
        name: &'static str,
        description: &'static str,
        parameters: Vec<ParameterSpec>,
    ) -> Self {
        Self {
            name,
            description,
            parameters,
        }
    }

    /// Look up a declared parameter by name.
    pub fn parameter(&self, name: &str) -> Option<&ParameterSpec> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// JSON Schema object describing the tool's arguments.
    pub fn input_schema(&self) -> Map<String, Value> {
        let properties: Map<String, Value> = self
            .parameters
            .iter()
            .map(|p| (p.name.to_string(), p.json_schema()))
            .collect();
        let required: Vec<&str> = self
            .parameters
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name)
            .collect();

        let mut schema = Map::new();
        schema.insert("type".into(), json!("object"));
        schema.insert("properties".into(), Value::Object(properties));
        schema.insert("required".into(), json!(required));
        schema.insert("additionalProperties".into(), json!(false));
        schema
    }

    /// Check raw arguments against the declared parameters.
    ///
    /// Parameters are checked in declaration order; the first violation wins.
    /// Undeclared keys are rejected after all declared parameters pass. A JSON
    /// `null` is treated as an omitted argument.
    pub fn validate(&self, arguments: &Map<String, Value>) -> Result<ValidatedArgs, ToolError> {
        let mut values = BTreeMap::new();

        for param in &self.parameters {
            match arguments.get(param.name).filter(|v| !v.is_null()) {
                None if param.required => {
                    return Err(ToolError::MissingParameter {
                        tool: self.name.to_string(),
                        parameter: param.name.to_string(),
                    });
                }
                None => {
                    if let Some(default) = &param.default {
                        values.insert(param.name, default.clone());
                    }
                }
                Some(raw) => {
                    let value =
                        param
                            .param_type
                            .coerce(raw)
                            .ok_or_else(|| ToolError::TypeMismatch {
                                parameter: param.name.to_string(),
                                expected: param.param_type,
                                found: json_type_name(raw),
                            })?;
                    param.check_constraints(&value)?;
                    values.insert(param.name, value);
                }
            }
        }

        if let Some(extra) = arguments.keys().find(|k| self.parameter(k).is_none()) {
            return Err(ToolError::UnexpectedParameter {
                tool: self.name.to_string(),
                parameter: extra.clone(),
            });
        }

        Ok(ValidatedArgs { values })
    }
}

/// Arguments that passed validation against a [`ToolSpec`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidatedArgs {
    values: BTreeMap<&'static str, ArgValue>,
}

impl ValidatedArgs {
    /// Typed value of a parameter, if present.
    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.values.get(name)
    }

    /// Number of present arguments (explicit or defaulted).
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no arguments are present.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Decode into a tool's parameter struct.
    ///
    /// Enumerated string parameters map onto serde enums here. A failure
    /// means the struct and the schema disagree, which is a bug in the tool.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, HandlerError> {
        let object: Map<String, Value> = self
            .values
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_json()))
            .collect();
        serde_json::from_value(Value::Object(object)).map_err(|e| {
            HandlerError::internal(format!("validated arguments do not match tool parameters: {e}"))
        })
    }
}
