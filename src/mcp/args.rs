use crate::error::{NmdcError, Result};
use serde_json::{Map, Value};

/// Tool-call arguments with typed, per-argument accessors.
///
/// Every accessor fails with a validation error naming the argument, so a
/// caller always learns which input was wrong.
#[derive(Debug, Clone, Default)]
pub struct ToolArguments {
    values: Map<String, Value>,
}

impl ToolArguments {
    pub fn from_value(arguments: Value) -> Result<Self> {
        match arguments {
            Value::Null => Ok(Self::default()),
            Value::Object(values) => Ok(Self { values }),
            other => Err(NmdcError::invalid_argument(
                "arguments",
                format!("expected an object, got {}", type_name(&other)),
            )),
        }
    }

    /// Reject arguments the tool does not declare.
    pub fn only(&self, allowed: &[&str]) -> Result<()> {
        match self.values.keys().find(|key| !allowed.contains(&key.as_str())) {
            Some(unknown) => Err(NmdcError::invalid_argument(
                unknown.as_str(),
                format!("unknown argument; expected one of: {}", allowed.join(", ")),
            )),
            None => Ok(()),
        }
    }

    /// Present and not `null`.
    fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name).filter(|value| !value.is_null())
    }

    pub fn required_str(&self, name: &str) -> Result<String> {
        self.optional_str(name)?
            .ok_or_else(|| NmdcError::invalid_argument(name, "is required"))
    }

    pub fn optional_str(&self, name: &str) -> Result<Option<String>> {
        match self.get(name) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(expected(name, "a string", other)),
        }
    }

    /// A strictly positive integer. Zero, negatives and fractions are rejected.
    pub fn optional_positive(&self, name: &str) -> Result<Option<usize>> {
        let Some(value) = self.get(name) else {
            return Ok(None);
        };
        let Value::Number(number) = value else {
            return Err(expected(name, "a positive integer", value));
        };
        match number.as_u64() {
            Some(0) | None => Err(NmdcError::invalid_argument(
                name,
                format!("must be a positive integer, got {}", number),
            )),
            Some(n) => Ok(Some(usize::try_from(n).unwrap_or(usize::MAX))),
        }
    }

    pub fn required_f64(&self, name: &str) -> Result<f64> {
        match self.get(name) {
            None => Err(NmdcError::invalid_argument(name, "is required")),
            Some(Value::Number(number)) => number
                .as_f64()
                .ok_or_else(|| NmdcError::invalid_argument(name, "must be a finite number")),
            Some(other) => Err(expected(name, "a number", other)),
        }
    }

    pub fn required_str_list(&self, name: &str) -> Result<Vec<String>> {
        self.optional_str_list(name)?
            .ok_or_else(|| NmdcError::invalid_argument(name, "is required"))
    }

    pub fn optional_str_list(&self, name: &str) -> Result<Option<Vec<String>>> {
        let Some(value) = self.get(name) else {
            return Ok(None);
        };
        let Value::Array(items) = value else {
            return Err(expected(name, "an array of strings", value));
        };
        items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.clone()),
                other => Err(expected(name, "an array of strings", other)),
            })
            .collect::<Result<Vec<_>>>()
            .map(Some)
    }
}

fn expected(name: &str, what: &str, got: &Value) -> NmdcError {
    NmdcError::invalid_argument(name, format!("must be {}, got {}", what, type_name(got)))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
