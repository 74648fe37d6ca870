//! Closed set of primitive kinds and their conversion table.

use serde_json::{Number, Value};
use thiserror::Error;

/// Primitive value kinds an attribute can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Float,
    Int,
    Bool,
    Str,
    Dict,
    ListOfFloat,
    ListOfInt,
    ListOfStr,
}

/// Failure converting a value to a primitive kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    /// The value (or an element of it) was null.
    #[error("value is null")]
    Null,
    /// The value cannot be represented as the target kind.
    #[error("cannot convert {value} to {target}")]
    Incompatible { value: String, target: &'static str },
}

impl Primitive {
    /// Parse a schema type name such as `float` or `list_of_float`.
    pub fn parse(name: &str) -> Option<Self> {
        let primitive = match name {
            "float" => Self::Float,
            "int" => Self::Int,
            "bool" => Self::Bool,
            "str" => Self::Str,
            "dict" => Self::Dict,
            "list_of_float" => Self::ListOfFloat,
            "list_of_int" => Self::ListOfInt,
            "list_of_str" => Self::ListOfStr,
            _ => return None,
        };
        Some(primitive)
    }

    /// Schema spelling of the kind, used in messages.
    pub fn name(self) -> &'static str {
        match self {
            Self::Float => "float",
            Self::Int => "int",
            Self::Bool => "bool",
            Self::Str => "str",
            Self::Dict => "dict",
            Self::ListOfFloat => "list_of_float",
            Self::ListOfInt => "list_of_int",
            Self::ListOfStr => "list_of_str",
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Float | Self::Int)
    }

    /// Element kind of a list primitive.
    pub fn element(self) -> Option<Self> {
        match self {
            Self::ListOfFloat => Some(Self::Float),
            Self::ListOfInt => Some(Self::Int),
            Self::ListOfStr => Some(Self::Str),
            _ => None,
        }
    }

    /// List kind whose elements are `self`.
    pub fn list_of(self) -> Option<Self> {
        match self {
            Self::Float => Some(Self::ListOfFloat),
            Self::Int => Some(Self::ListOfInt),
            Self::Str => Some(Self::ListOfStr),
            _ => None,
        }
    }

    /// Convert a JSON value to this kind.
    pub fn convert(self, value: &Value) -> Result<Value, ConversionError> {
        if value.is_null() {
            return Err(ConversionError::Null);
        }
        match self {
            Self::Float => to_float(value).map(Value::Number),
            Self::Int => to_int(value).map(Value::Number),
            Self::Bool => to_bool(value).map(Value::Bool),
            Self::Str => to_str(value).map(Value::String),
            Self::Dict => match value {
                Value::Object(_) => Ok(value.clone()),
                _ => Err(incompatible(value, self)),
            },
            Self::ListOfFloat | Self::ListOfInt | Self::ListOfStr => {
                let Value::Array(items) = value else {
                    return Err(incompatible(value, self));
                };
                let element = self.element().unwrap_or(Self::Float);
                items
                    .iter()
                    .map(|item| element.convert(item))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::Array)
            }
        }
    }
}

/// Declared type of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeType {
    /// A single primitive kind.
    Scalar(Primitive),
    /// Either one constant of the scalar kind or a per-timestep series of it
    /// (declared as `["float", "list_of_float"]`).
    ScalarOrSeries(Primitive),
}

impl AttributeType {
    /// Parse a schema `type` entry: a name or a `[scalar, list_of_scalar]` pair.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(name) => Primitive::parse(name).map(Self::Scalar),
            Value::Array(names) => {
                let kinds = names
                    .iter()
                    .map(|name| name.as_str().and_then(Primitive::parse))
                    .collect::<Option<Vec<_>>>()?;
                let scalar = kinds.iter().copied().find(|kind| kind.list_of().is_some())?;
                let series = scalar.list_of()?;
                if kinds.len() == 2 && kinds.contains(&series) {
                    Some(Self::ScalarOrSeries(scalar))
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    /// Kind used for scalar conversion of this attribute.
    pub fn scalar(self) -> Primitive {
        match self {
            Self::Scalar(kind) | Self::ScalarOrSeries(kind) => kind,
        }
    }

    pub fn is_union(self) -> bool {
        matches!(self, Self::ScalarOrSeries(_))
    }

    /// True when array values are bound-checked element by element.
    pub fn checks_elements(self) -> bool {
        match self {
            Self::ScalarOrSeries(_) => true,
            Self::Scalar(kind) => matches!(kind, Primitive::ListOfFloat | Primitive::ListOfInt),
        }
    }
}

fn incompatible(value: &Value, target: Primitive) -> ConversionError {
    ConversionError::Incompatible {
        value: value.to_string(),
        target: target.name(),
    }
}

fn finite_number(raw: f64, value: &Value, target: Primitive) -> Result<Number, ConversionError> {
    Number::from_f64(raw).ok_or_else(|| incompatible(value, target))
}

fn to_float(value: &Value) -> Result<Number, ConversionError> {
    let raw = match value {
        Value::Number(number) => number.as_f64(),
        Value::Bool(flag) => Some(if *flag { 1.0 } else { 0.0 }),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    let raw = raw.ok_or_else(|| incompatible(value, Primitive::Float))?;
    finite_number(raw, value, Primitive::Float)
}

fn to_int(value: &Value) -> Result<Number, ConversionError> {
    match value {
        Value::Number(number) if number.is_i64() || number.is_u64() => Ok(number.clone()),
        Value::Number(number) => {
            let raw = number
                .as_f64()
                .filter(|raw| raw.is_finite() && raw.abs() < i64::MAX as f64)
                .ok_or_else(|| incompatible(value, Primitive::Int))?;
            Ok(Number::from(raw.trunc() as i64))
        }
        Value::Bool(flag) => Ok(Number::from(i64::from(*flag))),
        Value::String(text) => text
            .trim()
            .parse::<i64>()
            .map(Number::from)
            .map_err(|_| incompatible(value, Primitive::Int)),
        _ => Err(incompatible(value, Primitive::Int)),
    }
}

/// Only `true`, `false`, `1` and `0` are accepted as booleans.
fn to_bool(value: &Value) -> Result<bool, ConversionError> {
    match value {
        Value::Bool(flag) => Ok(*flag),
        Value::Number(number) => match number.as_f64() {
            Some(raw) if raw == 1.0 => Ok(true),
            Some(raw) if raw == 0.0 => Ok(false),
            _ => Err(incompatible(value, Primitive::Bool)),
        },
        _ => Err(incompatible(value, Primitive::Bool)),
    }
}

fn to_str(value: &Value) -> Result<String, ConversionError> {
    match value {
        Value::String(text) => Ok(text.clone()),
        Value::Number(number) => Ok(number.to_string()),
        Value::Bool(flag) => Ok(flag.to_string()),
        _ => Err(incompatible(value, Primitive::Str)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn float_accepts_numbers_bools_and_numeric_strings() {
        assert_eq!(Primitive::Float.convert(&json!(3)), Ok(json!(3.0)));
        assert_eq!(Primitive::Float.convert(&json!(" 2.5 ")), Ok(json!(2.5)));
        assert_eq!(Primitive::Float.convert(&json!(true)), Ok(json!(1.0)));
        assert!(Primitive::Float.convert(&json!("abc")).is_err());
        assert!(Primitive::Float.convert(&json!("nan")).is_err());
        assert!(Primitive::Float.convert(&json!([1])).is_err());
    }

    #[test]
    fn int_truncates_floats_but_rejects_decimal_strings() {
        assert_eq!(Primitive::Int.convert(&json!(3.7)), Ok(json!(3)));
        assert_eq!(Primitive::Int.convert(&json!("12")), Ok(json!(12)));
        assert!(Primitive::Int.convert(&json!("12.5")).is_err());
    }

    #[test]
    fn bool_is_restricted_to_literal_set() {
        assert_eq!(Primitive::Bool.convert(&json!(1)), Ok(json!(true)));
        assert_eq!(Primitive::Bool.convert(&json!(0.0)), Ok(json!(false)));
        assert_eq!(Primitive::Bool.convert(&json!(false)), Ok(json!(false)));
        assert!(Primitive::Bool.convert(&json!(2)).is_err());
        assert!(Primitive::Bool.convert(&json!("true")).is_err());
    }

    #[test]
    fn list_conversion_reports_null_elements() {
        assert_eq!(
            Primitive::ListOfFloat.convert(&json!([1, "2"])),
            Ok(json!([1.0, 2.0]))
        );
        assert_eq!(
            Primitive::ListOfFloat.convert(&json!([1, null])),
            Err(ConversionError::Null)
        );
    }

    #[test]
    fn parses_union_type() {
        assert_eq!(
            AttributeType::from_value(&json!(["float", "list_of_float"])),
            Some(AttributeType::ScalarOrSeries(Primitive::Float))
        );
        assert_eq!(
            AttributeType::from_value(&json!("int")),
            Some(AttributeType::Scalar(Primitive::Int))
        );
        assert_eq!(AttributeType::from_value(&json!(["float", "int"])), None);
        assert_eq!(AttributeType::from_value(&json!("decimal")), None);
    }
}
