//! Accessors for untyped project JSON.
//!
//! Source projects are loosely typed: numbers sometimes arrive as strings,
//! optional keys are often missing. These helpers read what is there and
//! report absence as `None`.

use serde_json::{Map, Value};

use crate::error::{ConvertError, Result};

/// Numeric value, accepting numeric strings.
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

/// Numeric coordinate field. Absent is `Ok(None)`; present but not
/// numeric is a [`ConvertError::UnitConversion`].
pub fn coordinate(value: Option<&Value>, field: &'static str) -> Result<Option<f64>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(v) => as_number(v)
            .map(Some)
            .ok_or_else(|| ConvertError::UnitConversion {
                field,
                value: v.to_string(),
            }),
    }
}

pub fn number(obj: &Map<String, Value>, key: &str) -> Option<f64> {
    obj.get(key).and_then(as_number)
}

pub fn number_or(obj: &Map<String, Value>, key: &str, default: f64) -> f64 {
    number(obj, key).unwrap_or(default)
}

pub fn string<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    obj.get(key).and_then(Value::as_str)
}

pub fn boolean(obj: &Map<String, Value>, key: &str) -> Option<bool> {
    obj.get(key).and_then(Value::as_bool)
}

pub fn array<'a>(obj: &'a Map<String, Value>, key: &str) -> &'a [Value] {
    obj.get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

pub fn object<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a Map<String, Value>> {
    obj.get(key).and_then(Value::as_object)
}

/// Display text of a scalar the way the source runtime stringifies it.
pub fn display(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() => crate::xml::format_number(f),
            _ => n.to_string(),
        },
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_as_number() {
        assert_eq!(as_number(&json!(3)), Some(3.0));
        assert_eq!(as_number(&json!("4.5")), Some(4.5));
        assert_eq!(as_number(&json!("abc")), None);
        assert_eq!(as_number(&json!(null)), None);
    }

    #[test]
    fn test_coordinate() {
        assert_eq!(coordinate(None, "x").unwrap(), None);
        assert_eq!(coordinate(Some(&json!(12)), "x").unwrap(), Some(12.0));
        assert!(matches!(
            coordinate(Some(&json!("left")), "x"),
            Err(ConvertError::UnitConversion { field: "x", .. })
        ));
    }

    #[test]
    fn test_display() {
        assert_eq!(display(&json!(10)), "10");
        assert_eq!(display(&json!(2.5)), "2.5");
        assert_eq!(display(&json!(1.0)), "1");
        assert_eq!(display(&json!("hi")), "hi");
        assert_eq!(display(&json!(true)), "true");
        assert_eq!(display(&Value::Null), "");
    }
}
