//! Literal argument slots.

use std::fmt;

use serde_json::Value;

use crate::error::{ConvertError, Result};
use crate::xml::{Element, format_number};

/// Scratch 3 compact primitive type codes.
pub mod sb3_type {
    pub const MATH_NUMBER: u64 = 4;
    pub const POSITIVE_NUMBER: u64 = 5;
    pub const WHOLE_NUMBER: u64 = 6;
    pub const INTEGER_NUMBER: u64 = 7;
    pub const ANGLE_NUMBER: u64 = 8;
    pub const COLOR_PICKER: u64 = 9;
    pub const TEXT: u64 = 10;
    pub const BROADCAST: u64 = 11;
    pub const VARIABLE: u64 = 12;
    pub const LIST: u64 = 13;
}

/// The literal held by a slot.
///
/// `Empty` stands for both a missing value and JSON `null`.
#[derive(Debug, Clone, PartialEq)]
pub enum PrimitiveValue {
    Text(String),
    Number(f64),
    Bool(bool),
    Empty,
}

/// One literal slot of a block, possibly a dropdown option.
#[derive(Debug, Clone, PartialEq)]
pub struct Primitive {
    pub value: PrimitiveValue,
    pub is_option: bool,
}

impl Primitive {
    pub fn new(value: PrimitiveValue, is_option: bool) -> Self {
        Self { value, is_option }
    }

    pub fn literal(value: PrimitiveValue) -> Self {
        Self::new(value, false)
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::literal(PrimitiveValue::Text(text.into()))
    }

    pub fn option(text: impl Into<String>) -> Self {
        Self::new(PrimitiveValue::Text(text.into()), true)
    }

    pub fn empty() -> Self {
        Self::literal(PrimitiveValue::Empty)
    }

    /// Wrap any JSON scalar. Compound values keep their JSON text.
    pub fn from_json(value: &Value) -> Self {
        let value = match value {
            Value::Null => PrimitiveValue::Empty,
            Value::Bool(b) => PrimitiveValue::Bool(*b),
            Value::Number(n) => match n.as_f64() {
                Some(f) => PrimitiveValue::Number(f),
                None => PrimitiveValue::Text(n.to_string()),
            },
            Value::String(s) => PrimitiveValue::Text(s.clone()),
            other => PrimitiveValue::Text(other.to_string()),
        };
        Self::literal(value)
    }

    /// Scratch 2 stores literals inline as plain JSON scalars.
    pub fn read_sb2(value: &Value) -> Result<Self> {
        match value {
            Value::Array(_) | Value::Object(_) => Err(ConvertError::sb2(format!(
                "expected a literal argument, got {value}"
            ))),
            scalar => Ok(Self::from_json(scalar)),
        }
    }

    /// Scratch 3 compact primitive: `[type, value, ...]`.
    pub fn read_sb3(value: &Value) -> Result<Self> {
        let items = value
            .as_array()
            .ok_or_else(|| ConvertError::sb3(format!("expected a primitive array, got {value}")))?;
        let code = items
            .first()
            .and_then(Value::as_u64)
            .ok_or_else(|| ConvertError::sb3("primitive array without a type code"))?;
        let literal = items.get(1).unwrap_or(&Value::Null);

        match code {
            sb3_type::MATH_NUMBER..=sb3_type::TEXT | sb3_type::BROADCAST => {
                Ok(Self::from_json(literal))
            }
            sb3_type::VARIABLE | sb3_type::LIST => Err(ConvertError::sb3(
                "variable reference is not a literal primitive",
            )),
            other => Err(ConvertError::sb3(format!("unknown primitive type {other}"))),
        }
    }

    pub fn to_xml(&self) -> Element {
        if self.is_option {
            return Element::new("l").child(Element::new("option").text(self.to_string()));
        }
        match &self.value {
            PrimitiveValue::Bool(true) => {
                Element::new("l").child(Element::new("bool").text("true"))
            }
            PrimitiveValue::Bool(false) | PrimitiveValue::Empty => Element::new("l"),
            _ => Element::new("l").text(self.to_string()),
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            PrimitiveValue::Text(s) => f.write_str(s),
            PrimitiveValue::Number(n) => f.write_str(&format_number(*n)),
            PrimitiveValue::Bool(b) => write!(f, "{b}"),
            PrimitiveValue::Empty => Ok(()),
        }
    }
}

impl From<&Value> for Primitive {
    fn from(value: &Value) -> Self {
        Self::from_json(value)
    }
}
