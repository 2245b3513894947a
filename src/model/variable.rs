use serde_json::{Map, Value};

use super::json;
use super::primitive::Primitive;
use crate::error::{ConvertError, Result};
use crate::xml::Element;

#[derive(Debug, Clone, PartialEq)]
pub enum VariableValue {
    Scalar(Primitive),
    List(Vec<Primitive>),
}

/// A named variable or list.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
    pub value: VariableValue,
}

impl Variable {
    pub fn scalar(name: impl Into<String>, value: Primitive) -> Self {
        Self {
            name: name.into(),
            value: VariableValue::Scalar(value),
        }
    }

    pub fn list(name: impl Into<String>, items: Vec<Primitive>) -> Self {
        Self {
            name: name.into(),
            value: VariableValue::List(items),
        }
    }

    /// `{"name": .., "value": ..}`
    pub fn read_sb2(value: &Value) -> Result<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| ConvertError::sb2(format!("variable must be an object, got {value}")))?;
        let name = json::string(obj, "name")
            .ok_or_else(|| ConvertError::sb2("variable without a name"))?;
        let value = obj.get("value").unwrap_or(&Value::Null);
        Ok(Self::scalar(name, Primitive::from_json(value)))
    }

    /// `{"listName": .., "contents": [..]}`
    pub fn read_sb2_list(value: &Value) -> Result<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| ConvertError::sb2(format!("list must be an object, got {value}")))?;
        let name = json::string(obj, "listName")
            .ok_or_else(|| ConvertError::sb2("list without a listName"))?;
        let items = json::array(obj, "contents")
            .iter()
            .map(Primitive::from_json)
            .collect();
        Ok(Self::list(name, items))
    }

    /// `[name, value, cloud?]`
    pub fn read_sb3(value: &Value) -> Result<Self> {
        let (name, value) = sb3_pair(value)?;
        Ok(Self::scalar(name, Primitive::from_json(value)))
    }

    /// `[name, [item, ...]]`
    pub fn read_sb3_list(value: &Value) -> Result<Self> {
        let (name, items) = sb3_pair(value)?;
        let items = items
            .as_array()
            .map(|items| items.iter().map(Primitive::from_json).collect())
            .unwrap_or_default();
        Ok(Self::list(name, items))
    }

    /// Variables and lists of a Scratch 2 object.
    pub fn read_all_sb2(obj: &Map<String, Value>) -> Vec<Self> {
        let scalars = json::array(obj, "variables").iter().map(Self::read_sb2);
        let lists = json::array(obj, "lists").iter().map(Self::read_sb2_list);
        scalars.chain(lists).filter_map(keep).collect()
    }

    /// Variables and lists of a Scratch 3 target.
    pub fn read_all_sb3(obj: &Map<String, Value>) -> Vec<Self> {
        let values = |key: &'static str| {
            json::object(obj, key)
                .into_iter()
                .flat_map(|entries| entries.values())
        };
        let scalars = values("variables").map(Self::read_sb3);
        let lists = values("lists").map(Self::read_sb3_list);
        scalars.chain(lists).filter_map(keep).collect()
    }

    pub fn to_xml(&self) -> Element {
        let element = Element::new("variable").attr("name", self.name.as_str());
        match &self.value {
            VariableValue::Scalar(value) => element.child(value.to_xml()),
            VariableValue::List(items) => element.child(
                Element::new("list").children(
                    items
                        .iter()
                        .map(|item| Element::new("item").child(item.to_xml())),
                ),
            ),
        }
    }
}

fn sb3_pair(value: &Value) -> Result<(String, &Value)> {
    let items = value
        .as_array()
        .ok_or_else(|| ConvertError::sb3(format!("variable must be an array, got {value}")))?;
    let name = items
        .first()
        .and_then(Value::as_str)
        .ok_or_else(|| ConvertError::sb3("variable without a name"))?;
    Ok((name.to_string(), items.get(1).unwrap_or(&Value::Null)))
}

fn keep(result: Result<Variable>) -> Option<Variable> {
    result
        .inspect_err(|e| tracing::warn!(error = %e, "variable skipped"))
        .ok()
}
