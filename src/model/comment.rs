//! Script comments.

use serde_json::Value;

use super::json;
use crate::config::WorkspaceScale;
use crate::error::{ConvertError, Result};
use crate::xml::Element;

/// Index-to-meaning table of a Scratch 2 comment array:
/// `[x, y, width, height, open, blockID, text]`.
pub mod sb2_layout {
    pub const X: usize = 0;
    pub const Y: usize = 1;
    pub const WIDTH: usize = 2;
    pub const HEIGHT: usize = 3;
    pub const OPEN: usize = 4;
    /// `-1` when the comment floats on the scripting area.
    pub const BLOCK_ID: usize = 5;
    pub const TEXT: usize = 6;
    pub const LEN: usize = 7;
}

/// Scratch 2 block-id sentinel for a floating comment.
pub const SB2_NO_BLOCK: i64 = -1;

/// Snap! default comment width, used when the source has none.
pub const DEFAULT_WIDTH: f64 = 90.0;

/// Identifies the block a comment is attached to.
///
/// Scratch 2 numbers blocks in traversal order, Scratch 3 names them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BlockKey {
    Index(usize),
    Id(String),
}

/// A floating or block-attached annotation.
///
/// `x`/`y` are set only for floating comments.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptComment {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: f64,
    pub collapsed: bool,
    pub text: String,
    pub attached_to: Option<BlockKey>,
}

impl ScriptComment {
    pub fn read_sb2(value: &Value) -> Result<Self> {
        use sb2_layout::*;

        let items = value
            .as_array()
            .filter(|items| items.len() >= LEN)
            .ok_or_else(|| {
                ConvertError::sb2(format!("comment must be a {LEN}-element array, got {value}"))
            })?;

        let mut comment = Self {
            x: None,
            y: None,
            width: json::as_number(&items[WIDTH]).unwrap_or(DEFAULT_WIDTH),
            collapsed: !truthy(&items[OPEN]),
            text: json::display(&items[TEXT]),
            attached_to: None,
        };

        match items[BLOCK_ID].as_i64() {
            Some(SB2_NO_BLOCK) => {
                comment.set_position(
                    json::coordinate(items.get(X), "x"),
                    json::coordinate(items.get(Y), "y"),
                );
            }
            Some(index) if index >= 0 => {
                comment.attached_to = Some(BlockKey::Index(index as usize));
            }
            _ => {}
        }

        Ok(comment)
    }

    /// Scratch 3 comment object; coordinates and width are divided by the
    /// workspace scale.
    pub fn read_sb3(value: &Value, scale: WorkspaceScale) -> Result<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| ConvertError::sb3(format!("comment must be an object, got {value}")))?;

        let mut comment = Self {
            x: None,
            y: None,
            width: json::number(obj, "width")
                .map(|w| w / scale.x)
                .unwrap_or(DEFAULT_WIDTH),
            collapsed: json::boolean(obj, "minimized").unwrap_or(false),
            text: json::string(obj, "text").unwrap_or_default().to_string(),
            attached_to: None,
        };

        // Only an explicit null marks a positioned workspace comment.
        match obj.get("blockId") {
            Some(Value::Null) => {
                comment.set_position(
                    json::coordinate(obj.get("x"), "x").map(|x| x.map(|x| x / scale.x)),
                    json::coordinate(obj.get("y"), "y").map(|y| y.map(|y| y / scale.y)),
                );
            }
            Some(Value::String(id)) => comment.attached_to = Some(BlockKey::Id(id.clone())),
            _ => {}
        }

        Ok(comment)
    }

    /// Keep a position only when both axes converted.
    fn set_position(&mut self, x: Result<Option<f64>>, y: Result<Option<f64>>) {
        match (x, y) {
            (Ok(x), Ok(y)) => {
                self.x = x;
                self.y = y;
            }
            (Err(e), _) | (_, Err(e)) => {
                tracing::warn!(error = %e, "comment position dropped");
            }
        }
    }

    pub fn is_floating(&self) -> bool {
        self.attached_to.is_none()
    }

    pub fn to_xml(&self) -> Element {
        let element = match (self.x, self.y) {
            (Some(x), Some(y)) => Element::new("comment").attr("x", x).attr("y", y),
            _ => Element::new("comment"),
        };
        element
            .attr("w", self.width)
            .attr("collapsed", self.collapsed)
            .text(self.text.clone())
    }
}

/// Truthiness of a loosely typed flag.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::{AttrValue, serialize};
    use serde_json::json;

    const SCALE: WorkspaceScale = WorkspaceScale { x: 1.5, y: 1.8 };

    #[test]
    fn test_sb2_floating_comment_has_position() {
        let comment =
            ScriptComment::read_sb2(&json!([20, 30, 150, 60, true, -1, "note"])).unwrap();
        assert!(comment.is_floating());
        assert_eq!(
            serialize(&comment.to_xml()).unwrap(),
            r#"<comment x="20" y="30" w="150" collapsed="false">note</comment>"#
        );
    }

    #[test]
    fn test_sb2_attached_comment_has_no_position() {
        let comment = ScriptComment::read_sb2(&json!([20, 30, 150, 60, false, 0, "on block"]))
            .unwrap();
        assert_eq!(comment.attached_to, Some(BlockKey::Index(0)));
        let xml = comment.to_xml();
        assert!(xml.get_attr("x").is_none());
        assert!(xml.get_attr("y").is_none());
        assert_eq!(xml.get_attr("collapsed"), Some(&AttrValue::Bool(true)));
        assert_eq!(xml.text_content(), "on block");
    }

    #[test]
    fn test_sb2_short_array_is_malformed() {
        let err = ScriptComment::read_sb2(&json!([20, 30, 150])).unwrap_err();
        assert!(matches!(err, ConvertError::MalformedDialect { .. }));
    }

    #[test]
    fn test_sb2_unparsable_position_is_omitted() {
        let comment =
            ScriptComment::read_sb2(&json!(["left", 30, 150, 60, true, -1, "note"])).unwrap();
        assert_eq!(comment.x, None);
        assert_eq!(comment.y, None);
        assert!(comment.to_xml().get_attr("x").is_none());
    }

    #[test]
    fn test_sb3_floating_comment_is_scaled() {
        let comment = ScriptComment::read_sb3(
            &json!({"blockId": null, "x": 100, "y": 200, "width": 300, "height": 200,
                    "minimized": true, "text": "hi"}),
            SCALE,
        )
        .unwrap();
        assert_eq!(comment.x, Some(100.0 / 1.5));
        assert_eq!(comment.y, Some(200.0 / 1.8));
        assert_eq!(comment.width, 200.0);
        assert!(comment.collapsed);
        let xml = comment.to_xml();
        assert_eq!(xml.get_attr("x"), Some(&AttrValue::Num(100.0 / 1.5)));
        assert_eq!(xml.get_attr("y"), Some(&AttrValue::Num(200.0 / 1.8)));
    }

    #[test]
    fn test_sb3_comment_without_block_id_has_no_position() {
        let comment = ScriptComment::read_sb3(
            &json!({"x": 100, "y": 200, "width": 150, "minimized": false, "text": "loose"}),
            SCALE,
        )
        .unwrap();
        assert!(comment.is_floating());
        assert_eq!(comment.x, None);
        assert_eq!(comment.y, None);
        assert_eq!(
            serialize(&comment.to_xml()).unwrap(),
            r#"<comment w="100" collapsed="false">loose</comment>"#
        );
    }

    #[test]
    fn test_sb3_attached_comment() {
        let comment = ScriptComment::read_sb3(
            &json!({"blockId": "abc", "x": 100, "y": 200, "width": 150, "minimized": false,
                    "text": "attached"}),
            SCALE,
        )
        .unwrap();
        assert_eq!(comment.attached_to, Some(BlockKey::Id("abc".to_string())));
        assert_eq!(comment.x, None);
        let xml = serialize(&comment.to_xml()).unwrap();
        assert_eq!(xml, r#"<comment w="100" collapsed="false">attached</comment>"#);
    }

    #[test]
    fn test_truthy() {
        assert!(truthy(&json!(true)));
        assert!(truthy(&json!(1)));
        assert!(!truthy(&json!(0)));
        assert!(!truthy(&json!("")));
        assert!(!truthy(&Value::Null));
    }
}
