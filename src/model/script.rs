//! Scripts and the per-sprite scripting area.

use rustc_hash::FxHashMap;
use serde_json::{Map, Value};

use super::ReadContext;
use super::block::{Block, Sb2Scope, Sb3Scope, count_sb2_body};
use super::comment::{BlockKey, ScriptComment};
use super::json;
use crate::error::{ConvertError, Result};
use crate::xml::Element;

/// An ordered run of blocks. Top-level scripts carry a position; C-slot
/// bodies do not.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Script {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub blocks: Vec<Block>,
}

impl Script {
    /// `[x, y, [block, block, ...]]`
    pub fn read_sb2(value: &Value, scope: &mut Sb2Scope<'_>) -> Result<Self> {
        let items = value
            .as_array()
            .filter(|items| items.len() >= 3)
            .ok_or_else(|| ConvertError::sb2(format!("script must be [x, y, blocks], got {value}")))?;
        let mut script = Self::read_sb2_body(&items[2], scope)?;
        script.x = json::as_number(&items[0]);
        script.y = json::as_number(&items[1]);
        Ok(script)
    }

    /// A bare list of block arrays; `null` is an empty body.
    pub fn read_sb2_body(value: &Value, scope: &mut Sb2Scope<'_>) -> Result<Self> {
        let blocks = match value {
            Value::Null => Vec::new(),
            Value::Array(items) => items
                .iter()
                .map(|item| Block::read_sb2(item, scope))
                .collect::<Result<_>>()?,
            other => {
                return Err(ConvertError::sb2(format!(
                    "expected a list of blocks, got {other}"
                )));
            }
        };
        Ok(Self {
            x: None,
            y: None,
            blocks,
        })
    }

    /// Top-level chain starting at `id`, positioned in Snap! units.
    pub fn read_sb3(id: &str, scope: &mut Sb3Scope<'_>) -> Result<Self> {
        let scale = scope.ctx.scale;
        let (x, y) = match scope.blocks().get(id) {
            Some(Value::Object(obj)) => (json::number(obj, "x"), json::number(obj, "y")),
            Some(Value::Array(items)) => (
                items.get(3).and_then(json::as_number),
                items.get(4).and_then(json::as_number),
            ),
            _ => (None, None),
        };
        let mut script = Self::read_sb3_chain(id, scope)?;
        script.x = x.map(|x| x / scale.x);
        script.y = y.map(|y| y / scale.y);
        Ok(script)
    }

    /// Follow `next` links from `id`.
    pub fn read_sb3_chain(id: &str, scope: &mut Sb3Scope<'_>) -> Result<Self> {
        let mut blocks = Vec::new();
        let mut current = Some(id.to_string());
        while let Some(id) = current {
            blocks.push(Block::read_sb3(&id, scope)?);
            current = scope
                .blocks()
                .get(&id)
                .and_then(|block| block.get("next"))
                .and_then(Value::as_str)
                .map(str::to_string);
        }
        Ok(Self {
            x: None,
            y: None,
            blocks,
        })
    }

    pub fn attach_comments(&mut self, comments: &mut FxHashMap<BlockKey, ScriptComment>) {
        for block in &mut self.blocks {
            block.attach_comments(comments);
        }
    }

    pub fn to_xml(&self) -> Element {
        let element = match (self.x, self.y) {
            (Some(x), Some(y)) => Element::new("script").attr("x", x).attr("y", y),
            _ => Element::new("script"),
        };
        element.children(self.blocks.iter().map(Block::to_xml))
    }
}

/// Scripts plus the comments that did not attach to any block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScriptArea {
    pub scripts: Vec<Script>,
    pub comments: Vec<ScriptComment>,
}

impl ScriptArea {
    /// Reads `scripts` and `scriptComments` from a Scratch 2 object.
    ///
    /// A script or comment that fails to decode is dropped with a warning;
    /// the rest of the sprite still converts.
    pub fn read_sb2(obj: &Map<String, Value>, ctx: &ReadContext<'_>) -> Self {
        if !ctx.has_scripts {
            return Self::default();
        }
        let mut scope = Sb2Scope::new(ctx);
        let scripts = json::array(obj, "scripts")
            .iter()
            .filter_map(|value| {
                let blocks = value.get(2).map_or(0, count_sb2_body);
                let script = scope.read_script(blocks, |scope| Script::read_sb2(value, scope));
                keep(script, "script")
            })
            .collect();
        let comments = json::array(obj, "scriptComments")
            .iter()
            .filter_map(|value| keep(ScriptComment::read_sb2(value), "comment"))
            .collect();
        Self::assemble(scripts, comments)
    }

    /// Reads top-level chains from `blocks` and every entry of `comments`.
    pub fn read_sb3(obj: &Map<String, Value>, ctx: &ReadContext<'_>) -> Self {
        if !ctx.has_scripts {
            return Self::default();
        }
        let empty = Map::new();
        let blocks = json::object(obj, "blocks").unwrap_or(&empty);
        let mut scope = Sb3Scope::new(ctx, blocks);

        let scripts = blocks
            .iter()
            .filter(|(_, block)| is_top_level(block))
            .filter_map(|(id, _)| keep(Script::read_sb3(id, &mut scope), "script"))
            .collect();
        let comments = json::object(obj, "comments")
            .into_iter()
            .flat_map(|comments| comments.values())
            .filter_map(|value| keep(ScriptComment::read_sb3(value, ctx.scale), "comment"))
            .collect();
        Self::assemble(scripts, comments)
    }

    fn assemble(mut scripts: Vec<Script>, comments: Vec<ScriptComment>) -> Self {
        let mut floating = Vec::new();
        let mut attached = FxHashMap::default();
        for comment in comments {
            match comment.attached_to.clone() {
                // A block holds one comment; extras float.
                Some(key) => floating.extend(attached.insert(key, comment)),
                None => floating.push(comment),
            }
        }

        for script in &mut scripts {
            script.attach_comments(&mut attached);
        }
        if !attached.is_empty() {
            tracing::warn!(count = attached.len(), "comments attached to missing blocks");
        }
        floating.extend(attached.into_values());

        Self {
            scripts,
            comments: floating,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty() && self.comments.is_empty()
    }

    pub fn to_xml(&self) -> Element {
        Element::new("scripts")
            .children(self.scripts.iter().map(Script::to_xml))
            .children(self.comments.iter().map(ScriptComment::to_xml))
    }
}

fn is_top_level(block: &Value) -> bool {
    match block {
        Value::Object(obj) => {
            json::boolean(obj, "topLevel").unwrap_or(false)
                && !json::boolean(obj, "shadow").unwrap_or(false)
        }
        // Compact variable/list reporters only exist at top level.
        Value::Array(_) => true,
        _ => false,
    }
}

fn keep<T>(result: Result<T>, what: &'static str) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(error = %e, "{what} skipped");
            None
        }
    }
}
