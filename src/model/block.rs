//! Blocks and their arguments.
//!
//! Scratch 2 encodes a block as `[selector, arg, arg, ...]` where each arg
//! is a literal, a nested block array, or a list of block arrays (a C-slot).
//! Scratch 3 stores blocks in a flat map keyed by id; arguments live under
//! `inputs` (shadow type, then a block id or compact primitive) and
//! `fields` (`[value, id?]`).

use rustc_hash::{FxHashMap, FxHashSet};
use serde_json::{Map, Value};

use super::ReadContext;
use super::comment::{BlockKey, ScriptComment};
use super::json;
use super::primitive::{Primitive, sb3_type};
use super::script::Script;
use crate::error::{ConvertError, Result};
use crate::opcodes::{self, ArgKind, BlockSpec};
use crate::xml::Element;

/// A block argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Literal(Primitive),
    Block(Box<Block>),
    Script(Script),
}

impl Input {
    pub fn to_xml(&self) -> Element {
        match self {
            Input::Literal(primitive) => primitive.to_xml(),
            Input::Block(block) => block.to_xml(),
            Input::Script(script) => script.to_xml(),
        }
    }

    fn variable(name: String) -> Self {
        Input::Block(Box::new(Block::variable(name)))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BlockKind {
    /// Any block with a selector and slots.
    Command { selector: String, inputs: Vec<Input> },
    /// Variable or list reporter.
    Variable { name: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub kind: BlockKind,
    /// Source identity, used only to attach comments.
    pub key: Option<BlockKey>,
    pub comment: Option<ScriptComment>,
}

impl Block {
    pub fn command(selector: impl Into<String>, inputs: Vec<Input>) -> Self {
        Self {
            kind: BlockKind::Command {
                selector: selector.into(),
                inputs,
            },
            key: None,
            comment: None,
        }
    }

    pub fn variable(name: impl Into<String>) -> Self {
        Self {
            kind: BlockKind::Variable { name: name.into() },
            key: None,
            comment: None,
        }
    }

    fn with_key(mut self, key: BlockKey) -> Self {
        self.key = Some(key);
        self
    }

    pub fn selector(&self) -> Option<&str> {
        match &self.kind {
            BlockKind::Command { selector, .. } => Some(selector),
            BlockKind::Variable { .. } => None,
        }
    }

    pub fn inputs(&self) -> &[Input] {
        match &self.kind {
            BlockKind::Command { inputs, .. } => inputs,
            BlockKind::Variable { .. } => &[],
        }
    }

    // ------------------------------------------------------------------
    // Scratch 2
    // ------------------------------------------------------------------

    pub fn read_sb2(value: &Value, scope: &mut Sb2Scope<'_>) -> Result<Self> {
        let items = value
            .as_array()
            .filter(|items| !items.is_empty())
            .ok_or_else(|| ConvertError::sb2(format!("expected a block array, got {value}")))?;
        let selector = items[0]
            .as_str()
            .ok_or_else(|| ConvertError::sb2(format!("block without selector: {value}")))?;
        let args = &items[1..];

        let kind = if selector == opcodes::SB2_READ_VARIABLE
            || selector == opcodes::SB2_LIST_CONTENTS
        {
            BlockKind::Variable {
                name: args.first().map(json::display).unwrap_or_default(),
            }
        } else {
            match opcodes::lookup_sb2(selector) {
                Some(spec) => BlockKind::Command {
                    selector: spec.snap.to_string(),
                    inputs: read_sb2_args(spec, args, scope)?,
                },
                None => {
                    scope.ctx.report_unsupported(selector);
                    let inputs = args
                        .iter()
                        .map(|arg| read_sb2_arg(arg, None, scope))
                        .collect::<Result<Vec<_>>>()?;
                    BlockKind::Command {
                        selector: selector.to_string(),
                        inputs,
                    }
                }
            }
        };

        // Numbered after its arguments: Scratch 2 visits nested blocks first.
        let key = BlockKey::Index(scope.next_index());
        Ok(Self {
            kind,
            key: Some(key),
            comment: None,
        })
    }

    // ------------------------------------------------------------------
    // Scratch 3
    // ------------------------------------------------------------------

    pub fn read_sb3(id: &str, scope: &mut Sb3Scope<'_>) -> Result<Self> {
        scope.enter(id)?;
        let obj = scope.block(id)?;

        // Reporters dropped loose on the workspace are stored compactly.
        if let Some(items) = obj.as_array() {
            return read_sb3_compact_reporter(items).map(|block| block.with_key(key_for(id)));
        }

        let obj = obj
            .as_object()
            .ok_or_else(|| ConvertError::sb3(format!("block {id} is not an object")))?;
        let opcode = json::string(obj, "opcode")
            .ok_or_else(|| ConvertError::sb3(format!("block {id} has no opcode")))?;
        let inputs = json::object(obj, "inputs");
        let fields = json::object(obj, "fields");

        let kind = if opcode == opcodes::SB3_VARIABLE || opcode == opcodes::SB3_LIST_CONTENTS {
            let field = if opcode == opcodes::SB3_VARIABLE {
                "VARIABLE"
            } else {
                "LIST"
            };
            BlockKind::Variable {
                name: fields
                    .and_then(|f| field_value(f, field))
                    .map(json::display)
                    .unwrap_or_default(),
            }
        } else {
            let field_text =
                |name: &str| fields.and_then(|f| field_value(f, name)).map(json::display);
            match opcodes::lookup_sb3_guarded(opcode, field_text) {
                Some(spec) => {
                    let mut args = Vec::with_capacity(spec.args.len());
                    for arg in spec.args {
                        args.push(match arg.kind {
                            ArgKind::Const(value) => Input::Literal(Primitive::option(value)),
                            kind => read_sb3_arg(arg.name, kind, inputs, fields, scope)?,
                        });
                    }
                    BlockKind::Command {
                        selector: spec.snap.to_string(),
                        inputs: args,
                    }
                }
                None => {
                    scope.ctx.report_unsupported(opcode);
                    let mut args = Vec::new();
                    for input in inputs.into_iter().flat_map(|inputs| inputs.values()) {
                        args.push(read_sb3_input(input, ArgKind::Slot, scope)?);
                    }
                    for field in fields.into_iter().flat_map(|fields| fields.values()) {
                        let value = field.get(0).unwrap_or(&Value::Null);
                        args.push(literal_input(value, ArgKind::Slot));
                    }
                    BlockKind::Command {
                        selector: opcode.to_string(),
                        inputs: args,
                    }
                }
            }
        };

        Ok(Self {
            kind,
            key: Some(key_for(id)),
            comment: None,
        })
    }

    /// Move matching comments from `comments` onto this block and every
    /// block nested in it.
    pub fn attach_comments(&mut self, comments: &mut FxHashMap<BlockKey, ScriptComment>) {
        if let Some(key) = &self.key {
            if let Some(comment) = comments.remove(key) {
                self.comment = Some(comment);
            }
        }
        if let BlockKind::Command { inputs, .. } = &mut self.kind {
            for input in inputs {
                match input {
                    Input::Block(block) => block.attach_comments(comments),
                    Input::Script(script) => script.attach_comments(comments),
                    Input::Literal(_) => {}
                }
            }
        }
    }

    pub fn to_xml(&self) -> Element {
        let element = match &self.kind {
            BlockKind::Command { selector, inputs } => Element::new("block")
                .attr("s", selector.as_str())
                .children(inputs.iter().map(Input::to_xml)),
            BlockKind::Variable { name } => Element::new("block").attr("var", name.as_str()),
        };
        match &self.comment {
            Some(comment) => element.child(comment.to_xml()),
            None => element,
        }
    }
}

fn key_for(id: &str) -> BlockKey {
    BlockKey::Id(id.to_string())
}

// ============================================================================
// SCOPES
// ============================================================================

/// Per-sprite state while decoding Scratch 2 scripts.
pub struct Sb2Scope<'a> {
    pub ctx: &'a ReadContext<'a>,
    next_index: usize,
}

impl<'a> Sb2Scope<'a> {
    pub fn new(ctx: &'a ReadContext<'a>) -> Self {
        Self { ctx, next_index: 0 }
    }

    fn next_index(&mut self) -> usize {
        let index = self.next_index;
        self.next_index += 1;
        index
    }

    /// Read one top-level script holding `blocks` blocks. A script that
    /// fails partway still advances the counter past all of them.
    pub fn read_script<T>(
        &mut self,
        blocks: usize,
        read: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        let start = self.next_index;
        let result = read(self);
        if result.is_err() {
            self.next_index = start + blocks;
        }
        result
    }
}

/// Per-target state while decoding Scratch 3 blocks.
pub struct Sb3Scope<'a> {
    pub ctx: &'a ReadContext<'a>,
    blocks: &'a Map<String, Value>,
    visited: FxHashSet<String>,
}

impl<'a> Sb3Scope<'a> {
    pub fn new(ctx: &'a ReadContext<'a>, blocks: &'a Map<String, Value>) -> Self {
        Self {
            ctx,
            blocks,
            visited: FxHashSet::default(),
        }
    }

    pub fn blocks(&self) -> &'a Map<String, Value> {
        self.blocks
    }

    fn block(&self, id: &str) -> Result<&'a Value> {
        self.blocks
            .get(id)
            .ok_or_else(|| ConvertError::sb3(format!("reference to missing block {id}")))
    }

    /// Record a visit; a block reached twice means the graph has a cycle
    /// or shared subtree.
    fn enter(&mut self, id: &str) -> Result<()> {
        if self.visited.insert(id.to_string()) {
            Ok(())
        } else {
            Err(ConvertError::sb3(format!("block {id} is reachable twice")))
        }
    }
}

// ============================================================================
// ARGUMENT DECODING
// ============================================================================

fn read_sb2_args(spec: &BlockSpec, args: &[Value], scope: &mut Sb2Scope<'_>) -> Result<Vec<Input>> {
    let mut source = args.iter();
    let mut inputs = Vec::with_capacity(spec.args.len());
    for arg in spec.args {
        inputs.push(match arg.kind {
            ArgKind::Const(value) => Input::Literal(Primitive::option(value)),
            kind => read_sb2_arg(source.next().unwrap_or(&Value::Null), Some(kind), scope)?,
        });
    }
    Ok(inputs)
}

enum Sb2Arg<'v> {
    Block(&'v Value),
    Body(&'v Value),
    Literal(&'v Value),
}

/// `kind` is `None` for the arguments of an unmapped block, where an array
/// is only a block (or body) when headed by a known selector. Anything else,
/// like the parameter names of a `procDef`, stays a literal.
fn classify_sb2_arg(value: &Value, kind: Option<ArgKind>) -> Sb2Arg<'_> {
    if kind == Some(ArgKind::Script) {
        return Sb2Arg::Body(value);
    }
    let Value::Array(items) = value else {
        return Sb2Arg::Literal(value);
    };
    match (items.first(), kind) {
        (Some(Value::String(_)), Some(_)) => Sb2Arg::Block(value),
        (Some(Value::String(selector)), None) if opcodes::is_sb2_block(selector) => {
            Sb2Arg::Block(value)
        }
        (Some(Value::Array(_)), Some(_)) => Sb2Arg::Body(value),
        (Some(Value::Array(inner)), None)
            if inner
                .first()
                .and_then(Value::as_str)
                .is_some_and(opcodes::is_sb2_block) =>
        {
            Sb2Arg::Body(value)
        }
        _ => Sb2Arg::Literal(value),
    }
}

fn read_sb2_arg(value: &Value, kind: Option<ArgKind>, scope: &mut Sb2Scope<'_>) -> Result<Input> {
    match classify_sb2_arg(value, kind) {
        Sb2Arg::Block(value) => {
            Block::read_sb2(value, scope).map(|block| Input::Block(Box::new(block)))
        }
        Sb2Arg::Body(value) => Script::read_sb2_body(value, scope).map(Input::Script),
        Sb2Arg::Literal(value) => Ok(match kind {
            None => Input::Literal(Primitive::from_json(value)),
            Some(_) if value.is_array() => Input::Literal(Primitive::empty()),
            Some(kind) => literal_input(value, kind),
        }),
    }
}

/// Number of blocks in a Scratch 2 body, counted the way
/// [`Block::read_sb2`] numbers them.
pub fn count_sb2_body(value: &Value) -> usize {
    value
        .as_array()
        .map_or(0, |items| items.iter().map(count_sb2_block).sum())
}

fn count_sb2_block(value: &Value) -> usize {
    let Some(items) = value.as_array() else {
        return 0;
    };
    let Some(selector) = items.first().and_then(Value::as_str) else {
        return 0;
    };
    let args = &items[1..];
    let nested: usize =
        if selector == opcodes::SB2_READ_VARIABLE || selector == opcodes::SB2_LIST_CONTENTS {
            0
        } else {
            match opcodes::lookup_sb2(selector) {
                Some(spec) => spec
                    .source_args()
                    .zip(args)
                    .map(|(arg, value)| count_sb2_arg(value, Some(arg.kind)))
                    .sum(),
                None => args.iter().map(|value| count_sb2_arg(value, None)).sum(),
            }
        };
    nested + 1
}

fn count_sb2_arg(value: &Value, kind: Option<ArgKind>) -> usize {
    match classify_sb2_arg(value, kind) {
        Sb2Arg::Block(value) => count_sb2_block(value),
        Sb2Arg::Body(value) => count_sb2_body(value),
        Sb2Arg::Literal(_) => 0,
    }
}

fn read_sb3_arg(
    name: &str,
    kind: ArgKind,
    inputs: Option<&Map<String, Value>>,
    fields: Option<&Map<String, Value>>,
    scope: &mut Sb3Scope<'_>,
) -> Result<Input> {
    if let Some(input) = inputs.and_then(|inputs| inputs.get(name)) {
        return read_sb3_input(input, kind, scope);
    }
    if let Some(value) = fields.and_then(|fields| field_value(fields, name)) {
        return Ok(literal_input(value, kind));
    }
    Ok(match kind {
        ArgKind::Script => Input::Script(Script::default()),
        _ => Input::Literal(Primitive::empty()),
    })
}

/// Decode `[shadowType, value, shadowValue?]`.
fn read_sb3_input(input: &Value, kind: ArgKind, scope: &mut Sb3Scope<'_>) -> Result<Input> {
    let items = input
        .as_array()
        .ok_or_else(|| ConvertError::sb3(format!("input must be an array, got {input}")))?;
    let value = match items.get(1) {
        Some(Value::Null) | None => items.get(2).unwrap_or(&Value::Null),
        Some(value) => value,
    };

    if kind == ArgKind::Script {
        return match value {
            Value::String(id) => Script::read_sb3_chain(id, scope).map(Input::Script),
            _ => Ok(Input::Script(Script::default())),
        };
    }

    match value {
        Value::String(id) => {
            let block = scope.block(id)?;
            if block.get("shadow").and_then(Value::as_bool) == Some(true) {
                let literal = block
                    .get("fields")
                    .and_then(Value::as_object)
                    .and_then(|fields| fields.values().next())
                    .and_then(|field| field.get(0))
                    .unwrap_or(&Value::Null);
                Ok(literal_input(literal, kind))
            } else {
                Block::read_sb3(id, scope).map(|b| Input::Block(Box::new(b)))
            }
        }
        Value::Array(compact) => {
            let code = compact.first().and_then(Value::as_u64);
            if matches!(code, Some(sb3_type::VARIABLE) | Some(sb3_type::LIST)) {
                return read_sb3_compact_reporter(compact).map(|b| Input::Block(Box::new(b)));
            }
            let primitive = Primitive::read_sb3(value)?;
            Ok(match kind {
                ArgKind::Slot => Input::Literal(primitive),
                _ => literal_input(compact.get(1).unwrap_or(&Value::Null), kind),
            })
        }
        Value::Null => Ok(Input::Literal(Primitive::empty())),
        other => Err(ConvertError::sb3(format!("unexpected input value {other}"))),
    }
}

/// `[12, name, id, x?, y?]` or `[13, name, id, x?, y?]`.
fn read_sb3_compact_reporter(items: &[Value]) -> Result<Block> {
    match items.first().and_then(Value::as_u64) {
        Some(sb3_type::VARIABLE) | Some(sb3_type::LIST) => Ok(Block::variable(
            items.get(1).map(json::display).unwrap_or_default(),
        )),
        _ => Err(ConvertError::sb3(
            "compact top-level block is not a variable or list",
        )),
    }
}

fn field_value<'v>(fields: &'v Map<String, Value>, name: &str) -> Option<&'v Value> {
    fields.get(name).and_then(|field| match field {
        Value::Array(items) => items.first(),
        other => Some(other),
    })
}

/// Interpret a scalar according to the slot it fills.
fn literal_input(value: &Value, kind: ArgKind) -> Input {
    match kind {
        ArgKind::Slot | ArgKind::Script => Input::Literal(Primitive::from_json(value)),
        ArgKind::Menu => {
            let text = json::display(value);
            Input::Literal(match opcodes::menu_option(&text) {
                Some(option) => Primitive::option(option),
                None => Primitive::text(text),
            })
        }
        ArgKind::Option => Input::Literal(Primitive::option(opcodes::option_value(
            &json::display(value),
        ))),
        ArgKind::VarName => Input::Literal(Primitive::text(json::display(value))),
        ArgKind::ListRef => Input::variable(json::display(value)),
        ArgKind::Const(option) => Input::Literal(Primitive::option(option)),
    }
}
