//! Dialect-agnostic project model.
//!
//! Every entity decodes from both Scratch dialects (`read_sb2` for the
//! positional 2.0 format, `read_sb3` for the keyed 3.0 format) into one
//! canonical shape, and renders itself as a Snap! XML [`Element`] with
//! `to_xml`.
//!
//! ```text
//! Project
//! ├── Stage ── costumes, sounds, ScriptArea, globals
//! └── Sprite* ── costumes, sounds, variables, ScriptArea
//!                                              └── Script* ── Block* ── Input*
//! ```
//!
//! Decoding is synchronous. Costume and sound bytes are fetched afterwards
//! from the [`AssetStore`](crate::assets::AssetStore).
//!
//! [`Element`]: crate::xml::Element

mod asset;
mod block;
mod comment;
mod costume;
pub(crate) mod json;
mod primitive;
mod project;
mod script;
mod sound;
mod sprite;
mod stage;
mod variable;

pub use block::{Block, BlockKind, Input, Sb2Scope, Sb3Scope};
pub use comment::{BlockKey, DEFAULT_WIDTH, SB2_NO_BLOCK, ScriptComment, sb2_layout};
pub use costume::Costume;
pub use primitive::{Primitive, PrimitiveValue, sb3_type};
pub use project::{Dialect, Project};
pub use script::{Script, ScriptArea};
pub use sound::Sound;
pub use sprite::{RotationStyle, Sprite};
pub use stage::Stage;
pub use variable::{Variable, VariableValue};

use std::sync::Mutex;

use rustc_hash::FxHashSet;

use crate::config::WorkspaceScale;
use crate::log::LogSink;

/// Switches for one project read.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReadOptions {
    /// The blob is a full project description (run the ingestion cascade).
    /// When false the blob is a bare project fragment.
    pub has_description: bool,
    /// Decode scripts and comments. When false they are skipped entirely.
    pub has_scripts: bool,
    pub workspace_scale: WorkspaceScale,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            has_description: true,
            has_scripts: true,
            workspace_scale: WorkspaceScale::default(),
        }
    }
}

/// Shared state while decoding one project.
pub struct ReadContext<'a> {
    pub scale: WorkspaceScale,
    pub log: &'a dyn LogSink,
    pub has_scripts: bool,
    reported: Mutex<FxHashSet<String>>,
}

impl<'a> ReadContext<'a> {
    pub fn new(scale: WorkspaceScale, log: &'a dyn LogSink) -> Self {
        Self {
            scale,
            log,
            has_scripts: true,
            reported: Mutex::new(FxHashSet::default()),
        }
    }

    pub fn from_options(options: &ReadOptions, log: &'a dyn LogSink) -> Self {
        Self {
            has_scripts: options.has_scripts,
            ..Self::new(options.workspace_scale, log)
        }
    }

    /// Tell the user about an unmapped opcode, once per opcode.
    pub fn report_unsupported(&self, opcode: &str) {
        let first = match self.reported.lock() {
            Ok(mut reported) => reported.insert(opcode.to_string()),
            Err(poisoned) => poisoned.into_inner().insert(opcode.to_string()),
        };
        tracing::warn!(opcode, "unmapped block opcode");
        if first {
            self.log.log(&format!("Unsupported block: {opcode}"));
        }
    }
}
