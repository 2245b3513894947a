//! # snapinator
//!
//! Converts Scratch projects (1.x binaries, 2.0 and 3.0 files or online
//! project JSON) into Snap! project XML.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! app       → Snapinator: read, convert, encode, slice aggregates
//!   ↓
//! ingest    → Input cascade: JSON → zip → Scratch 1.x converter
//!   ↓
//! model     → Project tree, decoded from either dialect
//!   ↓
//! opcodes   → Scratch 2 / Scratch 3 / Snap! block table
//!   ↓
//! assets    → AssetStore: remote server, zip archive, legacy archive
//!   ↓
//! xml       → Element tree and serializer
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use snapinator::{ConvertConfig, ReadOptions, Snapinator};
//!
//! # async fn run() -> snapinator::Result<()> {
//! let bytes = std::fs::read("game.sb3")?;
//! let app = Snapinator::new(ConvertConfig::default());
//! let xml = app.convert("game", &bytes, ReadOptions::default()).await?;
//! # let _ = xml;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// MODULES (dependency order: xml → assets → opcodes → model → ingest → app)
// ============================================================================

/// Element tree and serialization
pub mod xml;

/// Error type shared by every module
pub mod error;

/// Progress log sinks
pub mod log;

/// Converter settings, loadable from YAML
pub mod config;

/// Asset stores
pub mod assets;

/// Block opcode table
pub mod opcodes;

/// Project model and both dialect decoders
pub mod model;

/// Input format detection
pub mod ingest;

/// Conversion entry points
pub mod app;

// Re-export commonly needed items
pub use app::{SliceMode, SliceOutput, Snapinator};
pub use assets::{AssetStore, AssetStoreKind, LegacyConverter, LegacyProject, NoLegacyConverter};
pub use config::{ConvertConfig, WorkspaceScale};
pub use error::{ConvertError, Result};
pub use ingest::{Ingested, Ingestor, SourceKind};
pub use log::{LogSink, MemorySink, TracingSink};
pub use model::{Project, ReadOptions};
pub use xml::{Element, serialize};
