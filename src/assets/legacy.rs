//! Scratch 1.x binary projects.
//!
//! Decoding the Scratch 1.x object format is done by an external
//! converter that produces the Scratch 2 JSON description plus a zip of
//! the extracted media. This module defines that seam and the asset
//! store built over the converter's zip.

use serde_json::Value;

use super::archive::ZipIndex;
use crate::error::{ConvertError, Result};

/// Magic prefix of Scratch 1.x project files (`ScratchV01`, `ScratchV02`).
pub const SB1_MAGIC: &[u8] = b"ScratchV0";

/// Output of a legacy conversion.
#[derive(Debug, Clone)]
pub struct LegacyProject {
    /// Scratch 2 shaped project description.
    pub json: Value,
    /// Zip container holding the extracted media.
    pub zip: Vec<u8>,
}

/// Converts a Scratch 1.x binary into JSON plus a media zip.
pub trait LegacyConverter: Send + Sync {
    fn convert(&self, input: &[u8]) -> Result<LegacyProject>;
}

/// Used when no converter is available: recognises the binary format but
/// cannot decode it.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLegacyConverter;

impl LegacyConverter for NoLegacyConverter {
    fn convert(&self, input: &[u8]) -> Result<LegacyProject> {
        if input.starts_with(SB1_MAGIC) {
            Err(ConvertError::Unsupported(
                "Scratch 1.x projects need a legacy converter".to_string(),
            ))
        } else {
            Err(ConvertError::legacy("missing ScratchV0 header"))
        }
    }
}

/// Asset store over the zip produced by a [`LegacyConverter`].
#[derive(Debug, Clone)]
pub struct LegacyBinaryArchive {
    index: ZipIndex,
}

impl LegacyBinaryArchive {
    pub fn new(project: LegacyProject) -> Result<Self> {
        Ok(Self {
            index: ZipIndex::from_bytes(&project.zip)?,
        })
    }

    pub fn get(&self, name: &str) -> Result<&[u8]> {
        self.index.get(name)
    }
}
