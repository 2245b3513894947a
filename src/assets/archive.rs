//! In-memory index over a zip container.

use std::io::{Cursor, Read};

use indexmap::IndexMap;
use zip::ZipArchive;

use crate::error::{ConvertError, Result};

/// Every file of a zip container, decompressed once at load time.
#[derive(Debug, Clone, Default)]
pub struct ZipIndex {
    entries: IndexMap<String, Vec<u8>>,
}

impl ZipIndex {
    /// Decompress a whole zip container.
    pub fn from_bytes(input: &[u8]) -> Result<Self> {
        let mut archive = ZipArchive::new(Cursor::new(input))
            .map_err(|e| ConvertError::archive(format!("Failed to open archive: {e}")))?;

        let mut entries = IndexMap::new();
        for i in 0..archive.len() {
            let mut file = archive
                .by_index(i)
                .map_err(|e| ConvertError::archive(format!("Failed to read entry {i}: {e}")))?;
            if file.is_dir() {
                continue;
            }
            let name = file.name().to_string();
            let mut content = Vec::new();
            file.read_to_end(&mut content)
                .map_err(|e| ConvertError::archive(format!("Failed to read {name}: {e}")))?;
            entries.insert(name, content);
        }

        tracing::debug!(entries = entries.len(), "indexed zip archive");
        Ok(Self { entries })
    }

    /// Look up an entry by path.
    ///
    /// Falls back to an entry whose last path segment is `name`, as long as
    /// exactly one such entry exists (projects zipped inside a folder).
    pub fn get(&self, name: &str) -> Result<&[u8]> {
        if let Some(content) = self.entries.get(name) {
            return Ok(content);
        }

        let mut matches = self
            .entries
            .iter()
            .filter(|(path, _)| path.rsplit('/').next() == Some(name));
        match (matches.next(), matches.next()) {
            (Some((_, content)), None) => Ok(content),
            _ => Err(ConvertError::AssetNotFound(name.to_string())),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_ok()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry paths in archive order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}
