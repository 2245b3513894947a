//! Ingestion: turn an opaque input blob into a project description plus
//! the asset store its media lives in.
//!
//! The format is not declared by the caller, so each known container is
//! tried in a fixed order and the first one that parses wins:
//!
//! 1. plain JSON (an online project; media on the remote asset server)
//! 2. zip archive with a `project.json` entry (`.sb2` / `.sb3`)
//! 3. Scratch 1.x binary, through the [`LegacyConverter`]
//!
//! When every branch fails the reasons are collected into
//! [`ConvertError::InvalidProject`].

use serde_json::Value;

use crate::assets::{
    AssetStore, LegacyBinaryArchive, LegacyConverter, RemoteAssetServer, ZipIndex,
};
use crate::config::ConvertConfig;
use crate::error::{ConvertError, Result};

/// Which cascade branch accepted the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    RemoteJson,
    ZipArchive,
    LegacyBinary,
}

impl SourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SourceKind::RemoteJson => "json",
            SourceKind::ZipArchive => "zip",
            SourceKind::LegacyBinary => "legacy",
        }
    }
}

/// A project description and where to find its assets.
#[derive(Debug)]
pub struct Ingested {
    pub root: Value,
    pub store: AssetStore,
    pub source: SourceKind,
}

type Detector = fn(&Ingestor<'_>, &[u8]) -> Result<Ingested>;

/// Branches in the order they are attempted.
const CASCADE: &[(SourceKind, Detector)] = &[
    (SourceKind::RemoteJson, try_json),
    (SourceKind::ZipArchive, try_zip),
    (SourceKind::LegacyBinary, try_legacy),
];

pub struct Ingestor<'a> {
    config: &'a ConvertConfig,
    converter: &'a dyn LegacyConverter,
}

impl<'a> Ingestor<'a> {
    pub fn new(config: &'a ConvertConfig, converter: &'a dyn LegacyConverter) -> Self {
        Self { config, converter }
    }

    /// Resolve `blob` into a root value and asset store.
    ///
    /// With `has_description == false` the blob is a bare project fragment
    /// and no cascade runs.
    pub fn ingest(&self, blob: &[u8], has_description: bool) -> Result<Ingested> {
        if !has_description {
            let root = parse_object(blob).map_err(|e| ConvertError::InvalidProject {
                reasons: vec![format!("fragment: {e}")],
            })?;
            return Ok(self.fragment(root));
        }

        let mut reasons = Vec::with_capacity(CASCADE.len());
        for (kind, detect) in CASCADE {
            match detect(self, blob) {
                Ok(ingested) => {
                    tracing::debug!(source = kind.as_str(), "input accepted");
                    return Ok(ingested);
                }
                Err(e) => {
                    tracing::debug!(source = kind.as_str(), error = %e, "input rejected");
                    reasons.push(format!("{}: {e}", kind.as_str()));
                }
            }
        }
        Err(ConvertError::InvalidProject { reasons })
    }

    /// Wrap an already-parsed fragment. Its assets are fetched remotely.
    pub fn fragment(&self, root: Value) -> Ingested {
        Ingested {
            root,
            store: AssetStore::RemoteAssetServer(RemoteAssetServer::new(self.config)),
            source: SourceKind::RemoteJson,
        }
    }
}

fn try_json(ingestor: &Ingestor<'_>, blob: &[u8]) -> Result<Ingested> {
    let root = parse_object(blob)?;
    Ok(ingestor.fragment(root))
}

fn try_zip(ingestor: &Ingestor<'_>, blob: &[u8]) -> Result<Ingested> {
    let index = ZipIndex::from_bytes(blob)?;
    let root = parse_object(index.get(&ingestor.config.description_entry)?)?;
    Ok(Ingested {
        root,
        store: AssetStore::ZipArchive(index),
        source: SourceKind::ZipArchive,
    })
}

fn try_legacy(ingestor: &Ingestor<'_>, blob: &[u8]) -> Result<Ingested> {
    let mut project = ingestor.converter.convert(blob)?;
    let root = project.json.take();
    if !root.is_object() {
        return Err(ConvertError::legacy("converter output is not a JSON object"));
    }
    Ok(Ingested {
        root,
        store: AssetStore::LegacyBinaryArchive(LegacyBinaryArchive::new(project)?),
        source: SourceKind::LegacyBinary,
    })
}

fn parse_object(bytes: &[u8]) -> Result<Value> {
    let text = std::str::from_utf8(bytes).map_err(|e| ConvertError::json(e.to_string()))?;
    let value: Value = serde_json::from_str(text).map_err(|e| ConvertError::json(e.to_string()))?;
    if value.is_object() {
        Ok(value)
    } else {
        Err(ConvertError::json("project description is not a JSON object"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{AssetStoreKind, LegacyProject, NoLegacyConverter};
    use crate::config::ConvertConfig;
    use serde_json::json;
    use std::io::Write;

    fn zip_of(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut buffer = std::io::Cursor::new(Vec::new());
        {
            let mut writer = ::zip::ZipWriter::new(&mut buffer);
            for (name, bytes) in entries {
                writer
                    .start_file(*name, ::zip::write::SimpleFileOptions::default())
                    .unwrap();
                writer.write_all(bytes).unwrap();
            }
            writer.finish().unwrap();
        }
        buffer.into_inner()
    }

    struct FakeLegacy;

    impl LegacyConverter for FakeLegacy {
        fn convert(&self, input: &[u8]) -> Result<LegacyProject> {
            if !input.starts_with(b"ScratchV0") {
                return Err(ConvertError::legacy("not legacy"));
            }
            Ok(LegacyProject {
                json: json!({"objName": "Stage", "children": []}),
                zip: zip_of(&[("0.png", b"PNG")]),
            })
        }
    }

    #[test]
    fn test_json_branch() {
        let config = ConvertConfig::default();
        let ingestor = Ingestor::new(&config, &NoLegacyConverter);
        let ingested = ingestor.ingest(br#"{"targets": []}"#, true).unwrap();
        assert_eq!(ingested.source, SourceKind::RemoteJson);
        assert_eq!(ingested.store.kind(), AssetStoreKind::RemoteAssetServer);
    }

    #[test]
    fn test_zip_branch() {
        let config = ConvertConfig::default();
        let ingestor = Ingestor::new(&config, &NoLegacyConverter);
        let blob = zip_of(&[("project.json", br#"{"targets": []}"#), ("a.svg", b"<svg/>")]);
        let ingested = ingestor.ingest(&blob, true).unwrap();
        assert_eq!(ingested.source, SourceKind::ZipArchive);
        assert_eq!(ingested.root, json!({"targets": []}));
    }

    #[test]
    fn test_legacy_branch() {
        let config = ConvertConfig::default();
        let ingestor = Ingestor::new(&config, &FakeLegacy);
        let ingested = ingestor.ingest(b"ScratchV02\x00\x01", true).unwrap();
        assert_eq!(ingested.source, SourceKind::LegacyBinary);
        assert_eq!(ingested.store.kind(), AssetStoreKind::LegacyBinaryArchive);
    }

    #[test]
    fn test_exhausted_cascade_lists_every_branch() {
        let config = ConvertConfig::default();
        let ingestor = Ingestor::new(&config, &NoLegacyConverter);
        let err = ingestor.ingest(b"garbage", true).unwrap_err();
        match err {
            ConvertError::InvalidProject { reasons } => {
                assert_eq!(reasons.len(), 3);
                assert!(reasons[0].starts_with("json: "));
                assert!(reasons[1].starts_with("zip: "));
                assert!(reasons[2].starts_with("legacy: "));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_zip_without_description_falls_through() {
        let config = ConvertConfig::default();
        let ingestor = Ingestor::new(&config, &NoLegacyConverter);
        let blob = zip_of(&[("a.svg", b"<svg/>")]);
        assert!(matches!(
            ingestor.ingest(&blob, true),
            Err(ConvertError::InvalidProject { .. })
        ));
    }

    #[test]
    fn test_fragment_skips_cascade() {
        let config = ConvertConfig::default();
        let ingestor = Ingestor::new(&config, &FakeLegacy);
        let ingested = ingestor.ingest(br#"{"objName": "Sprite1"}"#, false).unwrap();
        assert_eq!(ingested.store.kind(), AssetStoreKind::RemoteAssetServer);

        let blob = zip_of(&[("project.json", b"{}")]);
        assert!(matches!(
            ingestor.ingest(&blob, false),
            Err(ConvertError::InvalidProject { .. })
        ));
    }
}
