//! The converter front door: blob in, Snap! XML out.

use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::assets::{LegacyConverter, NoLegacyConverter};
use crate::config::ConvertConfig;
use crate::error::{ConvertError, Result};
use crate::ingest::Ingestor;
use crate::log::{LogSink, TracingSink};
use crate::model::{Project, ReadOptions};
use crate::xml::serialize;

/// Actor key holding the whole project in a slice aggregate.
pub const FULL_ACTOR: &str = "full";
/// Attribute of the full actor holding all of its scripts.
pub const ALL_SLICE: &str = "all";

/// How the `full` actor of a slice aggregate is converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SliceMode {
    /// Description and scripts.
    #[default]
    Original,
    /// Description only; scripts are dropped.
    Asset,
    /// Scripts only, taken from the actor's `all` slice.
    Scripts,
}

/// Encoded XML for one actor of a slice aggregate.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SliceOutput {
    Project(String),
    Attributes(IndexMap<String, String>),
}

pub struct Snapinator {
    config: ConvertConfig,
    converter: Arc<dyn LegacyConverter>,
    log: Arc<dyn LogSink>,
}

impl Snapinator {
    /// A converter without Scratch 1.x support that logs through `tracing`.
    pub fn new(config: ConvertConfig) -> Self {
        Self {
            config,
            converter: Arc::new(NoLegacyConverter),
            log: Arc::new(TracingSink),
        }
    }

    pub fn with_converter(mut self, converter: Arc<dyn LegacyConverter>) -> Self {
        self.converter = converter;
        self
    }

    pub fn with_log(mut self, log: Arc<dyn LogSink>) -> Self {
        self.log = log;
        self
    }

    /// Ingest `blob` and assemble the project tree.
    ///
    /// The workspace scale always comes from the converter's config.
    pub async fn read_project(&self, name: &str, blob: &[u8], options: ReadOptions) -> Result<Project> {
        self.log.log(&format!("Reading project \"{name}\""));
        let result = self.read_inner(name, blob, options).await;
        if let Err(e) = &result {
            self.log.log(&e.to_string());
        }
        result
    }

    async fn read_inner(&self, name: &str, blob: &[u8], options: ReadOptions) -> Result<Project> {
        let options = ReadOptions {
            workspace_scale: self.config.workspace_scale,
            ..options
        };
        let ingested =
            Ingestor::new(&self.config, self.converter.as_ref()).ingest(blob, options.has_description)?;
        tracing::info!(project = name, source = ingested.source.as_str(), "input ingested");

        let mut project =
            Project::read(name, &ingested.root, &ingested.store, self.log.as_ref(), options).await?;
        project.app_name = self.config.app_name.clone();
        Ok(project)
    }

    /// Read and serialize in one step.
    pub async fn convert(&self, name: &str, blob: &[u8], options: ReadOptions) -> Result<String> {
        let project = self.read_project(name, blob, options).await?;
        self.to_xml_string(&project)
    }

    pub fn to_xml_string(&self, project: &Project) -> Result<String> {
        self.log.log("Writing Snap! XML");
        serialize(&project.to_xml())
    }

    /// The serialized project, URI-component encoded.
    pub fn to_url(&self, project: &Project) -> Result<String> {
        let xml = serialize(&project.to_xml())?;
        Ok(urlencoding::encode(&xml).into_owned())
    }

    /// Link that opens the project in the Snap! editor.
    pub fn snap_open_url(&self, project: &Project) -> Result<String> {
        Ok(format!("{}#open:{}", self.config.snap_url, self.to_url(project)?))
    }

    /// Convert every slice of an aggregate.
    ///
    /// `aggregate` maps actor name to `{attribute: program}`. The `full`
    /// actor is converted from `full_project` according to `mode`; every
    /// other slice is a script-only fragment. A slice that fails to convert
    /// is logged and left out.
    pub async fn convert_slices(
        &self,
        project_id: &str,
        mode: SliceMode,
        full_project: &[u8],
        aggregate: &Value,
    ) -> Result<IndexMap<String, SliceOutput>> {
        let actors = aggregate
            .as_object()
            .ok_or_else(|| ConvertError::json("slice aggregate is not a JSON object"))?;

        let mut output = IndexMap::with_capacity(actors.len());
        for (actor, slices) in actors {
            if actor == FULL_ACTOR {
                let converted = match mode {
                    SliceMode::Original => self.encoded(project_id, full_project, true, true).await,
                    SliceMode::Asset => self.encoded(project_id, full_project, true, false).await,
                    SliceMode::Scripts => match slices.get(ALL_SLICE) {
                        Some(program) => self.encoded_fragment(project_id, program).await,
                        None => None,
                    },
                };
                if let Some(xml) = converted {
                    output.insert(actor.clone(), SliceOutput::Project(xml));
                }
                continue;
            }

            let mut attributes = IndexMap::new();
            for (attribute, program) in slices.as_object().into_iter().flatten() {
                if let Some(xml) = self.encoded_fragment(project_id, program).await {
                    attributes.insert(attribute.clone(), xml);
                }
            }
            output.insert(actor.clone(), SliceOutput::Attributes(attributes));
        }
        Ok(output)
    }

    async fn encoded(
        &self,
        name: &str,
        blob: &[u8],
        has_description: bool,
        has_scripts: bool,
    ) -> Option<String> {
        let options = ReadOptions {
            has_description,
            has_scripts,
            ..ReadOptions::default()
        };
        let project = self.read_project(name, blob, options).await.ok()?;
        self.to_url(&project)
            .inspect_err(|e| self.log.log(&e.to_string()))
            .ok()
    }

    /// Slices arrive either as JSON text or as an inline JSON value.
    async fn encoded_fragment(&self, name: &str, program: &Value) -> Option<String> {
        let blob = match program {
            Value::String(text) => text.clone().into_bytes(),
            other => other.to_string().into_bytes(),
        };
        self.encoded(name, &blob, false, true).await
    }
}

impl Default for Snapinator {
    fn default() -> Self {
        Self::new(ConvertConfig::default())
    }
}
