use futures::future::{try_join, try_join_all};
use serde_json::Value;

use super::json;
use super::sprite::Sprite;
use super::stage::Stage;
use super::variable::Variable;
use super::{ReadContext, ReadOptions};
use crate::assets::AssetStore;
use crate::error::{ConvertError, Result};
use crate::log::LogSink;
use crate::xml::Element;

/// Written to `<project app>` unless the caller overrides it.
pub const DEFAULT_APP_NAME: &str = "Snapinator";

/// Source project format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// Scratch 2.0: a root sprite object with `children`.
    Sb2,
    /// Scratch 3.0: a `targets` array.
    Sb3,
}

impl Dialect {
    pub fn detect(root: &Value) -> Result<Self> {
        let Some(obj) = root.as_object() else {
            return Err(invalid("project root is not a JSON object"));
        };
        if obj.get("targets").is_some_and(Value::is_array) {
            Ok(Dialect::Sb3)
        } else if obj.contains_key("objName") || obj.contains_key("children") {
            Ok(Dialect::Sb2)
        } else {
            Err(invalid("project root has neither targets nor objName"))
        }
    }
}

fn invalid(reason: &str) -> ConvertError {
    ConvertError::InvalidProject {
        reasons: vec![reason.to_string()],
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    pub name: String,
    pub app_name: String,
    pub dialect: Dialect,
    pub stage: Stage,
    /// Back to front.
    pub sprites: Vec<Sprite>,
}

impl Project {
    /// Decode `root` and fetch every costume and sound from `store`.
    ///
    /// A bare fragment (`has_description == false`) carries no media of
    /// its own, so nothing is fetched for it.
    pub async fn read(
        name: &str,
        root: &Value,
        store: &AssetStore,
        log: &dyn LogSink,
        options: ReadOptions,
    ) -> Result<Self> {
        let mut project = {
            let ctx = ReadContext::from_options(&options, log);
            Self::decode(name, root, &ctx)?
        };
        tracing::info!(
            project = %project.name,
            dialect = ?project.dialect,
            sprites = project.sprites.len(),
            store = ?store.kind(),
            "project decoded"
        );
        if options.has_description {
            project.load_assets(store).await?;
        }
        Ok(project)
    }

    /// Synchronous part of [`Project::read`]: no assets are fetched.
    pub fn decode(name: &str, root: &Value, ctx: &ReadContext<'_>) -> Result<Self> {
        match Dialect::detect(root)? {
            Dialect::Sb2 => Self::read_sb2(name, root, ctx),
            Dialect::Sb3 => Self::read_sb3(name, root, ctx),
        }
    }

    pub fn read_sb2(name: &str, root: &Value, ctx: &ReadContext<'_>) -> Result<Self> {
        let stage = Stage::read_sb2(root, ctx)?;
        let sprites = root
            .get("children")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            // Watchers share the children list; only sprites have objName.
            .filter(|child| child.get("objName").is_some())
            .filter_map(|child| keep(Sprite::read_sb2(child, ctx)))
            .collect();
        Ok(Self::new(name, Dialect::Sb2, stage, sprites))
    }

    pub fn read_sb3(name: &str, root: &Value, ctx: &ReadContext<'_>) -> Result<Self> {
        let targets = root
            .get("targets")
            .and_then(Value::as_array)
            .ok_or_else(|| invalid("targets is not an array"))?;
        let is_stage = |target: &Value| target.get("isStage").and_then(Value::as_bool) == Some(true);

        let stage = targets
            .iter()
            .find(|target| is_stage(target))
            .ok_or_else(|| invalid("no stage target"))?;
        let stage = Stage::read_sb3(stage, ctx)?;

        let mut layered: Vec<(f64, &Value)> = targets
            .iter()
            .filter(|target| !is_stage(target))
            .enumerate()
            .map(|(i, target)| {
                let layer = target
                    .as_object()
                    .and_then(|obj| json::number(obj, "layerOrder"))
                    .unwrap_or(i as f64);
                (layer, target)
            })
            .collect();
        layered.sort_by(|a, b| a.0.total_cmp(&b.0));
        let sprites = layered
            .into_iter()
            .filter_map(|(_, target)| keep(Sprite::read_sb3(target, ctx)))
            .collect();

        Ok(Self::new(name, Dialect::Sb3, stage, sprites))
    }

    fn new(name: &str, dialect: Dialect, stage: Stage, sprites: Vec<Sprite>) -> Self {
        Self {
            name: name.to_string(),
            app_name: DEFAULT_APP_NAME.to_string(),
            dialect,
            stage,
            sprites,
        }
    }

    /// Fetch all media. Sprites load concurrently with each other and
    /// with the stage; the first failure aborts the rest.
    pub async fn load_assets(&mut self, store: &AssetStore) -> Result<()> {
        try_join(
            self.stage.load_assets(store),
            try_join_all(self.sprites.iter_mut().map(|sprite| sprite.load_assets(store))),
        )
        .await?;
        Ok(())
    }

    /// Stage variables, visible to every sprite.
    pub fn globals(&self) -> &[Variable] {
        &self.stage.variables
    }

    pub fn to_xml(&self) -> Element {
        Element::new("project")
            .attr("name", self.name.as_str())
            .attr("app", self.app_name.as_str())
            .attr("version", "1")
            .child(Element::new("notes"))
            .child(self.stage.to_xml(&self.sprites))
            .child(Element::new("hidden"))
            .child(Element::new("headers"))
            .child(Element::new("code"))
            .child(Element::new("blocks"))
            .child(Element::new("variables").children(self.globals().iter().map(Variable::to_xml)))
    }
}

fn keep(result: Result<Sprite>) -> Option<Sprite> {
    result
        .inspect_err(|e| tracing::warn!(error = %e, "sprite skipped"))
        .ok()
}
