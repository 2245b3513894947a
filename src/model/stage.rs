use serde_json::Value;

use super::ReadContext;
use super::costume::Costume;
use super::json;
use super::script::ScriptArea;
use super::sound::Sound;
use super::sprite::{Sprite, costume_number, current_costume, load_media, media_list, read_each};
use super::variable::Variable;
use crate::assets::AssetStore;
use crate::error::{ConvertError, Result};
use crate::xml::Element;

pub const STAGE_WIDTH: f64 = 480.0;
pub const STAGE_HEIGHT: f64 = 360.0;

/// The backdrop object. Its variables are the project's globals.
#[derive(Debug, Clone, PartialEq)]
pub struct Stage {
    pub name: String,
    pub tempo: f64,
    pub volume: f64,
    pub current_costume: Option<usize>,
    pub costumes: Vec<Costume>,
    pub sounds: Vec<Sound>,
    pub variables: Vec<Variable>,
    pub scripts: ScriptArea,
}

impl Stage {
    /// The Scratch 2 root object.
    pub fn read_sb2(value: &Value, ctx: &ReadContext<'_>) -> Result<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| ConvertError::sb2(format!("stage must be an object, got {value}")))?;
        let costumes = read_each(obj, "costumes", Costume::read_sb2)?;
        Ok(Self {
            name: json::string(obj, "objName").unwrap_or("Stage").to_string(),
            tempo: json::number_or(obj, "tempoBPM", 60.0),
            volume: json::number_or(obj, "volume", 100.0),
            current_costume: current_costume(json::number(obj, "currentCostumeIndex"), &costumes),
            costumes,
            sounds: read_each(obj, "sounds", Sound::read_sb2)?,
            variables: Variable::read_all_sb2(obj),
            scripts: ScriptArea::read_sb2(obj, ctx),
        })
    }

    /// The `targets` entry with `isStage: true`.
    pub fn read_sb3(value: &Value, ctx: &ReadContext<'_>) -> Result<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| ConvertError::sb3(format!("stage must be an object, got {value}")))?;
        let costumes = read_each(obj, "costumes", Costume::read_sb3)?;
        Ok(Self {
            name: json::string(obj, "name").unwrap_or("Stage").to_string(),
            tempo: json::number_or(obj, "tempo", 60.0),
            volume: json::number_or(obj, "volume", 100.0),
            current_costume: current_costume(json::number(obj, "currentCostume"), &costumes),
            costumes,
            sounds: read_each(obj, "sounds", Sound::read_sb3)?,
            variables: Variable::read_all_sb3(obj),
            scripts: ScriptArea::read_sb3(obj, ctx),
        })
    }

    pub async fn load_assets(&mut self, store: &AssetStore) -> Result<()> {
        load_media(&mut self.costumes, &mut self.sounds, store).await
    }

    /// Sprites render inside the stage element.
    pub fn to_xml(&self, sprites: &[Sprite]) -> Element {
        Element::new("stage")
            .attr("name", self.name.as_str())
            .attr("width", STAGE_WIDTH)
            .attr("height", STAGE_HEIGHT)
            .attr("costume", costume_number(self.current_costume))
            .attr("tempo", self.tempo)
            .attr("threadsafe", false)
            .attr("volume", self.volume)
            .attr("lines", "round")
            .attr("ternary", false)
            .attr("codify", false)
            .attr("inheritance", false)
            .attr("sublistIDs", false)
            .attr("scheduled", false)
            .child(Element::new("pentrails"))
            .child(media_list("costumes", self.costumes.iter().map(Costume::to_xml)))
            .child(media_list("sounds", self.sounds.iter().map(Sound::to_xml)))
            .child(Element::new("variables"))
            .child(Element::new("blocks"))
            .child(self.scripts.to_xml())
            .child(
                Element::new("sprites").attr("select", 1usize).children(
                    sprites
                        .iter()
                        .enumerate()
                        .map(|(i, sprite)| sprite.to_xml(i + 1)),
                ),
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::MemorySink;
    use crate::xml::serialize;
    use serde_json::json;

    #[test]
    fn test_sb2_stage_defaults() {
        let sink = MemorySink::new();
        let ctx = ReadContext::new(Default::default(), &sink);
        let stage = Stage::read_sb2(&json!({"objName": "Stage", "children": []}), &ctx).unwrap();
        assert_eq!(stage.tempo, 60.0);
        assert_eq!(stage.current_costume, None);
        let xml = serialize(&stage.to_xml(&[])).unwrap();
        assert!(xml.starts_with(r#"<stage name="Stage" width="480" height="360" costume="0" tempo="60""#));
        assert!(xml.ends_with(r#"<scripts/><sprites select="1"/></stage>"#));
    }

    #[test]
    fn test_sb3_stage_keeps_globals_out_of_stage_element() {
        let sink = MemorySink::new();
        let ctx = ReadContext::new(Default::default(), &sink);
        let stage = Stage::read_sb3(
            &json!({
                "isStage": true, "name": "Stage", "tempo": 120, "volume": 50,
                "variables": {"g": ["global", 1]}, "lists": {},
                "costumes": [], "sounds": [], "blocks": {}, "comments": {}
            }),
            &ctx,
        )
        .unwrap();
        assert_eq!(stage.variables.len(), 1);
        let xml = stage.to_xml(&[]);
        assert!(xml.find("variables").is_some_and(|v| v.elements().next().is_none()));
        assert_eq!(xml.get_attr("tempo").map(ToString::to_string), Some("120".into()));
    }
}
