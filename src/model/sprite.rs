use futures::future::{try_join, try_join_all};
use serde_json::{Map, Value};

use super::ReadContext;
use super::costume::Costume;
use super::json;
use super::script::ScriptArea;
use super::sound::Sound;
use super::variable::Variable;
use crate::assets::AssetStore;
use crate::error::{ConvertError, Result};
use crate::xml::Element;

/// Snap! rotation styles, numbered as Snap! stores them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RotationStyle {
    #[default]
    Normal = 1,
    LeftRight = 2,
    None = 0,
}

impl RotationStyle {
    /// Parse either dialect's spelling. Unknown styles rotate normally.
    pub fn parse(value: &str) -> Self {
        match value {
            "leftRight" | "left-right" => RotationStyle::LeftRight,
            "none" | "don't rotate" => RotationStyle::None,
            _ => RotationStyle::Normal,
        }
    }

    pub fn code(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub heading: f64,
    pub scale: f64,
    pub rotation_style: RotationStyle,
    pub draggable: bool,
    pub visible: bool,
    /// Index into `costumes`, if a costume is worn.
    pub current_costume: Option<usize>,
    pub costumes: Vec<Costume>,
    pub sounds: Vec<Sound>,
    pub variables: Vec<Variable>,
    pub scripts: ScriptArea,
}

impl Sprite {
    /// One entry of the stage's `children`.
    pub fn read_sb2(value: &Value, ctx: &ReadContext<'_>) -> Result<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| ConvertError::sb2(format!("sprite must be an object, got {value}")))?;
        let name = json::string(obj, "objName")
            .ok_or_else(|| ConvertError::sb2("sprite without objName"))?;
        let costumes = read_each(obj, "costumes", Costume::read_sb2)?;

        Ok(Self {
            name: name.to_string(),
            x: json::number_or(obj, "scratchX", 0.0),
            y: json::number_or(obj, "scratchY", 0.0),
            heading: json::number_or(obj, "direction", 90.0),
            scale: json::number_or(obj, "scale", 1.0),
            rotation_style: RotationStyle::parse(
                json::string(obj, "rotationStyle").unwrap_or_default(),
            ),
            draggable: json::boolean(obj, "isDraggable").unwrap_or(false),
            visible: json::boolean(obj, "visible").unwrap_or(true),
            current_costume: current_costume(json::number(obj, "currentCostumeIndex"), &costumes),
            costumes,
            sounds: read_each(obj, "sounds", Sound::read_sb2)?,
            variables: Variable::read_all_sb2(obj),
            scripts: ScriptArea::read_sb2(obj, ctx),
        })
    }

    /// A non-stage entry of `targets`.
    pub fn read_sb3(value: &Value, ctx: &ReadContext<'_>) -> Result<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| ConvertError::sb3(format!("sprite must be an object, got {value}")))?;
        let name = json::string(obj, "name")
            .ok_or_else(|| ConvertError::sb3("sprite without a name"))?;
        let costumes = read_each(obj, "costumes", Costume::read_sb3)?;

        Ok(Self {
            name: name.to_string(),
            x: json::number_or(obj, "x", 0.0),
            y: json::number_or(obj, "y", 0.0),
            heading: json::number_or(obj, "direction", 90.0),
            scale: json::number_or(obj, "size", 100.0) / 100.0,
            rotation_style: RotationStyle::parse(
                json::string(obj, "rotationStyle").unwrap_or_default(),
            ),
            draggable: json::boolean(obj, "draggable").unwrap_or(false),
            visible: json::boolean(obj, "visible").unwrap_or(true),
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

    /// `idx` is the sprite's 1-based position in the corral.
    pub fn to_xml(&self, idx: usize) -> Element {
        Element::new("sprite")
            .attr("name", self.name.as_str())
            .attr("idx", idx)
            .attr("x", self.x)
            .attr("y", self.y)
            .attr("heading", self.heading)
            .attr("scale", self.scale)
            .attr("rotation", self.rotation_style.code())
            .attr("draggable", self.draggable)
            .attr_opt("hidden", (!self.visible).then_some(true))
            .attr("costume", costume_number(self.current_costume))
            .child(media_list("costumes", self.costumes.iter().map(Costume::to_xml)))
            .child(media_list("sounds", self.sounds.iter().map(Sound::to_xml)))
            .child(Element::new("blocks"))
            .child(Element::new("variables").children(self.variables.iter().map(Variable::to_xml)))
            .child(self.scripts.to_xml())
    }
}

/// Decode every entry of `obj[key]`; one bad entry fails the owner.
pub(super) fn read_each<T>(
    obj: &Map<String, Value>,
    key: &str,
    read: impl Fn(&Value) -> Result<T>,
) -> Result<Vec<T>> {
    json::array(obj, key).iter().map(read).collect()
}

/// Clamp a source costume index to the costumes actually present.
pub(super) fn current_costume(index: Option<f64>, costumes: &[Costume]) -> Option<usize> {
    let index = index.filter(|i| *i >= 0.0)?.floor() as usize;
    (index < costumes.len()).then_some(index)
}

/// Snap! numbers costumes from 1; 0 means none.
pub(super) fn costume_number(index: Option<usize>) -> usize {
    index.map_or(0, |i| i + 1)
}

/// `<costumes><list><item>..</item></list></costumes>`
pub(super) fn media_list(tag: &str, items: impl Iterator<Item = Element>) -> Element {
    Element::new(tag).child(
        Element::new("list").children(items.map(|item| Element::new("item").child(item))),
    )
}

/// Fetch every costume and sound of one object concurrently.
pub(super) async fn load_media(
    costumes: &mut [Costume],
    sounds: &mut [Sound],
    store: &AssetStore,
) -> Result<()> {
    try_join(
        try_join_all(costumes.iter_mut().map(|costume| costume.load(store))),
        try_join_all(sounds.iter_mut().map(|sound| sound.load(store))),
    )
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::MemorySink;
    use crate::xml::serialize;
    use serde_json::json;

    #[test]
    fn test_rotation_styles() {
        assert_eq!(RotationStyle::parse("normal").code(), 1);
        assert_eq!(RotationStyle::parse("all around").code(), 1);
        assert_eq!(RotationStyle::parse("leftRight").code(), 2);
        assert_eq!(RotationStyle::parse("left-right").code(), 2);
        assert_eq!(RotationStyle::parse("none").code(), 0);
        assert_eq!(RotationStyle::parse("don't rotate").code(), 0);
    }

    #[test]
    fn test_sb3_sprite() {
        let sink = MemorySink::new();
        let ctx = ReadContext::new(Default::default(), &sink);
        let sprite = Sprite::read_sb3(
            &json!({
                "isStage": false, "name": "Cat", "x": 10, "y": -5, "size": 50,
                "direction": 45, "draggable": true, "visible": false,
                "rotationStyle": "left-right", "currentCostume": 1,
                "costumes": [
                    {"name": "a", "md5ext": "a.svg", "rotationCenterX": 0, "rotationCenterY": 0},
                    {"name": "b", "md5ext": "b.svg", "rotationCenterX": 0, "rotationCenterY": 0}
                ],
                "sounds": [],
                "variables": {"v": ["speed", 3]},
                "lists": {},
                "blocks": {},
                "comments": {}
            }),
            &ctx,
        )
        .unwrap();
        assert_eq!(sprite.scale, 0.5);
        assert_eq!(sprite.current_costume, Some(1));
        let xml = serialize(&sprite.to_xml(1)).unwrap();
        assert!(xml.starts_with(concat!(
            r#"<sprite name="Cat" idx="1" x="10" y="-5" heading="45" scale="0.5" "#,
            r#"rotation="2" draggable="true" hidden="true" costume="2">"#
        )));
        assert!(xml.contains(r#"<variables><variable name="speed"><l>3</l></variable></variables>"#));
        assert!(xml.ends_with("<scripts/></sprite>"));
    }

    #[test]
    fn test_sb2_sprite_out_of_range_costume() {
        let sink = MemorySink::new();
        let ctx = ReadContext::new(Default::default(), &sink);
        let sprite = Sprite::read_sb2(
            &json!({
                "objName": "Sprite1", "scratchX": 0, "scratchY": 0, "scale": 1,
                "direction": 90, "rotationStyle": "normal", "isDraggable": false,
                "visible": true, "currentCostumeIndex": 4,
                "costumes": [{"costumeName": "c", "baseLayerID": 0, "baseLayerMD5": "x.png"}],
                "sounds": []
            }),
            &ctx,
        )
        .unwrap();
        assert_eq!(sprite.current_costume, None);
        assert_eq!(sprite.to_xml(1).get_attr("costume").map(ToString::to_string), Some("0".into()));
    }

    #[test]
    fn test_costume_number() {
        assert_eq!(costume_number(None), 0);
        assert_eq!(costume_number(Some(0)), 1);
    }
}
