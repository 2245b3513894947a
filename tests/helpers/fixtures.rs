//! Equivalent Scratch 2 and Scratch 3 projects.
//!
//! Both describe the same stage and sprite, so after conversion they must
//! produce identical Snap! XML.

use snapinator::{ConvertError, LegacyConverter, LegacyProject};

pub const BACKDROP_SVG: &[u8] = b"<svg xmlns=\"http://www.w3.org/2000/svg\"/>";
pub const CAT_SVG: &[u8] = b"<svg xmlns=\"http://www.w3.org/2000/svg\"><circle r=\"5\"/></svg>";
pub const MEOW_WAV: &[u8] = b"RIFF\x24\x00\x00\x00WAVEfmt ";

pub const SB3_PROJECT: &str = r#"{
  "targets": [
    {
      "isStage": true, "name": "Stage", "tempo": 60, "volume": 100, "layerOrder": 0,
      "variables": {"v1": ["score", 0]}, "lists": {}, "broadcasts": {},
      "blocks": {}, "comments": {}, "currentCostume": 0,
      "costumes": [{"assetId": "bd1", "name": "backdrop1", "md5ext": "bd1.svg",
                    "dataFormat": "svg", "rotationCenterX": 240, "rotationCenterY": 180}],
      "sounds": []
    },
    {
      "isStage": false, "name": "Cat", "layerOrder": 1, "visible": true,
      "x": 0, "y": 0, "size": 100, "direction": 90, "draggable": false,
      "rotationStyle": "all around", "currentCostume": 0,
      "variables": {}, "lists": {"l1": ["items", ["a", "b"]]},
      "blocks": {
        "flag": {"opcode": "event_whenflagclicked", "next": "say", "parent": null,
                 "inputs": {}, "fields": {}, "shadow": false, "topLevel": true,
                 "x": 48, "y": 90},
        "say": {"opcode": "looks_sayforsecs", "next": "repeat", "parent": "flag",
                "inputs": {"MESSAGE": [1, [10, "Hello & welcome"]], "SECS": [1, [4, "2"]]},
                "fields": {}, "shadow": false, "topLevel": false},
        "repeat": {"opcode": "control_repeat", "next": null, "parent": "say",
                   "inputs": {"TIMES": [1, [6, "10"]], "SUBSTACK": [2, "move"]},
                   "fields": {}, "shadow": false, "topLevel": false},
        "move": {"opcode": "motion_movesteps", "next": null, "parent": "repeat",
                 "inputs": {"STEPS": [3, [12, "score", "v1"], [4, "10"]]},
                 "fields": {}, "shadow": false, "topLevel": false}
      },
      "comments": {
        "c1": {"blockId": "say", "x": 0, "y": 0, "width": 150, "height": 150,
               "minimized": false, "text": "greets"},
        "c2": {"blockId": null, "x": 300, "y": 36, "width": 150, "height": 100,
               "minimized": true, "text": "floating"}
      },
      "costumes": [{"assetId": "cat1", "name": "cat-a", "bitmapResolution": 1,
                    "md5ext": "cat1.svg", "dataFormat": "svg",
                    "rotationCenterX": 48, "rotationCenterY": 50}],
      "sounds": [{"assetId": "meow", "name": "Meow", "dataFormat": "wav",
                  "md5ext": "meow.wav", "rate": 44100, "sampleCount": 37376}]
    }
  ],
  "monitors": [], "extensions": [], "meta": {"semver": "3.0.0"}
}"#;

pub const SB2_PROJECT: &str = r#"{
  "objName": "Stage",
  "tempoBPM": 60,
  "variables": [{"name": "score", "value": 0, "isPersistent": false}],
  "costumes": [{"costumeName": "backdrop1", "baseLayerID": 0, "baseLayerMD5": "bd1.svg",
                "bitmapResolution": 1, "rotationCenterX": 240, "rotationCenterY": 180}],
  "currentCostumeIndex": 0,
  "children": [
    {
      "objName": "Cat",
      "scripts": [[32, 50, [
        ["whenGreenFlag"],
        ["say:duration:elapsed:from:", "Hello & welcome", 2],
        ["doRepeat", 10, [["forward:", ["readVariable", "score"]]]]
      ]]],
      "scriptComments": [
        [0, 0, 100, 100, true, 1, "greets"],
        [200, 20, 100, 100, false, -1, "floating"]
      ],
      "lists": [{"listName": "items", "contents": ["a", "b"], "isPersistent": false}],
      "sounds": [{"soundName": "Meow", "soundID": 0, "md5": "meow.wav",
                  "sampleCount": 37376, "rate": 44100, "format": ""}],
      "costumes": [{"costumeName": "cat-a", "baseLayerID": 1, "baseLayerMD5": "cat1.svg",
                    "bitmapResolution": 1, "rotationCenterX": 48, "rotationCenterY": 50}],
      "currentCostumeIndex": 0,
      "scratchX": 0, "scratchY": 0, "scale": 1, "direction": 90,
      "rotationStyle": "normal", "isDraggable": false, "indexInLibrary": 1, "visible": true
    },
    {"target": "Cat", "cmd": "getVar:", "param": "score", "visible": false}
  ]
}"#;

/// Media of [`SB3_PROJECT`], keyed the way Scratch 3 archives and the
/// asset server name them.
pub fn sb3_assets() -> Vec<(&'static str, &'static [u8])> {
    vec![
        ("bd1.svg", BACKDROP_SVG),
        ("cat1.svg", CAT_SVG),
        ("meow.wav", MEOW_WAV),
    ]
}

/// Media of [`SB2_PROJECT`], numbered the way Scratch 2 archives them.
pub fn sb2_assets() -> Vec<(&'static str, &'static [u8])> {
    vec![
        ("0.svg", BACKDROP_SVG),
        ("1.svg", CAT_SVG),
        ("0.wav", MEOW_WAV),
    ]
}

pub fn sb3_archive() -> Vec<u8> {
    let mut entries = vec![("project.json", SB3_PROJECT.as_bytes())];
    entries.extend(sb3_assets());
    super::zip_of(&entries)
}

pub fn sb2_archive() -> Vec<u8> {
    let mut entries = vec![("project.json", SB2_PROJECT.as_bytes())];
    entries.extend(sb2_assets());
    super::zip_of(&entries)
}

/// Stand-in for an external Scratch 1.x converter: accepts anything with
/// the legacy header and returns the Scratch 2 fixture.
pub struct FixtureLegacyConverter;

pub const LEGACY_BLOB: &[u8] = b"ScratchV02\x00\x00\x00\x01fixture";

impl LegacyConverter for FixtureLegacyConverter {
    fn convert(&self, input: &[u8]) -> snapinator::Result<LegacyProject> {
        if !input.starts_with(b"ScratchV0") {
            return Err(ConvertError::legacy("missing ScratchV0 header"));
        }
        Ok(LegacyProject {
            json: serde_json::from_str(SB2_PROJECT)
                .map_err(|e| ConvertError::json(e.to_string()))?,
            zip: super::zip_of(&sb2_assets()),
        })
    }
}
