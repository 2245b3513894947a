#![allow(clippy::unwrap_used)]
//! Generated XML must parse back and preserve every text value.

#[path = "helpers/mod.rs"]
mod helpers;

use helpers::fixtures;
use quick_xml::Reader;
use quick_xml::events::Event;
use rstest::rstest;
use snapinator::{ConvertConfig, ReadOptions, Snapinator};

/// Element names in document order, plus every unescaped text node.
fn parse(xml: &str) -> (Vec<String>, Vec<String>) {
    let mut reader = Reader::from_str(xml);
    let mut names = Vec::new();
    let mut texts = Vec::new();
    let mut depth = 0usize;
    loop {
        match reader.read_event().unwrap() {
            Event::Start(start) => {
                depth += 1;
                names.push(String::from_utf8(start.name().as_ref().to_vec()).unwrap());
            }
            Event::Empty(start) => {
                names.push(String::from_utf8(start.name().as_ref().to_vec()).unwrap());
            }
            Event::End(_) => depth -= 1,
            Event::Text(text) => texts.push(text.unescape().unwrap().into_owned()),
            Event::Eof => break,
            _ => {}
        }
    }
    assert_eq!(depth, 0, "unbalanced document");
    (names, texts)
}

#[rstest]
#[case::sb2(fixtures::sb2_archive())]
#[case::sb3(fixtures::sb3_archive())]
#[tokio::test]
async fn test_output_is_well_formed(#[case] blob: Vec<u8>) {
    let xml = Snapinator::default()
        .convert("game", &blob, ReadOptions::default())
        .await
        .unwrap();
    let (names, texts) = parse(&xml);

    assert_eq!(names.first().map(String::as_str), Some("project"));
    for expected in ["stage", "sprites", "sprite", "costume", "sound", "script", "comment"] {
        assert!(names.iter().any(|n| n == expected), "missing <{expected}>");
    }
    assert!(texts.iter().any(|t| t == "Hello & welcome"));
    assert!(texts.iter().any(|t| t == "greets"));
    assert!(texts.iter().any(|t| t == "floating"));
}

#[rstest]
#[case::markup("<b>bold</b>")]
#[case::quotes(r#"say "hi" & 'bye'"#)]
#[case::unicode("héllo wörld ✓")]
#[tokio::test]
async fn test_text_survives_escaping(#[case] message: &str) {
    let root = serde_json::json!({
        "targets": [
            {"isStage": true, "name": message, "costumes": [], "sounds": [],
             "variables": {"v": [message, message]}, "lists": {}, "comments": {},
             "blocks": {
                 "say": {"opcode": "looks_say", "next": null, "parent": null,
                         "inputs": {"MESSAGE": [1, [10, message]]}, "fields": {},
                         "shadow": false, "topLevel": true, "x": 0, "y": 0}
             }}
        ]
    });
    let app = Snapinator::new(ConvertConfig::default());
    let xml = app
        .convert(message, root.to_string().as_bytes(), ReadOptions::default())
        .await
        .unwrap();
    let (_, texts) = parse(&xml);
    // Once as the variable value, once as the say argument.
    assert_eq!(texts.iter().filter(|t| *t == message).count(), 2);

    let mut reader = Reader::from_str(&xml);
    loop {
        if let Event::Start(start) = reader.read_event().unwrap() {
            let name = start.try_get_attribute("name").unwrap().unwrap();
            assert_eq!(name.unescape_value().unwrap(), message);
            break;
        }
    }
}
