//! Reader for text-serialized asset files.
//!
//! Assets are multi-document YAML where every document is introduced by a
//! header carrying its class and file ID:
//!
//! ```text
//! %YAML 1.1
//! %TAG !u! tag:unity3d.com,2011:
//! --- !u!21 &2100000
//! Material:
//!   m_Shader: {fileID: 4800000, guid: 7a6b5c4d3e2f1a0b9c8d7e6f5a4b3c2d, type: 3}
//! ```
//!
//! The headers use a tag shorthand that is not valid outside the file's own
//! `%TAG` directive, so they are parsed by hand and only the body of each
//! document goes through `serde_yaml`.

use depcache::{ContentId, LocalId, ObjectReference, Property, SerializedObject};
use regex::Regex;
use serde_yaml::{Mapping, Value};
use std::sync::LazyLock;

static HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^--- !u!\d+ &(-?\d+)( stripped)?").expect("header pattern is a valid regex")
});

// Plain scalars like `0000000000000000e000000000000000` would otherwise be
// read as numbers and lose their text.
static GUID_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"guid: ([0-9a-fA-F]{32})").expect("guid pattern is a valid regex")
});

/// Marker every text-serialized asset starts with.
pub const YAML_MARKER: &str = "%YAML";

/// One document of an asset file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YamlDocument {
    /// File ID of the object within the asset (`0` when absent)
    pub file_id: LocalId,
    /// Whether the header was marked `stripped`
    pub stripped: bool,
    /// The document body
    pub object: SerializedObject,
}

#[derive(Default)]
struct PendingDocument {
    file_id: LocalId,
    stripped: bool,
    body: String,
}

/// Returns `true` if `text` is a text-serialized asset.
#[must_use]
pub fn is_yaml_asset(text: &str) -> bool {
    text.starts_with(YAML_MARKER)
}

/// Split an asset file into its documents.
///
/// # Errors
///
/// Returns a message naming the failing document if a body is not valid YAML.
pub fn parse_documents(text: &str) -> Result<Vec<YamlDocument>, String> {
    let text = GUID_VALUE.replace_all(text, "guid: \"$1\"");

    let mut documents = Vec::new();
    let mut pending = PendingDocument::default();
    let mut has_header = false;

    for line in text.lines() {
        if line.starts_with('%') {
            continue;
        }
        if line.starts_with("---") {
            if has_header || !pending.body.trim().is_empty() {
                documents.push(finish(std::mem::take(&mut pending))?);
            }
            has_header = true;
            if let Some(captures) = HEADER.captures(line) {
                pending.file_id = captures[1].parse().unwrap_or_default();
                pending.stripped = captures.get(2).is_some();
            }
            continue;
        }
        pending.body.push_str(line);
        pending.body.push('\n');
    }

    if has_header || !pending.body.trim().is_empty() {
        documents.push(finish(pending)?);
    }
    Ok(documents)
}

fn finish(pending: PendingDocument) -> Result<YamlDocument, String> {
    let value: Value = serde_yaml::from_str(&pending.body)
        .map_err(|e| format!("document &{}: {e}", pending.file_id))?;

    let object = match value {
        Value::Mapping(mapping) if mapping.len() == 1 => {
            let (key, body) = mapping.into_iter().next().unwrap_or_default();
            SerializedObject::new(scalar_text(&key), properties_of(&body))
        }
        other => SerializedObject::new("", properties_of(&other)),
    };

    Ok(YamlDocument {
        file_id: pending.file_id,
        stripped: pending.stripped,
        object,
    })
}

/// Child properties of a YAML value; scalars have none.
fn properties_of(value: &Value) -> Vec<Property> {
    match value {
        Value::Mapping(mapping) => mapping
            .iter()
            .map(|(key, value)| property(scalar_text(key), value))
            .collect(),
        Value::Sequence(items) => items
            .iter()
            .enumerate()
            .map(|(i, value)| property(format!("Array.data[{i}]"), value))
            .collect(),
        Value::Tagged(tagged) => properties_of(&tagged.value),
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => Vec::new(),
    }
}

fn property(name: String, value: &Value) -> Property {
    match value {
        Value::Mapping(mapping) if mapping.contains_key("fileID") => {
            Property::reference(name, reference_of(mapping))
        }
        Value::Mapping(_) | Value::Sequence(_) => Property::nested(name, properties_of(value)),
        Value::Tagged(tagged) => property(name, &tagged.value),
        scalar => Property::scalar(name, scalar_text(scalar)),
    }
}

fn reference_of(mapping: &Mapping) -> ObjectReference {
    let file_id = mapping
        .get("fileID")
        .and_then(|v| match v {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        })
        .unwrap_or_default();
    let guid = mapping
        .get("guid")
        .map(scalar_text)
        .filter(|guid| !guid.is_empty())
        .map(ContentId::new);
    ObjectReference { guid, file_id }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Tagged(tagged) => scalar_text(&tagged.value),
        Value::Null | Value::Sequence(_) | Value::Mapping(_) => String::new(),
    }
}

/// Look up a top-level property by name.
#[must_use]
pub fn find<'a>(properties: &'a [Property], name: &str) -> Option<&'a Property> {
    properties.iter().find(|p| p.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use depcache::PropertyValue;

    const MATERIAL: &str = "%YAML 1.1
%TAG !u! tag:unity3d.com,2011:
--- !u!21 &2100000
Material:
  serializedVersion: 8
  m_Name: Wood
  m_Shader: {fileID: 4800000, guid: 7a6b5c4d3e2f1a0b9c8d7e6f5a4b3c2d, type: 3}
  m_SavedProperties:
    m_TexEnvs:
    - _MainTex:
        m_Texture: {fileID: 2800000, guid: 1f4c0e3ab26d4e8f9a7b6c5d4e3f2a1b, type: 3}
        m_Scale: {x: 1, y: 1}
    - _BumpMap:
        m_Texture: {fileID: 0}
";

    #[test]
    fn headers_are_parsed_and_stripped() {
        let documents = parse_documents(MATERIAL).unwrap();

        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].file_id, 2_100_000);
        assert!(!documents[0].stripped);
        assert_eq!(documents[0].object.type_name, "Material");
    }

    #[test]
    fn references_keep_guid_and_file_id() {
        let documents = parse_documents(MATERIAL).unwrap();
        let shader = find(&documents[0].object.properties, "m_Shader").unwrap();

        assert_eq!(
            shader.value,
            PropertyValue::Reference(ObjectReference::external(
                "7a6b5c4d3e2f1a0b9c8d7e6f5a4b3c2d",
                4_800_000
            ))
        );
    }

    #[test]
    fn sequences_become_indexed_nested_properties() {
        let documents = parse_documents(MATERIAL).unwrap();
        let saved = find(&documents[0].object.properties, "m_SavedProperties").unwrap();

        let PropertyValue::Nested(saved) = &saved.value else {
            panic!("expected nested value");
        };
        let PropertyValue::Nested(envs) = &find(saved, "m_TexEnvs").unwrap().value else {
            panic!("expected nested value");
        };
        assert_eq!(envs.len(), 2);
        assert_eq!(envs[0].name, "Array.data[0]");
    }

    #[test]
    fn numeric_looking_guid_stays_text() {
        let text = "%YAML 1.1\n--- !u!114 &1\nMonoBehaviour:\n  m_Font: {fileID: 10102, guid: 0000000000000000e000000000000000, type: 0}\n";

        let documents = parse_documents(text).unwrap();
        let font = find(&documents[0].object.properties, "m_Font").unwrap();

        let PropertyValue::Reference(reference) = &font.value else {
            panic!("expected a reference");
        };
        assert_eq!(
            reference.guid.as_ref().map(ContentId::as_str),
            Some("0000000000000000e000000000000000")
        );
    }

    #[test]
    fn stripped_documents_are_flagged() {
        let text = "%YAML 1.1\n--- !u!1 &500 stripped\nGameObject:\n  m_PrefabInstance: {fileID: 600}\n--- !u!1001 &600\nPrefabInstance:\n  m_SourcePrefab: {fileID: 100100000, guid: 1f4c0e3ab26d4e8f9a7b6c5d4e3f2a1b, type: 3}\n";

        let documents = parse_documents(text).unwrap();

        assert_eq!(documents.len(), 2);
        assert!(documents[0].stripped);
        assert_eq!(documents[1].object.type_name, "PrefabInstance");
        assert_eq!(documents[1].file_id, 600);
    }

    #[test]
    fn malformed_body_names_the_document() {
        let text = "%YAML 1.1\n--- !u!21 &77\nMaterial:\n  m_Name: [unclosed\n";

        let err = parse_documents(text).unwrap_err();

        assert!(err.contains("&77"), "{err}");
    }

    #[test]
    fn marker_detection() {
        assert!(is_yaml_asset(MATERIAL));
        assert!(!is_yaml_asset("\u{89}PNG\r\n"));
    }
}
