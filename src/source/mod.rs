//! Raw JSON shapes of an EmPath document.
//!
//! These structs mirror the file format and are only used as input to the
//! [`Compiler`](crate::compiler::Compiler). Required fields are `Option`s so that a
//! missing key is reported as a located `MissingRequiredField` instead of a bare
//! serde message.

use crate::error::{BuildError, Location};
use crate::model::{DocumentStatus, ExitKind};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;

pub mod kinds;

pub use kinds::{ConnectionKind, ElementKind};

/// A `uuid -> payload` table, in file order.
pub type Table = serde_json::Map<String, Value>;

/// A single `{key, value}` pair of `docInfo` or a board's `info` list.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InfoEntry {
    pub key: String,
    #[serde(default)]
    pub value: Value,
}

/// Ordered key/value information attached to a document or a board.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InfoMap {
    entries: Vec<(String, String)>,
}

impl InfoMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a value. A replaced key keeps its first position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<InfoEntry> for InfoMap {
    fn from_iter<T: IntoIterator<Item = InfoEntry>>(iter: T) -> Self {
        let mut map = InfoMap::new();
        for entry in iter {
            map.insert(entry.key, value_to_text(&entry.value));
        }
        map
    }
}

impl<'de> Deserialize<'de> for InfoMap {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            List(Vec<InfoEntry>),
            Object(Table),
        }

        match Option::<Repr>::deserialize(deserializer)? {
            None => Ok(InfoMap::new()),
            Some(Repr::List(entries)) => Ok(entries.into_iter().collect()),
            Some(Repr::Object(object)) => {
                let mut map = InfoMap::new();
                for (key, value) in &object {
                    map.insert(key.clone(), value_to_text(value));
                }
                Ok(map)
            }
        }
    }
}

/// Info values are free-form; non-string JSON values keep their JSON spelling.
fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Top-level document object.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDocument {
    pub name: Option<String>,
    pub version: Option<i64>,
    #[serde(rename = "conversationID")]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub indices: Option<String>,
    #[serde(default)]
    pub doc_info: InfoMap,
    #[serde(default)]
    pub document_status: Option<DocumentStatus>,
    #[serde(default, rename = "excludeDocument")]
    pub exclude_document: bool,
    pub boards: Option<Table>,
    /// Every other top-level key, including the element and connection tables.
    #[serde(flatten)]
    pub tables: Table,
}

impl RawDocument {
    pub fn from_json_str(json: &str, file: Option<&str>) -> Result<Self, BuildError> {
        serde_json::from_str(json).map_err(|e| BuildError::JsonParseError {
            message: e.to_string(),
            location: Location::in_file(file),
        })
    }

    pub fn from_value(value: Value, file: Option<&str>) -> Result<Self, BuildError> {
        serde_json::from_value(value).map_err(|e| BuildError::JsonParseError {
            message: e.to_string(),
            location: Location::in_file(file),
        })
    }

    /// Reads and parses a document file.
    pub fn from_file(path: &Path) -> Result<Self, BuildError> {
        let json = read_file(path)?;
        Self::from_json_str(&json, Some(&path.display().to_string()))
    }

    /// The document-level table for a type key, if the file has one.
    pub fn table(&self, key: &str) -> Option<&Table> {
        self.tables.get(key).and_then(Value::as_object)
    }
}

/// Checks the `excludeDocument` flag of a file without building it.
pub fn is_file_excluded(path: &Path) -> Result<bool, BuildError> {
    #[derive(Deserialize)]
    struct ExclusionProbe {
        #[serde(default, rename = "excludeDocument")]
        exclude_document: bool,
    }

    let json = read_file(path)?;
    let probe: ExclusionProbe =
        serde_json::from_str(&json).map_err(|e| BuildError::JsonParseError {
            message: e.to_string(),
            location: Location::in_file(Some(&path.display().to_string())),
        })?;
    Ok(probe.exclude_document)
}

fn read_file(path: &Path) -> Result<String, BuildError> {
    fs::read_to_string(path).map_err(|e| BuildError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// A board payload from the document's `boards` table.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBoard {
    pub name: Option<String>,
    #[serde(default)]
    pub order: i64,
    #[serde(default)]
    pub excluded: bool,
    #[serde(default)]
    pub board_type: Option<String>,
    #[serde(default)]
    pub content_id: Option<String>,
    #[serde(default)]
    pub info: InfoMap,
    /// Per-kind uuid lists, plus anything else the editor stores on a board.
    #[serde(flatten)]
    pub lists: Table,
}

impl RawBoard {
    pub fn from_value(value: &Value) -> Result<Self, serde_json::Error> {
        RawBoard::deserialize(value)
    }

    /// The uuids listed under `key`, or `None` when the board has no such list.
    pub fn uuid_list(&self, key: &str) -> Result<Option<Vec<String>>, String> {
        let Some(value) = self.lists.get(key) else {
            return Ok(None);
        };
        match value {
            Value::Null => Ok(None),
            Value::Array(items) => items
                .iter()
                .map(|item| {
                    item.as_str()
                        .map(str::to_string)
                        .ok_or_else(|| format!("expected a uuid string, found {}", item))
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Some),
            other => Err(format!("expected a list of uuids, found {}", other)),
        }
    }
}

/// Fields shared by every element kind.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawNodeCommon {
    pub name: Option<String>,
    pub text: Option<String>,
    pub code: Option<String>,
    #[serde(default)]
    pub is_intro: bool,
    #[serde(default)]
    pub is_topic: bool,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFlexible {
    pub subtype: Option<String>,
    #[serde(default)]
    pub subtype_data: Value,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOpenQuestion {
    pub question: Option<String>,
    pub variable: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawExit {
    #[serde(default)]
    pub exit_type: ExitKind,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTemplate {
    pub template_uuid: Option<String>,
    #[serde(default)]
    pub parameters: Table,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawConnection {
    pub source: Option<String>,
    #[serde(alias = "target")]
    pub destination: Option<String>,
    #[serde(default)]
    pub name: String,
    pub pattern: Option<String>,
}

/// Deserializes a payload table entry, naming the offending uuid and table on failure.
pub(crate) fn parse_payload<'a, T: Deserialize<'a>>(
    value: &'a Value,
    uuid: &str,
    type_key: &str,
    location: &Location,
) -> Result<T, BuildError> {
    T::deserialize(value).map_err(|e| malformed(uuid, type_key, e, location))
}

fn malformed(uuid: &str, type_key: &str, e: impl de::Error, location: &Location) -> BuildError {
    BuildError::MalformedPayload {
        uuid: uuid.to_string(),
        type_key: type_key.to_string(),
        message: e.to_string(),
        location: location.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn info_map_accepts_list_and_object() {
        let list: InfoMap = serde_json::from_value(json!([
            {"key": "onExit", "value": "^exit_controller()"},
            {"key": "Priority", "value": 3},
        ]))
        .unwrap();
        assert_eq!(list.get("onExit"), Some("^exit_controller()"));
        assert_eq!(list.get("Priority"), Some("3"));

        let object: InfoMap = serde_json::from_value(json!({"Owner": "design"})).unwrap();
        assert_eq!(object.get("Owner"), Some("design"));
        assert_eq!(object.len(), 1);
    }

    #[test]
    fn info_map_replacement_keeps_position() {
        let mut info = InfoMap::new();
        info.insert("a", "1");
        info.insert("b", "2");
        info.insert("a", "3");
        let keys: Vec<_> = info.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(info.get("a"), Some("3"));
    }

    #[test]
    fn document_tables_keep_file_order() {
        let raw = RawDocument::from_json_str(
            r#"{"name": "d", "version": 1, "conversationID": "c", "boards": {"z": {}, "a": {}},
                "elements": {"e2": {}, "e1": {}}}"#,
            None,
        )
        .unwrap();
        let boards: Vec<_> = raw.boards.as_ref().unwrap().keys().collect();
        assert_eq!(boards, vec!["z", "a"]);
        let elements: Vec<_> = raw.table("elements").unwrap().keys().collect();
        assert_eq!(elements, vec!["e2", "e1"]);
    }

    #[test]
    fn board_uuid_list_rejects_non_strings() {
        let board = RawBoard::from_value(&json!({"name": "b", "elements": ["e1", 4]})).unwrap();
        assert!(board.uuid_list("elements").is_err());
        assert_eq!(board.uuid_list("connections"), Ok(None));
    }
}
