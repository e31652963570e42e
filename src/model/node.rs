use crate::source::{ElementKind, Table};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// The subtype of an exit node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExitKind {
    /// Leaves the current conversation.
    #[default]
    Conversation,
    /// Leaves the whole module.
    Module,
    /// Returns to the calling board.
    Board,
    #[serde(other)]
    Other,
}

impl fmt::Display for ExitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitKind::Conversation => write!(f, "conversation"),
            ExitKind::Module => write!(f, "module"),
            ExitKind::Board => write!(f, "board"),
            ExitKind::Other => write!(f, "other"),
        }
    }
}

/// Kind-specific node data, filled in by the resolver.
#[derive(Debug, Clone, PartialEq)]
pub enum NodePayload {
    Standard,
    Flexible { subtype: String, data: Value },
    OpenQuestion {
        question: Option<String>,
        variable: Option<String>,
    },
    Exit { exit: ExitKind },
    Template {
        template_uuid: String,
        parameters: Table,
    },
}

/// A typed unit of dialogue or logic.
///
/// Skeleton nodes only carry `uuid`, `board`, `kind` and `name`; everything else is
/// set when the resolver fills the node from its payload.
#[derive(Debug, Clone)]
pub struct Node {
    pub uuid: String,
    /// Uuid of the owning board.
    pub board: String,
    pub kind: ElementKind,
    pub name: String,
    pub text: Option<String>,
    pub code: Option<String>,
    pub is_intro: bool,
    pub is_topic: bool,
    pub tags: Vec<String>,
    /// `None` until the resolver fills the node.
    pub payload: Option<NodePayload>,
    /// Uuids of connections ending at this node, in connection table order.
    pub connections_in: Vec<String>,
    /// Uuids of connections starting at this node, in connection table order.
    pub connections_out: Vec<String>,
}

impl Node {
    pub(crate) fn skeleton(kind: ElementKind, uuid: &str, board: &str) -> Self {
        Self {
            uuid: uuid.to_string(),
            board: board.to_string(),
            kind,
            name: String::new(),
            text: None,
            code: None,
            is_intro: false,
            is_topic: false,
            tags: Vec::new(),
            payload: None,
            connections_in: Vec::new(),
            connections_out: Vec::new(),
        }
    }

    pub fn is_filled(&self) -> bool {
        self.payload.is_some()
    }

    pub fn is_exit(&self) -> bool {
        self.kind == ElementKind::Exit
    }

    pub fn exit_kind(&self) -> Option<ExitKind> {
        match &self.payload {
            Some(NodePayload::Exit { exit }) => Some(*exit),
            _ => None,
        }
    }

    pub fn flexible_subtype(&self) -> Option<&str> {
        match &self.payload {
            Some(NodePayload::Flexible { subtype, .. }) => Some(subtype),
            _ => None,
        }
    }

    pub fn template_uuid(&self) -> Option<&str> {
        match &self.payload {
            Some(NodePayload::Template { template_uuid, .. }) => Some(template_uuid),
            _ => None,
        }
    }

    pub fn has_code(&self) -> bool {
        self.code.as_deref().is_some_and(|c| !c.is_empty())
    }

    /// Last four characters of the uuid, used for fallback names and graph labels.
    pub fn short_uuid(&self) -> &str {
        short_uuid(&self.uuid)
    }
}

pub(crate) fn short_uuid(uuid: &str) -> &str {
    let start = uuid
        .char_indices()
        .rev()
        .nth(3)
        .map(|(i, _)| i)
        .unwrap_or(0);
    &uuid[start..]
}

/// Computes the display name of a node from its raw payload.
pub(crate) fn display_name(kind: ElementKind, uuid: &str, payload: &Value) -> String {
    match payload.get("name").and_then(Value::as_str).map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => format!("{} {}", kind.label(), short_uuid(uuid)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn display_name_falls_back_to_kind_and_uuid_suffix() {
        let uuid = "0a1b2c3d-ffff-1234";
        assert_eq!(
            display_name(ElementKind::Standard, uuid, &json!({"name": "  Greeting "})),
            "Greeting"
        );
        assert_eq!(
            display_name(ElementKind::Exit, uuid, &json!({"name": ""})),
            "Exit 1234"
        );
        assert_eq!(display_name(ElementKind::Template, "ab", &json!({})), "Template ab");
    }
}
