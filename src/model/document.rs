use super::{Board, BoardRef, Connection, ExcludedBoard, Node};
use crate::error::{BuildError, Location};
use crate::source::InfoMap;
use ahash::AHashMap;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// `docInfo` key holding the legacy exit snippet.
pub const LEGACY_EXIT_INFO_KEY: &str = "onExit";
/// `docInfo` key that switches a document to explicit exit nodes when set to `"Yes"`.
pub const EXPLICIT_EXITS_INFO_KEY: &str = "ConvertedToExplicitExits";
/// Fallback exit used when a legacy document declares no `onExit`.
pub const DEFAULT_DOCUMENT_EXIT: &str = "^exit_controller()";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DocumentStatus {
    InDevelopment,
    #[default]
    Finalized,
}

/// One compiled conversation or module source file.
///
/// The document owns every node and connection in uuid-keyed arenas. Boards and
/// entities refer to each other by uuid only.
#[derive(Debug, Clone, Default)]
pub struct Document {
    pub name: String,
    pub version: i64,
    pub conversation_id: String,
    pub module_id: Option<String>,
    pub indices: String,
    pub status: DocumentStatus,
    pub info: InfoMap,
    /// Empty whenever `uses_explicit_exits` is set.
    pub legacy_exit_code: String,
    pub uses_explicit_exits: bool,
    pub file_path: Option<String>,
    pub(crate) boards: Vec<Board>,
    pub(crate) excluded_boards: Vec<ExcludedBoard>,
    pub(crate) nodes: AHashMap<String, Node>,
    pub(crate) connections: AHashMap<String, Connection>,
}

impl Document {
    /// Documents themselves are never excluded; only their boards can be.
    pub fn is_excluded(&self) -> bool {
        false
    }

    pub fn is_status_finalized(&self) -> bool {
        self.status == DocumentStatus::Finalized
    }

    /// The part of the conversation id before the first underscore.
    pub fn conversation_prefix(&self) -> &str {
        self.conversation_id
            .split('_')
            .next()
            .unwrap_or(&self.conversation_id)
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_path
            .as_deref()
            .and_then(|p| Path::new(p).file_name())
            .and_then(|n| n.to_str())
    }

    pub(crate) fn location(&self) -> Location {
        Location::in_file(self.file_path.as_deref())
    }

    pub(crate) fn board_location(&self, board_uuid: &str) -> Location {
        match self.boards.iter().find(|b| b.uuid == board_uuid) {
            Some(board) => self.location().with_board(&board.uuid, &board.name),
            None => Location {
                board_uuid: Some(board_uuid.to_string()),
                ..self.location()
            },
        }
    }

    /// Active boards, sorted by their declared order.
    pub fn boards(&self) -> impl Iterator<Item = BoardRef<'_>> {
        self.boards.iter().map(move |board| BoardRef { doc: self, board })
    }

    pub fn board_count(&self) -> usize {
        self.boards.len()
    }

    pub fn excluded_boards(&self) -> &[ExcludedBoard] {
        &self.excluded_boards
    }

    pub fn board(&self, uuid: &str) -> Option<BoardRef<'_>> {
        self.boards().find(|b| b.uuid() == uuid)
    }

    pub fn board_by_name(&self, name: &str) -> Option<BoardRef<'_>> {
        self.boards().find(|b| b.name() == name)
    }

    pub fn excluded_board_by_name(&self, name: &str) -> Option<&ExcludedBoard> {
        self.excluded_boards.iter().find(|b| b.name == name)
    }

    /// A node looked up through its board.
    pub fn node(&self, board_uuid: &str, node_uuid: &str) -> Option<&Node> {
        self.board(board_uuid)
            .and_then(|board| board.get_element(node_uuid))
    }

    pub fn find_node(&self, uuid: &str) -> Option<&Node> {
        self.nodes.get(uuid)
    }

    pub fn find_connection(&self, uuid: &str) -> Option<&Connection> {
        self.connections.get(uuid)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    pub fn is_board_excluded(&self, uuid: &str) -> bool {
        self.excluded_boards.iter().any(|b| b.uuid == uuid)
    }

    pub fn is_board_name_excluded(&self, name: &str) -> bool {
        self.excluded_boards.iter().any(|b| b.name == name)
    }

    pub fn is_element_excluded(&self, uuid: &str) -> bool {
        self.excluded_boards
            .iter()
            .any(|b| b.element_uuids.contains(uuid))
    }

    pub fn is_connection_excluded(&self, uuid: &str) -> bool {
        self.excluded_boards
            .iter()
            .any(|b| b.connection_uuids.contains(uuid))
    }

    /// Distinct template uuids used by template nodes, in board order.
    pub fn dependent_template_uuids(&self) -> Vec<&str> {
        self.boards()
            .flat_map(|board| board.elements())
            .filter_map(Node::template_uuid)
            .unique()
            .collect()
    }

    /// Resolves the board a module starts on.
    ///
    /// The start board must exist, must not be excluded and must not be a function board.
    pub fn start_board(&self, name: &str) -> Result<BoardRef<'_>, BuildError> {
        if let Some(board) = self.board_by_name(name) {
            if board.board().is_function_board() {
                return Err(BuildError::InvalidStartBoard {
                    name: name.to_string(),
                    reason: "it is a function board".to_string(),
                    location: self.location().with_board(board.uuid(), name),
                });
            }
            return Ok(board);
        }

        if let Some(excluded) = self.excluded_board_by_name(name) {
            return Err(BuildError::InvalidExclusionReference {
                reference: format!("start board '{}'", name),
                location: self.location().with_board(&excluded.uuid, &excluded.name),
            });
        }

        Err(BuildError::UnknownBoard {
            name: name.to_string(),
            location: self.location(),
        })
    }
}
