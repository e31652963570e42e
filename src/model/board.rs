use super::{Connection, Document, Node, TopicClusters};
use crate::source::InfoMap;
use ahash::AHashSet;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BoardKind {
    #[default]
    Standard,
    /// A board invoked like a function from other boards; never a start board.
    Function,
}

impl BoardKind {
    pub(crate) fn from_discriminator(board_type: Option<&str>) -> Self {
        match board_type {
            Some(t) if t.eq_ignore_ascii_case("function") => BoardKind::Function,
            _ => BoardKind::Standard,
        }
    }
}

/// A named section of the conversation graph.
///
/// `elements` and `connections` hold uuids into the owning [`Document`]'s arenas.
#[derive(Debug, Clone)]
pub struct Board {
    pub uuid: String,
    pub name: String,
    pub order: i64,
    pub kind: BoardKind,
    pub content_id: Option<String>,
    pub info: InfoMap,
    pub elements: Vec<String>,
    pub connections: Vec<String>,
    pub(crate) topic_clusters: TopicClusters,
}

impl Board {
    pub(crate) fn new(uuid: &str, name: &str, order: i64, kind: BoardKind) -> Self {
        Self {
            uuid: uuid.to_string(),
            name: name.to_string(),
            order,
            kind,
            content_id: None,
            info: InfoMap::new(),
            elements: Vec::new(),
            connections: Vec::new(),
            topic_clusters: TopicClusters::default(),
        }
    }

    pub fn is_function_board(&self) -> bool {
        self.kind == BoardKind::Function
    }
}

/// Tombstone of a board marked as excluded. Only identity is kept.
#[derive(Debug, Clone, Default)]
pub struct ExcludedBoard {
    pub uuid: String,
    pub name: String,
    pub element_uuids: AHashSet<String>,
    pub connection_uuids: AHashSet<String>,
}

impl ExcludedBoard {
    pub(crate) fn new(uuid: &str, name: &str) -> Self {
        Self {
            uuid: uuid.to_string(),
            name: name.to_string(),
            ..Self::default()
        }
    }
}

/// A board together with the document that owns its entities.
#[derive(Debug, Clone, Copy)]
pub struct BoardRef<'a> {
    pub(crate) doc: &'a Document,
    pub(crate) board: &'a Board,
}

impl<'a> BoardRef<'a> {
    pub fn board(&self) -> &'a Board {
        self.board
    }

    pub fn uuid(&self) -> &'a str {
        &self.board.uuid
    }

    pub fn name(&self) -> &'a str {
        &self.board.name
    }

    pub fn document(&self) -> &'a Document {
        self.doc
    }

    /// Nodes of this board in skeleton order.
    pub fn elements(&self) -> impl Iterator<Item = &'a Node> + use<'a> {
        let doc = self.doc;
        self.board
            .elements
            .iter()
            .filter_map(move |uuid| doc.nodes.get(uuid))
    }

    /// Connections owned by this board, move-on connections included.
    pub fn connections(&self) -> impl Iterator<Item = &'a Connection> + use<'a> {
        let doc = self.doc;
        self.board
            .connections
            .iter()
            .filter_map(move |uuid| doc.connections.get(uuid))
    }

    pub fn get_element(&self, uuid: &str) -> Option<&'a Node> {
        self.doc.nodes.get(uuid).filter(|n| n.board == self.board.uuid)
    }

    pub fn get_connection(&self, uuid: &str) -> Option<&'a Connection> {
        self.doc
            .connections
            .get(uuid)
            .filter(|c| c.board == self.board.uuid)
    }

    pub fn has_intro(&self) -> bool {
        self.elements().any(|n| n.is_intro)
    }

    /// The first introduction node, which starts the board's flow.
    pub fn intro_node(&self) -> Option<&'a Node> {
        self.elements().find(|n| n.is_intro)
    }

    pub fn exit_nodes(&self) -> Vec<&'a Node> {
        self.elements().filter(|n| n.is_exit()).collect()
    }

    pub fn nodes_with_flexible_subtype(&self, subtype: &str) -> Vec<&'a Node> {
        self.elements()
            .filter(|n| n.flexible_subtype() == Some(subtype))
            .collect()
    }

    /// Topic clusters computed by validation. Empty for boards without an intro.
    pub fn topic_clusters(&self) -> &'a TopicClusters {
        &self.board.topic_clusters
    }
}
