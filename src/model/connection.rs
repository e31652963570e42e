use crate::source::ConnectionKind;

/// A typed, directed edge between two nodes.
///
/// Standard connections resolve their endpoints against the owning board only.
/// Move-on connections resolve across the whole document and are owned by the
/// board of their source node.
#[derive(Debug, Clone)]
pub struct Connection {
    pub uuid: String,
    pub kind: ConnectionKind,
    /// Uuid of the owning board.
    pub board: String,
    /// Uuid of the resolved source node.
    pub source: Option<String>,
    /// Uuid of the resolved destination node.
    pub destination: Option<String>,
    /// Source uuid as written in the payload, resolved or not.
    pub declared_source: Option<String>,
    /// Destination uuid as written in the payload, resolved or not.
    pub declared_destination: Option<String>,
    /// Connection name; the move name for move-on connections.
    pub name: String,
    pub pattern: Option<String>,
    filled: bool,
}

impl Connection {
    pub(crate) fn skeleton(kind: ConnectionKind, uuid: &str, board: &str) -> Self {
        Self {
            uuid: uuid.to_string(),
            kind,
            board: board.to_string(),
            source: None,
            destination: None,
            declared_source: None,
            declared_destination: None,
            name: String::new(),
            pattern: None,
            filled: false,
        }
    }

    pub(crate) fn mark_filled(&mut self) {
        self.filled = true;
    }

    pub fn is_filled(&self) -> bool {
        self.filled
    }

    pub fn is_move_on(&self) -> bool {
        self.kind == ConnectionKind::MoveOn
    }

    /// Both endpoints resolved.
    pub fn is_resolved(&self) -> bool {
        self.source.is_some() && self.destination.is_some()
    }
}
