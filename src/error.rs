use std::fmt;
use thiserror::Error;

/// Where in a source document an error was detected.
///
/// Every field is optional; `Display` only renders the parts that are known, so a
/// document-level error prints just the file while a node-level error also names
/// the board and the node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    pub file: Option<String>,
    pub board_name: Option<String>,
    pub board_uuid: Option<String>,
    pub entity_uuid: Option<String>,
    pub field: Option<String>,
}

impl Location {
    pub fn in_file(file: Option<&str>) -> Self {
        Self {
            file: file.map(str::to_string),
            ..Self::default()
        }
    }

    pub fn with_board(mut self, uuid: &str, name: &str) -> Self {
        self.board_uuid = Some(uuid.to_string());
        self.board_name = Some(name.to_string());
        self
    }

    pub fn with_entity(mut self, uuid: &str) -> Self {
        self.entity_uuid = Some(uuid.to_string());
        self
    }

    pub fn with_field(mut self, field: &str) -> Self {
        self.field = Some(field.to_string());
        self
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(file) = &self.file {
            parts.push(format!("file://{}", file));
        }
        match (&self.board_name, &self.board_uuid) {
            (Some(name), Some(uuid)) => parts.push(format!("board '{}' ({})", name, uuid)),
            (None, Some(uuid)) => parts.push(format!("board {}", uuid)),
            (Some(name), None) => parts.push(format!("board '{}'", name)),
            (None, None) => {}
        }
        if let Some(uuid) = &self.entity_uuid {
            parts.push(format!("uuid {}", uuid));
        }
        if let Some(field) = &self.field {
            parts.push(format!("field '{}'", field));
        }
        if parts.is_empty() {
            write!(f, "<unknown location>")
        } else {
            write!(f, "{}", parts.join(", "))
        }
    }
}

/// Which end of a connection failed to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Source,
    Destination,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Source => write!(f, "source"),
            Endpoint::Destination => write!(f, "destination"),
        }
    }
}

/// Fieldless mirror of [`BuildError`] for matching without destructuring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    JsonParse,
    Io,
    MissingRequiredField,
    MissingTopLevelEntry,
    MalformedPayload,
    DanglingElementReference,
    DanglingConnectionReference,
    DuplicateEntity,
    DuplicateNodeName,
    UnresolvedConnectionEndpoint,
    MissingRequiredExit,
    MissingCompletionNode,
    UnconnectedCompletionNode,
    InvalidExclusionReference,
    UnknownBoard,
    InvalidStartBoard,
}

/// Errors that can occur while building a document graph.
///
/// Every error is fatal to the document being built.
#[derive(Error, Debug, Clone)]
pub enum BuildError {
    #[error("Failed to parse document JSON: {message} ({location})")]
    JsonParseError { message: String, location: Location },

    #[error("Failed to read '{path}': {message}")]
    Io { path: String, message: String },

    #[error("Required field '{field}' is missing or empty ({location})")]
    MissingRequiredField { field: String, location: Location },

    #[error(
        "Element uuid '{uuid}' is listed under '{type_key}' but not found in the document's top-level '{type_key}' table ({location})"
    )]
    MissingTopLevelEntry {
        uuid: String,
        type_key: String,
        location: Location,
    },

    #[error("Payload of '{uuid}' (type: {type_key}) is malformed: {message} ({location})")]
    MalformedPayload {
        uuid: String,
        type_key: String,
        message: String,
        location: Location,
    },

    #[error(
        "Element '{uuid}' (type: {type_key}) was not found on any boards (including excluded boards), some data is lost ({location})"
    )]
    DanglingElementReference {
        uuid: String,
        type_key: String,
        location: Location,
    },

    #[error(
        "Connection '{uuid}' (type: {type_key}) was not found on any boards (including excluded boards) ({location})"
    )]
    DanglingConnectionReference {
        uuid: String,
        type_key: String,
        location: Location,
    },

    #[error(
        "Uuid '{uuid}' is owned by more than one board, first by board '{first_board}' ({location})"
    )]
    DuplicateEntity {
        uuid: String,
        first_board: String,
        location: Location,
    },

    #[error(
        "Node name '{name}' is used by both '{first_uuid}' and '{second_uuid}' ({duplicates} duplicate name(s) found) ({location})"
    )]
    DuplicateNodeName {
        name: String,
        first_uuid: String,
        second_uuid: String,
        duplicates: usize,
        location: Location,
    },

    #[error("Connection '{uuid}' has no resolved {endpoint} node '{target}' ({location})")]
    UnresolvedConnectionEndpoint {
        uuid: String,
        endpoint: Endpoint,
        target: String,
        location: Location,
    },

    #[error(
        "Document uses explicit exits but no {required} exit node is reachable, out of {exit_nodes_found} exit node(s) found ({location})"
    )]
    MissingRequiredExit {
        required: String,
        exit_nodes_found: usize,
        location: Location,
    },

    #[error("Document requires at least one '{subtype}' node, none were found ({location})")]
    MissingCompletionNode { subtype: String, location: Location },

    #[error(
        "None of the {nodes_found} '{subtype}' node(s) has both incoming and outgoing connections ({location})"
    )]
    UnconnectedCompletionNode {
        subtype: String,
        nodes_found: usize,
        location: Location,
    },

    #[error("'{reference}' cannot be used because it is marked as excluded ({location})")]
    InvalidExclusionReference {
        reference: String,
        location: Location,
    },

    #[error("Board '{name}' cannot be found in document ({location})")]
    UnknownBoard { name: String, location: Location },

    #[error("Board '{name}' cannot be used as a start board: {reason} ({location})")]
    InvalidStartBoard {
        name: String,
        reason: String,
        location: Location,
    },
}

impl BuildError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BuildError::JsonParseError { .. } => ErrorKind::JsonParse,
            BuildError::Io { .. } => ErrorKind::Io,
            BuildError::MissingRequiredField { .. } => ErrorKind::MissingRequiredField,
            BuildError::MissingTopLevelEntry { .. } => ErrorKind::MissingTopLevelEntry,
            BuildError::MalformedPayload { .. } => ErrorKind::MalformedPayload,
            BuildError::DanglingElementReference { .. } => ErrorKind::DanglingElementReference,
            BuildError::DanglingConnectionReference { .. } => {
                ErrorKind::DanglingConnectionReference
            }
            BuildError::DuplicateEntity { .. } => ErrorKind::DuplicateEntity,
            BuildError::DuplicateNodeName { .. } => ErrorKind::DuplicateNodeName,
            BuildError::UnresolvedConnectionEndpoint { .. } => {
                ErrorKind::UnresolvedConnectionEndpoint
            }
            BuildError::MissingRequiredExit { .. } => ErrorKind::MissingRequiredExit,
            BuildError::MissingCompletionNode { .. } => ErrorKind::MissingCompletionNode,
            BuildError::UnconnectedCompletionNode { .. } => ErrorKind::UnconnectedCompletionNode,
            BuildError::InvalidExclusionReference { .. } => ErrorKind::InvalidExclusionReference,
            BuildError::UnknownBoard { .. } => ErrorKind::UnknownBoard,
            BuildError::InvalidStartBoard { .. } => ErrorKind::InvalidStartBoard,
        }
    }

    /// The location context, if the error has one. `Io` errors only know their path.
    pub fn location(&self) -> Option<&Location> {
        match self {
            BuildError::Io { .. } => None,
            BuildError::JsonParseError { location, .. }
            | BuildError::MissingRequiredField { location, .. }
            | BuildError::MissingTopLevelEntry { location, .. }
            | BuildError::MalformedPayload { location, .. }
            | BuildError::DanglingElementReference { location, .. }
            | BuildError::DanglingConnectionReference { location, .. }
            | BuildError::DuplicateEntity { location, .. }
            | BuildError::DuplicateNodeName { location, .. }
            | BuildError::UnresolvedConnectionEndpoint { location, .. }
            | BuildError::MissingRequiredExit { location, .. }
            | BuildError::MissingCompletionNode { location, .. }
            | BuildError::UnconnectedCompletionNode { location, .. }
            | BuildError::InvalidExclusionReference { location, .. }
            | BuildError::UnknownBoard { location, .. }
            | BuildError::InvalidStartBoard { location, .. } => Some(location),
        }
    }
}
