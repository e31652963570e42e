//! The built entity graph.

pub mod board;
pub mod cluster;
pub mod connection;
pub mod document;
pub mod node;

pub use board::{Board, BoardKind, BoardRef, ExcludedBoard};
pub use cluster::{TopicCluster, TopicClusters};
pub use connection::Connection;
pub use document::{
    DEFAULT_DOCUMENT_EXIT, Document, DocumentStatus, EXPLICIT_EXITS_INFO_KEY,
    LEGACY_EXIT_INFO_KEY,
};
pub use node::{ExitKind, Node, NodePayload};
