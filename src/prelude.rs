//! Prelude module for convenient imports
//!
//! Re-exports the types needed to build a document and walk the result.
//!
//! # Example
//!
//! ```rust,no_run
//! use empath::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let json = std::fs::read_to_string("path/to/document.chatModule")?;
//! let document = Compiler::from_json_str(&json)?.build().compile()?;
//!
//! let intro_boards = document.boards().filter(|b| b.has_intro()).count();
//! println!("{} board(s) with an intro", intro_boards);
//! # Ok(())
//! # }
//! ```

// Building
pub use crate::cache::{BuildCache, MemoryCache};
pub use crate::compiler::{BuildOptions, Compiler, CompilerBuilder, ExitRequirement, NameScope};

// Entity model
pub use crate::model::{
    Board, BoardRef, Connection, Document, ExcludedBoard, ExitKind, Node, NodePayload,
    TopicCluster, TopicClusters,
};
pub use crate::source::{ConnectionKind, ElementKind, RawDocument};

// Errors
pub use crate::error::{BuildError, ErrorKind, Location};

// Export
pub use crate::visualizer::to_dot;

pub use std::path::Path;

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
