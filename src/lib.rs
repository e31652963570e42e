//! # EmPath - Dialogue Document Graph Compiler
//!
//! **EmPath** turns a designer-authored dialogue document (a JSON file of boards, nodes
//! and connections) into a validated, cross-referenced graph that a renderer can walk
//! without ever seeing a dangling reference.
//!
//! ## Core Workflow
//!
//! A build runs four passes over one document and either returns the finished
//! [`Document`](model::Document) or the first [`BuildError`](error::BuildError):
//!
//! 1.  **Skeleton**: Every board listed in the file becomes a `Board` or an `ExcludedBoard`.
//!     Nodes and connections listed on active boards are created empty, with their display names.
//! 2.  **Resolve**: The document-level tables fill every skeleton. Move-on connections,
//!     which boards never list, are created here and owned by their source node's board.
//! 3.  **Sort**: Boards are stably sorted by their declared `order`.
//! 4.  **Validate**: Boards with an introduction node are checked for duplicate names,
//!     unresolved connections and missing exits, and are grouped into topic clusters.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use empath::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let mut cache = MemoryCache::new();
//!     let path = Path::new("conversations/greeting.chatModule");
//!
//!     let document = Compiler::from_file(path, &mut cache)?
//!         .with_name_scope(NameScope::Board)
//!         .build()
//!         .compile()?;
//!
//!     for board in document.boards() {
//!         println!("{}: {} node(s)", board.name(), board.elements().count());
//!     }
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod compiler;
pub mod error;
pub mod model;
pub mod prelude;
pub mod source;
pub mod visualizer;
