//! Star Tactics knowledge core
//!
//! Small in-memory graph of titled, tagged text entries connected by
//! bidirectional links, persisted to a flat JSON file and exposed through
//! a read-oriented query surface.
//!
//! ## Features
//!
//! - **Write-through persistence** - every mutation is durably saved
//!   before the call returns, via an optional storage backend
//! - **Link integrity** - symmetric bidirectional links, broken-link
//!   detection after deletions, explicit repair
//! - **Scan search** - case-insensitive tag-AND and free-text search plus
//!   a derived statistics view for the query layer
//!
//! ## Example
//!
//! ```
//! use star_tactics::{JsonStorage, KnowledgeGraph};
//! use std::sync::Arc;
//!
//! # fn main() -> star_tactics::Result<()> {
//! # let dir = tempfile::TempDir::new().unwrap();
//! let storage = Arc::new(JsonStorage::new(dir.path().join("knowledge_base.json")));
//! let mut kb = KnowledgeGraph::with_storage(storage)?;
//!
//! let python = kb.create(
//!     "Python Programming",
//!     "Python is a high-level programming language",
//!     vec!["python".into(), "programming".into()],
//!     vec![],
//! )?;
//! let ml = kb.create("Machine Learning", "Learning from data", vec![], vec![])?;
//!
//! kb.add_bidirectional_link(&python, &ml)?;
//! assert!(kb.validate_links(&python));
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod graph;
pub mod links;
pub mod node;
pub mod search;
pub mod storage;

// Re-exports for convenience
pub use error::{KnowledgeError, Result};
pub use graph::{KnowledgeGraph, UpdateNode};
pub use node::{KnowledgeNode, Metadata, NodeId};
pub use search::GraphStats;
pub use storage::{JsonStorage, StorageBackend};
