//! Knowledge node entity
//!
//! Core record type for the knowledge graph: a titled, tagged text entry
//! with outgoing links to other nodes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for knowledge nodes
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct NodeId(pub Uuid);

impl NodeId {
    /// Create a new random NodeId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from existing UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for NodeId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Freeform per-node metadata sidecar.
///
/// The core stores and round-trips whatever the caller attaches but assigns
/// no meaning to the keys. Fields like `category`, `color` or `importance`
/// are conventions owned by the data-seeding layer.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// A single knowledge record.
///
/// `links` holds outgoing references by id. Entries may point at nodes that
/// no longer exist ("broken links") — that is an expected transient state,
/// resolved through the link-integrity operations on
/// [`KnowledgeGraph`](crate::graph::KnowledgeGraph).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeNode {
    /// Unique identifier, immutable for the node's lifetime
    pub id: NodeId,
    /// Display title (not enforced unique or non-empty at this layer)
    pub title: String,
    /// Free-form text body
    pub content: String,
    /// Searchable tags, insertion order preserved
    #[serde(default)]
    pub tags: Vec<String>,
    /// Outgoing links to other nodes
    #[serde(default)]
    pub links: Vec<NodeId>,
    /// Set once at construction
    pub created_at: DateTime<Utc>,
    /// Refreshed on every mutating operation, including link changes
    pub updated_at: DateTime<Utc>,
    /// Uninterpreted metadata sidecar
    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    pub metadata: Metadata,
}

impl KnowledgeNode {
    /// Create a new node with a fresh id and both timestamps set to now.
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: NodeId::new(),
            title: title.into(),
            content: content.into(),
            tags: Vec::new(),
            links: Vec::new(),
            created_at: now,
            updated_at: now,
            metadata: Metadata::new(),
        }
    }

    /// Use an existing id instead of a generated one (save/load round trips
    /// depend on id stability).
    pub fn with_id(mut self, id: NodeId) -> Self {
        self.id = id;
        self
    }

    /// Add a tag
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Replace all tags
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    /// Add an outgoing link
    pub fn with_link(mut self, id: NodeId) -> Self {
        self.links.push(id);
        self
    }

    /// Replace all links
    pub fn with_links(mut self, links: Vec<NodeId>) -> Self {
        self.links = links;
        self
    }

    /// Replace the metadata sidecar
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Mark the node as modified now.
    pub(crate) fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Case-insensitive check for an exact tag match.
    pub fn has_tag(&self, tag: &str) -> bool {
        let needle = tag.to_lowercase();
        self.tags.iter().any(|t| t.to_lowercase() == needle)
    }
}
