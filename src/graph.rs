//! Knowledge graph: node collection ownership and CRUD
//!
//! The graph owns the id-to-node map and delegates durability to an
//! optionally attached [`StorageBackend`]. Every mutating operation goes
//! through a single persist hook that is a no-op without a backend, so the
//! in-memory state and the durable file never drift for longer than one
//! failed save.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::Result;
use crate::node::{KnowledgeNode, Metadata, NodeId};
use crate::storage::StorageBackend;

/// Field replacements for [`KnowledgeGraph::update`].
///
/// Provided fields replace the node's attribute wholesale; `None` fields
/// are left untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateNode {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
    pub links: Option<Vec<NodeId>>,
}

impl UpdateNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn tags(mut self, tags: Vec<String>) -> Self {
        self.tags = Some(tags);
        self
    }

    pub fn links(mut self, links: Vec<NodeId>) -> Self {
        self.links = Some(links);
        self
    }
}

/// The knowledge graph: a collection of nodes connected by bidirectional
/// links, with synchronous write-through persistence.
///
/// Not-found conditions are signaled through `Option`/`bool` returns; the
/// `Result` wrapper on mutators only carries storage failures.
pub struct KnowledgeGraph {
    nodes: BTreeMap<NodeId, KnowledgeNode>,
    storage: Option<Arc<dyn StorageBackend>>,
}

impl KnowledgeGraph {
    /// Create an empty graph with no storage attached. Mutations stay
    /// in-memory only.
    pub fn new() -> Self {
        Self {
            nodes: BTreeMap::new(),
            storage: None,
        }
    }

    /// Create a graph backed by the given storage, loading any existing
    /// durable state. A backend with no prior state yields an empty graph.
    pub fn with_storage(storage: Arc<dyn StorageBackend>) -> Result<Self> {
        let mut graph = Self {
            nodes: BTreeMap::new(),
            storage: Some(storage),
        };
        graph.reload()?;
        Ok(graph)
    }

    /// Discard in-memory contents and repopulate from the attached
    /// backend's durable state. Without a backend, or without prior durable
    /// state, the graph is left unchanged.
    pub fn reload(&mut self) -> Result<()> {
        let Some(storage) = &self.storage else {
            return Ok(());
        };
        if let Some(nodes) = storage.load()? {
            log::info!("loaded {} nodes from storage", nodes.len());
            self.nodes = nodes;
        }
        Ok(())
    }

    /// Write the full collection through the attached backend. No-op when
    /// no backend is configured.
    fn persist(&self) -> Result<()> {
        match &self.storage {
            Some(storage) => storage.save(&self.nodes),
            None => Ok(()),
        }
    }

    /// Create a new node and return its id.
    ///
    /// The logical operation never fails; the `Result` carries only a
    /// post-mutation save failure.
    pub fn create(
        &mut self,
        title: impl Into<String>,
        content: impl Into<String>,
        tags: Vec<String>,
        links: Vec<NodeId>,
    ) -> Result<NodeId> {
        self.insert(
            KnowledgeNode::new(title, content)
                .with_tags(tags)
                .with_links(links),
        )
    }

    /// Insert a pre-built node, keyed by its own id.
    ///
    /// This is the door for seed loaders that attach metadata or reuse ids
    /// at construction time. An existing node under the same id is
    /// replaced.
    pub fn insert(&mut self, node: KnowledgeNode) -> Result<NodeId> {
        let id = node.id;
        self.nodes.insert(id, node);
        self.persist()?;
        Ok(id)
    }

    /// Get a node by id. Pure lookup, no backend interaction.
    pub fn get(&self, id: &NodeId) -> Option<&KnowledgeNode> {
        self.nodes.get(id)
    }

    /// Replace the provided fields of an existing node wholesale.
    ///
    /// Refreshes `updated_at` and saves on success. Returns `Ok(false)` if
    /// the id is unknown.
    pub fn update(&mut self, id: &NodeId, changes: UpdateNode) -> Result<bool> {
        let Some(node) = self.nodes.get_mut(id) else {
            return Ok(false);
        };
        if let Some(title) = changes.title {
            node.title = title;
        }
        if let Some(content) = changes.content {
            node.content = content;
        }
        if let Some(tags) = changes.tags {
            node.tags = tags;
        }
        if let Some(links) = changes.links {
            node.links = links;
        }
        node.touch();
        self.persist()?;
        Ok(true)
    }

    /// Replace a node's metadata sidecar wholesale.
    ///
    /// Metadata is stored uninterpreted; this is the bulk-attach operation
    /// used by seed loaders. Returns `Ok(false)` if the id is unknown.
    pub fn set_metadata(&mut self, id: &NodeId, metadata: Metadata) -> Result<bool> {
        let Some(node) = self.nodes.get_mut(id) else {
            return Ok(false);
        };
        node.metadata = metadata;
        node.touch();
        self.persist()?;
        Ok(true)
    }

    /// Remove a node. Returns `Ok(false)` if the id is unknown.
    ///
    /// Deletion does **not** cascade: other nodes keep this id in their
    /// `links`, leaving dangling references to be found and repaired via
    /// the link-integrity operations. This keeps deletion O(log n) with no
    /// reverse-index scan.
    pub fn delete(&mut self, id: &NodeId) -> Result<bool> {
        if self.nodes.remove(id).is_none() {
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    /// All nodes, in the graph's stable iteration order (sorted by id).
    pub fn list_all(&self) -> Vec<&KnowledgeNode> {
        self.nodes.values().collect()
    }

    /// Number of nodes in the graph.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub(crate) fn nodes(&self) -> &BTreeMap<NodeId, KnowledgeNode> {
        &self.nodes
    }

    pub(crate) fn nodes_mut(&mut self) -> &mut BTreeMap<NodeId, KnowledgeNode> {
        &mut self.nodes
    }

    pub(crate) fn persist_changes(&self) -> Result<()> {
        self.persist()
    }
}

impl Default for KnowledgeGraph {
    fn default() -> Self {
        Self::new()
    }
}
