//! Durable storage for the knowledge graph
//!
//! A backend serializes the full node collection; every save is a
//! full-collection rewrite, so cost is O(total nodes) regardless of
//! mutation size. The concrete [`JsonStorage`] writes one pretty-printed
//! JSON document with a top-level `nodes` map keyed by id.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::node::{KnowledgeNode, Metadata, NodeId};

/// Durable-storage capability attached to a graph instance.
///
/// `save` must be total and synchronous: once it returns `Ok`, a `load`
/// on a fresh graph reconstructs an equivalent collection. `load` returns
/// `Ok(None)` when no prior durable state exists, which leaves the calling
/// graph unchanged.
pub trait StorageBackend: Send + Sync {
    /// Write the full node collection to durable storage.
    fn save(&self, nodes: &BTreeMap<NodeId, KnowledgeNode>) -> Result<()>;

    /// Read the node collection back, or `None` on first run.
    fn load(&self) -> Result<Option<BTreeMap<NodeId, KnowledgeNode>>>;
}

/// On-disk node record. The id lives in the surrounding map key, not the
/// record itself.
#[derive(Debug, Serialize, Deserialize)]
struct NodeRecord {
    title: String,
    content: String,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    links: Vec<NodeId>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    metadata: Metadata,
}

impl NodeRecord {
    fn from_node(node: &KnowledgeNode) -> Self {
        Self {
            title: node.title.clone(),
            content: node.content.clone(),
            tags: node.tags.clone(),
            links: node.links.clone(),
            created_at: node.created_at,
            updated_at: node.updated_at,
            metadata: node.metadata.clone(),
        }
    }

    fn into_node(self, id: NodeId) -> KnowledgeNode {
        KnowledgeNode {
            id,
            title: self.title,
            content: self.content,
            tags: self.tags,
            links: self.links,
            created_at: self.created_at,
            updated_at: self.updated_at,
            metadata: self.metadata,
        }
    }
}

/// Top-level durable document.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Document {
    nodes: BTreeMap<NodeId, NodeRecord>,
}

/// JSON file storage backend.
///
/// Absence of the file is equivalent to an empty collection; any IO or
/// parse failure propagates to the caller. A corrupt file is fatal to the
/// load call — no partial recovery is attempted.
pub struct JsonStorage {
    path: PathBuf,
}

impl JsonStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StorageBackend for JsonStorage {
    fn save(&self, nodes: &BTreeMap<NodeId, KnowledgeNode>) -> Result<()> {
        let document = Document {
            nodes: nodes
                .iter()
                .map(|(id, node)| (*id, NodeRecord::from_node(node)))
                .collect(),
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(&document)?;
        fs::write(&self.path, json)?;
        log::debug!("saved {} nodes to {}", nodes.len(), self.path.display());
        Ok(())
    }

    fn load(&self) -> Result<Option<BTreeMap<NodeId, KnowledgeNode>>> {
        if !self.path.exists() {
            log::debug!("no durable state at {}", self.path.display());
            return Ok(None);
        }

        let json = fs::read_to_string(&self.path)?;
        let document: Document = serde_json::from_str(&json)?;

        let nodes = document
            .nodes
            .into_iter()
            .map(|(id, record)| (id, record.into_node(id)))
            .collect::<BTreeMap<_, _>>();

        log::info!("read {} nodes from {}", nodes.len(), self.path.display());
        Ok(Some(nodes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::KnowledgeError;
    use crate::graph::{KnowledgeGraph, UpdateNode};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn storage_in(dir: &TempDir) -> Arc<JsonStorage> {
        Arc::new(JsonStorage::new(dir.path().join("knowledge_base.json")))
    }

    #[test]
    fn test_load_missing_file_is_noop() {
        let dir = TempDir::new().unwrap();
        let storage = storage_in(&dir);

        assert!(storage.load().unwrap().is_none());

        let kb = KnowledgeGraph::with_storage(storage).unwrap();
        assert!(kb.is_empty());
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let storage = JsonStorage::new(dir.path().join("deeply/nested/kb.json"));

        storage.save(&BTreeMap::new()).unwrap();
        assert!(storage.path().exists());
    }

    #[test]
    fn test_round_trip_preserves_all_fields() {
        let dir = TempDir::new().unwrap();
        let storage = storage_in(&dir);

        let mut kb = KnowledgeGraph::with_storage(storage.clone()).unwrap();
        let a = kb
            .create(
                "Python Programming",
                "A high-level language",
                vec!["python".into(), "programming".into()],
                vec![],
            )
            .unwrap();
        let b = kb
            .create("星空観測", "夜空のガイド", vec!["星空".into()], vec![])
            .unwrap();
        let c = kb.create("Web", "Frameworks", vec![], vec![]).unwrap();
        kb.add_bidirectional_link(&a, &b).unwrap();
        kb.add_bidirectional_link(&b, &c).unwrap();

        let reloaded = KnowledgeGraph::with_storage(storage).unwrap();
        assert_eq!(reloaded.len(), 3);

        for original in kb.list_all() {
            let loaded = reloaded.get(&original.id).expect("id preserved");
            // Per-field equality, timestamps included
            assert_eq!(loaded, original);
        }
    }

    #[test]
    fn test_round_trip_preserves_metadata() {
        let dir = TempDir::new().unwrap();
        let storage = storage_in(&dir);

        let mut kb = KnowledgeGraph::with_storage(storage.clone()).unwrap();
        let id = kb.create("T", "C", vec![], vec![]).unwrap();
        let mut meta = Metadata::new();
        meta.insert("category".into(), serde_json::json!("astronomy"));
        meta.insert("importance".into(), serde_json::json!(3));
        kb.set_metadata(&id, meta).unwrap();

        let reloaded = KnowledgeGraph::with_storage(storage).unwrap();
        let node = reloaded.get(&id).unwrap();
        assert_eq!(node.metadata["category"], "astronomy");
        assert_eq!(node.metadata["importance"], 3);
    }

    #[test]
    fn test_every_mutation_is_written_through() {
        let dir = TempDir::new().unwrap();
        let storage = storage_in(&dir);

        let mut kb = KnowledgeGraph::with_storage(storage.clone()).unwrap();
        let a = kb.create("A", "a", vec![], vec![]).unwrap();
        let b = kb.create("B", "b", vec![], vec![]).unwrap();

        kb.add_bidirectional_link(&a, &b).unwrap();
        let fresh = KnowledgeGraph::with_storage(storage.clone()).unwrap();
        assert!(fresh.get(&a).unwrap().links.contains(&b));
        assert!(fresh.get(&b).unwrap().links.contains(&a));

        kb.remove_bidirectional_link(&a, &b).unwrap();
        let fresh = KnowledgeGraph::with_storage(storage.clone()).unwrap();
        assert!(fresh.get(&a).unwrap().links.is_empty());
        assert!(fresh.get(&b).unwrap().links.is_empty());

        kb.update(&a, UpdateNode::new().title("renamed")).unwrap();
        kb.delete(&b).unwrap();
        let fresh = KnowledgeGraph::with_storage(storage).unwrap();
        assert_eq!(fresh.get(&a).unwrap().title, "renamed");
        assert!(fresh.get(&b).is_none());
    }

    #[test]
    fn test_fix_broken_links_is_written_through() {
        let dir = TempDir::new().unwrap();
        let storage = storage_in(&dir);

        let mut kb = KnowledgeGraph::with_storage(storage.clone()).unwrap();
        let a = kb.create("A", "a", vec![], vec![]).unwrap();
        let b = kb.create("B", "b", vec![], vec![]).unwrap();
        kb.add_bidirectional_link(&a, &b).unwrap();
        kb.delete(&b).unwrap();
        assert_eq!(kb.fix_broken_links(&a).unwrap(), 1);

        let fresh = KnowledgeGraph::with_storage(storage).unwrap();
        assert!(fresh.get(&a).unwrap().links.is_empty());
    }

    #[test]
    fn test_reload_clears_existing_nodes() {
        let dir = TempDir::new().unwrap();
        let storage = storage_in(&dir);

        // Persist one node.
        let mut writer = KnowledgeGraph::with_storage(storage.clone()).unwrap();
        let persisted = writer.create("Durable", "d", vec![], vec![]).unwrap();

        // A second graph gains an in-memory-only node, then reloads.
        let mut kb = KnowledgeGraph::with_storage(storage).unwrap();
        let transient = KnowledgeNode::new("Transient", "t");
        let transient_id = transient.id;
        kb.nodes_mut().insert(transient_id, transient);

        kb.reload().unwrap();
        assert!(kb.get(&transient_id).is_none());
        assert!(kb.get(&persisted).is_some());
    }

    #[test]
    fn test_malformed_file_is_fatal() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("kb.json");
        fs::write(&path, "{ this is not json").unwrap();

        let storage = JsonStorage::new(&path);
        let err = storage.load().unwrap_err();
        assert!(matches!(err, KnowledgeError::Json(_)));
    }

    #[test]
    fn test_schema_mismatch_is_fatal() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("kb.json");
        // Valid JSON, wrong shape: node record missing required fields.
        fs::write(&path, r#"{"nodes": {"not-a-uuid": {"title": "x"}}}"#).unwrap();

        let storage = JsonStorage::new(&path);
        assert!(storage.load().is_err());
    }

    #[test]
    fn test_document_shape() {
        let dir = TempDir::new().unwrap();
        let storage = storage_in(&dir);

        let mut kb = KnowledgeGraph::with_storage(storage.clone()).unwrap();
        let id = kb
            .create("Title", "Content", vec!["tag".into()], vec![])
            .unwrap();

        let raw = fs::read_to_string(storage.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();

        let record = &value["nodes"][id.to_string()];
        assert_eq!(record["title"], "Title");
        assert_eq!(record["content"], "Content");
        assert_eq!(record["tags"][0], "tag");
        assert!(record["links"].as_array().unwrap().is_empty());
        // RFC 3339 timestamps round-trip losslessly
        assert!(record["created_at"].as_str().unwrap().contains('T'));
        assert!(record["updated_at"].as_str().unwrap().contains('T'));
        // The id is the map key, not a record field
        assert!(record.get("id").is_none());
    }
}
