//! Read-oriented query surface: tag/text search, edge list, statistics
//!
//! Everything here is a pure scan over the graph — no index structures and
//! no backend interaction. This is the surface the HTTP query layer is
//! built on.

use std::collections::{BTreeMap, BTreeSet};

use crate::graph::KnowledgeGraph;
use crate::node::{KnowledgeNode, NodeId};

/// Derived count view over the whole graph.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct GraphStats {
    /// Number of nodes
    pub total_nodes: usize,
    /// Number of link endpoints (sum of every node's `links` length, so a
    /// bidirectional link counts twice)
    pub total_links: usize,
    /// `total_links / total_nodes`, 0.0 for an empty graph
    pub average_links_per_node: f64,
    /// Node counts per `"category"` metadata value; nodes without the key
    /// are not counted
    pub categories: BTreeMap<String, usize>,
}

impl KnowledgeGraph {
    /// Find nodes carrying **all** of the given tags (case-insensitive
    /// exact match per tag). An empty tag list matches every node.
    pub fn search_by_tags<S: AsRef<str>>(&self, tags: &[S]) -> Vec<&KnowledgeNode> {
        self.list_all()
            .into_iter()
            .filter(|node| tags.iter().all(|tag| node.has_tag(tag.as_ref())))
            .collect()
    }

    /// Find nodes whose title or content contains the query as a
    /// case-insensitive substring. An empty query matches every node.
    pub fn search_by_text(&self, query: &str) -> Vec<&KnowledgeNode> {
        let needle = query.to_lowercase();
        self.list_all()
            .into_iter()
            .filter(|node| {
                node.title.to_lowercase().contains(&needle)
                    || node.content.to_lowercase().contains(&needle)
            })
            .collect()
    }

    /// Undirected edge list for graph visualisation.
    ///
    /// Each bidirectional link appears once, as a pair ordered by id; the
    /// list itself is sorted. Links whose target does not exist are
    /// skipped — broken links are a repair concern, not an edge.
    pub fn edges(&self) -> Vec<(NodeId, NodeId)> {
        let mut seen = BTreeSet::new();
        for node in self.list_all() {
            for link in &node.links {
                if self.get(link).is_none() {
                    continue;
                }
                let pair = if node.id <= *link {
                    (node.id, *link)
                } else {
                    (*link, node.id)
                };
                seen.insert(pair);
            }
        }
        seen.into_iter().collect()
    }

    /// Compute the derived statistics view.
    pub fn stats(&self) -> GraphStats {
        let nodes = self.list_all();
        let total_nodes = nodes.len();
        let total_links: usize = nodes.iter().map(|n| n.links.len()).sum();

        let mut categories: BTreeMap<String, usize> = BTreeMap::new();
        for node in &nodes {
            if let Some(category) = node.metadata.get("category").and_then(|v| v.as_str()) {
                *categories.entry(category.to_string()).or_insert(0) += 1;
            }
        }

        GraphStats {
            total_nodes,
            total_links,
            average_links_per_node: if total_nodes > 0 {
                total_links as f64 / total_nodes as f64
            } else {
                0.0
            },
            categories,
        }
    }
}
