//! Link integrity: bidirectional link maintenance and repair
//!
//! A link between A and B is stored as two independent entries (B's id in
//! A's `links` and vice versa), not as an edge object. These operations
//! keep the two sides symmetric, find dangling references left behind by
//! deletions, and remove them.
//!
//! Persistence rule: a link operation writes through to storage if and
//! only if it actually changed a node. A pure idempotent re-add succeeds
//! without touching `updated_at` or the durable file.

use std::collections::BTreeMap;

use crate::error::Result;
use crate::graph::KnowledgeGraph;
use crate::node::NodeId;

impl KnowledgeGraph {
    /// Ensure `a` and `b` link to each other.
    ///
    /// Returns `Ok(false)` if either id is unknown. Appends each direction
    /// only if not already present, so repeated calls never create
    /// duplicate entries. `updated_at` is bumped and the collection saved
    /// only when at least one side changed.
    pub fn add_bidirectional_link(&mut self, a: &NodeId, b: &NodeId) -> Result<bool> {
        if !self.nodes().contains_key(a) || !self.nodes().contains_key(b) {
            return Ok(false);
        }

        let mut changed = false;
        if let Some(node_a) = self.nodes_mut().get_mut(a) {
            if !node_a.links.contains(b) {
                node_a.links.push(*b);
                node_a.touch();
                changed = true;
            }
        }
        if let Some(node_b) = self.nodes_mut().get_mut(b) {
            if !node_b.links.contains(a) {
                node_b.links.push(*a);
                node_b.touch();
                changed = true;
            }
        }

        if changed {
            self.persist_changes()?;
        }
        Ok(true)
    }

    /// Remove the links between `a` and `b` in both directions.
    ///
    /// Returns `Ok(false)` if either id is unknown. As with adding,
    /// `updated_at` and storage are touched only on actual change.
    pub fn remove_bidirectional_link(&mut self, a: &NodeId, b: &NodeId) -> Result<bool> {
        if !self.nodes().contains_key(a) || !self.nodes().contains_key(b) {
            return Ok(false);
        }

        let mut changed = false;
        if let Some(node_a) = self.nodes_mut().get_mut(a) {
            if let Some(pos) = node_a.links.iter().position(|id| id == b) {
                node_a.links.remove(pos);
                node_a.touch();
                changed = true;
            }
        }
        if let Some(node_b) = self.nodes_mut().get_mut(b) {
            if let Some(pos) = node_b.links.iter().position(|id| id == a) {
                node_b.links.remove(pos);
                node_b.touch();
                changed = true;
            }
        }

        if changed {
            self.persist_changes()?;
        }
        Ok(true)
    }

    /// True iff the node exists and every entry in its `links` resolves to
    /// an existing node.
    pub fn validate_links(&self, id: &NodeId) -> bool {
        match self.get(id) {
            Some(node) => node.links.iter().all(|link| self.nodes().contains_key(link)),
            None => false,
        }
    }

    /// The subset of a node's `links` that do not resolve, in original
    /// order. Empty if the id is unknown.
    pub fn get_broken_links(&self, id: &NodeId) -> Vec<NodeId> {
        let Some(node) = self.get(id) else {
            return Vec::new();
        };
        node.links
            .iter()
            .filter(|link| !self.nodes().contains_key(link))
            .copied()
            .collect()
    }

    /// Scan every node for broken links. Nodes with none are omitted.
    pub fn get_all_broken_links(&self) -> BTreeMap<NodeId, Vec<NodeId>> {
        self.nodes()
            .keys()
            .filter_map(|id| {
                let broken = self.get_broken_links(id);
                (!broken.is_empty()).then_some((*id, broken))
            })
            .collect()
    }

    /// Remove every currently-broken link from the node in place, returning
    /// the count removed (0 if none, or if the id is unknown).
    ///
    /// One-sided cleanup: if A links to a deleted B, only A is repaired —
    /// there is no B left to fix.
    pub fn fix_broken_links(&mut self, id: &NodeId) -> Result<usize> {
        let broken = self.get_broken_links(id);
        if broken.is_empty() {
            return Ok(0);
        }

        if let Some(node) = self.nodes_mut().get_mut(id) {
            node.links.retain(|link| !broken.contains(link));
            node.touch();
        }
        self.persist_changes()?;

        log::debug!("removed {} broken links from {}", broken.len(), id);
        Ok(broken.len())
    }
}
