//! Node storage for the dependency graph.
//!
//! The store keeps one [`DependencyNode`] per content ID and maintains both
//! directions of every edge:
//!
//! - **dependencies**: IDs the node points to (outgoing)
//! - **references**: IDs pointing to the node (incoming)
//!
//! `B ∈ A.dependencies ⇔ A ∈ B.references` holds after every public call,
//! because [`GraphStore::connect`] is the only way to create an edge and it
//! writes both sides or neither.

use crate::error::{Error, Result};
use crate::types::{ContentId, LocalId};
use std::collections::{HashMap, HashSet};

/// One item of the corpus, as known to the graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyNode {
    id: ContentId,
    local_id: Option<LocalId>,
    dependencies: HashSet<ContentId>,
    references: HashSet<ContentId>,
}

impl DependencyNode {
    fn new(id: ContentId) -> Self {
        Self {
            id,
            local_id: None,
            dependencies: HashSet::new(),
            references: HashSet::new(),
        }
    }

    /// Content ID of the node.
    #[must_use]
    pub fn id(&self) -> &ContentId {
        &self.id
    }

    /// Sub-object recorded when the node was discovered as an edge target.
    #[must_use]
    pub fn local_id(&self) -> Option<LocalId> {
        self.local_id
    }

    /// IDs this node depends on.
    #[must_use]
    pub fn dependencies(&self) -> &HashSet<ContentId> {
        &self.dependencies
    }

    /// IDs that depend on this node.
    #[must_use]
    pub fn references(&self) -> &HashSet<ContentId> {
        &self.references
    }

    /// Dependencies in sorted order, for stable output.
    #[must_use]
    pub fn sorted_dependencies(&self) -> Vec<&ContentId> {
        let mut ids: Vec<_> = self.dependencies.iter().collect();
        ids.sort();
        ids
    }

    /// References in sorted order, for stable output.
    #[must_use]
    pub fn sorted_references(&self) -> Vec<&ContentId> {
        let mut ids: Vec<_> = self.references.iter().collect();
        ids.sort();
        ids
    }
}

/// Owner of every [`DependencyNode`].
#[derive(Debug, Default)]
pub struct GraphStore {
    nodes: HashMap<ContentId, DependencyNode>,
}

impl GraphStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Discard every node.
    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    /// Return the node for `id`, inserting an empty one if it does not exist.
    pub fn create_or_get(&mut self, id: &ContentId) -> &DependencyNode {
        self.nodes
            .entry(id.clone())
            .or_insert_with(|| DependencyNode::new(id.clone()))
    }

    /// Look up a node without inserting.
    #[must_use]
    pub fn try_get(&self, id: &ContentId) -> Option<&DependencyNode> {
        self.nodes.get(id)
    }

    /// Iterate over all nodes in unspecified order.
    pub fn nodes(&self) -> impl Iterator<Item = &DependencyNode> {
        self.nodes.values()
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the store holds no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of distinct dependency edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.nodes.values().map(|n| n.dependencies.len()).sum()
    }

    /// Record the sub-object a node was last referenced through.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownNode`] if `id` was never created.
    pub fn set_local_id(&mut self, id: &ContentId, local_id: LocalId) -> Result<()> {
        let node = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| Error::UnknownNode(id.clone()))?;
        node.local_id = Some(local_id);
        Ok(())
    }

    /// Connect `from -> to`, writing both directions of the edge.
    ///
    /// Returns `true` if the edge is new. Self-loops are allowed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownNode`] if either node was never created; the
    /// store is left untouched in that case.
    pub fn connect(&mut self, from: &ContentId, to: &ContentId) -> Result<bool> {
        if !self.nodes.contains_key(to) {
            return Err(Error::UnknownNode(to.clone()));
        }
        let source = self
            .nodes
            .get_mut(from)
            .ok_or_else(|| Error::UnknownNode(from.clone()))?;
        let inserted = source.dependencies.insert(to.clone());

        // Checked above; the second lookup is needed because `from` may equal `to`.
        if let Some(target) = self.nodes.get_mut(to) {
            target.references.insert(from.clone());
        }
        Ok(inserted)
    }
}
