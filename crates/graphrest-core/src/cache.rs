use std::collections::HashMap;

use tracing::debug;

use crate::types::{Node, Relationship};
use crate::uri::{canonical, Remote};

/// Identity map from canonical resource URI to the single in-memory entity for that resource.
///
/// Owned by a [`Hydrator`](crate::hydrate::Hydrator); construct one per session and
/// [`clear`](IdentityCache::clear) it on session reset.
#[derive(Debug, Default)]
pub struct IdentityCache {
    nodes: HashMap<String, Node>,
    relationships: HashMap<String, Relationship>,
}

impl IdentityCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(&self, uri: &str) -> Option<Node> {
        self.nodes.get(canonical(uri)).cloned()
    }

    pub fn relationship(&self, uri: &str) -> Option<Relationship> {
        self.relationships.get(canonical(uri)).cloned()
    }

    pub fn contains_node(&self, uri: &str) -> bool {
        self.nodes.contains_key(canonical(uri))
    }

    pub fn contains_relationship(&self, uri: &str) -> bool {
        self.relationships.contains_key(canonical(uri))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn relationship_count(&self) -> usize {
        self.relationships.len()
    }

    /// Return the cached node for `uri`, creating an empty bound node on first sight.
    pub(crate) fn node_or_insert(&mut self, uri: &str) -> Node {
        let uri = canonical(uri);
        if let Some(node) = self.nodes.get(uri) {
            debug!(uri, "node cache hit");
            return node.clone();
        }
        debug!(uri, "node cache insert");
        let node = Node::bound(Remote::new(uri));
        self.nodes.insert(uri.to_string(), node.clone());
        node
    }

    pub(crate) fn insert_relationship(&mut self, rel: Relationship) {
        debug!(uri = rel.uri(), "relationship cache insert");
        self.relationships.insert(rel.uri().to_string(), rel);
    }

    /// Drop every cached entity. Handles held elsewhere stay valid but are no longer shared
    /// with later hydrations.
    pub fn clear(&mut self) {
        debug!(
            nodes = self.nodes.len(),
            relationships = self.relationships.len(),
            "clearing identity cache"
        );
        self.nodes.clear();
        self.relationships.clear();
    }
}
