//! Accumulator for the nodes and relationships resolved from one document.

use serde::{Deserialize, Serialize};

use super::PropertySet;

/// A node identified by its type marker and key values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
    /// Node type marker (e.g. "Person").
    pub type_marker: String,
    /// Values that identify the node within its type.
    pub key_values: PropertySet,
    /// Additional properties to write.
    pub properties: PropertySet,
}

impl NodeData {
    pub fn new(type_marker: impl Into<String>) -> Self {
        Self {
            type_marker: type_marker.into(),
            ..Default::default()
        }
    }

    /// A node without key values cannot be matched or merged downstream.
    pub fn has_valid_id(&self) -> bool {
        !self.type_marker.is_empty() && !self.key_values.is_empty()
    }
}

/// A relationship from the source node to a related node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipData {
    /// Relationship type marker (e.g. "BEST_FRIEND_OF").
    pub type_marker: String,
    /// The node on the other end.
    pub related: NodeData,
    /// `true` when the relationship points from the source to `related`.
    pub outbound: bool,
    pub properties: PropertySet,
}

/// Everything resolved from one document that should be ingested.
///
/// Owned by the [`ProviderContext`](crate::context::ProviderContext) for the
/// document being processed; written by the caller after resolution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DesiredIngestion {
    pub source: Option<NodeData>,
    pub relationships: Vec<RelationshipData>,
}

impl DesiredIngestion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the source node. Nodes without key values are dropped.
    pub fn add_source_node(&mut self, node: NodeData) -> bool {
        if !node.has_valid_id() {
            tracing::debug!(
                type_marker = %node.type_marker,
                "Ignoring source node without key values"
            );
            return false;
        }
        self.source = Some(node);
        true
    }

    /// Adds a relationship. Relationships to nodes without key values are dropped.
    pub fn add_relationship(&mut self, relationship: RelationshipData) -> bool {
        if !relationship.related.has_valid_id() {
            tracing::debug!(
                type_marker = %relationship.type_marker,
                "Ignoring relationship to node without key values"
            );
            return false;
        }
        self.relationships.push(relationship);
        true
    }

    pub fn is_empty(&self) -> bool {
        self.source.is_none() && self.relationships.is_empty()
    }
}
