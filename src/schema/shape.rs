//! Node and relationship shapes.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{PropertyMetadata, PropertyMetadataSet, SchemaError};

/// Whether a shape describes nodes or relationships.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GraphObjectType {
    Node,
    Relationship,
}

impl fmt::Display for GraphObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphObjectType::Node => f.write_str("NODE"),
            GraphObjectType::Relationship => f.write_str("RELATIONSHIP"),
        }
    }
}

/// Identifying name of a shape within its object type (e.g. "Person").
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeMarker(String);

impl TypeMarker {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeMarker {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for TypeMarker {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// A typed node or relationship definition with its properties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphObjectShape {
    pub object_type: GraphObjectType,
    pub type_marker: TypeMarker,
    #[serde(default)]
    pub properties: PropertyMetadataSet,
}

impl GraphObjectShape {
    pub fn new(
        object_type: GraphObjectType,
        type_marker: impl Into<TypeMarker>,
        properties: PropertyMetadataSet,
    ) -> Self {
        Self {
            object_type,
            type_marker: type_marker.into(),
            properties,
        }
    }

    /// Builds a shape from a property list, rejecting repeated property names.
    pub fn try_new(
        object_type: GraphObjectType,
        type_marker: impl Into<TypeMarker>,
        properties: impl IntoIterator<Item = PropertyMetadata>,
    ) -> Result<Self, SchemaError> {
        let type_marker = type_marker.into();
        let mut set = PropertyMetadataSet::new();
        for metadata in properties {
            let name = metadata.name.clone();
            if !set.add(metadata) {
                return Err(SchemaError::DuplicateProperty {
                    marker: type_marker,
                    property: name,
                });
            }
        }
        Ok(Self::new(object_type, type_marker, set))
    }

    pub fn is_node(&self) -> bool {
        self.object_type == GraphObjectType::Node
    }

    pub fn is_relationship(&self) -> bool {
        self.object_type == GraphObjectType::Relationship
    }
}
