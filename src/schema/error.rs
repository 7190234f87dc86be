//! Schema integrity errors.

use std::fmt;

use thiserror::Error;

use super::{GraphObjectType, TypeMarker};

/// Which reference of a [`PresentRelationship`](super::PresentRelationship)
/// a marker was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerRole {
    From,
    To,
    Relationship,
}

impl fmt::Display for MarkerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarkerRole::From => f.write_str("from"),
            MarkerRole::To => f.write_str("to"),
            MarkerRole::Relationship => f.write_str("relationship"),
        }
    }
}

/// A single violated schema rule, naming the offending marker.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Duplicate {object_type} type marker: {marker}")]
    DuplicateTypeMarker {
        object_type: GraphObjectType,
        marker: TypeMarker,
    },

    #[error("Relationship {role} marker '{marker}' is not a declared {expected} shape")]
    UndeclaredTypeMarker {
        marker: TypeMarker,
        expected: GraphObjectType,
        role: MarkerRole,
    },

    #[error("Relationship {role} marker '{marker}' must be a {expected} shape, found {found}")]
    MistypedTypeMarker {
        marker: TypeMarker,
        expected: GraphObjectType,
        found: GraphObjectType,
        role: MarkerRole,
    },

    #[error("Duplicate property '{property}' on {marker}")]
    DuplicateProperty { marker: TypeMarker, property: String },

    #[error("Unknown property type '{0}'")]
    UnknownPropertyType(String),

    #[error("Unknown cardinality '{0}'. Valid values: SINGLE, MANY")]
    UnknownCardinality(String),
}

impl SchemaError {
    /// The marker this error is about, if any.
    pub fn marker(&self) -> Option<&TypeMarker> {
        match self {
            SchemaError::DuplicateTypeMarker { marker, .. }
            | SchemaError::UndeclaredTypeMarker { marker, .. }
            | SchemaError::MistypedTypeMarker { marker, .. }
            | SchemaError::DuplicateProperty { marker, .. } => Some(marker),
            SchemaError::UnknownPropertyType(_) | SchemaError::UnknownCardinality(_) => None,
        }
    }
}

/// Every violation found by one validation pass.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}", join_messages(.0))]
pub struct SchemaErrors(Vec<SchemaError>);

impl SchemaErrors {
    pub(crate) fn new(errors: Vec<SchemaError>) -> Self {
        Self(errors)
    }

    pub fn errors(&self) -> &[SchemaError] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &SchemaError> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns true if any error names `marker`.
    pub fn mentions(&self, marker: &str) -> bool {
        self.0
            .iter()
            .any(|e| e.marker().map(|m| m.as_str() == marker).unwrap_or(false))
    }
}

impl From<SchemaError> for SchemaErrors {
    fn from(error: SchemaError) -> Self {
        Self(vec![error])
    }
}

impl IntoIterator for SchemaErrors {
    type Item = SchemaError;
    type IntoIter = std::vec::IntoIter<SchemaError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

fn join_messages(errors: &[SchemaError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
