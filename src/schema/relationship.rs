//! Relationship declarations between node shapes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{SchemaError, TypeMarker};

/// How many counterpart entities one side of a relationship may have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Cardinality {
    /// At most one counterpart per instance on the opposite side.
    Single,
    /// Unbounded.
    Many,
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cardinality::Single => f.write_str("SINGLE"),
            Cardinality::Many => f.write_str("MANY"),
        }
    }
}

impl FromStr for Cardinality {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [Cardinality::Single, Cardinality::Many]
            .into_iter()
            .find(|c| c.to_string().eq_ignore_ascii_case(s))
            .ok_or_else(|| SchemaError::UnknownCardinality(s.to_string()))
    }
}

/// An edge type that may connect two node shapes.
///
/// The from-side and to-side cardinalities are distinct: `(SINGLE, MANY)` is
/// not the same declaration as `(MANY, SINGLE)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresentRelationship {
    pub from_type_marker: TypeMarker,
    pub to_type_marker: TypeMarker,
    pub relationship_type_marker: TypeMarker,
    pub from_side_cardinality: Cardinality,
    pub to_side_cardinality: Cardinality,
}

impl PresentRelationship {
    pub fn new(
        from_type_marker: impl Into<TypeMarker>,
        to_type_marker: impl Into<TypeMarker>,
        relationship_type_marker: impl Into<TypeMarker>,
        from_side_cardinality: Cardinality,
        to_side_cardinality: Cardinality,
    ) -> Self {
        Self {
            from_type_marker: from_type_marker.into(),
            to_type_marker: to_type_marker.into(),
            relationship_type_marker: relationship_type_marker.into(),
            from_side_cardinality,
            to_side_cardinality,
        }
    }

    pub fn from_side_cardinality(&self) -> Cardinality {
        self.from_side_cardinality
    }

    pub fn to_side_cardinality(&self) -> Cardinality {
        self.to_side_cardinality
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cardinality_pair_preserves_order() {
        let rel = PresentRelationship::new(
            "Person",
            "Person",
            "BEST_FRIEND_OF",
            Cardinality::Single,
            Cardinality::Many,
        );

        assert_eq!(
            (rel.from_side_cardinality(), rel.to_side_cardinality()),
            (Cardinality::Single, Cardinality::Many)
        );
        assert_ne!(
            rel,
            PresentRelationship::new(
                "Person",
                "Person",
                "BEST_FRIEND_OF",
                Cardinality::Many,
                Cardinality::Single
            )
        );
    }

    #[test]
    fn test_cardinality_from_str() {
        assert_eq!("SINGLE".parse::<Cardinality>().unwrap(), Cardinality::Single);
        assert_eq!("many".parse::<Cardinality>().unwrap(), Cardinality::Many);
        assert_eq!("Single".parse::<Cardinality>().unwrap(), Cardinality::Single);
        assert_eq!(
            "SOME".parse::<Cardinality>(),
            Err(SchemaError::UnknownCardinality("SOME".to_string()))
        );
    }

    #[test]
    fn test_cardinality_serde() {
        let json = serde_json::to_value(Cardinality::Many).unwrap();
        assert_eq!(json, serde_json::json!("MANY"));
    }
}
