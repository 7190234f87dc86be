//! Graph schema model: node and relationship shapes and the relationships
//! allowed between them.
//!
//! A [`GraphSchema`] is assembled once, validated, and then shared read-only.
//! Validation enforces:
//!
//! - type markers are unique within each [`GraphObjectType`]
//! - every [`PresentRelationship`] references declared NODE shapes on both
//!   ends and a declared RELATIONSHIP shape for its type

mod error;
mod property;
mod relationship;
mod shape;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

pub use error::{MarkerRole, SchemaError, SchemaErrors};
pub use property::{PropertyMetadata, PropertyMetadataSet, PropertyType};
pub use relationship::{Cardinality, PresentRelationship};
pub use shape::{GraphObjectShape, GraphObjectType, TypeMarker};

/// Shapes and relationship declarations consumed by printers, validators and
/// writers.
///
/// Deserializing goes through [`GraphSchema::try_new`], so a schema read from
/// data is always validated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawGraphSchema")]
pub struct GraphSchema {
    object_shapes: Vec<GraphObjectShape>,
    relationships: Vec<PresentRelationship>,
}

#[derive(Deserialize)]
struct RawGraphSchema {
    #[serde(default)]
    object_shapes: Vec<GraphObjectShape>,
    #[serde(default)]
    relationships: Vec<PresentRelationship>,
}

impl TryFrom<RawGraphSchema> for GraphSchema {
    type Error = SchemaErrors;

    fn try_from(raw: RawGraphSchema) -> Result<Self, Self::Error> {
        Self::try_new(raw.object_shapes, raw.relationships)
    }
}

impl GraphSchema {
    /// Assembles a schema without validating it.
    pub fn new(
        object_shapes: Vec<GraphObjectShape>,
        relationships: Vec<PresentRelationship>,
    ) -> Self {
        Self {
            object_shapes,
            relationships,
        }
    }

    /// Assembles and validates a schema. No partial schema is returned on error.
    pub fn try_new(
        object_shapes: Vec<GraphObjectShape>,
        relationships: Vec<PresentRelationship>,
    ) -> Result<Self, SchemaErrors> {
        let schema = Self::new(object_shapes, relationships);
        schema.validate()?;
        Ok(schema)
    }

    /// Checks every integrity rule and reports all violations together.
    pub fn validate(&self) -> Result<(), SchemaErrors> {
        let mut errors = Vec::new();

        let mut seen = HashSet::new();
        let mut reported = HashSet::new();
        for shape in &self.object_shapes {
            let key = (shape.object_type, &shape.type_marker);
            if !seen.insert(key) && reported.insert(key) {
                errors.push(SchemaError::DuplicateTypeMarker {
                    object_type: shape.object_type,
                    marker: shape.type_marker.clone(),
                });
            }
        }

        for relationship in &self.relationships {
            let references = [
                (&relationship.from_type_marker, GraphObjectType::Node, MarkerRole::From),
                (&relationship.to_type_marker, GraphObjectType::Node, MarkerRole::To),
                (
                    &relationship.relationship_type_marker,
                    GraphObjectType::Relationship,
                    MarkerRole::Relationship,
                ),
            ];
            for (marker, expected, role) in references {
                if let Some(error) = self.check_reference(marker, expected, role) {
                    errors.push(error);
                }
            }
        }

        if errors.is_empty() {
            tracing::debug!(
                shapes = self.object_shapes.len(),
                relationships = self.relationships.len(),
                "Schema validated"
            );
            Ok(())
        } else {
            tracing::debug!(errors = errors.len(), "Schema validation failed");
            Err(SchemaErrors::new(errors))
        }
    }

    fn check_reference(
        &self,
        marker: &TypeMarker,
        expected: GraphObjectType,
        role: MarkerRole,
    ) -> Option<SchemaError> {
        if self.shape(expected, marker.as_str()).is_some() {
            return None;
        }
        match self
            .object_shapes
            .iter()
            .find(|s| &s.type_marker == marker)
        {
            Some(other) => Some(SchemaError::MistypedTypeMarker {
                marker: marker.clone(),
                expected,
                found: other.object_type,
                role,
            }),
            None => Some(SchemaError::UndeclaredTypeMarker {
                marker: marker.clone(),
                expected,
                role,
            }),
        }
    }

    /// All shapes in declaration order.
    pub fn object_shapes(&self) -> &[GraphObjectShape] {
        &self.object_shapes
    }

    /// All relationship declarations in declaration order.
    pub fn present_relationships(&self) -> &[PresentRelationship] {
        &self.relationships
    }

    /// Node shapes in declaration order.
    pub fn nodes(&self) -> impl Iterator<Item = &GraphObjectShape> {
        self.object_shapes.iter().filter(|s| s.is_node())
    }

    /// Relationship shapes in declaration order.
    pub fn relationships(&self) -> impl Iterator<Item = &GraphObjectShape> {
        self.object_shapes.iter().filter(|s| s.is_relationship())
    }

    /// Finds a shape by object type and marker.
    pub fn shape(&self, object_type: GraphObjectType, marker: &str) -> Option<&GraphObjectShape> {
        self.object_shapes
            .iter()
            .find(|s| s.object_type == object_type && s.type_marker.as_str() == marker)
    }

    pub fn node_shape(&self, marker: &str) -> Option<&GraphObjectShape> {
        self.shape(GraphObjectType::Node, marker)
    }

    pub fn relationship_shape(&self, marker: &str) -> Option<&GraphObjectShape> {
        self.shape(GraphObjectType::Relationship, marker)
    }

    /// Relationship declarations whose from-side is `marker`.
    pub fn relationships_from<'a>(
        &'a self,
        marker: &'a str,
    ) -> impl Iterator<Item = &'a PresentRelationship> + 'a {
        self.relationships
            .iter()
            .filter(move |r| r.from_type_marker.as_str() == marker)
    }

    /// Relationship declarations whose to-side is `marker`.
    pub fn relationships_to<'a>(
        &'a self,
        marker: &'a str,
    ) -> impl Iterator<Item = &'a PresentRelationship> + 'a {
        self.relationships
            .iter()
            .filter(move |r| r.to_type_marker.as_str() == marker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(entries: &[(&str, PropertyType)]) -> PropertyMetadataSet {
        let mut set = PropertyMetadataSet::new();
        for (name, t) in entries {
            set.add(PropertyMetadata::new(*name, *t));
        }
        set
    }

    fn node(marker: &str, properties: PropertyMetadataSet) -> GraphObjectShape {
        GraphObjectShape::new(GraphObjectType::Node, marker, properties)
    }

    fn rel(marker: &str, properties: PropertyMetadataSet) -> GraphObjectShape {
        GraphObjectShape::new(GraphObjectType::Relationship, marker, properties)
    }

    fn basic_shapes() -> Vec<GraphObjectShape> {
        vec![
            node(
                "Person",
                props(&[("name", PropertyType::String), ("age", PropertyType::Integer)]),
            ),
            node(
                "Organization",
                props(&[("name", PropertyType::String), ("industry", PropertyType::String)]),
            ),
            rel("BEST_FRIEND_OF", props(&[("since", PropertyType::Datetime)])),
            rel("HAS_EMPLOYEE", props(&[("since", PropertyType::Datetime)])),
        ]
    }

    fn basic_relationships() -> Vec<PresentRelationship> {
        vec![
            PresentRelationship::new(
                "Person",
                "Person",
                "BEST_FRIEND_OF",
                Cardinality::Single,
                Cardinality::Many,
            ),
            PresentRelationship::new(
                "Organization",
                "Person",
                "HAS_EMPLOYEE",
                Cardinality::Many,
                Cardinality::Many,
            ),
        ]
    }

    fn basic_schema() -> GraphSchema {
        GraphSchema::try_new(basic_shapes(), basic_relationships()).unwrap()
    }

    #[test]
    fn test_basic_schema_is_valid() {
        let schema = basic_schema();

        assert_eq!(schema.nodes().count(), 2);
        assert_eq!(schema.relationships().count(), 2);
        assert_eq!(schema.present_relationships().len(), 2);
    }

    #[test]
    fn test_duplicate_node_marker() {
        let mut shapes = basic_shapes();
        shapes.push(node("Person", PropertyMetadataSet::new()));

        let errors = GraphSchema::try_new(shapes, basic_relationships()).unwrap_err();

        assert_eq!(
            errors.errors(),
            &[SchemaError::DuplicateTypeMarker {
                object_type: GraphObjectType::Node,
                marker: TypeMarker::new("Person"),
            }]
        );
        assert!(errors.to_string().contains("Person"));
    }

    #[test]
    fn test_triplicate_marker_reported_once() {
        let shapes = vec![
            node("Person", PropertyMetadataSet::new()),
            node("Person", PropertyMetadataSet::new()),
            node("Person", PropertyMetadataSet::new()),
        ];

        let errors = GraphSchema::try_new(shapes, vec![]).unwrap_err();
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_same_marker_across_object_types_allowed() {
        let shapes = vec![
            node("Person", PropertyMetadataSet::new()),
            rel("Person", PropertyMetadataSet::new()),
        ];

        assert!(GraphSchema::try_new(shapes, vec![]).is_ok());
    }

    #[test]
    fn test_undeclared_from_marker() {
        let mut relationships = basic_relationships();
        relationships.push(PresentRelationship::new(
            "Robot",
            "Person",
            "HAS_EMPLOYEE",
            Cardinality::Single,
            Cardinality::Single,
        ));

        let errors = GraphSchema::try_new(basic_shapes(), relationships).unwrap_err();

        assert_eq!(
            errors.errors(),
            &[SchemaError::UndeclaredTypeMarker {
                marker: TypeMarker::new("Robot"),
                expected: GraphObjectType::Node,
                role: MarkerRole::From,
            }]
        );
        assert!(errors.mentions("Robot"));
    }

    #[test]
    fn test_mistyped_markers() {
        let relationships = vec![PresentRelationship::new(
            "Person",
            "HAS_EMPLOYEE",
            "Organization",
            Cardinality::Many,
            Cardinality::Many,
        )];

        let errors = GraphSchema::try_new(basic_shapes(), relationships).unwrap_err();

        assert_eq!(
            errors.errors(),
            &[
                SchemaError::MistypedTypeMarker {
                    marker: TypeMarker::new("HAS_EMPLOYEE"),
                    expected: GraphObjectType::Node,
                    found: GraphObjectType::Relationship,
                    role: MarkerRole::To,
                },
                SchemaError::MistypedTypeMarker {
                    marker: TypeMarker::new("Organization"),
                    expected: GraphObjectType::Relationship,
                    found: GraphObjectType::Node,
                    role: MarkerRole::Relationship,
                },
            ]
        );
    }

    #[test]
    fn test_collects_all_errors() {
        let shapes = vec![
            node("Person", PropertyMetadataSet::new()),
            node("Person", PropertyMetadataSet::new()),
        ];
        let relationships = vec![PresentRelationship::new(
            "Person",
            "Ghost",
            "KNOWS",
            Cardinality::Single,
            Cardinality::Many,
        )];

        let errors = GraphSchema::try_new(shapes, relationships).unwrap_err();

        assert_eq!(errors.len(), 3);
        assert_eq!(errors.to_string().matches("; ").count(), 2);
        assert!(errors.mentions("Person"));
        assert!(errors.mentions("Ghost"));
        assert!(errors.mentions("KNOWS"));
    }

    #[test]
    fn test_lookups() {
        let schema = basic_schema();

        assert_eq!(
            schema.node_shape("Person").unwrap().properties.get("age").unwrap().declared_type,
            PropertyType::Integer
        );
        assert!(schema.node_shape("BEST_FRIEND_OF").is_none());
        assert!(schema.relationship_shape("BEST_FRIEND_OF").is_some());

        let from_org: Vec<_> = schema.relationships_from("Organization").collect();
        assert_eq!(from_org.len(), 1);
        assert_eq!(from_org[0].relationship_type_marker.as_str(), "HAS_EMPLOYEE");
        assert_eq!(schema.relationships_to("Person").count(), 2);
    }

    #[test]
    fn test_cardinality_read_back() {
        let schema = basic_schema();
        let best_friend = &schema.present_relationships()[0];

        assert_eq!(best_friend.from_side_cardinality(), Cardinality::Single);
        assert_eq!(best_friend.to_side_cardinality(), Cardinality::Many);
    }

    #[test]
    fn test_serde_round_trip_preserves_schema() {
        let schema = basic_schema();
        let json = serde_json::to_value(&schema).unwrap();

        assert_eq!(json["object_shapes"][0]["object_type"], "NODE");
        assert_eq!(json["relationships"][0]["from_side_cardinality"], "SINGLE");

        let back: GraphSchema = serde_json::from_value(json).unwrap();
        assert_eq!(back, schema);
    }

    #[test]
    fn test_deserialize_rejects_invalid_schema() {
        let payload = serde_json::json!({
            "object_shapes": [
                {"object_type": "NODE", "type_marker": "Person"},
                {"object_type": "NODE", "type_marker": "Person"},
                {"object_type": "RELATIONSHIP", "type_marker": "KNOWS"}
            ],
            "relationships": [{
                "from_type_marker": "Robot",
                "to_type_marker": "Person",
                "relationship_type_marker": "KNOWS",
                "from_side_cardinality": "SINGLE",
                "to_side_cardinality": "MANY"
            }]
        });

        let err = serde_json::from_value::<GraphSchema>(payload).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Duplicate NODE type marker: Person"));
        assert!(message.contains("Robot"));
    }
}
