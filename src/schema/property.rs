//! Property metadata attached to graph object shapes.

use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::SchemaError;

/// Scalar types a property may be declared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PropertyType {
    String,
    Integer,
    Float,
    Boolean,
    Datetime,
    List,
    Map,
}

impl PropertyType {
    /// Returns a static slice of all property types.
    pub fn all() -> &'static [PropertyType] {
        &[
            PropertyType::String,
            PropertyType::Integer,
            PropertyType::Float,
            PropertyType::Boolean,
            PropertyType::Datetime,
            PropertyType::List,
            PropertyType::Map,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::String => "STRING",
            PropertyType::Integer => "INTEGER",
            PropertyType::Float => "FLOAT",
            PropertyType::Boolean => "BOOLEAN",
            PropertyType::Datetime => "DATETIME",
            PropertyType::List => "LIST",
            PropertyType::Map => "MAP",
        }
    }

    /// Returns true if `value` can be stored as this type.
    ///
    /// `DATETIME` accepts RFC 3339 strings. Integers are valid floats.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (PropertyType::String, Value::String(_)) => true,
            (PropertyType::Integer, Value::Number(n)) => n.is_i64() || n.is_u64(),
            (PropertyType::Float, Value::Number(_)) => true,
            (PropertyType::Boolean, Value::Bool(_)) => true,
            (PropertyType::Datetime, Value::String(s)) => DateTime::parse_from_rfc3339(s).is_ok(),
            (PropertyType::List, Value::Array(_)) => true,
            (PropertyType::Map, Value::Object(_)) => true,
            _ => false,
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PropertyType {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PropertyType::all()
            .iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| SchemaError::UnknownPropertyType(s.to_string()))
    }
}

/// Name and declared type of a single property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyMetadata {
    pub name: String,
    #[serde(rename = "type")]
    pub declared_type: PropertyType,
}

impl PropertyMetadata {
    pub fn new(name: impl Into<String>, declared_type: PropertyType) -> Self {
        Self {
            name: name.into(),
            declared_type,
        }
    }
}

/// Property metadata keyed by name, in declaration order.
///
/// Names are unique: adding a second entry with an existing name keeps the
/// first one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<PropertyMetadata>", into = "Vec<PropertyMetadata>")]
pub struct PropertyMetadataSet {
    properties: Vec<PropertyMetadata>,
}

impl PropertyMetadataSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `metadata`. Returns false if the name was already present.
    pub fn add(&mut self, metadata: PropertyMetadata) -> bool {
        if self.contains(&metadata.name) {
            return false;
        }
        self.properties.push(metadata);
        true
    }

    pub fn get(&self, name: &str) -> Option<&PropertyMetadata> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PropertyMetadata> {
        self.properties.iter()
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Adds every property of `other` not already present here.
    pub fn merge(&mut self, other: &PropertyMetadataSet) {
        for metadata in other.iter() {
            self.add(metadata.clone());
        }
    }
}

impl TryFrom<Vec<PropertyMetadata>> for PropertyMetadataSet {
    type Error = String;

    fn try_from(properties: Vec<PropertyMetadata>) -> Result<Self, Self::Error> {
        let mut set = Self::new();
        for metadata in properties {
            let name = metadata.name.clone();
            if !set.add(metadata) {
                return Err(format!("duplicate property '{}'", name));
            }
        }
        Ok(set)
    }
}

impl From<PropertyMetadataSet> for Vec<PropertyMetadata> {
    fn from(set: PropertyMetadataSet) -> Self {
        set.properties
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_property_type_from_str() {
        assert_eq!("STRING".parse::<PropertyType>().unwrap(), PropertyType::String);
        assert_eq!("datetime".parse::<PropertyType>().unwrap(), PropertyType::Datetime);
        assert!(matches!(
            "DECIMAL".parse::<PropertyType>(),
            Err(SchemaError::UnknownPropertyType(ref s)) if s == "DECIMAL"
        ));
    }

    #[test]
    fn test_property_type_display_round_trips() {
        for t in PropertyType::all() {
            assert_eq!(t.to_string().parse::<PropertyType>().unwrap(), *t);
        }
    }

    #[test]
    fn test_accepts() {
        assert!(PropertyType::String.accepts(&json!("a")));
        assert!(!PropertyType::String.accepts(&json!(1)));
        assert!(PropertyType::Integer.accepts(&json!(3)));
        assert!(!PropertyType::Integer.accepts(&json!(3.5)));
        assert!(PropertyType::Float.accepts(&json!(3)));
        assert!(PropertyType::Boolean.accepts(&json!(false)));
        assert!(PropertyType::Datetime.accepts(&json!("2024-01-15T10:30:00Z")));
        assert!(!PropertyType::Datetime.accepts(&json!("last tuesday")));
        assert!(PropertyType::List.accepts(&json!([])));
        assert!(PropertyType::Map.accepts(&json!({})));
        assert!(!PropertyType::Map.accepts(&json!(null)));
    }

    #[test]
    fn test_metadata_set_keeps_first_on_duplicate() {
        let mut set = PropertyMetadataSet::new();
        assert!(set.add(PropertyMetadata::new("name", PropertyType::String)));
        assert!(!set.add(PropertyMetadata::new("name", PropertyType::Integer)));

        assert_eq!(set.len(), 1);
        assert_eq!(set.get("name").unwrap().declared_type, PropertyType::String);
    }

    #[test]
    fn test_metadata_set_merge() {
        let mut left = PropertyMetadataSet::new();
        left.add(PropertyMetadata::new("name", PropertyType::String));
        let mut right = PropertyMetadataSet::new();
        right.add(PropertyMetadata::new("name", PropertyType::Integer));
        right.add(PropertyMetadata::new("age", PropertyType::Integer));

        left.merge(&right);

        let names: Vec<_> = left.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["name", "age"]);
        assert_eq!(left.get("name").unwrap().declared_type, PropertyType::String);
    }

    #[test]
    fn test_metadata_set_deserialize_rejects_duplicates() {
        let result: Result<PropertyMetadataSet, _> = serde_json::from_value(json!([
            {"name": "a", "type": "STRING"},
            {"name": "a", "type": "INTEGER"}
        ]));
        assert!(result.is_err());
    }
}
