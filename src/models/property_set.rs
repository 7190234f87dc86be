//! Property bag for resolved node and relationship data.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Named property values, ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertySet {
    values: BTreeMap<String, Value>,
}

impl PropertySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a property. Absent values are ignored so a property that failed
    /// to resolve never overwrites one that did.
    pub fn set_property(&mut self, name: impl Into<String>, value: Option<Value>) {
        if let Some(value) = value {
            self.values.insert(name.into(), value);
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(String, Value)> for PropertySet {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
