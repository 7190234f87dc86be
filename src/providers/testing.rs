//! Test helpers for provider consumers.

use serde_json::Value;

use super::ValueProvider;
use crate::context::ProviderContext;

/// Returns a fixed list of values; `single_value` is the first one.
#[derive(Debug, Clone)]
pub struct StubbedValueProvider {
    values: Vec<Value>,
}

impl StubbedValueProvider {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }
}

impl ValueProvider for StubbedValueProvider {
    fn single_value(&self, _context: &ProviderContext) -> Option<Value> {
        self.values.first().cloned()
    }

    fn many_values<'a>(
        &'a self,
        _context: &'a ProviderContext,
    ) -> Box<dyn Iterator<Item = Value> + 'a> {
        Box::new(self.values.iter().cloned())
    }
}
