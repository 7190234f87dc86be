//! Literal values wrapped as providers.

use std::sync::Arc;

use serde_json::Value;

use super::{ProviderError, ProviderRegistry, ValueProvider};
use crate::context::ProviderContext;

/// Returns its literal unchanged, regardless of context.
///
/// A `null` literal resolves to nothing. For `many_values`, an array literal
/// yields its elements and any other literal yields itself.
#[derive(Debug, Clone, PartialEq)]
pub struct StaticValueProvider {
    value: Value,
}

impl StaticValueProvider {
    pub const TAG: &'static str = "!static";

    pub fn new(value: Value) -> Self {
        Self { value }
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Registers `!static` with `registry`.
    pub fn install(registry: &mut ProviderRegistry) -> Result<(), ProviderError> {
        registry.register(Self::TAG, Box::new(Self::construct))
    }

    pub(crate) fn construct(
        _registry: &ProviderRegistry,
        data: &Value,
    ) -> Result<Arc<dyn ValueProvider>, ProviderError> {
        Ok(Arc::new(Self::new(data.clone())))
    }
}

impl ValueProvider for StaticValueProvider {
    fn single_value(&self, _context: &ProviderContext) -> Option<Value> {
        match &self.value {
            Value::Null => None,
            value => Some(value.clone()),
        }
    }

    fn many_values<'a>(
        &'a self,
        _context: &'a ProviderContext,
    ) -> Box<dyn Iterator<Item = Value> + 'a> {
        match &self.value {
            Value::Null => Box::new(std::iter::empty()),
            Value::Array(items) => Box::new(items.iter().cloned()),
            value => Box::new(std::iter::once(value.clone())),
        }
    }
}
