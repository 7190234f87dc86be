//! Indirection through named mapping tables.

use std::sync::Arc;

use serde_json::Value;

use super::{
    guarantee_provider, is_truthy, ProviderError, ProviderRegistry, ProviderSpec, ValueProvider,
};
use crate::context::ProviderContext;

/// Resolves a key, looks it up in a named mapping, and resolves whatever the
/// mapping holds for that key in the same context.
///
/// Mapping entries may themselves be providers (including other
/// `MappingValueProvider`s), so lookups chain. A missing or empty mapping, a
/// falsy key, or a missing entry all resolve to `None`. Chains deeper than the
/// context's `max_mapping_depth` also resolve to `None`, which is how cyclic
/// mapping references terminate.
#[derive(Debug, Clone)]
pub struct MappingValueProvider {
    mapping_name: String,
    key: Arc<dyn ValueProvider>,
}

impl MappingValueProvider {
    pub const TAG: &'static str = "!mapping";

    pub fn new(mapping_name: impl Into<String>, key: impl Into<ProviderSpec>) -> Self {
        Self {
            mapping_name: mapping_name.into(),
            key: guarantee_provider(key),
        }
    }

    pub fn mapping_name(&self) -> &str {
        &self.mapping_name
    }

    pub fn key(&self) -> &Arc<dyn ValueProvider> {
        &self.key
    }

    /// Registers `!mapping` with `registry`.
    pub fn install(registry: &mut ProviderRegistry) -> Result<(), ProviderError> {
        registry.register(Self::TAG, Box::new(Self::construct))
    }

    /// Builds a provider from `{ mapping_name = "...", key = <spec> }`.
    pub(crate) fn construct(
        registry: &ProviderRegistry,
        data: &Value,
    ) -> Result<Arc<dyn ValueProvider>, ProviderError> {
        let fields = data
            .as_object()
            .ok_or_else(|| ProviderError::InvalidConfiguration {
                tag: Self::TAG.to_string(),
                message: format!("expected a table with mapping_name and key, got {}", data),
            })?;

        let mapping_name = match fields.get("mapping_name") {
            Some(Value::String(name)) if !name.is_empty() => name.clone(),
            Some(other) => {
                return Err(ProviderError::InvalidConfiguration {
                    tag: Self::TAG.to_string(),
                    message: format!("mapping_name must be a non-empty string, got {}", other),
                })
            }
            None => {
                return Err(ProviderError::MissingField {
                    tag: Self::TAG.to_string(),
                    field: "mapping_name".to_string(),
                })
            }
        };

        let key = fields.get("key").ok_or_else(|| ProviderError::MissingField {
            tag: Self::TAG.to_string(),
            field: "key".to_string(),
        })?;
        let key = registry.parse_spec(key)?;

        Ok(Arc::new(Self::new(mapping_name, key)))
    }
}

/// Converts a resolved key into a mapping lookup key.
///
/// Only scalars can be keys; arrays and objects never match an entry.
fn lookup_key(key: &Value) -> Option<String> {
    match key {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

impl ValueProvider for MappingValueProvider {
    fn single_value(&self, context: &ProviderContext) -> Option<Value> {
        let _depth = context.enter_mapping()?;

        let mapping = match context.mappings.get(&self.mapping_name) {
            Some(mapping) if !mapping.is_empty() => mapping,
            _ => {
                tracing::trace!(mapping = %self.mapping_name, "Mapping missing or empty");
                return None;
            }
        };

        let key = match self.key.single_value(context) {
            Some(key) if is_truthy(&key) => key,
            _ => {
                tracing::trace!(mapping = %self.mapping_name, "Mapping key resolved to nothing");
                return None;
            }
        };

        let entry = match lookup_key(&key).and_then(|k| mapping.get(&k)) {
            Some(entry) => entry.clone(),
            None => {
                tracing::trace!(mapping = %self.mapping_name, %key, "No mapping entry for key");
                return None;
            }
        };

        guarantee_provider(entry).single_value(context)
    }

    fn many_values<'a>(
        &'a self,
        context: &'a ProviderContext,
    ) -> Box<dyn Iterator<Item = Value> + 'a> {
        Box::new(self.single_value(context).filter(is_truthy).into_iter())
    }
}
