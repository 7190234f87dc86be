//! Tag -> constructor registry used by configuration loaders.

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use serde_json::Value;

use super::{
    DocumentPathProvider, MappingValueProvider, ProviderError, ProviderSpec, StaticValueProvider,
    ValueProvider,
};

/// Builds a provider from parsed configuration data.
///
/// Constructors receive the registry so nested specs (such as a mapping
/// provider's `key`) can be parsed with the same set of tags.
pub type ProviderConstructor = Box<
    dyn Fn(&ProviderRegistry, &Value) -> Result<Arc<dyn ValueProvider>, ProviderError>
        + Send
        + Sync,
>;

static GLOBAL: Lazy<ProviderRegistry> = Lazy::new(ProviderRegistry::with_builtins);

/// Explicit table of provider constructors keyed by tag (e.g. `!mapping`).
///
/// Each tag can be registered once. Configuration parsers call
/// [`construct`](Self::construct) or [`parse_spec`](Self::parse_spec) to turn
/// parsed data into providers; misconfigured data fails here, at load time,
/// rather than during resolution.
#[derive(Default)]
pub struct ProviderRegistry {
    constructors: HashMap<String, ProviderConstructor>,
}

impl ProviderRegistry {
    /// Creates a registry with no tags.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the built-in providers.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        StaticValueProvider::install(&mut registry).expect("fresh registry has no !static");
        MappingValueProvider::install(&mut registry).expect("fresh registry has no !mapping");
        DocumentPathProvider::install(&mut registry).expect("fresh registry has no !path");
        registry
    }

    /// Process-wide registry with the built-in providers.
    pub fn global() -> &'static ProviderRegistry {
        &GLOBAL
    }

    /// Registers a constructor for `tag`. Fails if the tag is already taken.
    pub fn register(
        &mut self,
        tag: impl Into<String>,
        constructor: ProviderConstructor,
    ) -> Result<(), ProviderError> {
        let tag = tag.into();
        if self.constructors.contains_key(&tag) {
            return Err(ProviderError::DuplicateTag(tag));
        }
        tracing::debug!(%tag, "Registered value provider");
        self.constructors.insert(tag, constructor);
        Ok(())
    }

    /// Returns true if `tag` has a constructor.
    pub fn contains(&self, tag: &str) -> bool {
        self.constructors.contains_key(tag)
    }

    /// Returns all registered tags.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.constructors.keys().map(|s| s.as_str())
    }

    /// Builds the provider registered under `tag` from `data`.
    pub fn construct(
        &self,
        tag: &str,
        data: &Value,
    ) -> Result<Arc<dyn ValueProvider>, ProviderError> {
        let constructor = self
            .constructors
            .get(tag)
            .ok_or_else(|| ProviderError::UnknownTag(tag.to_string()))?;

        let provider = constructor(self, data).inspect_err(|e| {
            tracing::debug!(%tag, error = %e, "Provider construction failed");
        })?;
        tracing::trace!(%tag, ?provider, "Constructed value provider");
        Ok(provider)
    }

    /// Interprets a configuration value as a literal or a tagged provider.
    ///
    /// A table with exactly one key starting with `!` is a tagged provider,
    /// e.g. `{"!mapping": {"mapping_name": "m", "key": "a"}}`. Anything else
    /// is a literal.
    pub fn parse_spec(&self, value: &Value) -> Result<ProviderSpec, ProviderError> {
        match value {
            Value::Object(map) if map.len() == 1 => match map.iter().next() {
                Some((tag, data)) if tag.starts_with('!') => {
                    Ok(ProviderSpec::Provider(self.construct(tag, data)?))
                }
                _ => Ok(ProviderSpec::Static(value.clone())),
            },
            _ => Ok(ProviderSpec::Static(value.clone())),
        }
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut tags: Vec<_> = self.tags().collect();
        tags.sort_unstable();
        f.debug_struct("ProviderRegistry").field("tags", &tags).finish()
    }
}
