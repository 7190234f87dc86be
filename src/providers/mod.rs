//! Value providers: lazily evaluated expressions over a [`ProviderContext`].
//!
//! Every provider answers two questions against a context:
//!
//! - [`ValueProvider::single_value`] - one value, or `None` when nothing resolves
//! - [`ValueProvider::many_values`] - zero or more values
//!
//! Configuration values are uniformly treated as providers: a literal written
//! where a provider is expected is lifted into a [`StaticValueProvider`] via
//! [`guarantee_provider`].
//!
//! # Variants
//!
//! - [`StaticValueProvider`] (`!static`) - returns a literal unchanged
//! - [`MappingValueProvider`] (`!mapping`) - indirection through a named mapping
//! - [`DocumentPathProvider`] (`!path`) - dotted-path extraction from the document
//!
//! New variants implement [`ValueProvider`] and register a constructor with a
//! [`ProviderRegistry`].

mod mapping;
mod path;
mod registry;
mod static_value;

#[cfg(test)]
pub(crate) mod testing;

use std::fmt::Debug;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::context::ProviderContext;

pub use mapping::MappingValueProvider;
pub use path::DocumentPathProvider;
pub use registry::{ProviderConstructor, ProviderRegistry};
pub use static_value::StaticValueProvider;

/// Errors raised while constructing providers from configuration data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("No provider registered for tag '{0}'")]
    UnknownTag(String),

    #[error("A provider is already registered for tag '{0}'")]
    DuplicateTag(String),

    #[error("Invalid configuration for '{tag}': {message}")]
    InvalidConfiguration { tag: String, message: String },

    #[error("Missing field '{field}' for '{tag}'")]
    MissingField { tag: String, field: String },
}

/// A reusable, stateless expression that extracts values from a context.
pub trait ValueProvider: Debug + Send + Sync {
    /// Resolves a single value, or `None` when nothing can be resolved.
    fn single_value(&self, context: &ProviderContext) -> Option<Value>;

    /// Resolves zero or more values.
    fn many_values<'a>(&'a self, context: &'a ProviderContext)
        -> Box<dyn Iterator<Item = Value> + 'a>;
}

/// A literal value or a provider, as found in configuration.
#[derive(Debug, Clone)]
pub enum ProviderSpec {
    Static(Value),
    Provider(Arc<dyn ValueProvider>),
}

impl ProviderSpec {
    pub fn is_static(&self) -> bool {
        matches!(self, ProviderSpec::Static(_))
    }
}

impl From<Value> for ProviderSpec {
    fn from(value: Value) -> Self {
        ProviderSpec::Static(value)
    }
}

impl From<&str> for ProviderSpec {
    fn from(value: &str) -> Self {
        ProviderSpec::Static(Value::String(value.to_string()))
    }
}

impl From<String> for ProviderSpec {
    fn from(value: String) -> Self {
        ProviderSpec::Static(Value::String(value))
    }
}

impl From<Arc<dyn ValueProvider>> for ProviderSpec {
    fn from(provider: Arc<dyn ValueProvider>) -> Self {
        ProviderSpec::Provider(provider)
    }
}

impl<P: ValueProvider + 'static> From<Arc<P>> for ProviderSpec {
    fn from(provider: Arc<P>) -> Self {
        ProviderSpec::Provider(provider)
    }
}

/// Lifts a spec into a provider. Literals become [`StaticValueProvider`]s.
pub fn guarantee_provider(spec: impl Into<ProviderSpec>) -> Arc<dyn ValueProvider> {
    match spec.into() {
        ProviderSpec::Static(value) => Arc::new(StaticValueProvider::new(value)),
        ProviderSpec::Provider(provider) => provider,
    }
}

/// Truthiness used by mapping indirection.
///
/// `null`, `false`, zero, the empty string and empty collections are falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}
