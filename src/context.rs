//! Resolution context handed to value providers.

use std::cell::Cell;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use serde_json::Value;

use crate::models::DesiredIngestion;
use crate::providers::ProviderSpec;

/// Default bound on nested mapping lookups within one resolution.
pub const DEFAULT_MAX_MAPPING_DEPTH: usize = 32;

thread_local! {
    // Mapping lookups in progress on this thread. Resolution never suspends,
    // so one thread runs one resolution chain at a time.
    static MAPPING_DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// A single named lookup table: key -> literal or provider.
pub type Mapping = HashMap<String, ProviderSpec>;

/// Named lookup tables available during resolution.
///
/// Built once at configuration-load time and shared read-only across every
/// context through an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct MappingRegistry {
    mappings: HashMap<String, Mapping>,
}

impl MappingRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a named mapping, builder style.
    pub fn with_mapping(mut self, name: impl Into<String>, mapping: Mapping) -> Self {
        self.insert(name, mapping);
        self
    }

    /// Adds (or replaces) a named mapping.
    pub fn insert(&mut self, name: impl Into<String>, mapping: Mapping) {
        self.mappings.insert(name.into(), mapping);
    }

    /// Looks up a mapping by name.
    pub fn get(&self, name: &str) -> Option<&Mapping> {
        self.mappings.get(name)
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}

/// Everything a provider may read while resolving one document.
///
/// A context is created per document and owned by the caller driving
/// resolution. Providers only ever see `&ProviderContext`, so resolution
/// cannot touch the document, the mappings or the ingestion accumulator.
#[derive(Debug)]
pub struct ProviderContext {
    /// The input document being processed.
    pub document: Value,
    /// Named lookup tables shared across documents.
    pub mappings: Arc<MappingRegistry>,
    /// Accumulator for resolved node and relationship data.
    pub desired_ingestion: DesiredIngestion,
    max_mapping_depth: usize,
}

impl ProviderContext {
    /// Creates a context with no mappings.
    pub fn new(document: Value, desired_ingestion: DesiredIngestion) -> Self {
        Self::with_mappings(document, desired_ingestion, Arc::new(MappingRegistry::new()))
    }

    /// Creates a context reading from the given mapping registry.
    pub fn with_mappings(
        document: Value,
        desired_ingestion: DesiredIngestion,
        mappings: Arc<MappingRegistry>,
    ) -> Self {
        Self {
            document,
            mappings,
            desired_ingestion,
            max_mapping_depth: DEFAULT_MAX_MAPPING_DEPTH,
        }
    }

    /// Overrides the nested mapping lookup bound.
    pub fn with_max_mapping_depth(mut self, depth: usize) -> Self {
        self.max_mapping_depth = depth;
        self
    }

    pub fn max_mapping_depth(&self) -> usize {
        self.max_mapping_depth
    }

    /// Enters one level of mapping indirection.
    ///
    /// Returns `None` once the depth bound is reached. The level is released
    /// when the returned guard is dropped. Depth is tracked per thread, so
    /// resolutions running concurrently against one context do not count
    /// against each other.
    pub(crate) fn enter_mapping(&self) -> Option<MappingDepthGuard<'_>> {
        let depth = MAPPING_DEPTH.with(|d| {
            let depth = d.get();
            d.set(depth + 1);
            depth
        });
        let guard = MappingDepthGuard {
            _context: PhantomData,
        };
        if depth >= self.max_mapping_depth {
            tracing::warn!(
                max_depth = self.max_mapping_depth,
                "Mapping indirection depth exceeded; treating value as absent"
            );
            return None;
        }
        Some(guard)
    }

    /// Consumes the context and returns the ingestion accumulator.
    pub fn into_desired_ingestion(self) -> DesiredIngestion {
        self.desired_ingestion
    }
}

// Raw pointer marker keeps the guard on the thread whose counter it holds.
pub(crate) struct MappingDepthGuard<'a> {
    _context: PhantomData<(&'a ProviderContext, *const ())>,
}

impl Drop for MappingDepthGuard<'_> {
    fn drop(&mut self) {
        MAPPING_DEPTH.with(|d| d.set(d.get().saturating_sub(1)));
    }
}
