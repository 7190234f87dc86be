//! Configuration with layered resolution using figment.
//!
//! Resolution order (highest priority last):
//! 1. User config: `~/.config/nodeflow/config.toml` (XDG) or platform config dir
//! 2. Project config: `.nodeflow.toml`
//! 3. Environment variables: `NODEFLOW_*`, nested keys separated by `__`
//!    (e.g. `NODEFLOW_RESOLUTION__MAX_MAPPING_DEPTH=8`)
//!
//! # Example
//!
//! ```toml
//! [resolution]
//! max_mapping_depth = 16
//!
//! [mappings.team_owner]
//! nodestream = "Zach"
//! graphdb = { "!mapping" = { mapping_name = "aliases", key = "gdb" } }
//!
//! [[schema.nodes]]
//! type = "Person"
//! properties = { name = "STRING", age = "INTEGER" }
//!
//! [[schema.relationships]]
//! type = "BEST_FRIEND_OF"
//! properties = { since = "DATETIME" }
//!
//! [[schema.present_relationships]]
//! from = "Person"
//! to = "Person"
//! relationship = "BEST_FRIEND_OF"
//! from_cardinality = "SINGLE"
//! to_cardinality = "MANY"
//! ```
//!
//! Mapping entries are literals, or tagged provider specs: a single-key table
//! whose key is a tag registered with the [`ProviderRegistry`].

use std::collections::{BTreeMap, HashMap};
use std::ops::Deref;
use std::path::Path;
use std::sync::Arc;

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;
use serde_json::Value;

use crate::context::{Mapping, MappingRegistry, ProviderContext, DEFAULT_MAX_MAPPING_DEPTH};
use crate::error::AppError;
use crate::models::DesiredIngestion;
use crate::providers::{ProviderError, ProviderRegistry};
use crate::schema::{
    Cardinality, GraphObjectShape, GraphObjectType, GraphSchema, PresentRelationship,
    PropertyMetadata, PropertyType, SchemaError, SchemaErrors,
};

/// Boxed wrapper for figment::Error to reduce Result size on the stack.
#[derive(Debug)]
pub struct ConfigError(Box<figment::Error>);

impl Deref for ConfigError {
    type Target = figment::Error;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self(Box::new(err))
    }
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub resolution: ResolutionConfig,
    /// Named mapping tables: mapping name -> key -> literal or tagged spec.
    #[serde(default)]
    pub mappings: HashMap<String, HashMap<String, Value>>,
    #[serde(default)]
    pub schema: SchemaConfig,
}

/// Provider resolution settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ResolutionConfig {
    /// Bound on nested mapping lookups; deeper chains resolve to nothing.
    #[serde(default = "default_max_mapping_depth")]
    pub max_mapping_depth: usize,
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            max_mapping_depth: DEFAULT_MAX_MAPPING_DEPTH,
        }
    }
}

fn default_max_mapping_depth() -> usize {
    DEFAULT_MAX_MAPPING_DEPTH
}

/// Declared node and relationship shapes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchemaConfig {
    #[serde(default)]
    pub nodes: Vec<ShapeConfig>,
    #[serde(default)]
    pub relationships: Vec<ShapeConfig>,
    #[serde(default)]
    pub present_relationships: Vec<PresentRelationshipConfig>,
}

/// A node or relationship shape declaration.
#[derive(Debug, Clone, Deserialize)]
pub struct ShapeConfig {
    /// Type marker (e.g. "Person").
    #[serde(rename = "type")]
    pub type_marker: String,
    /// Property name -> type name (e.g. "STRING").
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

/// A relationship declaration between two node shapes.
#[derive(Debug, Clone, Deserialize)]
pub struct PresentRelationshipConfig {
    pub from: String,
    pub to: String,
    pub relationship: String,
    #[serde(default = "default_cardinality")]
    pub from_cardinality: String,
    #[serde(default = "default_cardinality")]
    pub to_cardinality: String,
}

fn default_cardinality() -> String {
    Cardinality::Many.to_string()
}

impl Config {
    /// Load config with layered resolution (user → project → env).
    pub fn load() -> Result<Self, ConfigError> {
        let user_config = Self::user_config_path();

        Figment::new()
            // Layer 1: User config (lowest priority)
            .merge(Toml::file(user_config))
            // Layer 2: Project config
            .merge(Toml::file(".nodeflow.toml"))
            // Layer 3: Environment variables (highest priority)
            .merge(Self::env())
            .extract()
            .map_err(ConfigError::from)
    }

    /// Load a single config file, with environment overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Figment::new()
            .merge(Toml::file(path.as_ref()))
            .merge(Self::env())
            .extract()
            .map_err(ConfigError::from)
    }

    fn env() -> Env {
        Env::prefixed("NODEFLOW_").split("__")
    }

    /// User config path: ~/.config/nodeflow/config.toml (XDG) or platform config dir.
    fn user_config_path() -> std::path::PathBuf {
        // Prefer XDG config location (~/.config) on all platforms
        if let Some(home) = dirs::home_dir() {
            let xdg_path = home.join(".config").join("nodeflow").join("config.toml");
            if xdg_path.exists() {
                return xdg_path;
            }
        }
        // Fall back to platform-specific config dir
        dirs::config_dir()
            .map(|p| p.join("nodeflow").join("config.toml"))
            .unwrap_or_default()
    }

    /// Assembles and validates the declared schema.
    ///
    /// Unknown type names and integrity violations are all reported together.
    pub fn build_schema(&self) -> Result<GraphSchema, SchemaErrors> {
        let mut errors = Vec::new();
        let mut shapes = Vec::new();

        let declared = self
            .schema
            .nodes
            .iter()
            .map(|s| (GraphObjectType::Node, s))
            .chain(
                self.schema
                    .relationships
                    .iter()
                    .map(|s| (GraphObjectType::Relationship, s)),
            );
        for (object_type, shape) in declared {
            match shape.to_shape(object_type) {
                Ok(shape) => shapes.push(shape),
                Err(mut shape_errors) => errors.append(&mut shape_errors),
            }
        }

        let mut relationships = Vec::new();
        for declaration in &self.schema.present_relationships {
            match declaration.to_relationship() {
                Ok(relationship) => relationships.push(relationship),
                Err(mut relationship_errors) => errors.append(&mut relationship_errors),
            }
        }

        if !errors.is_empty() {
            return Err(SchemaErrors::new(errors));
        }
        GraphSchema::try_new(shapes, relationships)
    }

    /// Parses the mapping tables, constructing tagged entries through `registry`.
    pub fn build_mappings(
        &self,
        registry: &ProviderRegistry,
    ) -> Result<MappingRegistry, ProviderError> {
        let mut mappings = MappingRegistry::new();
        for (name, entries) in &self.mappings {
            let mut mapping = Mapping::new();
            for (key, value) in entries {
                mapping.insert(key.clone(), registry.parse_spec(value)?);
            }
            tracing::debug!(mapping = %name, entries = mapping.len(), "Loaded mapping");
            mappings.insert(name.clone(), mapping);
        }
        Ok(mappings)
    }

    /// Builds everything needed to resolve documents.
    pub fn setup(&self, registry: &ProviderRegistry) -> Result<IngestionSetup, AppError> {
        let schema = self.build_schema()?;
        let mappings = self.build_mappings(registry)?;
        Ok(IngestionSetup {
            schema: Arc::new(schema),
            mappings: Arc::new(mappings),
            max_mapping_depth: self.resolution.max_mapping_depth,
        })
    }
}

impl ShapeConfig {
    fn to_shape(&self, object_type: GraphObjectType) -> Result<GraphObjectShape, Vec<SchemaError>> {
        let mut errors = Vec::new();
        let mut properties = Vec::new();
        for (name, type_name) in &self.properties {
            match type_name.parse::<PropertyType>() {
                Ok(declared_type) => {
                    properties.push(PropertyMetadata::new(name.clone(), declared_type))
                }
                Err(e) => errors.push(e),
            }
        }
        if !errors.is_empty() {
            return Err(errors);
        }
        GraphObjectShape::try_new(object_type, self.type_marker.clone(), properties)
            .map_err(|e| vec![e])
    }
}

impl PresentRelationshipConfig {
    fn to_relationship(&self) -> Result<PresentRelationship, Vec<SchemaError>> {
        match (
            self.from_cardinality.parse::<Cardinality>(),
            self.to_cardinality.parse::<Cardinality>(),
        ) {
            (Ok(from_side), Ok(to_side)) => Ok(PresentRelationship::new(
                self.from.clone(),
                self.to.clone(),
                self.relationship.clone(),
                from_side,
                to_side,
            )),
            (from_side, to_side) => Err(from_side.err().into_iter().chain(to_side.err()).collect()),
        }
    }
}

/// Validated schema and mappings shared across every document.
#[derive(Debug, Clone)]
pub struct IngestionSetup {
    pub schema: Arc<GraphSchema>,
    pub mappings: Arc<MappingRegistry>,
    pub max_mapping_depth: usize,
}

impl IngestionSetup {
    /// Creates a fresh context for one document.
    pub fn context(&self, document: Value) -> ProviderContext {
        ProviderContext::with_mappings(document, DesiredIngestion::new(), self.mappings.clone())
            .with_max_mapping_depth(self.max_mapping_depth)
    }
}
