//! Nodeflow - value resolution and graph schema core
//!
//! Extracts typed values from loosely structured documents through value
//! providers, and describes the node and relationship shapes they are
//! ingested as.

pub mod config;
pub mod context;
pub mod error;
pub mod models;
pub mod providers;
pub mod schema;

pub use context::{MappingRegistry, ProviderContext};
pub use error::AppError;
pub use providers::{ProviderRegistry, ValueProvider};
pub use schema::GraphSchema;
