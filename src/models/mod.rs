//! Domain models for resolved ingestion data.

mod ingestion;
mod property_set;

pub use ingestion::{DesiredIngestion, NodeData, RelationshipData};
pub use property_set::PropertySet;
