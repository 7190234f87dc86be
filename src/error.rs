//! Application error types.

use thiserror::Error;

use crate::providers::ProviderError;
use crate::schema::SchemaErrors;

/// Application-level errors for nodeflow.
///
/// Resolution never produces an error: a value that cannot be resolved is
/// simply absent. Errors only come from building providers, assembling a
/// schema or loading configuration.
#[derive(Error, Debug)]
pub enum AppError {
    // Provider construction errors
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // Schema integrity errors
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaErrors),

    // Config errors
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}
