use assetd_core::{config::ConfigError, AssetdError};
use thiserror::Error;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The result of a CLI operation.
pub type AssetdCliResult<T> = Result<T, AssetdCliError>;

/// An error that ends a CLI invocation with a non-zero exit code.
#[derive(pretty_error_debug::Debug, Error)]
pub enum AssetdCliError {
    /// The server configuration is invalid. The server did not start.
    #[error("refusing to start: {0}")]
    Config(#[from] ConfigError),

    /// An error from the core library.
    #[error(transparent)]
    Core(#[from] AssetdError),

    /// An I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON serialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
