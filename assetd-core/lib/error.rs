use std::path::PathBuf;

use assetd_utils::AssetdUtilsError;
use thiserror::Error;

use crate::{config::ConfigError, management::HandoverFailure, store::StoreError};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The result of an assetd-core related operation.
pub type AssetdResult<T> = Result<T, AssetdError>;

/// An error that occurred in assetd-core.
#[derive(pretty_error_debug::Debug, Error)]
pub enum AssetdError {
    /// The configuration could not be resolved.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An asset could not be served.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// An error from the utils crate.
    #[error(transparent)]
    Utils(#[from] AssetdUtilsError),

    /// An I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON (de)serialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// An error walking a directory tree.
    #[error("walkdir error: {0}")]
    WalkDir(#[from] walkdir::Error),

    /// An HTTP client error.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// An argument could not be parsed or is not allowed.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The new instance would not use the same mount or environment source as the previous one.
    #[error("deployment contract violation: {0}")]
    ContractViolation(String),

    /// Another container already publishes the requested host port.
    #[error("port {port} is already published by {}", containers.join(", "))]
    PortConflict {
        /// The host port.
        port: u16,

        /// The containers holding the port.
        containers: Vec<String>,
    },

    /// The mount source does not exist on the host.
    #[error("mount source {0} does not exist or is not a directory")]
    MountSourceMissing(PathBuf),

    /// A container runtime command exited unsuccessfully.
    #[error("`{command}` failed with {status}: {stderr}")]
    RuntimeCommand {
        /// The command line that was run.
        command: String,

        /// The exit status as reported by the OS.
        status: String,

        /// The trimmed standard error of the command.
        stderr: String,
    },

    /// Assets present on the mount before a handover are missing or changed after it.
    #[error("{} asset(s) missing or changed after handover: {}", .0.len(), .0.join(", "))]
    AssetsLost(Vec<String>),

    /// A handover stopped before the new instance was live.
    #[error(transparent)]
    Handover(Box<HandoverFailure>),

    /// The new instance did not become healthy in time.
    #[error("health check failed: {0}")]
    HealthCheck(String),
}
