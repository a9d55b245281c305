use thiserror::Error;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The result of an assetd-utils related operation.
pub type AssetdUtilsResult<T> = Result<T, AssetdUtilsError>;

/// An error that occurred during a file system operation.
#[derive(pretty_error_debug::Debug, Error)]
pub enum AssetdUtilsError {
    /// The path failed validation.
    #[error("path validation error: {0}")]
    PathValidation(String),
}
