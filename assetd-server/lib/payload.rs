//! Response payloads for the assetd server.
//!
//! Error bodies follow the envelope the API collaborator already uses, so clients can handle
//! static and API errors the same way.

use serde::{Deserialize, Serialize};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Response type for regular message responses
#[derive(Debug, Serialize, Deserialize)]
pub struct RegularMessageResponse {
    /// Message describing the result
    pub message: String,
}

/// Body of every error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Always false
    pub success: bool,

    /// A generic, client-safe message
    pub message: String,

    /// The localized message. Falls back to `message` when there is no translation
    pub message_ar: String,

    /// A stable machine-readable code
    pub error_code: String,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl ErrorResponse {
    /// Creates an error body.
    pub fn new(message: impl Into<String>, error_code: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            success: false,
            message_ar: message.clone(),
            message,
            error_code: error_code.into(),
        }
    }
}
