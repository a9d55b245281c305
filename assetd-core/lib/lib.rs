//! `assetd-core` contains the pieces of assetd that do not depend on an HTTP framework.
//!
//! # Overview
//!
//! assetd serves uploaded files out of a directory that lives outside the service
//! container, so that files survive every redeploy of the service. This crate handles:
//! - Resolving the process configuration once, at startup
//! - Resolving asset paths against the static root without escaping it
//! - Replacing a running container while keeping its mount and environment contract
//!
//! # Modules
//!
//! - [`config`] - Environment-driven configuration
//! - [`store`] - The filesystem-backed asset store and static path helpers
//! - [`management`] - Container runtime abstraction and the handover protocol

#![warn(missing_docs)]

mod error;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub mod config;
pub mod management;
pub mod store;

pub use error::*;
