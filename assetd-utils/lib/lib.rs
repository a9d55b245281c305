//! `assetd-utils` is a library containing general utilities for the assetd project.

#![warn(missing_docs)]

pub mod defaults;
pub mod error;
pub mod path;
pub mod term;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub use defaults::*;
pub use error::*;
pub use path::*;
pub use term::*;
