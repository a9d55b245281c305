//! The filesystem-backed asset store.
//!
//! Assets are addressed by a path relative to the static root, e.g. `profile_images/29.png`.
//! The store never writes to the files it serves. Upload collaborators that write into the
//! static root use the helpers in [`paths`] so they agree with the store on layout.

mod asset;
mod errors;
pub mod paths;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub use asset::*;
pub use errors::*;
