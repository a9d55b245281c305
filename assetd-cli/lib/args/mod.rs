mod assetctl;
mod assetd;
mod log;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub use assetctl::*;
pub use assetd::*;
pub use log::*;
