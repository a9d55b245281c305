//! Container lifecycle management for assetd.
//!
//! A running assetd container is replaced by stopping and removing it, pulling the new
//! image, and running the new image with the same mount and environment source. The mount
//! holds the assets and outlives every container, so the replacement must never point at a
//! different directory or drop files from it.
//!
//! The main pieces are:
//! - [`ContainerRuntime`]: the operations a container engine must provide
//! - [`DockerCli`]: a runtime that shells out to the `docker` binary
//! - [`LifecycleManager`]: drives a handover as an explicit state machine
//! - [`MountManifest`]: a digest of the mount used to prove no asset was lost

mod docker;
mod handover;
mod instance;
mod manifest;
mod record;
mod runtime;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub use docker::*;
pub use handover::*;
pub use instance::*;
pub use manifest::*;
pub use record::*;
pub use runtime::*;
