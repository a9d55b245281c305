use async_trait::async_trait;

use crate::{management::InstanceSpec, AssetdResult};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// What a container runtime reports about a named instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceStatus {
    /// The container name.
    pub name: String,

    /// Whether the container is running.
    pub running: bool,

    /// The image the container was created from.
    pub image: String,
}

//--------------------------------------------------------------------------------------------------
// Traits
//--------------------------------------------------------------------------------------------------

/// The container operations the lifecycle manager relies on.
///
/// None of these operations may modify the contents of a mount.
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Looks up an instance by name. Returns `None` if no such container exists.
    async fn inspect(&self, name: &str) -> AssetdResult<Option<InstanceStatus>>;

    /// Stops a running instance.
    async fn stop(&self, name: &str) -> AssetdResult<()>;

    /// Removes a stopped instance. Volumes and bind mounts are left alone.
    async fn remove(&self, name: &str) -> AssetdResult<()>;

    /// Pulls an image.
    async fn pull(&self, image: &str) -> AssetdResult<()>;

    /// Creates and starts an instance.
    async fn run(&self, spec: &InstanceSpec) -> AssetdResult<()>;

    /// Names of the containers that publish `port` on the host.
    async fn containers_on_port(&self, port: u16) -> AssetdResult<Vec<String>>;
}
