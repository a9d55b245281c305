use std::{fmt, path::PathBuf, str::FromStr};

use assetd_utils::DEFAULT_CONTAINER_STATIC_ROOT;
use serde::{Deserialize, Serialize};

use crate::AssetdError;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// A bind mount from a host directory into the container, written `host:container`.
///
/// A bare `host` mounts at `/app/static`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathPair {
    /// The directory on the host. It owns the assets.
    pub host: PathBuf,

    /// Where the directory appears inside the container.
    pub container: String,
}

/// A published port, written `host:container` or just `port` when both are the same.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortPair {
    /// The port on the host.
    pub host: u16,

    /// The port inside the container.
    pub container: u16,
}

/// Everything needed to run one assetd container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceSpec {
    /// The container name.
    pub name: String,

    /// The image reference to run.
    pub image: String,

    /// The env file handed to the container.
    pub env_file: PathBuf,

    /// The static root mount.
    pub mount: PathPair,

    /// The published port.
    pub port: PortPair,
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl FromStr for PathPair {
    type Err = AssetdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (host, container) = s
            .rsplit_once(':')
            .unwrap_or((s, DEFAULT_CONTAINER_STATIC_ROOT));

        if host.is_empty() || !container.starts_with('/') {
            return Err(AssetdError::InvalidArgument(format!(
                "mount needs a host path and an absolute container path, got {s}"
            )));
        }

        Ok(Self {
            host: PathBuf::from(host),
            container: container.to_string(),
        })
    }
}

impl fmt::Display for PathPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host.display(), self.container)
    }
}

impl FromStr for PortPair {
    type Err = AssetdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse = |port: &str| match port.parse::<u16>() {
            Ok(port) if port > 0 => Ok(port),
            _ => Err(AssetdError::InvalidArgument(format!(
                "invalid port {port:?} in {s}"
            ))),
        };

        match s.split_once(':') {
            Some((host, container)) => Ok(Self {
                host: parse(host)?,
                container: parse(container)?,
            }),
            None => {
                let port = parse(s)?;
                Ok(Self {
                    host: port,
                    container: port,
                })
            }
        }
    }
}

impl fmt::Display for PortPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.container)
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
