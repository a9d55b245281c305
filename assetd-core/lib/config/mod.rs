//! Configuration for an assetd process.
//!
//! The configuration is resolved exactly once, when the process starts, from either the
//! process environment or an env file. The result is immutable and is handed to the server
//! state and the asset store explicitly. Nothing reads the environment after startup.

use std::{
    collections::HashMap,
    fmt,
    net::{IpAddr, SocketAddr},
    path::{Path, PathBuf},
};

use assetd_utils::{
    BIND_HOST_ENV_VAR, DEFAULT_BIND_HOST, PORT_ENV_VAR, PUBLIC_PREFIX, STATIC_ROOT_ENV_VAR,
};
use getset::Getters;
use nix::unistd::{access, AccessFlags};
use thiserror::Error;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Where the configuration is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// The environment of the current process.
    Process,

    /// A dotenv-style file. Its values are not copied into the process environment.
    EnvFile(PathBuf),
}

/// The resolved configuration of an assetd process.
#[derive(Debug, Clone, Getters)]
#[getset(get = "pub with_prefix")]
pub struct Config {
    /// Canonical absolute path of the directory assets are served from.
    static_root: PathBuf,

    /// Port to listen on.
    listen_port: u16,

    /// Address to listen on.
    bind_host: IpAddr,

    /// The source this configuration was resolved from.
    source: ConfigSource,
}

/// An error that makes the configuration unusable. The process must not start.
#[derive(pretty_error_debug::Debug, Error)]
pub enum ConfigError {
    /// A required variable is not set.
    #[error("{0} is not set")]
    MissingVar(&'static str),

    /// A required variable is set to an empty value.
    #[error("{0} is empty")]
    EmptyVar(&'static str),

    /// The static root is not an absolute path.
    #[error("STATIC_ROOT must be an absolute path, got {0}")]
    RootNotAbsolute(PathBuf),

    /// The static root does not exist.
    #[error("static root {0} does not exist")]
    RootNotFound(PathBuf),

    /// The static root exists but is not a directory.
    #[error("static root {0} is not a directory")]
    RootNotDirectory(PathBuf),

    /// The static root cannot be read from and written to by this process.
    #[error("static root {path} is not readable and writable: {reason}")]
    RootNotAccessible {
        /// The static root.
        path: PathBuf,

        /// Why access was refused.
        reason: String,
    },

    /// The port is not an integer in 1-65535.
    #[error("PORT must be an integer in 1-65535, got {0:?}")]
    InvalidPort(String),

    /// The bind host is not an IP address.
    #[error("BIND_HOST must be an IP address, got {0:?}")]
    InvalidHost(String),

    /// The env file could not be read or parsed.
    #[error("failed to read env file {path}: {reason}")]
    EnvFile {
        /// The env file.
        path: PathBuf,

        /// The underlying error.
        reason: String,
    },
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl Config {
    /// Resolves the configuration from the given source.
    ///
    /// Call this once per process and pass the result along.
    pub fn resolve(source: &ConfigSource) -> Result<Self, ConfigError> {
        let vars: HashMap<String, String> = match source {
            ConfigSource::Process => std::env::vars_os()
                .filter_map(|(key, value)| {
                    Some((key.into_string().ok()?, value.into_string().ok()?))
                })
                .collect(),
            ConfigSource::EnvFile(path) => read_env_file(path)?,
        };

        Self::from_vars(source.clone(), vars)
    }

    /// Builds the configuration from a set of variables.
    pub fn from_vars(
        source: ConfigSource,
        vars: impl IntoIterator<Item = (String, String)>,
    ) -> Result<Self, ConfigError> {
        let vars: HashMap<String, String> = vars.into_iter().collect();

        let static_root = required_var(&vars, STATIC_ROOT_ENV_VAR)?;
        let static_root = resolve_static_root(Path::new(static_root))?;

        let port = required_var(&vars, PORT_ENV_VAR)?;
        let listen_port = parse_port(port)?;

        let bind_host = match vars.get(BIND_HOST_ENV_VAR).map(|v| v.trim()) {
            Some(host) if !host.is_empty() => host
                .parse()
                .map_err(|_| ConfigError::InvalidHost(host.to_string()))?,
            _ => DEFAULT_BIND_HOST
                .parse()
                .map_err(|_| ConfigError::InvalidHost(DEFAULT_BIND_HOST.to_string()))?,
        };

        Ok(Self {
            static_root,
            listen_port,
            bind_host,
            source,
        })
    }

    /// The URL prefix assets are served under.
    pub fn get_public_prefix(&self) -> &'static str {
        PUBLIC_PREFIX
    }

    /// The socket address to listen on.
    pub fn get_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_host, self.listen_port)
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::Process => write!(f, "process environment"),
            ConfigSource::EnvFile(path) => write!(f, "env file {}", path.display()),
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Functions: Helpers
//--------------------------------------------------------------------------------------------------

fn read_env_file(path: &Path) -> Result<HashMap<String, String>, ConfigError> {
    let env_file_error = |e: dotenvy::Error| ConfigError::EnvFile {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };

    dotenvy::from_path_iter(path)
        .map_err(env_file_error)?
        .map(|item| item.map_err(env_file_error))
        .collect()
}

fn required_var<'a>(
    vars: &'a HashMap<String, String>,
    name: &'static str,
) -> Result<&'a str, ConfigError> {
    let value = vars.get(name).ok_or(ConfigError::MissingVar(name))?.trim();
    if value.is_empty() {
        return Err(ConfigError::EmptyVar(name));
    }

    Ok(value)
}

fn resolve_static_root(path: &Path) -> Result<PathBuf, ConfigError> {
    if !path.is_absolute() {
        return Err(ConfigError::RootNotAbsolute(path.to_path_buf()));
    }

    let metadata = match std::fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ConfigError::RootNotFound(path.to_path_buf()));
        }
        Err(e) => {
            return Err(ConfigError::RootNotAccessible {
                path: path.to_path_buf(),
                reason: e.to_string(),
            });
        }
    };

    if !metadata.is_dir() {
        return Err(ConfigError::RootNotDirectory(path.to_path_buf()));
    }

    // X_OK is needed to traverse into the directory.
    access(path, AccessFlags::R_OK | AccessFlags::W_OK | AccessFlags::X_OK).map_err(|errno| {
        ConfigError::RootNotAccessible {
            path: path.to_path_buf(),
            reason: errno.desc().to_string(),
        }
    })?;

    std::fs::canonicalize(path).map_err(|e| ConfigError::RootNotAccessible {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

fn parse_port(value: &str) -> Result<u16, ConfigError> {
    match value.parse::<u16>() {
        Ok(port) if port > 0 => Ok(port),
        _ => Err(ConfigError::InvalidPort(value.to_string())),
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
