//! Default values and well-known names shared across the assetd crates.

//--------------------------------------------------------------------------------------------------
// Constants: Environment
//--------------------------------------------------------------------------------------------------

/// Environment variable naming the static root directory.
pub const STATIC_ROOT_ENV_VAR: &str = "STATIC_ROOT";

/// Environment variable naming the listening port.
pub const PORT_ENV_VAR: &str = "PORT";

/// Environment variable naming the listening address.
pub const BIND_HOST_ENV_VAR: &str = "BIND_HOST";

//--------------------------------------------------------------------------------------------------
// Constants: HTTP
//--------------------------------------------------------------------------------------------------

/// The fixed URL prefix under which assets are exposed.
pub const PUBLIC_PREFIX: &str = "/static";

/// The segment stored by upload collaborators in front of relative asset paths.
pub const STATIC_SEGMENT: &str = "static";

/// The default listening address. Containers publish ports from all interfaces.
pub const DEFAULT_BIND_HOST: &str = "0.0.0.0";

/// The content type used when the extension is unknown.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

//--------------------------------------------------------------------------------------------------
// Constants: Deployment
//--------------------------------------------------------------------------------------------------

/// The directory, relative to the working directory, where deployment records are kept.
pub const DEFAULT_STATE_DIR: &str = ".assetd";

/// The suffix of deployment record files.
pub const DEPLOYMENT_RECORD_SUFFIX: &str = "deploy.json";

/// The default container path the static root is mounted at.
pub const DEFAULT_CONTAINER_STATIC_ROOT: &str = "/app/static";

/// The default number of seconds to wait for a new instance to report healthy.
pub const DEFAULT_HEALTH_TIMEOUT_SECS: u64 = 30;
