use std::{path::PathBuf, time::Duration};

use assetd_core::management::{HandoverOptions, InstanceSpec, PathPair, PortPair};
use assetd_utils::{DEFAULT_HEALTH_TIMEOUT_SECS, DEFAULT_STATE_DIR};
use clap::{Args, Parser, Subcommand};

use crate::{styles, LogArgs};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Operates assetd containers without losing the mounted assets
#[derive(Debug, Parser)]
#[command(name = "assetctl", author, version, styles=styles::styles())]
pub struct AssetctlArgs {
    /// The subcommand to run
    #[command(subcommand)]
    pub subcommand: AssetctlSubcommand,

    /// Verbosity
    #[command(flatten)]
    pub log: LogArgs,
}

/// Available subcommands for managing instances
#[derive(Debug, Subcommand)]
pub enum AssetctlSubcommand {
    /// Stop a running instance
    #[command(name = "stop")]
    Stop {
        /// Name of the instance
        name: String,
    },

    /// Remove a stopped instance
    #[command(name = "remove")]
    Remove {
        /// Name of the instance
        name: String,
    },

    /// Pull an image
    #[command(name = "pull")]
    Pull {
        /// Image reference to pull
        image: String,
    },

    /// Start a new instance after checking its mount, env file and port
    #[command(name = "run")]
    Run {
        /// The instance to start
        #[command(flatten)]
        instance: InstanceArgs,

        /// Directory holding deployment records
        #[arg(long, default_value = DEFAULT_STATE_DIR)]
        state_dir: PathBuf,

        /// Start even if the mount or env file differs from the last deployment
        #[arg(long, default_value_t = false)]
        force: bool,
    },

    /// Replace an instance: stop, remove, pull, run
    #[command(name = "redeploy")]
    Redeploy {
        /// The instance to deploy
        #[command(flatten)]
        instance: InstanceArgs,

        /// Directory holding deployment records
        #[arg(long, default_value = DEFAULT_STATE_DIR)]
        state_dir: PathBuf,

        /// URL polled after start until it answers with a success status
        #[arg(long)]
        health_url: Option<String>,

        /// Seconds to wait for the health URL
        #[arg(long, default_value_t = DEFAULT_HEALTH_TIMEOUT_SECS)]
        health_timeout: u64,

        /// Redeploy even if the mount or env file differs from the last deployment
        #[arg(long, default_value_t = false)]
        force: bool,

        /// Skip comparing the mounted assets before and after the handover
        #[arg(long, default_value_t = false)]
        no_verify: bool,
    },

    /// Show the state of an instance and its last deployment
    #[command(name = "status")]
    Status {
        /// Name of the instance
        name: String,

        /// Directory holding deployment records
        #[arg(long, default_value = DEFAULT_STATE_DIR)]
        state_dir: PathBuf,
    },

    /// Print the size and digest of every file under a directory
    #[command(name = "manifest")]
    Manifest {
        /// Directory to walk
        dir: PathBuf,
    },
}

/// The parameters of one instance
#[derive(Debug, Clone, Args)]
pub struct InstanceArgs {
    /// Name of the instance
    #[arg(long)]
    pub name: String,

    /// Image reference to run
    #[arg(long)]
    pub image: String,

    /// Env file passed to the instance
    #[arg(long = "env-file")]
    pub env_file: PathBuf,

    /// Static asset mount as `host_dir:container_dir`, or `host_dir` to mount at /app/static
    #[arg(long)]
    pub mount: PathPair,

    /// Published port as `host:container` or a single port for both
    #[arg(long)]
    pub port: PortPair,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl InstanceArgs {
    /// Converts the arguments into an instance spec.
    pub fn into_spec(self) -> InstanceSpec {
        InstanceSpec {
            name: self.name,
            image: self.image,
            env_file: self.env_file,
            mount: self.mount,
            port: self.port,
        }
    }
}

impl AssetctlSubcommand {
    /// Handover options for the subcommands that launch an instance.
    pub fn handover_options(&self) -> Option<HandoverOptions> {
        match self {
            Self::Run {
                state_dir, force, ..
            } => Some(HandoverOptions {
                state_dir: state_dir.clone(),
                force: *force,
                ..Default::default()
            }),
            Self::Redeploy {
                state_dir,
                health_url,
                health_timeout,
                force,
                no_verify,
                ..
            } => Some(HandoverOptions {
                state_dir: state_dir.clone(),
                health_url: health_url.clone(),
                health_timeout: Duration::from_secs(*health_timeout),
                verify_assets: !no_verify,
                force: *force,
            }),
            _ => None,
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const REDEPLOY: &[&str] = &[
        "assetctl",
        "redeploy",
        "--name",
        "assetd",
        "--image",
        "assetd:2",
        "--env-file",
        "/etc/assetd/.env",
        "--mount",
        "/srv/assetd/static:/app/static",
        "--port",
        "8000",
    ];

    #[test]
    fn test_parse_redeploy() {
        let args = AssetctlArgs::try_parse_from(REDEPLOY).unwrap();
        let options = args.subcommand.handover_options().unwrap();
        assert_eq!(options.state_dir, PathBuf::from(DEFAULT_STATE_DIR));
        assert_eq!(
            options.health_timeout,
            Duration::from_secs(DEFAULT_HEALTH_TIMEOUT_SECS)
        );
        assert!(options.verify_assets);
        assert!(!options.force);

        let AssetctlSubcommand::Redeploy { instance, .. } = args.subcommand else {
            panic!("expected redeploy");
        };
        let spec = instance.into_spec();
        assert_eq!(spec.mount.host, PathBuf::from("/srv/assetd/static"));
        assert_eq!(spec.mount.container, "/app/static");
        assert_eq!(spec.port.host, 8000);
        assert_eq!(spec.port.container, 8000);
    }

    #[test]
    fn test_parse_redeploy_flags() {
        let mut argv = REDEPLOY.to_vec();
        argv.extend([
            "--force",
            "--no-verify",
            "--health-url",
            "http://localhost:8000/api/v1/health",
            "--debug",
        ]);

        let args = AssetctlArgs::try_parse_from(argv).unwrap();
        assert_eq!(args.log.level(), Some("debug"));

        let options = args.subcommand.handover_options().unwrap();
        assert!(options.force);
        assert!(!options.verify_assets);
        assert_eq!(
            options.health_url.as_deref(),
            Some("http://localhost:8000/api/v1/health")
        );
    }

    #[test]
    fn test_relative_container_mount_is_rejected() {
        let mut argv = REDEPLOY.to_vec();
        argv[9] = "/srv/assetd/static:app/static";
        assert!(AssetctlArgs::try_parse_from(argv).is_err());
    }

    #[test]
    fn test_redeploy_requires_mount() {
        let argv: Vec<&str> = REDEPLOY[..8].to_vec();
        assert!(AssetctlArgs::try_parse_from(argv).is_err());
    }

    #[test]
    fn test_simple_subcommands_have_no_handover_options() {
        let args = AssetctlArgs::try_parse_from(["assetctl", "stop", "assetd"]).unwrap();
        assert!(
            matches!(args.subcommand, AssetctlSubcommand::Stop { ref name } if name == "assetd")
        );
        assert!(args.subcommand.handover_options().is_none());
    }
}
