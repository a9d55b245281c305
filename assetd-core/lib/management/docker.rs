use std::{path::PathBuf, process::Stdio};

use assetd_utils::{PORT_ENV_VAR, STATIC_ROOT_ENV_VAR};
use async_trait::async_trait;
use tokio::process::Command;

use crate::{
    management::{ContainerRuntime, InstanceSpec, InstanceStatus},
    AssetdError, AssetdResult,
};

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// The docker binary looked up on `PATH` by default.
const DEFAULT_DOCKER_BINARY: &str = "docker";

/// Restart policy applied to every instance.
const RESTART_POLICY: &str = "unless-stopped";

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// A [`ContainerRuntime`] backed by the `docker` command line client.
#[derive(Debug, Clone)]
pub struct DockerCli {
    binary: PathBuf,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl DockerCli {
    /// Creates a runtime that invokes the given docker binary.
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Builds the arguments for `docker run`.
    ///
    /// The mount uses `--mount type=bind`, which fails when the source is missing instead of
    /// silently creating an empty directory. `STATIC_ROOT` and `PORT` are passed explicitly
    /// so they always agree with the mount target and published port, whatever the env file
    /// says.
    pub fn run_args(spec: &InstanceSpec) -> Vec<String> {
        vec![
            "run".to_string(),
            "--detach".to_string(),
            "--name".to_string(),
            spec.name.clone(),
            "--restart".to_string(),
            RESTART_POLICY.to_string(),
            "--env-file".to_string(),
            spec.env_file.display().to_string(),
            "--env".to_string(),
            format!("{}={}", STATIC_ROOT_ENV_VAR, spec.mount.container),
            "--env".to_string(),
            format!("{}={}", PORT_ENV_VAR, spec.port.container),
            "--mount".to_string(),
            format!(
                "type=bind,source={},target={}",
                spec.mount.host.display(),
                spec.mount.container
            ),
            "--publish".to_string(),
            spec.port.to_string(),
            spec.image.clone(),
        ]
    }

    async fn exec<I, S>(&self, args: I) -> AssetdResult<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|a| a.as_ref().to_string()).collect();
        let command_line = format!("{} {}", self.binary.display(), args.join(" "));
        tracing::debug!("running {}", command_line);

        let output = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await?;

        if !output.status.success() {
            return Err(AssetdError::RuntimeCommand {
                command: command_line,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Default for DockerCli {
    fn default() -> Self {
        Self::new(DEFAULT_DOCKER_BINARY)
    }
}

#[async_trait]
impl ContainerRuntime for DockerCli {
    async fn inspect(&self, name: &str) -> AssetdResult<Option<InstanceStatus>> {
        let stdout = self
            .exec([
                "ps",
                "--all",
                "--no-trunc",
                "--format",
                "{{.Names}}\t{{.State}}\t{{.Image}}",
            ])
            .await?;

        Ok(parse_ps_line(&stdout, name))
    }

    async fn stop(&self, name: &str) -> AssetdResult<()> {
        self.exec(["stop", name]).await.map(|_| ())
    }

    async fn remove(&self, name: &str) -> AssetdResult<()> {
        self.exec(["rm", name]).await.map(|_| ())
    }

    async fn pull(&self, image: &str) -> AssetdResult<()> {
        self.exec(["pull", image]).await.map(|_| ())
    }

    async fn run(&self, spec: &InstanceSpec) -> AssetdResult<()> {
        self.exec(Self::run_args(spec)).await.map(|_| ())
    }

    async fn containers_on_port(&self, port: u16) -> AssetdResult<Vec<String>> {
        // The `publish` filter matches container ports, so host ports are read from `.Ports`.
        let stdout = self
            .exec(["ps", "--no-trunc", "--format", "{{.Names}}\t{{.Ports}}"])
            .await?;

        Ok(parse_port_holders(&stdout, port))
    }
}

//--------------------------------------------------------------------------------------------------
// Functions: Helpers
//--------------------------------------------------------------------------------------------------

fn parse_ps_line(stdout: &str, name: &str) -> Option<InstanceStatus> {
    stdout.lines().find_map(|line| {
        let mut fields = line.trim().splitn(3, '\t');
        let names = fields.next()?;
        let state = fields.next()?;
        let image = fields.next().unwrap_or_default();

        // A container can carry several comma separated names.
        names.split(',').any(|n| n == name).then(|| InstanceStatus {
            name: name.to_string(),
            running: state == "running",
            image: image.to_string(),
        })
    })
}

/// Names of the containers whose `.Ports` column publishes `port` on the host.
///
/// Entries look like `0.0.0.0:8080->80/tcp`, `[::]:8000-8001->8000-8001/tcp` or, for
/// exposed but unpublished ports, `80/tcp`.
fn parse_port_holders(stdout: &str, port: u16) -> Vec<String> {
    stdout
        .lines()
        .filter_map(|line| {
            let (names, ports) = line.trim().split_once('\t')?;
            let holds_port = ports
                .split(',')
                .filter_map(|mapping| mapping.trim().split_once("->"))
                .filter_map(|(host, _)| host.rsplit_once(':'))
                .any(|(_, host_ports)| host_range_contains(host_ports, port));

            holds_port.then(|| names.split(',').map(str::to_string).collect::<Vec<_>>())
        })
        .flatten()
        .collect()
}

fn host_range_contains(host_ports: &str, port: u16) -> bool {
    let (start, end) = host_ports.split_once('-').unwrap_or((host_ports, host_ports));
    match (start.parse::<u16>(), end.parse::<u16>()) {
        (Ok(start), Ok(end)) => (start..=end).contains(&port),
        _ => false,
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
