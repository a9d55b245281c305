use std::{fmt, path::PathBuf, time::Duration};

use assetd_utils::{DEFAULT_HEALTH_TIMEOUT_SECS, DEFAULT_STATE_DIR};
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::{
    management::{ContainerRuntime, DeploymentRecord, InstanceSpec, MountManifest},
    AssetdError, AssetdResult,
};

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// Delay between health probes.
const HEALTH_POLL_INTERVAL: Duration = Duration::from_millis(500);

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Where a handover stands.
///
/// The happy path is `Running(old) → Stopping → Stopped → Removed → Pulling(new) →
/// Running(new)`. A first deployment starts from `Absent`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "detail", rename_all = "snake_case")]
pub enum HandoverState {
    /// No instance with the name exists.
    Absent,

    /// An instance is running the given image.
    Running(String),

    /// The old instance is being stopped.
    Stopping,

    /// The old instance is stopped but still exists.
    Stopped,

    /// The old instance is gone. Nothing serves the port.
    Removed,

    /// The given image is being pulled.
    Pulling(String),

    /// The handover stopped. The reason is attached.
    Failed(String),
}

/// A state together with the time it was entered.
#[derive(Debug, Clone, Serialize)]
pub struct Transition {
    /// The state entered.
    pub state: HandoverState,

    /// When it was entered.
    pub at: DateTime<Utc>,
}

/// The history of one handover.
#[derive(Debug, Clone, Serialize)]
pub struct HandoverReport {
    /// The instance being replaced or created.
    pub name: String,

    /// Every state entered, in order.
    pub transitions: Vec<Transition>,

    /// Number of assets on the mount before the handover, when verification ran.
    pub assets_verified: Option<usize>,
}

/// A handover that did not reach `Running(new)`.
#[derive(Debug, Error)]
#[error("handover of {} failed in state {}: {source}", .report.name, .state)]
pub struct HandoverFailure {
    /// The state the handover was in when it failed.
    pub state: HandoverState,

    /// What happened before the failure.
    pub report: HandoverReport,

    /// The cause.
    #[source]
    pub source: AssetdError,
}

/// Knobs for a handover.
#[derive(Debug, Clone)]
pub struct HandoverOptions {
    /// Directory holding deployment records.
    pub state_dir: PathBuf,

    /// URL polled after the new instance starts. Any 2xx response counts as healthy.
    pub health_url: Option<String>,

    /// How long to wait for the health URL.
    pub health_timeout: Duration,

    /// Whether to check that every asset on the mount survived the handover.
    pub verify_assets: bool,

    /// Allow a different mount or env file than the previous deployment used.
    pub force: bool,
}

/// Replaces container instances while keeping their mount and environment contract.
#[derive(Debug)]
pub struct LifecycleManager<R> {
    runtime: R,
    options: HandoverOptions,
}

/// Tracks the state of a single handover while it runs.
struct Handover {
    state: HandoverState,
    report: HandoverReport,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl<R: ContainerRuntime> LifecycleManager<R> {
    /// Creates a manager driving `runtime`.
    pub fn new(runtime: R, options: HandoverOptions) -> Self {
        Self { runtime, options }
    }

    /// The underlying runtime.
    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    /// Replaces the instance named in `spec` with a new one built from `spec`.
    ///
    /// Nothing is stopped until the preflight checks pass. If the pull fails the old
    /// instance stays removed and nothing is launched; relaunching the previous image is
    /// left to the operator.
    pub async fn redeploy(&self, spec: &InstanceSpec) -> Result<HandoverReport, HandoverFailure> {
        let current = match self.runtime.inspect(&spec.name).await {
            Ok(current) => current,
            Err(source) => {
                return Err(HandoverFailure {
                    state: HandoverState::Absent,
                    report: HandoverReport::new(&spec.name),
                    source,
                })
            }
        };

        let initial = match &current {
            None => HandoverState::Absent,
            Some(status) if status.running => HandoverState::Running(status.image.clone()),
            Some(_) => HandoverState::Stopped,
        };

        let mut handover = Handover::new(&spec.name, initial);
        match self.run_handover(spec, current.is_some(), &mut handover).await {
            Ok(()) => Ok(handover.report),
            Err(source) => {
                let state = handover.state.clone();
                handover.enter(HandoverState::Failed(source.to_string()));
                tracing::error!("handover of {} failed in state {}: {}", spec.name, state, source);
                Err(HandoverFailure {
                    state,
                    report: handover.report,
                    source,
                })
            }
        }
    }

    /// Checks that `spec` can be launched without breaking the deployment contract.
    ///
    /// Returns the spec with host paths made absolute.
    pub async fn preflight(&self, spec: &InstanceSpec) -> AssetdResult<InstanceSpec> {
        let mut resolved = spec.clone();

        resolved.mount.host = match tokio::fs::canonicalize(&spec.mount.host).await {
            Ok(path) if path.is_dir() => path,
            _ => return Err(AssetdError::MountSourceMissing(spec.mount.host.clone())),
        };

        resolved.env_file = tokio::fs::canonicalize(&spec.env_file)
            .await
            .map_err(|e| {
                AssetdError::InvalidArgument(format!(
                    "env file {} is not readable: {}",
                    spec.env_file.display(),
                    e
                ))
            })?;

        if let Some(record) = DeploymentRecord::load(&self.options.state_dir, &spec.name).await? {
            let previous = &record.spec;
            let mut violations = Vec::new();
            if previous.mount != resolved.mount {
                violations.push(format!("mount {} != {}", resolved.mount, previous.mount));
            }
            if previous.env_file != resolved.env_file {
                violations.push(format!(
                    "env file {} != {}",
                    resolved.env_file.display(),
                    previous.env_file.display()
                ));
            }

            if !violations.is_empty() {
                if !self.options.force {
                    return Err(AssetdError::ContractViolation(violations.join("; ")));
                }
                tracing::warn!(
                    "forcing handover of {} despite contract change: {}",
                    spec.name,
                    violations.join("; ")
                );
            }

            if previous.image != resolved.image {
                tracing::info!("image changes from {} to {}", previous.image, resolved.image);
            }
        }

        let holders: Vec<String> = self
            .runtime
            .containers_on_port(resolved.port.host)
            .await?
            .into_iter()
            .filter(|holder| holder != &spec.name)
            .collect();
        if !holders.is_empty() {
            return Err(AssetdError::PortConflict {
                port: resolved.port.host,
                containers: holders,
            });
        }

        Ok(resolved)
    }

    async fn run_handover(
        &self,
        spec: &InstanceSpec,
        exists: bool,
        handover: &mut Handover,
    ) -> AssetdResult<()> {
        let spec = self.preflight(spec).await?;

        let manifest = if self.options.verify_assets {
            let manifest = MountManifest::capture(&spec.mount.host).await?;
            tracing::info!(
                "captured {} asset(s) under {}",
                manifest.len(),
                spec.mount.host.display()
            );
            Some(manifest)
        } else {
            None
        };

        if let HandoverState::Running(_) = handover.state {
            handover.enter(HandoverState::Stopping);
            self.runtime.stop(&spec.name).await?;
            handover.enter(HandoverState::Stopped);
        }

        if exists {
            self.runtime.remove(&spec.name).await?;
            handover.enter(HandoverState::Removed);
        }

        handover.enter(HandoverState::Pulling(spec.image.clone()));
        self.runtime.pull(&spec.image).await?;

        self.runtime.run(&spec).await?;
        handover.enter(HandoverState::Running(spec.image.clone()));

        if let Some(url) = &self.options.health_url {
            wait_until_healthy(url, self.options.health_timeout).await?;
            tracing::info!("{} is healthy", spec.name);
        }

        if let Some(manifest) = manifest {
            let lost = manifest.verify(&spec.mount.host).await?;
            if !lost.is_empty() {
                return Err(AssetdError::AssetsLost(lost));
            }
            handover.report.assets_verified = Some(manifest.len());
        }

        DeploymentRecord::new(spec).save(&self.options.state_dir).await?;
        Ok(())
    }
}

impl Handover {
    fn new(name: &str, initial: HandoverState) -> Self {
        let mut handover = Self {
            state: initial.clone(),
            report: HandoverReport::new(name),
        };
        handover.record(initial);
        handover
    }

    fn enter(&mut self, state: HandoverState) {
        tracing::info!("{}: {} -> {}", self.report.name, self.state, state);
        self.state = state.clone();
        self.record(state);
    }

    fn record(&mut self, state: HandoverState) {
        self.report.transitions.push(Transition {
            state,
            at: Utc::now(),
        });
    }
}

impl HandoverReport {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            transitions: Vec::new(),
            assets_verified: None,
        }
    }

    /// The states entered, without timestamps.
    pub fn states(&self) -> Vec<&HandoverState> {
        self.transitions.iter().map(|t| &t.state).collect()
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Default for HandoverOptions {
    fn default() -> Self {
        Self {
            state_dir: PathBuf::from(DEFAULT_STATE_DIR),
            health_url: None,
            health_timeout: Duration::from_secs(DEFAULT_HEALTH_TIMEOUT_SECS),
            verify_assets: true,
            force: false,
        }
    }
}

impl fmt::Display for HandoverState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandoverState::Absent => write!(f, "absent"),
            HandoverState::Running(image) => write!(f, "running({image})"),
            HandoverState::Stopping => write!(f, "stopping"),
            HandoverState::Stopped => write!(f, "stopped"),
            HandoverState::Removed => write!(f, "removed"),
            HandoverState::Pulling(image) => write!(f, "pulling({image})"),
            HandoverState::Failed(reason) => write!(f, "failed({reason})"),
        }
    }
}

impl From<HandoverFailure> for AssetdError {
    fn from(failure: HandoverFailure) -> Self {
        AssetdError::Handover(Box::new(failure))
    }
}

//--------------------------------------------------------------------------------------------------
// Functions: Helpers
//--------------------------------------------------------------------------------------------------

async fn wait_until_healthy(url: &str, timeout: Duration) -> AssetdResult<()> {
    let client = reqwest::Client::builder()
        .timeout(HEALTH_POLL_INTERVAL * 4)
        .build()?;
    let deadline = tokio::time::Instant::now() + timeout;

    loop {
        let last_error = match client.get(url).send().await {
            Ok(response) if response.status().is_success() => return Ok(()),
            Ok(response) => format!("{url} answered {}", response.status()),
            Err(e) => format!("{url} unreachable: {e}"),
        };

        if tokio::time::Instant::now() + HEALTH_POLL_INTERVAL > deadline {
            return Err(AssetdError::HealthCheck(last_error));
        }

        tracing::debug!("waiting for health: {}", last_error);
        tokio::time::sleep(HEALTH_POLL_INTERVAL).await;
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
