use std::path::Path;

use assetd_cli::AssetdCliResult;
use assetd_core::{
    management::{
        ContainerRuntime, DeploymentRecord, HandoverOptions, HandoverReport, HandoverState,
        InstanceSpec, LifecycleManager, MountManifest,
    },
    AssetdError,
};
use assetd_utils::{CHECKMARK, CROSS};
use console::style;

//--------------------------------------------------------------------------------------------------
// Functions: Handlers
//--------------------------------------------------------------------------------------------------

pub async fn stop_subcommand(runtime: &impl ContainerRuntime, name: &str) -> AssetdCliResult<()> {
    runtime.stop(name).await?;
    println!("{} Stopped {}", &*CHECKMARK, style(name).yellow());
    Ok(())
}

pub async fn remove_subcommand(runtime: &impl ContainerRuntime, name: &str) -> AssetdCliResult<()> {
    runtime.remove(name).await?;
    println!("{} Removed {}", &*CHECKMARK, style(name).yellow());
    Ok(())
}

pub async fn pull_subcommand(runtime: &impl ContainerRuntime, image: &str) -> AssetdCliResult<()> {
    runtime.pull(image).await?;
    println!("{} Pulled {}", &*CHECKMARK, style(image).yellow());
    Ok(())
}

pub async fn run_subcommand<R: ContainerRuntime>(
    runtime: R,
    spec: InstanceSpec,
    options: HandoverOptions,
) -> AssetdCliResult<()> {
    let state_dir = options.state_dir.clone();
    let manager = LifecycleManager::new(runtime, options);
    let spec = manager.preflight(&spec).await?;

    if manager.runtime().inspect(&spec.name).await?.is_some() {
        return Err(AssetdError::InvalidArgument(format!(
            "an instance named {} already exists, use redeploy to replace it",
            spec.name
        ))
        .into());
    }

    manager.runtime().run(&spec).await?;
    DeploymentRecord::new(spec.clone()).save(&state_dir).await?;

    println!(
        "{} Started {} from {} on port {}",
        &*CHECKMARK,
        style(&spec.name).yellow(),
        style(&spec.image).cyan(),
        spec.port.host
    );
    Ok(())
}

pub async fn redeploy_subcommand<R: ContainerRuntime>(
    runtime: R,
    spec: InstanceSpec,
    options: HandoverOptions,
) -> AssetdCliResult<()> {
    let manager = LifecycleManager::new(runtime, options);
    match manager.redeploy(&spec).await {
        Ok(report) => {
            print_report(&report);
            if let Some(count) = report.assets_verified {
                println!("{} {} assets intact", &*CHECKMARK, count);
            }
            Ok(())
        }
        Err(failure) => {
            print_report(&failure.report);
            if matches!(failure.state, HandoverState::Removed | HandoverState::Pulling(_)) {
                println!(
                    "{} {} is not running, relaunch the previous image to restore service",
                    &*CROSS,
                    style(&spec.name).yellow()
                );
            }
            Err(AssetdError::from(failure).into())
        }
    }
}

pub async fn status_subcommand(
    runtime: &impl ContainerRuntime,
    name: &str,
    state_dir: &Path,
) -> AssetdCliResult<()> {
    match runtime.inspect(name).await? {
        Some(status) => println!(
            "{} {} is {} ({})",
            if status.running { &*CHECKMARK } else { &*CROSS },
            style(name).yellow(),
            if status.running { "running" } else { "stopped" },
            style(&status.image).cyan()
        ),
        None => println!("{} {} does not exist", &*CROSS, style(name).yellow()),
    }

    match DeploymentRecord::load(state_dir, name).await? {
        Some(record) => println!(
            "  last deployed {} at {}\n  mount {}:{}\n  env file {}\n  port {}",
            style(&record.spec.image).cyan(),
            record.deployed_at.to_rfc3339(),
            record.spec.mount.host.display(),
            record.spec.mount.container,
            record.spec.env_file.display(),
            record.spec.port
        ),
        None => println!("  no deployment record in {}", state_dir.display()),
    }

    Ok(())
}

pub async fn manifest_subcommand(dir: &Path) -> AssetdCliResult<()> {
    let manifest = MountManifest::capture(dir).await?;
    println!("{}", serde_json::to_string_pretty(&manifest)?);
    tracing::info!("{} files under {}", manifest.len(), dir.display());
    Ok(())
}

//--------------------------------------------------------------------------------------------------
// Functions: Helpers
//--------------------------------------------------------------------------------------------------

fn print_report(report: &HandoverReport) {
    for transition in &report.transitions {
        let mark = match transition.state {
            HandoverState::Failed(_) => &*CROSS,
            _ => &*CHECKMARK,
        };
        println!(
            "{} {} {}",
            mark,
            style(transition.at.format("%H:%M:%S")).dim(),
            transition.state
        );
    }
}
