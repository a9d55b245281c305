mod handlers;

use assetd_cli::{AssetctlArgs, AssetctlSubcommand, AssetdCliResult};
use assetd_core::management::DockerCli;
use clap::Parser;

//--------------------------------------------------------------------------------------------------
// Functions: main
//--------------------------------------------------------------------------------------------------

#[tokio::main]
async fn main() -> AssetdCliResult<()> {
    // Parse command line arguments
    let args = AssetctlArgs::parse();
    args.log.init_tracing();

    let runtime = DockerCli::default();
    let options = args.subcommand.handover_options();

    match args.subcommand {
        AssetctlSubcommand::Stop { name } => {
            handlers::stop_subcommand(&runtime, &name).await?;
        }
        AssetctlSubcommand::Remove { name } => {
            handlers::remove_subcommand(&runtime, &name).await?;
        }
        AssetctlSubcommand::Pull { image } => {
            handlers::pull_subcommand(&runtime, &image).await?;
        }
        AssetctlSubcommand::Run { instance, .. } => {
            handlers::run_subcommand(runtime, instance.into_spec(), options.unwrap_or_default())
                .await?;
        }
        AssetctlSubcommand::Redeploy { instance, .. } => {
            handlers::redeploy_subcommand(
                runtime,
                instance.into_spec(),
                options.unwrap_or_default(),
            )
            .await?;
        }
        AssetctlSubcommand::Status { name, state_dir } => {
            handlers::status_subcommand(&runtime, &name, &state_dir).await?;
        }
        AssetctlSubcommand::Manifest { dir } => {
            handlers::manifest_subcommand(&dir).await?;
        }
    }

    Ok(())
}
