use std::path::PathBuf;

use assetd_core::config::ConfigSource;
use clap::Parser;

use crate::{styles, LogArgs};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Serves static assets from the configured static root
#[derive(Debug, Parser)]
#[command(name = "assetd", author, version, styles=styles::styles())]
pub struct AssetdArgs {
    /// Env file to read STATIC_ROOT, PORT and BIND_HOST from instead of the process environment
    #[arg(short = 'e', long = "env-file")]
    pub env_file: Option<PathBuf>,

    /// Verbosity
    #[command(flatten)]
    pub log: LogArgs,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl AssetdArgs {
    /// The configuration source selected on the command line.
    pub fn config_source(&self) -> ConfigSource {
        match &self.env_file {
            Some(path) => ConfigSource::EnvFile(path.clone()),
            None => ConfigSource::Process,
        }
    }
}
