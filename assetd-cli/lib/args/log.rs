use clap::Args;
use tracing_subscriber::EnvFilter;

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// Crates whose log level the verbosity flags control.
const LOG_TARGETS: &[&str] = &["assetd", "assetd_core", "assetd_server", "assetd_cli", "assetctl"];

/// Filter used when neither a flag nor `RUST_LOG` is given.
const DEFAULT_LOG_FILTER: &str = "info";

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Verbosity flags shared by the binaries
#[derive(Debug, Args)]
pub struct LogArgs {
    /// Show logs with trace level verbosity
    #[arg(long, global = true)]
    pub trace: bool,

    /// Show logs with debug level verbosity
    #[arg(long, global = true)]
    pub debug: bool,

    /// Show logs with info level verbosity
    #[arg(long, global = true)]
    pub info: bool,

    /// Show logs with warn level verbosity
    #[arg(long, global = true)]
    pub warn: bool,

    /// Show logs with error level verbosity
    #[arg(long, global = true)]
    pub error: bool,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl LogArgs {
    /// The level selected by the flags, most verbose first.
    pub fn level(&self) -> Option<&'static str> {
        if self.trace {
            Some("trace")
        } else if self.debug {
            Some("debug")
        } else if self.info {
            Some("info")
        } else if self.warn {
            Some("warn")
        } else if self.error {
            Some("error")
        } else {
            None
        }
    }

    /// Builds the log filter. A flag wins over `RUST_LOG`.
    pub fn env_filter(&self) -> EnvFilter {
        match self.level() {
            Some(level) => EnvFilter::new(
                LOG_TARGETS
                    .iter()
                    .map(|target| format!("{target}={level}"))
                    .collect::<Vec<_>>()
                    .join(","),
            ),
            None => EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        }
    }

    /// Installs the global tracing subscriber.
    pub fn init_tracing(&self) {
        tracing_subscriber::fmt()
            .with_env_filter(self.env_filter())
            .init();
    }
}
