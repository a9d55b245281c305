use std::sync::Arc;

use assetd_cli::{AssetdArgs, AssetdCliResult};
use assetd_core::config::Config;
use assetd_server::{route, state::AppState};
use assetd_utils::CHECKMARK;
use axum::http::Method;
use clap::Parser;
use tower_http::cors::{Any, CorsLayer};

//--------------------------------------------------------------------------------------------------
// Functions: Main
//--------------------------------------------------------------------------------------------------

#[tokio::main]
pub async fn main() -> AssetdCliResult<()> {
    // Parse command line arguments
    let args = AssetdArgs::parse();
    args.log.init_tracing();

    // Resolve configuration before anything is bound
    let source = args.config_source();
    let config = match Config::resolve(&source) {
        Ok(config) => Arc::new(config),
        Err(e) => {
            tracing::error!("invalid configuration from {}: {}", source, e);
            return Err(e.into());
        }
    };

    tracing::info!(
        "serving {} from {}",
        config.get_public_prefix(),
        config.get_static_root().display()
    );

    // Create application state
    let state = AppState::new(config.clone());

    // Configure CORS
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::HEAD])
        .allow_origin(Any);

    // Build application
    let app = route::create_router(state, route::default_api_router()).layer(cors);

    // Start server
    tracing::info!("starting server on {}", config.get_addr());
    let listener = tokio::net::TcpListener::bind(config.get_addr()).await?;
    println!(
        "{} Server listening on {}",
        &*CHECKMARK,
        console::style(config.get_addr()).yellow()
    );

    axum::serve(listener, app).await?;

    Ok(())
}
