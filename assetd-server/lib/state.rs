//! Application state for the assetd server.
//!
//! The state is built once from the resolved configuration and cloned into every request.
//! Nothing in it is mutated while serving.

use std::sync::Arc;

use assetd_core::{config::Config, store::AssetStore};
use getset::Getters;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Application state structure
#[derive(Debug, Clone, Getters)]
#[getset(get = "pub with_prefix")]
pub struct AppState {
    /// The application configuration
    config: Arc<Config>,

    /// The store serving files from the static root
    store: AssetStore,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl AppState {
    /// Create a new application state instance
    pub fn new(config: Arc<Config>) -> Self {
        let store = AssetStore::from_config(&config);
        Self { config, store }
    }
}
