// src/api/state.rs
use crate::artifact::ArtifactStore;
use crate::config::AppConfig;
use crate::errors::Result;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: ArtifactStore,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self> {
        let store = ArtifactStore::open(&config.runtime_dir)?;
        Ok(Self {
            config: Arc::new(config),
            store,
        })
    }
}
