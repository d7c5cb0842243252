use std::sync::Arc;

use anyhow::Result;
use taskdeck_core::{FileTaskRepository, InMemoryTaskRepository, TaskRepository, TaskService};

use crate::config::{ServerConfig, StoreKind};

pub type DynRepository = Box<dyn TaskRepository + Send + Sync>;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<TaskService<DynRepository>>,
}

impl AppState {
    pub fn new(repo: DynRepository) -> Self {
        Self {
            service: Arc::new(TaskService::new(repo)),
        }
    }

    pub fn from_config(config: &ServerConfig) -> Result<Self> {
        Ok(Self::new(open_repository(config)?))
    }
}

pub fn open_repository(config: &ServerConfig) -> Result<DynRepository> {
    match config.store {
        StoreKind::File => {
            let repo = FileTaskRepository::new(config.data_dir.clone())?;
            tracing::info!(path = %repo.file_path().display(), "using file task store");
            Ok(Box::new(repo))
        }
        StoreKind::Memory => {
            tracing::info!("using in-memory task store");
            Ok(Box::new(InMemoryTaskRepository::new()))
        }
    }
}
