//! Application state.

use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use vup_firestore::{FirestoreVideoRepository, InMemoryVideoRepository, VideoRepository};
use vup_media::{ProcessRunner, ToolRunner};
use vup_storage::{InMemoryObjectStore, ObjectStore, S3ObjectStore};
use vup_worker::{IntakeService, PipelineContext, PipelineCoordinator, WorkerConfig, WorkerPool};

use crate::config::{ApiConfig, RecordStore, StorageBackend};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub intake: IntakeService,
}

impl AppState {
    pub fn new(config: ApiConfig, intake: IntakeService) -> Self {
        Self { config, intake }
    }

    /// Build backends per config and start the worker pool.
    pub fn from_config(config: ApiConfig, worker: WorkerConfig) -> anyhow::Result<Self> {
        worker.validate().context("invalid worker configuration")?;

        let storage: Arc<dyn ObjectStore> = match config.storage_backend {
            StorageBackend::S3 => {
                Arc::new(S3ObjectStore::from_env().context("S3 object store setup failed")?)
            }
            StorageBackend::Memory => Arc::new(InMemoryObjectStore::new()),
        };
        let repo: Arc<dyn VideoRepository> = match config.record_store {
            RecordStore::Firestore => Arc::new(
                FirestoreVideoRepository::from_env().context("Firestore setup failed")?,
            ),
            RecordStore::Memory => Arc::new(InMemoryVideoRepository::new()),
        };
        let runner: Arc<dyn ToolRunner> = Arc::new(ProcessRunner::new());

        info!(
            storage = ?config.storage_backend,
            records = ?config.record_store,
            workers = worker.pool_size,
            "Backends configured"
        );

        let pool_size = worker.pool_size;
        let ctx = PipelineContext::new(runner, storage, repo, worker);
        let pool = Arc::new(WorkerPool::start(
            pool_size,
            PipelineCoordinator::new(ctx.clone()),
        ));

        Ok(Self::new(config, IntakeService::new(ctx, pool)))
    }

    pub fn pool(&self) -> &Arc<WorkerPool> {
        self.intake.pool()
    }
}
