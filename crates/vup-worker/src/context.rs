//! Shared handles passed to every pipeline stage.

use std::sync::Arc;

use vup_firestore::VideoRepository;
use vup_media::ToolRunner;
use vup_storage::ObjectStore;

use crate::config::WorkerConfig;

#[derive(Clone)]
pub struct PipelineContext {
    pub runner: Arc<dyn ToolRunner>,
    pub storage: Arc<dyn ObjectStore>,
    pub repo: Arc<dyn VideoRepository>,
    pub config: Arc<WorkerConfig>,
}

impl PipelineContext {
    pub fn new(
        runner: Arc<dyn ToolRunner>,
        storage: Arc<dyn ObjectStore>,
        repo: Arc<dyn VideoRepository>,
        config: WorkerConfig,
    ) -> Self {
        Self {
            runner,
            storage,
            repo,
            config: Arc::new(config),
        }
    }
}
