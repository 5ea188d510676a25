//! Video processing pipeline.
//!
//! This crate provides:
//! - Metadata, segmentation and key-frame stages
//! - The pipeline coordinator driving the status state machine
//! - A fixed-size worker pool with graceful shutdown
//! - The intake service that accepts uploads and queues runs

pub mod config;
pub mod context;
pub mod coordinator;
pub mod error;
pub mod intake;
pub mod logging;
pub mod metrics;
pub mod pool;
pub mod stages;

pub use config::{BucketConfig, WorkerConfig};
pub use context::PipelineContext;
pub use coordinator::{PipelineCoordinator, RunOutcome};
pub use error::{IntakeError, WorkerError, WorkerResult};
pub use intake::IntakeService;
pub use logging::RunLogger;
pub use pool::{ShutdownReport, WorkerPool};
