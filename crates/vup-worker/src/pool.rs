//! Fixed-size worker pool for pipeline runs.
//!
//! Submission pushes a video id onto an unbounded queue and returns
//! immediately. `pool_size` workers pull from the queue, each running one
//! video at a time to completion.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use vup_models::VideoId;

use crate::coordinator::PipelineCoordinator;
use crate::error::{WorkerError, WorkerResult};

/// Result of [`WorkerPool::shutdown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShutdownReport {
    /// Runs that finished (any outcome) over the pool's lifetime.
    pub completed: usize,
    /// Runs that were queued or in flight when shutdown gave up on them.
    pub interrupted: usize,
    /// Whether the grace period expired and workers were aborted.
    pub forced: bool,
}

pub struct WorkerPool {
    sender: Mutex<Option<mpsc::UnboundedSender<VideoId>>>,
    workers: Mutex<JoinSet<()>>,
    /// Submitted runs that have not finished yet.
    pending: Arc<Mutex<HashSet<VideoId>>>,
    completed: Arc<AtomicUsize>,
    coordinator: Arc<PipelineCoordinator>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl WorkerPool {
    /// Spawn `size` workers on the current runtime.
    pub fn start(size: usize, coordinator: PipelineCoordinator) -> Self {
        let (tx, rx) = mpsc::unbounded_channel::<VideoId>();
        let rx = Arc::new(tokio::sync::Mutex::new(rx));
        let coordinator = Arc::new(coordinator);
        let pending = Arc::new(Mutex::new(HashSet::new()));
        let completed = Arc::new(AtomicUsize::new(0));

        let mut workers = JoinSet::new();
        for worker_id in 0..size.max(1) {
            let rx = Arc::clone(&rx);
            let coordinator = Arc::clone(&coordinator);
            let pending = Arc::clone(&pending);
            let completed = Arc::clone(&completed);

            workers.spawn(async move {
                debug!(worker_id, "Worker started");
                loop {
                    // Only the worker holding the lock waits on the queue
                    let next = rx.lock().await.recv().await;
                    let Some(video_id) = next else { break };

                    let outcome = coordinator.run(&video_id).await;
                    debug!(
                        worker_id,
                        video_id = %video_id,
                        outcome = outcome.as_str(),
                        "Run finished"
                    );

                    lock(&pending).remove(&video_id);
                    completed.fetch_add(1, Ordering::SeqCst);
                }
                debug!(worker_id, "Worker stopped");
            });
        }

        info!("Worker pool started with {} workers", size.max(1));

        Self {
            sender: Mutex::new(Some(tx)),
            workers: Mutex::new(workers),
            pending,
            completed,
            coordinator,
        }
    }

    /// Queue a video for processing without waiting for it.
    pub fn submit(&self, video_id: VideoId) -> WorkerResult<()> {
        let sender = lock(&self.sender);
        let Some(tx) = sender.as_ref() else {
            return Err(WorkerError::ShuttingDown);
        };

        lock(&self.pending).insert(video_id.clone());
        if tx.send(video_id.clone()).is_err() {
            lock(&self.pending).remove(&video_id);
            return Err(WorkerError::ShuttingDown);
        }
        Ok(())
    }

    pub fn is_accepting(&self) -> bool {
        lock(&self.sender).is_some()
    }

    /// Runs submitted but not finished.
    pub fn pending_count(&self) -> usize {
        lock(&self.pending).len()
    }

    pub fn completed_count(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    /// Stop accepting work, let workers drain the queue for up to `grace`,
    /// then abort them. Every run that did not finish is marked failed.
    pub async fn shutdown(&self, grace: Duration) -> ShutdownReport {
        // Closing the queue lets idle workers exit once it is empty
        lock(&self.sender).take();
        let mut workers = std::mem::take(&mut *lock(&self.workers));

        info!(
            pending = self.pending_count(),
            "Shutting down worker pool, grace period {}s",
            grace.as_secs()
        );

        let drained = tokio::time::timeout(grace, async {
            while workers.join_next().await.is_some() {}
        })
        .await
        .is_ok();

        if !drained {
            warn!("Grace period expired, aborting {} workers", workers.len());
            workers.abort_all();
            // Wait for aborted tasks so their scratch files are dropped
            while workers.join_next().await.is_some() {}
        }

        let unfinished: Vec<VideoId> = lock(&self.pending).drain().collect();
        for video_id in &unfinished {
            self.coordinator.mark_interrupted(video_id).await;
        }

        let report = ShutdownReport {
            completed: self.completed_count(),
            interrupted: unfinished.len(),
            forced: !drained,
        };
        info!(?report, "Worker pool stopped");
        report
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("accepting", &self.is_accepting())
            .field("pending", &self.pending_count())
            .field("completed", &self.completed_count())
            .finish()
    }
}
