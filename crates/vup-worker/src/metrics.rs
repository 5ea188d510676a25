//! Pipeline metrics.

use std::future::Future;
use std::time::Instant;

use metrics::{counter, histogram};

pub mod names {
    /// Finished runs by outcome (ready, failed, interrupted).
    pub const RUNS_TOTAL: &str = "vup_pipeline_runs_total";

    /// Stage duration by stage name.
    pub const STAGE_SECONDS: &str = "vup_pipeline_stage_seconds";

    /// Objects written by kind (video, segment, frame).
    pub const UPLOADS_TOTAL: &str = "vup_uploads_total";
}

pub fn record_run(outcome: &'static str) {
    counter!(names::RUNS_TOTAL, "outcome" => outcome).increment(1);
}

pub fn record_upload(kind: &'static str) {
    counter!(names::UPLOADS_TOTAL, "kind" => kind).increment(1);
}

/// Await `fut`, recording its wall time under `stage`.
pub async fn timed<F: Future>(stage: &'static str, fut: F) -> F::Output {
    let start = Instant::now();
    let output = fut.await;
    histogram!(names::STAGE_SECONDS, "stage" => stage).record(start.elapsed().as_secs_f64());
    output
}
