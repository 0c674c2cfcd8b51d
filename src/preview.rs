//! Background preview rendering with last-write-wins semantics.
//!
//! While a slider is dragged every change is submitted, but the worker only
//! ever holds one pending job: jobs travel through a [`watch`] channel, so a
//! new submission replaces whatever has not started yet. A result that
//! finishes after a newer submission is dropped, so the display only ever
//! receives the most recent parameters.
//!
//! The worker owns a small tokio runtime; renders run on its blocking pool.
//! Dropping the worker closes the job channel and waits for an in-flight
//! render to finish. Do not drop it from inside another async runtime.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Runtime;
use tokio::sync::watch;
use tracing::debug;

use crate::buffer::ImageBuffer;
use crate::engine::FilterEngine;
use crate::error::{FilterError, Result};
use crate::pipeline::FilterPipeline;
use crate::registry::FilterKind;

/// Parameters for one preview render. The source is shared, not copied.
#[derive(Debug, Clone)]
pub struct PreviewJob {
    pub kind: FilterKind,
    pub source: Arc<ImageBuffer>,
    pub param1: f64,
    pub param2: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct PreviewResult {
    /// Value returned by the [`PreviewWorker::submit`] call that produced it.
    pub generation: u64,
    pub result: Result<ImageBuffer>,
}

type JobSlot = Option<(u64, PreviewJob)>;

fn generation_of(slot: &JobSlot) -> u64 {
    slot.as_ref().map_or(0, |(generation, _)| *generation)
}

pub struct PreviewWorker {
    // Field order matters: the job sender drops first, which ends the render
    // loop before the runtime shuts down.
    jobs: watch::Sender<JobSlot>,
    results: watch::Receiver<Option<PreviewResult>>,
    delivered: AtomicU64,
    runtime: Runtime,
}

impl PreviewWorker {
    pub fn spawn<E: FilterEngine + 'static>(pipeline: Arc<FilterPipeline<E>>) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .max_blocking_threads(1)
            .thread_name("filteredit-preview")
            .enable_time()
            .build()
            .map_err(|e| FilterError::invalid_options(format!("cannot start preview worker: {e}")))?;

        let (jobs, job_rx) = watch::channel(None);
        let (result_tx, results) = watch::channel(None);
        runtime.spawn(run(pipeline, job_rx, result_tx));

        Ok(Self {
            jobs,
            results,
            delivered: AtomicU64::new(0),
            runtime,
        })
    }

    /// Queue a render, replacing any job that has not started. Returns its generation.
    pub fn submit(&self, job: PreviewJob) -> u64 {
        let mut generation = 0;
        self.jobs.send_modify(|slot| {
            generation = generation_of(slot) + 1;
            if let Some((superseded, _)) = slot.replace((generation, job)) {
                debug!(superseded, generation, "pending preview replaced");
            }
        });
        generation
    }

    pub fn latest_generation(&self) -> u64 {
        generation_of(&self.jobs.borrow())
    }

    /// Take the result of the newest submission if it has finished.
    ///
    /// Each result is handed out once.
    pub fn latest(&self) -> Option<PreviewResult> {
        let latest = self.latest_generation();
        let current = self.results.borrow();
        let done = current.as_ref()?;
        if done.generation != latest {
            debug!(generation = done.generation, latest, "preview is stale");
            return None;
        }
        if self.delivered.swap(latest, Ordering::AcqRel) == latest {
            return None;
        }
        Some(done.clone())
    }

    /// Block until the newest submission finishes or `timeout` elapses.
    pub fn wait_latest(&self, timeout: Duration) -> Option<PreviewResult> {
        let latest = self.latest_generation();
        let mut results = self.results.clone();
        let finished = self.runtime.block_on(async move {
            let ready = results.wait_for(|r| r.as_ref().is_some_and(|d| d.generation >= latest));
            let finished = matches!(tokio::time::timeout(timeout, ready).await, Ok(Ok(_)));
            finished
        });
        if finished {
            self.latest()
        } else {
            None
        }
    }
}

async fn run<E: FilterEngine + 'static>(
    pipeline: Arc<FilterPipeline<E>>,
    mut jobs: watch::Receiver<JobSlot>,
    results: watch::Sender<Option<PreviewResult>>,
) {
    while jobs.changed().await.is_ok() {
        let next = jobs.borrow_and_update().clone();
        let Some((generation, job)) = next else {
            continue;
        };

        let pipeline = Arc::clone(&pipeline);
        let result = tokio::task::spawn_blocking(move || {
            pipeline.apply(job.kind, &job.source, job.param1, job.param2)
        })
        .await
        .unwrap_or_else(|e| Err(FilterError::render(format!("preview render aborted: {e}"))));

        let latest = generation_of(&jobs.borrow());
        if generation == latest {
            results.send_replace(Some(PreviewResult { generation, result }));
        } else {
            debug!(generation, latest, "discarding superseded preview");
        }
    }
    debug!("preview worker stopped");
}
