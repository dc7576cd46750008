//! Bounded-parallelism executor over a crossbeam task channel.
//!
//! Workers pull from the queue until it disconnects or cancellation fires.
//! Submission blocks when the queue is full (backpressure). A task panic is
//! recovered, logged, converted into an error, and never kills the worker.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::thread::{self, JoinHandle};

use cloudslash_core::errors::{ScanError, SwarmError};
use cloudslash_core::SweepConfig;
use crossbeam_channel::{bounded, Receiver, Sender};

use super::cancellation::CancelToken;
use super::task::{Task, TaskOutcome, TaskSpec};

/// The worker pool.
pub struct Swarm {
    tx: Option<Sender<Task>>,
    workers: Vec<JoinHandle<()>>,
    cancel: CancelToken,
}

impl Swarm {
    /// Spawn `max_workers` workers pulling from a bounded task queue.
    pub fn start(config: &SweepConfig, cancel: CancelToken) -> Self {
        let (tx, rx) = bounded(config.effective_task_channel_bound());
        let count = config.effective_max_workers();
        let workers = (0..count)
            .map(|i| {
                let rx = rx.clone();
                let cancel = cancel.clone();
                thread::Builder::new()
                    .name(format!("cloudslash-swarm-{i}"))
                    .spawn(move || worker_loop(rx, cancel))
                    .expect("failed to spawn swarm worker thread")
            })
            .collect();
        tracing::debug!(workers = count, "swarm started");
        Self {
            tx: Some(tx),
            workers,
            cancel,
        }
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Submit a fire-and-forget task. Blocks while the queue is full.
    pub fn submit(
        &self,
        spec: TaskSpec,
        f: impl FnOnce(&CancelToken) -> Result<(), ScanError> + Send + 'static,
    ) -> Result<(), SwarmError> {
        self.submit_inner(spec, Box::new(f), None)
    }

    /// Submit a task whose completion is reported on `outcome`. Panics are
    /// converted into `ScanError::Fatal` before delivery.
    pub fn submit_tracked(
        &self,
        spec: TaskSpec,
        f: impl FnOnce(&CancelToken) -> Result<(), ScanError> + Send + 'static,
        outcome: Sender<TaskOutcome>,
    ) -> Result<(), SwarmError> {
        self.submit_inner(spec, Box::new(f), Some(outcome))
    }

    fn submit_inner(
        &self,
        spec: TaskSpec,
        run: super::task::TaskFn,
        outcome: Option<Sender<TaskOutcome>>,
    ) -> Result<(), SwarmError> {
        let tx = self.tx.as_ref().ok_or(SwarmError::NotRunning)?;
        tx.send(Task { spec, run, outcome })
            .map_err(|_| SwarmError::Disconnected)
    }

    /// Cancel outstanding work, close the queue, and join all workers.
    pub fn stop(mut self) {
        self.cancel.cancel();
        self.shutdown();
    }

    /// Close the queue and join workers once every queued task has run.
    pub fn join(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.tx.take();
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                tracing::error!("swarm worker thread panicked outside task recovery");
            }
        }
    }
}

impl Drop for Swarm {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_loop(rx: Receiver<Task>, cancel: CancelToken) {
    for task in rx.iter() {
        let started = std::time::Instant::now();
        let result = if cancel.is_cancelled() {
            // Keep draining so blocked submitters are released, but do not
            // start new work.
            Err(ScanError::Cancelled)
        } else {
            run_task(&task.spec, task.run, &cancel)
        };
        if let Some(outcome) = task.outcome {
            let _ = outcome.send(TaskOutcome {
                name: task.spec.name,
                result,
                duration_ms: started.elapsed().as_millis() as u64,
            });
        }
    }
}

fn run_task(spec: &TaskSpec, run: super::task::TaskFn, cancel: &CancelToken) -> Result<(), ScanError> {
    let span = tracing::info_span!(
        "discovery_task",
        task = %spec.name,
        provider = %spec.provider,
        region = %spec.region,
        profile = %spec.profile,
    );
    let _guard = span.enter();

    match catch_unwind(AssertUnwindSafe(|| run(cancel))) {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "discovery task failed");
            Err(e)
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            tracing::error!(panic = %message, "discovery task panicked");
            Err(ScanError::Fatal { message })
        }
    }
}

pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
