//! Background diff recomputation.
//!
//! Building a diff can be expensive on large files, so [`DiffWorker`] runs it on its own
//! thread:
//! - the caller sends requests over a channel and keeps handling input
//! - every request gets a generation number; a new request cancels the one in flight
//! - results of superseded generations are dropped silently
//!
//! The contract is "last requested diff wins", never "first to finish wins".

use crate::builder::CancelToken;
use crate::config::DiffConfig;
use crate::error::DiffError;
use crate::file_diff::BuiltDiff;
use crate::script::DiffProvider;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

/// A recomputation request.
#[derive(Debug, Clone)]
struct DiffRequest {
    generation: u64,
    old: String,
    new: String,
    cancel: CancelToken,
}

/// Outcome of one recomputation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffResult {
    /// Generation of the request this result answers.
    pub generation: u64,
    /// The built diff, or why building it failed.
    pub outcome: Result<BuiltDiff, DiffError>,
}

/// Handle to the background diff thread. Dropping it stops the thread.
pub struct DiffWorker {
    request_tx: Option<Sender<DiffRequest>>,
    result_rx: Receiver<DiffResult>,
    handle: Option<thread::JoinHandle<()>>,
    generation: u64,
    in_flight: Option<CancelToken>,
    config: DiffConfig,
}

impl DiffWorker {
    /// Spawn the worker thread with the provider it computes edit scripts with.
    pub fn spawn<P>(provider: P, config: DiffConfig) -> Self
    where
        P: DiffProvider + Send + 'static,
    {
        let (request_tx, request_rx) = mpsc::channel();
        let (result_tx, result_rx) = mpsc::channel();
        let handle = thread::spawn(move || worker_loop(request_rx, result_tx, provider));
        Self {
            request_tx: Some(request_tx),
            result_rx,
            handle: Some(handle),
            generation: 0,
            in_flight: None,
            config,
        }
    }

    /// Spawn a worker using the default provider for `config`.
    pub fn with_config(config: DiffConfig) -> Self {
        Self::spawn(config.provider(), config)
    }

    /// Configuration models built from this worker's results should use.
    pub fn config(&self) -> &DiffConfig {
        &self.config
    }

    /// Generation of the most recent request (0 before the first one).
    pub fn latest_generation(&self) -> u64 {
        self.generation
    }

    /// Queue a recomputation of `old` against `new`, superseding any earlier request.
    ///
    /// Returns the request's generation.
    pub fn request(&mut self, old: impl Into<String>, new: impl Into<String>) -> u64 {
        if let Some(previous) = self.in_flight.take() {
            previous.cancel();
        }
        self.generation += 1;
        let cancel = CancelToken::new();
        self.in_flight = Some(cancel.clone());

        let request = DiffRequest {
            generation: self.generation,
            old: old.into(),
            new: new.into(),
            cancel,
        };
        match &self.request_tx {
            Some(tx) => {
                if let Err(e) = tx.send(request) {
                    log::error!("DiffWorker: failed to send request: {}", e);
                }
            }
            None => log::error!("DiffWorker: request after shutdown"),
        }
        self.generation
    }

    /// Latest result, if it has arrived. Stale results are discarded.
    pub fn try_recv(&mut self) -> Option<DiffResult> {
        while let Ok(result) = self.result_rx.try_recv() {
            if let Some(result) = self.accept_result(result) {
                return Some(result);
            }
        }
        None
    }

    /// Wait up to `timeout` for the result of the latest request.
    pub fn recv_timeout(&mut self, timeout: Duration) -> Option<DiffResult> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.result_rx.recv_timeout(remaining) {
                Ok(result) => {
                    if let Some(result) = self.accept_result(result) {
                        return Some(result);
                    }
                }
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                    return None;
                }
            }
        }
    }

    fn accept_result(&mut self, result: DiffResult) -> Option<DiffResult> {
        if result.generation != self.generation {
            log::debug!(
                "DiffWorker: dropping stale result {} (latest {})",
                result.generation,
                self.generation
            );
            return None;
        }
        self.in_flight = None;
        Some(result)
    }

    /// Stop the thread and wait for it to exit.
    pub fn shutdown(&mut self) {
        if let Some(token) = self.in_flight.take() {
            token.cancel();
        }
        // Closing the channel ends the worker loop.
        self.request_tx = None;
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            log::error!("DiffWorker: worker thread panicked");
        }
    }
}

impl Drop for DiffWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_loop<P: DiffProvider>(
    request_rx: Receiver<DiffRequest>,
    result_tx: Sender<DiffResult>,
    provider: P,
) {
    log::info!("DiffWorker started");

    while let Ok(mut request) = request_rx.recv() {
        // Only the newest queued request matters.
        while let Ok(newer) = request_rx.try_recv() {
            log::debug!("DiffWorker: skipping superseded request {}", request.generation);
            request = newer;
        }
        if request.cancel.is_cancelled() {
            log::debug!("DiffWorker: request {} cancelled before start", request.generation);
            continue;
        }

        let outcome =
            BuiltDiff::compute(&request.old, &request.new, &provider, Some(&request.cancel));
        if matches!(outcome, Err(DiffError::Cancelled)) {
            log::debug!("DiffWorker: request {} cancelled", request.generation);
            continue;
        }

        let result = DiffResult {
            generation: request.generation,
            outcome,
        };
        if result_tx.send(result).is_err() {
            log::debug!("DiffWorker: result receiver gone");
            break;
        }
    }

    log::info!("DiffWorker stopped");
}
