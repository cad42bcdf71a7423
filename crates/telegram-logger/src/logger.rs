//! Logger handle and lifecycle orchestration.
//!
//! [`Logger::initialize`] builds one complete pipeline: the bounded ingest
//! queue, the dispatch worker and the retention sweeper, all owned by the
//! returned handle. Independent handles never share state, so several
//! pipelines can coexist in one process.
//!
//! # Graceful shutdown
//!
//! 1. New `log` calls are rejected.
//! 2. The cancellation token fires; the worker closes the queue and drains
//!    every record already accepted.
//! 3. `shutdown` waits for the drain signal without a bound, then joins the
//!    worker (5s) and the sweeper (1s). A task exceeding its bound is
//!    aborted, not treated as fatal.
//!
//! Records whose `log` call returned `Ok` are on disk (and delivered, where
//! requested) once `shutdown` returns.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::config::LoggerConfig;
use crate::dispatch::DispatchWorker;
use crate::error::LoggerError;
use crate::file_sink::FileSink;
use crate::record::{LogOptions, LogRecord};
use crate::remote_sink::RemoteSink;
use crate::retention::RetentionSweeper;

/// Capacity of the ingest queue. A full queue suspends producers rather
/// than dropping records.
const QUEUE_CAPACITY: usize = 10_000;

/// Bound on joining the dispatch worker after its drain has completed.
const DISPATCH_JOIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Bound on joining the retention sweeper.
const SWEEPER_JOIN_TIMEOUT: Duration = Duration::from_secs(1);

/// Handle to a running logging pipeline.
///
/// Cheap to clone; all clones share the same pipeline and any clone may
/// log or shut it down.
#[derive(Debug, Clone)]
pub struct Logger {
    inner: Arc<LoggerInner>,
}

#[derive(Debug)]
struct LoggerInner {
    tx: mpsc::Sender<LogRecord>,
    config: LoggerConfig,
    running: AtomicBool,
    tasks: Mutex<Option<PipelineTasks>>,
}

#[derive(Debug)]
struct PipelineTasks {
    cancel: CancellationToken,
    drained: oneshot::Receiver<()>,
    dispatch_task: JoinHandle<()>,
    sweeper_task: JoinHandle<()>,
}

impl Logger {
    /// Validates the configuration, creates the log directory and starts
    /// the background tasks.
    ///
    /// Each call builds an independent pipeline owned by the returned
    /// handle.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime; the background tasks are
    /// spawned onto the ambient runtime.
    pub fn initialize(config: LoggerConfig) -> Result<Self, LoggerError> {
        config.validate()?;
        std::fs::create_dir_all(&config.directory).map_err(|source| {
            LoggerError::CreateDirectory {
                path: config.directory.clone(),
                source,
            }
        })?;
        let client = reqwest::Client::builder()
            .build()
            .map_err(|source| LoggerError::HttpClient { source })?;

        let (tx, rx) = mpsc::channel(QUEUE_CAPACITY);
        let cancel = CancellationToken::new();
        let (drained_tx, drained_rx) = oneshot::channel();

        let worker = DispatchWorker::new(
            rx,
            FileSink::new(config.directory.clone(), config.instance_name.clone()),
            RemoteSink::new(client, &config),
            config.diagnostics.clone(),
            cancel.clone(),
            drained_tx,
        );
        let dispatch_task = tokio::spawn(worker.run());

        let sweeper = RetentionSweeper::new(
            config.directory.clone(),
            config.instance_name.clone(),
            config.retention_days,
            config.diagnostics.clone(),
            cancel.clone(),
        );
        let sweeper_task = tokio::spawn(sweeper.run());

        debug!("logger {} started", config.instance_name);

        Ok(Self {
            inner: Arc::new(LoggerInner {
                tx,
                config,
                running: AtomicBool::new(true),
                tasks: Mutex::new(Some(PipelineTasks {
                    cancel,
                    drained: drained_rx,
                    dispatch_task,
                    sweeper_task,
                })),
            }),
        })
    }

    /// Enqueues one record for asynchronous dispatch.
    ///
    /// Returns before any I/O happens; the dispatch worker performs the
    /// file write and the remote delivery later. Suspends while the queue
    /// is full. Errors are synchronous only: a lifecycle error when the
    /// pipeline is shut down, a configuration error when remote delivery
    /// is requested without targets or without a token for the record's
    /// severity. Failures past the enqueue are reported to the
    /// diagnostics callback, never to this caller.
    pub async fn log(
        &self,
        message: impl Into<String>,
        options: LogOptions,
    ) -> Result<(), LoggerError> {
        if !self.inner.running.load(Ordering::SeqCst) {
            return Err(LoggerError::NotRunning);
        }
        if options.deliver_remote {
            if self.inner.config.remote_targets.is_empty() {
                return Err(LoggerError::MissingRemoteTargets);
            }
            if self.inner.config.token_for(options.severity).is_none() {
                return Err(LoggerError::MissingRemoteToken {
                    severity: options.severity,
                });
            }
        }
        self.inner
            .tx
            .send(LogRecord::new(message.into(), options))
            .await
            .map_err(|_| LoggerError::NotRunning)
    }

    /// Drains the queue, stops the background tasks and closes the files.
    ///
    /// Idempotent; a second call returns immediately.
    pub async fn shutdown(&self) {
        let Some(tasks) = self.inner.tasks.lock().await.take() else {
            return;
        };
        self.inner.running.store(false, Ordering::SeqCst);
        debug!(
            "shutting down logger {}, draining queue",
            self.inner.config.instance_name
        );
        tasks.cancel.cancel();

        // The drain itself has no bound: every accepted record is
        // dispatched before the worker signals. An Err means the worker
        // is already gone, which is as drained as it gets.
        let _ = tasks.drained.await;

        join_with_timeout(tasks.dispatch_task, DISPATCH_JOIN_TIMEOUT, "dispatch worker").await;
        join_with_timeout(tasks.sweeper_task, SWEEPER_JOIN_TIMEOUT, "retention sweeper").await;
        debug!("logger {} stopped", self.inner.config.instance_name);
    }
}

impl Drop for LoggerInner {
    fn drop(&mut self) {
        // Last handle gone without a shutdown call: stop the tasks so the
        // process is free to exit.
        if let Some(tasks) = self.tasks.get_mut().take() {
            tasks.cancel.cancel();
            tasks.dispatch_task.abort();
            tasks.sweeper_task.abort();
        }
    }
}

async fn join_with_timeout(mut handle: JoinHandle<()>, bound: Duration, name: &str) {
    match tokio::time::timeout(bound, &mut handle).await {
        Ok(Ok(())) => debug!("{name} stopped cleanly"),
        Ok(Err(join_error)) => error!("{name} ended abnormally: {join_error}"),
        Err(_) => {
            warn!("{name} did not stop within {bound:?}, aborting");
            handle.abort();
        }
    }
}
