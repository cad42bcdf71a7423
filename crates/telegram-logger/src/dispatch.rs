//! Single-consumer dispatch loop.
//!
//! The worker owns both sinks outright; nothing else touches the rotation
//! state or the open handles. It runs until cancelled, then closes the
//! queue to further sends, drains every record that was accepted, signals
//! drain completion and exits. Per-record failures are reported to
//! diagnostics and never stop the loop.

use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::diagnostics::Diagnostics;
use crate::file_sink::FileSink;
use crate::record::LogRecord;
use crate::remote_sink::RemoteSink;

pub(crate) struct DispatchWorker {
    rx: mpsc::Receiver<LogRecord>,
    file_sink: FileSink,
    remote_sink: RemoteSink,
    diagnostics: Diagnostics,
    cancel: CancellationToken,
    drained: oneshot::Sender<()>,
}

impl DispatchWorker {
    pub(crate) fn new(
        rx: mpsc::Receiver<LogRecord>,
        file_sink: FileSink,
        remote_sink: RemoteSink,
        diagnostics: Diagnostics,
        cancel: CancellationToken,
        drained: oneshot::Sender<()>,
    ) -> Self {
        Self {
            rx,
            file_sink,
            remote_sink,
            diagnostics,
            cancel,
            drained,
        }
    }

    /// Event loop. Exits after draining on cancellation, or once every
    /// sender is gone and the queue is empty.
    pub(crate) async fn run(mut self) {
        loop {
            tokio::select! {
                maybe_record = self.rx.recv() => {
                    match maybe_record {
                        Some(record) => self.dispatch(record).await,
                        None => break,
                    }
                }
                () = self.cancel.cancelled() => {
                    debug!("dispatch worker cancelled, draining accepted records");
                    // Close first: new sends fail fast. recv keeps yielding
                    // until the buffer and any send already holding a permit
                    // are drained; an empty buffer alone does not mean done.
                    self.rx.close();
                    while let Some(record) = self.rx.recv().await {
                        self.dispatch(record).await;
                    }
                    break;
                }
            }
        }
        let _ = self.drained.send(());
        // Dropping the worker drops the file sink and closes its handles.
    }

    /// Routes one record to the requested sinks. The two attempts are
    /// independent; a failure in one never suppresses the other.
    async fn dispatch(&mut self, record: LogRecord) {
        if record.persist {
            if let Err(error) = self
                .file_sink
                .write(&record.message, record.severity)
                .await
            {
                self.diagnostics.report(&error);
            }
        }
        if record.deliver_remote {
            self.remote_sink
                .send(&record.message, record.severity)
                .await;
        }
    }
}
