//! Error types for the logging pipeline.
//!
//! Two families exist. [`LoggerError`] is returned synchronously by the
//! public operations, before any record is enqueued. [`DeliveryError`]
//! occurs inside the asynchronous dispatch path after the originating call
//! has already returned; it is never surfaced to that caller and instead
//! reaches the configured [`Diagnostics`](crate::Diagnostics) callback.

use std::path::PathBuf;

use thiserror::Error;

use crate::record::Severity;

/// Errors returned by [`Logger::initialize`](crate::Logger::initialize) and
/// [`Logger::log`](crate::Logger::log).
#[derive(Debug, Error)]
pub enum LoggerError {
    /// The instance name was empty or whitespace.
    #[error("Logger name must be provided, cannot be empty")]
    EmptyInstanceName,

    /// The log directory could not be created.
    #[error("Failed to create log directory {}: {source}", path.display())]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The HTTP client for remote delivery could not be built.
    #[error("Failed to build HTTP client: {source}")]
    HttpClient {
        #[source]
        source: reqwest::Error,
    },

    /// Remote delivery was requested but no targets are configured.
    #[error("Telegram chat IDs not configured")]
    MissingRemoteTargets,

    /// Remote delivery was requested but the token for the record's
    /// severity is not configured.
    #[error("Telegram token for {} not configured", severity.file_label())]
    MissingRemoteToken { severity: Severity },

    /// The handle has been shut down.
    #[error("Logger is not running")]
    NotRunning,
}

impl LoggerError {
    /// True for errors caused by bad or missing setup. The caller can fix
    /// the configuration and retry.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            LoggerError::EmptyInstanceName
                | LoggerError::CreateDirectory { .. }
                | LoggerError::HttpClient { .. }
                | LoggerError::MissingRemoteTargets
                | LoggerError::MissingRemoteToken { .. }
        )
    }

    /// True for errors caused by calling an operation in the wrong state.
    #[must_use]
    pub fn is_lifecycle(&self) -> bool {
        matches!(self, LoggerError::NotRunning)
    }
}

/// A transient failure while dispatching an already-accepted record or
/// while sweeping expired files.
///
/// Delivery is best-effort: each failure is reported once to the
/// diagnostics callback and the attempt is abandoned without retry.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// Appending to a daily file failed.
    #[error("Failed to append to {}: {source}", path.display())]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A POST to one remote target failed at the transport level.
    #[error("Failed to deliver to Telegram chat {target}: {source}")]
    RemoteSend {
        target: String,
        #[source]
        source: reqwest::Error,
    },

    /// A remote target answered with a non-success status.
    #[error("Telegram chat {target} rejected message with status {status}")]
    RemoteRejected {
        target: String,
        status: reqwest::StatusCode,
    },

    /// Deleting an expired file failed during a retention sweep.
    #[error("Failed to remove expired log file {}: {source}", path.display())]
    RetentionSweep {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
