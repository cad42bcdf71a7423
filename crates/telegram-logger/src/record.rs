//! Log record types shared between the public API and the dispatch worker.

/// Severity class of a log record.
///
/// The severity selects the daily file (`logs` vs `errors`), the Telegram
/// token used for remote delivery, and the marker prepended to remote
/// messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Info,
    Error,
}

impl Severity {
    /// Label used in daily file names: `{instance}_{label}_{date}.log`.
    pub(crate) fn file_label(self) -> &'static str {
        match self {
            Severity::Info => "logs",
            Severity::Error => "errors",
        }
    }

    /// Marker prepended to remotely delivered messages.
    pub(crate) fn remote_marker(self) -> &'static str {
        match self {
            Severity::Info => "\u{2139}\u{fe0f} LOG",
            Severity::Error => "\u{1f534} ERROR",
        }
    }
}

/// Per-call options for [`Logger::log`](crate::Logger::log).
///
/// Defaults match the common case: an info-level record written to the
/// daily file and not delivered remotely.
#[derive(Debug, Clone, Copy)]
pub struct LogOptions {
    pub severity: Severity,
    /// Deliver the record to every configured Telegram target.
    pub deliver_remote: bool,
    /// Append the record to the daily file for its severity.
    pub persist: bool,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            severity: Severity::Info,
            deliver_remote: false,
            persist: true,
        }
    }
}

impl LogOptions {
    /// Options for an error-severity record.
    #[must_use]
    pub fn error() -> Self {
        Self {
            severity: Severity::Error,
            ..Self::default()
        }
    }
}

/// A record accepted into the ingest queue.
///
/// Immutable once enqueued; consumed exactly once by the dispatch worker.
#[derive(Debug, Clone)]
pub(crate) struct LogRecord {
    pub(crate) message: String,
    pub(crate) severity: Severity,
    pub(crate) persist: bool,
    pub(crate) deliver_remote: bool,
}

impl LogRecord {
    pub(crate) fn new(message: String, options: LogOptions) -> Self {
        Self {
            message,
            severity: options.severity,
            persist: options.persist,
            deliver_remote: options.deliver_remote,
        }
    }
}
