//! # Telegram Logger
//!
//! Asynchronous logging pipeline with daily files and Telegram delivery.
//!
//! [`Logger::log`] enqueues a record onto a bounded in-memory queue and
//! returns without performing I/O. A background worker consumes the queue,
//! appends each record to a per-day, per-severity file and delivers selected
//! records to the configured Telegram chats. A companion task deletes files
//! older than the configured retention once per hour.
//!
//! ## Architecture
//!
//! - [`config`]: settings captured once at initialization
//! - [`logger`]: the [`Logger`] handle, ingestion and lifecycle
//! - [`record`]: severity classes and per-call options
//! - [`error`]: synchronous API errors and asynchronous delivery failures
//! - [`diagnostics`]: callback receiving delivery failures
//!
//! Delivery is best-effort past the enqueue: a failed file write or Telegram
//! post is reported to the [`Diagnostics`] callback and never fails the call
//! that produced the record. What `shutdown` does guarantee is that every
//! record accepted by `log` has been dispatched before it returns.
//!
//! ## Example
//!
//! ```no_run
//! use telegram_logger::{LogOptions, Logger, LoggerConfig};
//!
//! # async fn run() -> Result<(), telegram_logger::LoggerError> {
//! let mut config = LoggerConfig::new("billing");
//! config.errors_token = Some("123456:bot-token".to_string());
//! config.remote_targets = vec!["-1001234".to_string()];
//!
//! let logger = Logger::initialize(config)?;
//! logger.log("service started", LogOptions::default()).await?;
//! logger
//!     .log(
//!         "payment failed",
//!         LogOptions {
//!             deliver_remote: true,
//!             ..LogOptions::error()
//!         },
//!     )
//!     .await?;
//! logger.shutdown().await;
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

/// Logger settings
pub mod config;

/// Delivery failure callback
pub mod diagnostics;

/// Error types
pub mod error;

/// The logger handle, ingestion and lifecycle
pub mod logger;

/// Severity classes and per-call options
pub mod record;

mod dispatch;
mod file_sink;
mod remote_sink;
mod retention;

pub use config::{LoggerConfig, DEFAULT_API_BASE_URL};
pub use diagnostics::Diagnostics;
pub use error::{DeliveryError, LoggerError};
pub use logger::Logger;
pub use record::{LogOptions, Severity};
