//! Logger configuration.
//!
//! A [`LoggerConfig`] is a plain value captured once by
//! [`Logger::initialize`](crate::Logger::initialize) and immutable
//! afterwards. There is no environment or file loading layer; embedders
//! construct the value themselves.

use std::path::PathBuf;

use crate::diagnostics::Diagnostics;
use crate::error::LoggerError;
use crate::record::Severity;

/// Production endpoint of the Telegram Bot API.
pub const DEFAULT_API_BASE_URL: &str = "https://api.telegram.org";

/// Settings for one logger instance.
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Directory holding the daily files. Created at initialize if absent.
    pub directory: PathBuf,

    /// File name prefix identifying this instance. Required, non-empty;
    /// the retention sweeper only ever touches files carrying this prefix.
    pub instance_name: String,

    /// Days a daily file is kept before the sweeper deletes it.
    pub retention_days: u32,

    /// Bot token used when delivering info-severity records remotely.
    pub logs_token: Option<String>,

    /// Bot token used when delivering error-severity records remotely.
    pub errors_token: Option<String>,

    /// Chat IDs receiving remote deliveries. Empty disables remote
    /// delivery; `log` rejects `deliver_remote` requests in that case.
    pub remote_targets: Vec<String>,

    /// Base URL of the Telegram API. Tests point this at a local server.
    pub api_base_url: String,

    /// Callback receiving every delivery failure.
    pub diagnostics: Diagnostics,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("logs"),
            instance_name: String::new(),
            retention_days: 30,
            logs_token: None,
            errors_token: None,
            remote_targets: Vec::new(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            diagnostics: Diagnostics::default(),
        }
    }
}

impl LoggerConfig {
    /// Configuration with the given instance name and default settings.
    #[must_use]
    pub fn new(instance_name: impl Into<String>) -> Self {
        Self {
            instance_name: instance_name.into(),
            ..Self::default()
        }
    }

    /// The token configured for the given severity class, if any.
    pub(crate) fn token_for(&self, severity: Severity) -> Option<&str> {
        match severity {
            Severity::Info => self.logs_token.as_deref(),
            Severity::Error => self.errors_token.as_deref(),
        }
    }

    pub(crate) fn validate(&self) -> Result<(), LoggerError> {
        if self.instance_name.trim().is_empty() {
            return Err(LoggerError::EmptyInstanceName);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LoggerConfig::default();
        assert_eq!(config.directory, PathBuf::from("logs"));
        assert_eq!(config.retention_days, 30);
        assert!(config.logs_token.is_none());
        assert!(config.errors_token.is_none());
        assert!(config.remote_targets.is_empty());
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
    }

    #[test]
    fn test_empty_name_is_rejected() {
        assert!(matches!(
            LoggerConfig::default().validate(),
            Err(LoggerError::EmptyInstanceName)
        ));
        assert!(matches!(
            LoggerConfig::new("   ").validate(),
            Err(LoggerError::EmptyInstanceName)
        ));
    }

    #[test]
    fn test_named_config_passes_validation() {
        assert!(LoggerConfig::new("billing").validate().is_ok());
    }

    #[test]
    fn test_token_selection_by_severity() {
        let mut config = LoggerConfig::new("svc");
        config.logs_token = Some("log-token".to_string());
        assert_eq!(config.token_for(Severity::Info), Some("log-token"));
        assert_eq!(config.token_for(Severity::Error), None);
    }
}
