//! Best-effort delivery of records to Telegram chats.
//!
//! Each record is posted to every configured chat sequentially, one
//! `sendMessage` call per chat, with a short pause between calls so a burst
//! of records does not trip the Bot API's rate limits. Delivery is
//! fire-and-forget: failures are reported to diagnostics and never retried.

use std::time::Duration;

use serde::Serialize;

use crate::config::LoggerConfig;
use crate::diagnostics::Diagnostics;
use crate::error::DeliveryError;
use crate::record::Severity;

/// Per-request timeout for one `sendMessage` call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Pause after each target to stay under the Bot API rate limits.
const TARGET_PACING: Duration = Duration::from_millis(50);

/// Wire body of the Bot API `sendMessage` call.
#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
}

pub(crate) struct RemoteSink {
    client: reqwest::Client,
    api_base_url: String,
    logs_token: Option<String>,
    errors_token: Option<String>,
    targets: Vec<String>,
    diagnostics: Diagnostics,
}

impl RemoteSink {
    pub(crate) fn new(client: reqwest::Client, config: &LoggerConfig) -> Self {
        Self {
            client,
            api_base_url: config.api_base_url.clone(),
            logs_token: config.logs_token.clone(),
            errors_token: config.errors_token.clone(),
            targets: config.remote_targets.clone(),
            diagnostics: config.diagnostics.clone(),
        }
    }

    /// Delivers one record to every configured chat.
    ///
    /// A no-op when no token is configured for the severity or the target
    /// list is empty. Targets are attempted independently; a failure
    /// against one does not abort delivery to the rest.
    pub(crate) async fn send(&self, message: &str, severity: Severity) {
        let Some(token) = self.token_for(severity) else {
            return;
        };
        if self.targets.is_empty() {
            return;
        }

        let text = format!("{}\n\n{message}", severity.remote_marker());
        let url = format!("{}/bot{token}/sendMessage", self.api_base_url);
        for target in &self.targets {
            if let Err(error) = self.send_to_target(&url, target, &text).await {
                self.diagnostics.report(&error);
            }
            tokio::time::sleep(TARGET_PACING).await;
        }
    }

    async fn send_to_target(
        &self,
        url: &str,
        target: &str,
        text: &str,
    ) -> Result<(), DeliveryError> {
        let body = SendMessage {
            chat_id: target,
            text,
            parse_mode: "HTML",
        };
        let response = self
            .client
            .post(url)
            .timeout(REQUEST_TIMEOUT)
            .json(&body)
            .send()
            .await
            .map_err(|source| DeliveryError::RemoteSend {
                target: target.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DeliveryError::RemoteRejected {
                target: target.to_string(),
                status,
            });
        }
        Ok(())
    }

    fn token_for(&self, severity: Severity) -> Option<&str> {
        match severity {
            Severity::Info => self.logs_token.as_deref(),
            Severity::Error => self.errors_token.as_deref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use serde_json::json;

    use super::*;

    fn collecting_diagnostics() -> (Diagnostics, Arc<Mutex<Vec<String>>>) {
        let seen: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let diagnostics = Diagnostics::new(move |error| {
            sink.lock().unwrap().push(error.to_string());
        });
        (diagnostics, seen)
    }

    fn sink_for(server: &mockito::ServerGuard, diagnostics: Diagnostics) -> RemoteSink {
        let mut config = LoggerConfig::new("svc");
        config.api_base_url = server.url();
        config.logs_token = Some("log-token".to_string());
        config.errors_token = Some("err-token".to_string());
        config.remote_targets = vec!["100".to_string(), "200".to_string()];
        config.diagnostics = diagnostics;
        RemoteSink::new(reqwest::Client::new(), &config)
    }

    #[tokio::test]
    async fn test_posts_documented_body_to_every_target() {
        let mut server = mockito::Server::new_async().await;
        let (diagnostics, seen) = collecting_diagnostics();

        let first = server
            .mock("POST", "/botlog-token/sendMessage")
            .match_header("content-type", "application/json")
            .match_body(mockito::Matcher::Json(json!({
                "chat_id": "100",
                "text": "ℹ️ LOG\n\nqueue caught up",
                "parse_mode": "HTML",
            })))
            .with_status(200)
            .create_async()
            .await;
        let second = server
            .mock("POST", "/botlog-token/sendMessage")
            .match_body(mockito::Matcher::Json(json!({
                "chat_id": "200",
                "text": "ℹ️ LOG\n\nqueue caught up",
                "parse_mode": "HTML",
            })))
            .with_status(200)
            .create_async()
            .await;

        let sink = sink_for(&server, diagnostics);
        sink.send("queue caught up", Severity::Info).await;

        first.assert_async().await;
        second.assert_async().await;
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_error_severity_uses_error_token_and_marker() {
        let mut server = mockito::Server::new_async().await;
        let (diagnostics, _seen) = collecting_diagnostics();

        let mock = server
            .mock("POST", "/boterr-token/sendMessage")
            .match_body(mockito::Matcher::PartialJson(json!({
                "text": "🔴 ERROR\n\ndisk failure",
            })))
            .with_status(200)
            .expect(2)
            .create_async()
            .await;

        let sink = sink_for(&server, diagnostics);
        sink.send("disk failure", Severity::Error).await;

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_missing_token_is_a_no_op() {
        let mut server = mockito::Server::new_async().await;
        let (diagnostics, seen) = collecting_diagnostics();

        let mock = server
            .mock("POST", mockito::Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let mut config = LoggerConfig::new("svc");
        config.api_base_url = server.url();
        config.remote_targets = vec!["100".to_string()];
        config.diagnostics = diagnostics;
        let sink = RemoteSink::new(reqwest::Client::new(), &config);
        sink.send("nobody hears this", Severity::Info).await;

        mock.assert_async().await;
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_target_list_is_a_no_op() {
        let mut server = mockito::Server::new_async().await;
        let (diagnostics, _seen) = collecting_diagnostics();

        let mock = server
            .mock("POST", mockito::Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let mut config = LoggerConfig::new("svc");
        config.api_base_url = server.url();
        config.logs_token = Some("log-token".to_string());
        config.diagnostics = diagnostics;
        let sink = RemoteSink::new(reqwest::Client::new(), &config);
        sink.send("nobody hears this", Severity::Info).await;

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_rejected_target_does_not_block_the_rest() {
        let mut server = mockito::Server::new_async().await;
        let (diagnostics, seen) = collecting_diagnostics();

        let rejected = server
            .mock("POST", "/botlog-token/sendMessage")
            .match_body(mockito::Matcher::PartialJson(json!({ "chat_id": "100" })))
            .with_status(500)
            .create_async()
            .await;
        let delivered = server
            .mock("POST", "/botlog-token/sendMessage")
            .match_body(mockito::Matcher::PartialJson(json!({ "chat_id": "200" })))
            .with_status(200)
            .create_async()
            .await;

        let sink = sink_for(&server, diagnostics);
        sink.send("flaky", Severity::Info).await;

        rejected.assert_async().await;
        delivered.assert_async().await;
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].contains("100"));
        assert!(seen[0].contains("500"));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_reports_every_target() {
        let (diagnostics, seen) = collecting_diagnostics();
        let url = {
            let server = mockito::Server::new_async().await;
            server.url()
            // Server drops here; the port is closed again.
        };

        let mut config = LoggerConfig::new("svc");
        config.api_base_url = url;
        config.logs_token = Some("log-token".to_string());
        config.remote_targets = vec!["100".to_string(), "200".to_string()];
        config.diagnostics = diagnostics;
        let sink = RemoteSink::new(reqwest::Client::new(), &config);
        sink.send("into the void", Severity::Info).await;

        assert_eq!(seen.lock().unwrap().len(), 2);
    }
}
