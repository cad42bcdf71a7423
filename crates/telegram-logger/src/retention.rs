//! Periodic deletion of this instance's expired daily files.
//!
//! The sweeper wakes once per interval, lists the log directory and deletes
//! files matching this instance's naming patterns whose modification time is
//! strictly older than the retention window. Files of other instances
//! sharing the directory are never touched. The sleep races the
//! cancellation token, so shutdown does not wait out the interval.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::diagnostics::Diagnostics;
use crate::error::DeliveryError;

/// Time between sweeps. The first sweep runs one full interval after
/// startup.
const SWEEP_INTERVAL: Duration = Duration::from_secs(3600);

const SECONDS_PER_DAY: u64 = 86_400;

pub(crate) struct RetentionSweeper {
    directory: PathBuf,
    instance_name: String,
    retention: Duration,
    diagnostics: Diagnostics,
    cancel: CancellationToken,
}

impl RetentionSweeper {
    pub(crate) fn new(
        directory: PathBuf,
        instance_name: String,
        retention_days: u32,
        diagnostics: Diagnostics,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            directory,
            instance_name,
            retention: Duration::from_secs(u64::from(retention_days) * SECONDS_PER_DAY),
            diagnostics,
            cancel,
        }
    }

    pub(crate) async fn run(self) {
        loop {
            tokio::select! {
                () = tokio::time::sleep(SWEEP_INTERVAL) => {
                    sweep_expired(
                        &self.directory,
                        &self.instance_name,
                        SystemTime::now(),
                        self.retention,
                        &self.diagnostics,
                    )
                    .await;
                }
                () = self.cancel.cancelled() => {
                    debug!("retention sweeper stopping");
                    break;
                }
            }
        }
    }
}

/// One sweep pass. Per-file failures are reported and the pass continues
/// with the remaining files.
async fn sweep_expired(
    directory: &Path,
    instance_name: &str,
    now: SystemTime,
    retention: Duration,
    diagnostics: &Diagnostics,
) {
    let mut entries = match tokio::fs::read_dir(directory).await {
        Ok(entries) => entries,
        Err(error) => {
            // Nothing to sweep if the directory is gone or unreadable.
            debug!("retention sweep skipped, cannot read {}: {error}", directory.display());
            return;
        }
    };

    let logs_prefix = format!("{instance_name}_logs_");
    let errors_prefix = format!("{instance_name}_errors_");

    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(source) => {
                diagnostics.report(&DeliveryError::RetentionSweep {
                    path: directory.to_path_buf(),
                    source,
                });
                break;
            }
        };

        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if !is_instance_log(name, &logs_prefix, &errors_prefix) {
            continue;
        }

        let path = entry.path();
        let modified = match entry.metadata().await.and_then(|meta| meta.modified()) {
            Ok(modified) => modified,
            Err(source) => {
                diagnostics.report(&DeliveryError::RetentionSweep { path, source });
                continue;
            }
        };

        // A file dated in the future has age zero and is retained.
        let age = now.duration_since(modified).unwrap_or_default();
        if age > retention {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => debug!("removed expired log file {}", path.display()),
                Err(source) => {
                    diagnostics.report(&DeliveryError::RetentionSweep { path, source });
                }
            }
        }
    }
}

fn is_instance_log(name: &str, logs_prefix: &str, errors_prefix: &str) -> bool {
    (name.starts_with(logs_prefix) || name.starts_with(errors_prefix)) && name.ends_with(".log")
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    fn collecting_diagnostics() -> (Diagnostics, Arc<Mutex<Vec<String>>>) {
        let seen: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let diagnostics = Diagnostics::new(move |error| {
            sink.lock().unwrap().push(error.to_string());
        });
        (diagnostics, seen)
    }

    fn days(n: u64) -> Duration {
        Duration::from_secs(n * SECONDS_PER_DAY)
    }

    #[tokio::test]
    async fn test_sweep_deletes_expired_files_of_this_instance_only() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "svc_logs_2026_01_01.log",
            "svc_errors_2026_01_01.log",
            "other_logs_2026_01_01.log",
            "svc_logs_2026_01_01.log.bak",
        ] {
            std::fs::write(dir.path().join(name), b"old\n").unwrap();
        }
        let (diagnostics, seen) = collecting_diagnostics();

        // Files were just written; pretend the sweep happens 31 days later.
        let now = SystemTime::now() + days(31);
        sweep_expired(dir.path(), "svc", now, days(30), &diagnostics).await;

        assert!(!dir.path().join("svc_logs_2026_01_01.log").exists());
        assert!(!dir.path().join("svc_errors_2026_01_01.log").exists());
        assert!(dir.path().join("other_logs_2026_01_01.log").exists());
        assert!(dir.path().join("svc_logs_2026_01_01.log.bak").exists());
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sweep_retains_files_within_the_window() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("svc_logs_2026_01_01.log"), b"recent\n").unwrap();
        let (diagnostics, _seen) = collecting_diagnostics();

        let now = SystemTime::now() + days(29);
        sweep_expired(dir.path(), "svc", now, days(30), &diagnostics).await;

        assert!(dir.path().join("svc_logs_2026_01_01.log").exists());
    }

    #[tokio::test]
    async fn test_zero_retention_expires_everything_already_written() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("svc_logs_2026_01_01.log"), b"gone\n").unwrap();
        let (diagnostics, _seen) = collecting_diagnostics();

        let now = SystemTime::now() + Duration::from_secs(1);
        sweep_expired(dir.path(), "svc", now, Duration::ZERO, &diagnostics).await;

        assert!(!dir.path().join("svc_logs_2026_01_01.log").exists());
    }

    #[tokio::test]
    async fn test_missing_directory_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let gone = dir.path().join("never_created");
        let (diagnostics, seen) = collecting_diagnostics();

        sweep_expired(&gone, "svc", SystemTime::now(), days(30), &diagnostics).await;

        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sweeper_task_stops_on_cancellation() {
        let dir = tempfile::tempdir().unwrap();
        let (diagnostics, _seen) = collecting_diagnostics();
        let cancel = CancellationToken::new();
        let sweeper = RetentionSweeper::new(
            dir.path().to_path_buf(),
            "svc".to_string(),
            30,
            diagnostics,
            cancel.clone(),
        );

        let handle = tokio::spawn(sweeper.run());
        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("sweeper did not stop after cancellation")
            .unwrap();
    }
}
