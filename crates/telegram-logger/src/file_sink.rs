//! Date-partitioned append-only file sink.
//!
//! Records land in one file per severity class and calendar day,
//! `{instance}_{logs|errors}_{YYYY}_{MM}_{DD}.log`. The sink keeps one open
//! handle per severity and an immutable rotation epoch (the date and the two
//! daily paths); both are owned by the dispatch task, so no locking is
//! involved. The epoch is recomputed only when the wall-clock date changes,
//! never on the per-write path.
//!
//! Every line is flushed as soon as it is written. That trades throughput
//! for a bounded worst case: at most the single in-flight record can be
//! lost on a crash.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, NaiveDate};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;

use crate::error::DeliveryError;
use crate::record::Severity;

/// The daily paths for one calendar date. Swapped wholesale on rollover.
#[derive(Debug)]
struct RotationEpoch {
    date: NaiveDate,
    info_path: PathBuf,
    error_path: PathBuf,
}

impl RotationEpoch {
    fn compute(directory: &Path, instance_name: &str, date: NaiveDate) -> Self {
        let date_str = date.format("%Y_%m_%d").to_string();
        Self {
            date,
            info_path: directory.join(format!("{instance_name}_logs_{date_str}.log")),
            error_path: directory.join(format!("{instance_name}_errors_{date_str}.log")),
        }
    }

    fn path_for(&self, severity: Severity) -> &Path {
        match severity {
            Severity::Info => &self.info_path,
            Severity::Error => &self.error_path,
        }
    }
}

/// An open append handle together with the path it was opened at.
#[derive(Debug)]
struct OpenLogFile {
    path: PathBuf,
    file: File,
}

#[derive(Debug)]
pub(crate) struct FileSink {
    directory: PathBuf,
    instance_name: String,
    epoch: RotationEpoch,
    info_slot: Option<OpenLogFile>,
    error_slot: Option<OpenLogFile>,
}

impl FileSink {
    pub(crate) fn new(directory: PathBuf, instance_name: String) -> Self {
        let epoch =
            RotationEpoch::compute(&directory, &instance_name, Local::now().date_naive());
        Self {
            directory,
            instance_name,
            epoch,
            info_slot: None,
            error_slot: None,
        }
    }

    /// Appends one timestamped line to today's file for the severity.
    pub(crate) async fn write(
        &mut self,
        message: &str,
        severity: Severity,
    ) -> Result<(), DeliveryError> {
        self.write_at(Local::now(), message, severity).await
    }

    async fn write_at(
        &mut self,
        now: DateTime<Local>,
        message: &str,
        severity: Severity,
    ) -> Result<(), DeliveryError> {
        let path = self.epoch_for(now.date_naive()).path_for(severity).to_path_buf();

        let slot = match severity {
            Severity::Info => &mut self.info_slot,
            Severity::Error => &mut self.error_slot,
        };
        // Rollover: replacing the slot drops, and thereby closes, the old
        // handle before the new one is used.
        if slot.as_ref().map_or(true, |open| open.path != path) {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .await
                .map_err(|source| DeliveryError::FileWrite {
                    path: path.clone(),
                    source,
                })?;
            *slot = Some(OpenLogFile { path, file });
        }

        if let Some(open) = slot {
            let line = format!("[{}] {message}\n", now.format("%Y-%m-%d %H:%M:%S"));
            open.file
                .write_all(line.as_bytes())
                .await
                .map_err(|source| DeliveryError::FileWrite {
                    path: open.path.clone(),
                    source,
                })?;
            open.file
                .flush()
                .await
                .map_err(|source| DeliveryError::FileWrite {
                    path: open.path.clone(),
                    source,
                })?;
        }
        Ok(())
    }

    fn epoch_for(&mut self, date: NaiveDate) -> &RotationEpoch {
        if self.epoch.date != date {
            self.epoch = RotationEpoch::compute(&self.directory, &self.instance_name, date);
        }
        &self.epoch
    }
}
