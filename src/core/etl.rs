use crate::core::decoder::decode_rows;
use crate::core::recorder::join_path;
use crate::core::transform::transform_record;
use crate::core::{ContactClient, OutcomeRecorder, Record, Storage};
use crate::domain::model::{BatchReport, TimeEntry};
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;
use chrono::Utc;

enum FileOutcome {
    Processed,
    Skipped,
}

enum RowOutcome {
    Succeeded,
    Failed,
}

/// 乾跑模式下每個檔案的預覽
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePreview {
    pub file_name: String,
    pub rows: usize,
}

/// Runs one batch over every file in the upload folder.
///
/// Files and rows are handled strictly one after another. The outcome sinks
/// rely on that ordering and take no locks.
pub struct EtlEngine<S: Storage, C: ContactClient, R: OutcomeRecorder> {
    storage: S,
    client: C,
    recorder: R,
    input_path: String,
    monitor: SystemMonitor,
}

impl<S: Storage, C: ContactClient, R: OutcomeRecorder> EtlEngine<S, C, R> {
    pub fn new(storage: S, client: C, recorder: R, input_path: impl Into<String>) -> Self {
        Self::new_with_monitoring(storage, client, recorder, input_path, false)
    }

    pub fn new_with_monitoring(
        storage: S,
        client: C,
        recorder: R,
        input_path: impl Into<String>,
        monitor_enabled: bool,
    ) -> Self {
        Self {
            storage,
            client,
            recorder,
            input_path: input_path.into(),
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    /// Never fails: a file-level error ends the run early and is reported in
    /// [`BatchReport::error`] together with the file it happened on.
    pub async fn run(&self) -> BatchReport {
        tracing::info!("🚀 Starting contact sync from {}", self.input_path);

        let mut report = BatchReport::default();
        match self.run_batch(&mut report).await {
            Ok(()) => {
                tracing::info!(
                    "✅ Contacts processed and files removed: {} file(s), {} created, {} failed",
                    report.processed_files.len(),
                    report.rows_succeeded,
                    report.rows_failed
                );
            }
            Err(e) => {
                tracing::error!(
                    "❌ Batch stopped at {}: {} (Category: {:?})",
                    report.failed_at_file.as_deref().unwrap_or("<listing>"),
                    e,
                    e.category()
                );
                tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
                report.error = Some(e.to_string());
            }
        }

        self.monitor.log_final_stats(report.rows_processed());
        report
    }

    async fn run_batch(&self, report: &mut BatchReport) -> Result<()> {
        self.recorder.prepare().await?;

        let files = self.storage.list_files(&self.input_path).await?;
        tracing::info!("Found {} file(s) in {}", files.len(), self.input_path);

        for file in files {
            match self.process_file(&file, report).await {
                Ok(FileOutcome::Processed) => report.processed_files.push(file),
                Ok(FileOutcome::Skipped) => report.skipped_files.push(file),
                Err(e) => {
                    report.failed_at_file = Some(file);
                    return Err(e);
                }
            }
        }

        Ok(())
    }

    async fn process_file(&self, file: &str, report: &mut BatchReport) -> Result<FileOutcome> {
        let start = Utc::now();
        tracing::info!("📄 Processing file: {}", file);

        let path = join_path(&self.input_path, file);
        let buffer = self.storage.read_file(&path).await?;
        let rows = decode_rows(&buffer)?;

        if rows.is_empty() {
            tracing::warn!("No data found in file: {}", file);
            return Ok(FileOutcome::Skipped);
        }
        tracing::debug!("Decoded {} row(s) from {}", rows.len(), file);

        for row in &rows {
            self.process_row(row, report).await;
        }

        self.storage.remove_file(&path).await?;

        let entry = TimeEntry {
            file_name: file.to_string(),
            start,
            end: Utc::now(),
        };
        self.recorder.record_file_timing(&entry).await?;
        self.monitor.log_file_stats(file, report.rows_processed());

        Ok(FileOutcome::Processed)
    }

    async fn process_row(&self, row: &Record, report: &mut BatchReport) {
        let payload = transform_record(row);
        let customer_id = row.customer_id_label();

        let recorded = match self.client.create_contact(&payload).await {
            Ok(outcome) if outcome.is_success() => {
                tracing::debug!("Contact with CustomerId {} created", customer_id);
                self.recorder
                    .record_success(row)
                    .await
                    .map(|_| RowOutcome::Succeeded)
            }
            Ok(outcome) => {
                tracing::warn!(
                    "Contact with CustomerId {} failed to create (HTTP {})",
                    customer_id,
                    outcome.status()
                );
                self.recorder
                    .record_failure(row)
                    .await
                    .map(|_| RowOutcome::Failed)
            }
            Err(e) => {
                tracing::error!("Error creating contact for CustomerId {}: {}", customer_id, e);
                self.recorder
                    .record_failure(row)
                    .await
                    .map(|_| RowOutcome::Failed)
            }
        };

        match recorded {
            Ok(RowOutcome::Succeeded) => report.rows_succeeded += 1,
            Ok(RowOutcome::Failed) => report.rows_failed += 1,
            Err(e) => {
                // 寫入結果檔失敗只影響這一列
                tracing::error!("Could not record outcome for CustomerId {}: {}", customer_id, e);
                report.rows_errored += 1;
            }
        }
    }

    /// Lists what a run would do without calling the CRM or touching any file.
    pub async fn dry_run(&self) -> Result<Vec<FilePreview>> {
        let files = self.storage.list_files(&self.input_path).await?;
        let mut previews = Vec::with_capacity(files.len());

        for file in files {
            let buffer = self
                .storage
                .read_file(&join_path(&self.input_path, &file))
                .await?;
            let rows = decode_rows(&buffer)?.len();
            previews.push(FilePreview {
                file_name: file,
                rows,
            });
        }

        Ok(previews)
    }
}
