use crate::core::decoder::{decode_rows, encode_rows};
use crate::core::{OutcomeRecorder, Record, Storage};
use crate::domain::model::TimeEntry;
use crate::utils::error::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::path::Path;

pub const SUCCESSFUL_DATA_FILE: &str = "successfulData.json";
pub const FAILED_DATA_FILE: &str = "failedData.xlsx";
pub const LOG_FILE: &str = "log.txt";
pub const TIME_LOG_FILE: &str = "timeLog.txt";
pub const FAILED_DATA_SHEET: &str = "FailedData";

pub fn join_path(dir: &str, name: &str) -> String {
    Path::new(dir).join(name).to_string_lossy().into_owned()
}

/// Flat-file outcome sinks inside one output folder.
///
/// The failed-rows workbook is re-read and rewritten in full for every
/// failure. That is only sound while a single task writes to the folder.
pub struct FileOutcomeRecorder<S: Storage> {
    storage: S,
    output_path: String,
}

impl<S: Storage> FileOutcomeRecorder<S> {
    pub fn new(storage: S, output_path: impl Into<String>) -> Self {
        Self {
            storage,
            output_path: output_path.into(),
        }
    }

    fn path(&self, name: &str) -> String {
        join_path(&self.output_path, name)
    }

    async fn append_line(&self, name: &str, line: &str) -> Result<()> {
        let mut data = line.as_bytes().to_vec();
        data.push(b'\n');
        self.storage.append_file(&self.path(name), &data).await
    }

    /// 讀取目前累積的失敗資料列
    pub async fn failed_rows(&self) -> Result<Vec<Record>> {
        let path = self.path(FAILED_DATA_FILE);
        if !self.storage.exists(&path).await? {
            return Ok(Vec::new());
        }
        let bytes = self.storage.read_file(&path).await?;
        decode_rows(&bytes)
    }
}

#[async_trait]
impl<S: Storage> OutcomeRecorder for FileOutcomeRecorder<S> {
    async fn prepare(&self) -> Result<()> {
        self.storage.create_dir_all(&self.output_path).await
    }

    async fn record_success(&self, row: &Record) -> Result<()> {
        let line = format!(
            "Contact with CustomerId {} created successfully",
            row.customer_id_label()
        );
        self.append_line(LOG_FILE, &line).await?;

        let mut entry = Map::new();
        if let Some(id) = row.customer_id() {
            entry.insert("CustomerId".to_string(), id.clone());
        }
        let json = serde_json::to_string(&Value::Object(entry))?;
        self.append_line(SUCCESSFUL_DATA_FILE, &json).await
    }

    async fn record_failure(&self, row: &Record) -> Result<()> {
        let line = format!(
            "Contact with CustomerId {} failed to create",
            row.customer_id_label()
        );
        self.append_line(LOG_FILE, &line).await?;

        let mut rows = self.failed_rows().await?;
        rows.push(row.clone());
        let bytes = encode_rows(&rows, FAILED_DATA_SHEET)?;
        self.storage
            .write_file(&self.path(FAILED_DATA_FILE), &bytes)
            .await
    }

    async fn record_file_timing(&self, entry: &TimeEntry) -> Result<()> {
        self.append_line(TIME_LOG_FILE, &entry.to_string()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_support::MockStorage;
    use chrono::Utc;
    use serde_json::json;

    fn row(id: Value) -> Record {
        [
            ("CustomerId", id),
            ("Gender", json!("F")),
            ("MaritalStatus", json!("S")),
            ("MobileNo", json!("9990001111")),
        ]
        .into_iter()
        .collect()
    }

    #[tokio::test]
    async fn test_record_success_appends_log_and_json_lines() {
        let storage = MockStorage::new();
        let recorder = FileOutcomeRecorder::new(storage.clone(), "out");

        recorder.record_success(&row(json!("7"))).await.unwrap();
        recorder.record_success(&row(json!(8))).await.unwrap();

        let log = storage.get_text(&join_path("out", LOG_FILE)).await.unwrap();
        assert_eq!(
            log,
            "Contact with CustomerId 7 created successfully\nContact with CustomerId 8 created successfully\n"
        );

        let json_lines = storage
            .get_text(&join_path("out", SUCCESSFUL_DATA_FILE))
            .await
            .unwrap();
        assert_eq!(json_lines, "{\"CustomerId\":\"7\"}\n{\"CustomerId\":8}\n");
    }

    #[tokio::test]
    async fn test_record_success_without_customer_id() {
        let storage = MockStorage::new();
        let recorder = FileOutcomeRecorder::new(storage.clone(), "out");

        recorder.record_success(&Record::new()).await.unwrap();

        let json_lines = storage
            .get_text(&join_path("out", SUCCESSFUL_DATA_FILE))
            .await
            .unwrap();
        assert_eq!(json_lines, "{}\n");
    }

    #[tokio::test]
    async fn test_record_failure_accumulates_rows() {
        let storage = MockStorage::new();
        let recorder = FileOutcomeRecorder::new(storage.clone(), "out");

        recorder.record_failure(&row(json!("7"))).await.unwrap();
        recorder.record_failure(&row(json!("9"))).await.unwrap();

        let failed = recorder.failed_rows().await.unwrap();
        assert_eq!(failed, vec![row(json!("7")), row(json!("9"))]);

        let log = storage.get_text(&join_path("out", LOG_FILE)).await.unwrap();
        assert!(log.contains("Contact with CustomerId 7 failed to create"));
        assert!(log.contains("Contact with CustomerId 9 failed to create"));
        assert!(storage
            .get_file(&join_path("out", SUCCESSFUL_DATA_FILE))
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_record_failure_keeps_rows_from_previous_runs() {
        let storage = MockStorage::new();
        let previous = vec![row(json!("1"))];
        storage
            .put_file(
                &join_path("out", FAILED_DATA_FILE),
                encode_rows(&previous, FAILED_DATA_SHEET).unwrap(),
            )
            .await;

        let recorder = FileOutcomeRecorder::new(storage.clone(), "out");
        recorder.record_failure(&row(json!("2"))).await.unwrap();

        let failed = recorder.failed_rows().await.unwrap();
        assert_eq!(failed, vec![row(json!("1")), row(json!("2"))]);
    }

    #[tokio::test]
    async fn test_record_file_timing() {
        let storage = MockStorage::new();
        let recorder = FileOutcomeRecorder::new(storage.clone(), "out");
        let now = Utc::now();

        recorder
            .record_file_timing(&TimeEntry {
                file_name: "a.xlsx".to_string(),
                start: now,
                end: now,
            })
            .await
            .unwrap();

        let log = storage
            .get_text(&join_path("out", TIME_LOG_FILE))
            .await
            .unwrap();
        assert!(log.starts_with("File: a.xlsx, Start Time: "));
        assert!(log.ends_with('\n'));
    }
}
