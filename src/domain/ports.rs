use crate::domain::model::{ContactPayload, Record, SyncOutcome, TimeEntry};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    fn append_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    fn exists(&self, path: &str) -> impl std::future::Future<Output = Result<bool>> + Send;
    /// Names (not full paths) of the regular files directly inside `dir`, sorted.
    fn list_files(&self, dir: &str)
        -> impl std::future::Future<Output = Result<Vec<String>>> + Send;
    fn remove_file(&self, path: &str) -> impl std::future::Future<Output = Result<()>> + Send;
    fn create_dir_all(&self, path: &str) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn api_endpoint(&self) -> &str;
    fn api_username(&self) -> &str;
    fn api_password(&self) -> &str;
    fn input_path(&self) -> &str;
    fn output_path(&self) -> &str;
    fn request_timeout_seconds(&self) -> Option<u64>;
}

/// 遠端 CRM：每呼叫一次就建立一個聯絡人
#[async_trait]
pub trait ContactClient: Send + Sync {
    async fn create_contact(&self, payload: &ContactPayload) -> Result<SyncOutcome>;
}

/// Sinks for per-row outcomes and per-file timings.
#[async_trait]
pub trait OutcomeRecorder: Send + Sync {
    async fn prepare(&self) -> Result<()> {
        Ok(())
    }
    async fn record_success(&self, row: &Record) -> Result<()>;
    async fn record_failure(&self, row: &Record) -> Result<()>;
    async fn record_file_timing(&self, entry: &TimeEntry) -> Result<()>;
}
