use crate::core::Storage;
use crate::utils::error::{EtlError, Result};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// In-memory storage keyed by full path.
#[derive(Clone, Default)]
pub struct MockStorage {
    files: Arc<Mutex<BTreeMap<String, Vec<u8>>>>,
}

fn not_found(path: &str) -> EtlError {
    EtlError::IoError(std::io::Error::new(
        std::io::ErrorKind::NotFound,
        format!("File not found: {}", path),
    ))
}

impl MockStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn put_file(&self, path: &str, data: impl Into<Vec<u8>>) {
        let mut files = self.files.lock().await;
        files.insert(path.to_string(), data.into());
    }

    pub async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
        let files = self.files.lock().await;
        files.get(path).cloned()
    }

    pub async fn get_text(&self, path: &str) -> Option<String> {
        self.get_file(path)
            .await
            .map(|data| String::from_utf8_lossy(&data).into_owned())
    }
}

impl Storage for MockStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let files = self.files.lock().await;
        files.get(path).cloned().ok_or_else(|| not_found(path))
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let mut files = self.files.lock().await;
        files.insert(path.to_string(), data.to_vec());
        Ok(())
    }

    async fn append_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let mut files = self.files.lock().await;
        files
            .entry(path.to_string())
            .or_default()
            .extend_from_slice(data);
        Ok(())
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        let files = self.files.lock().await;
        Ok(files.contains_key(path))
    }

    async fn list_files(&self, dir: &str) -> Result<Vec<String>> {
        let files = self.files.lock().await;
        Ok(files
            .keys()
            .map(|key| Path::new(key.as_str()))
            .filter(|path| path.parent() == Some(Path::new(dir)))
            .filter_map(|path| path.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .collect())
    }

    async fn remove_file(&self, path: &str) -> Result<()> {
        let mut files = self.files.lock().await;
        files.remove(path).map(|_| ()).ok_or_else(|| not_found(path))
    }

    async fn create_dir_all(&self, _path: &str) -> Result<()> {
        Ok(())
    }
}
