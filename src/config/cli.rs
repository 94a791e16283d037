use crate::core::Storage;
use crate::utils::error::Result;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Local file system storage. Relative paths resolve against `base_path`,
/// absolute paths are used as given.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        Path::new(&self.base_path).join(path)
    }

    async fn ensure_parent(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }
        Ok(())
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        Ok(fs::read(self.resolve(path)).await?)
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = self.resolve(path);
        Self::ensure_parent(&full_path).await?;
        fs::write(full_path, data).await?;
        Ok(())
    }

    async fn append_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = self.resolve(path);
        Self::ensure_parent(&full_path).await?;
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(full_path)
            .await?;
        file.write_all(data).await?;
        file.flush().await?;
        Ok(())
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        Ok(fs::try_exists(self.resolve(path)).await?)
    }

    async fn list_files(&self, dir: &str) -> Result<Vec<String>> {
        let mut entries = fs::read_dir(self.resolve(dir)).await?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            // 子資料夾不處理
            if entry.file_type().await?.is_file() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    async fn remove_file(&self, path: &str) -> Result<()> {
        fs::remove_file(self.resolve(path)).await?;
        Ok(())
    }

    async fn create_dir_all(&self, path: &str) -> Result<()> {
        fs::create_dir_all(self.resolve(path)).await?;
        Ok(())
    }
}
