use super::TempStore;
use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;
use uuid::Uuid;

/// Stores uploads as uniquely named files under a single directory.
pub struct DiskTempStore {
    root: PathBuf,
}

impl DiskTempStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Keep the client's extension so external tools can sniff the format,
    /// but never any other part of the client-supplied name.
    fn file_name_for(original_name: &str) -> String {
        let extension = Path::new(original_name)
            .extension()
            .and_then(|e| e.to_str())
            .filter(|e| !e.is_empty() && e.len() <= 8 && e.chars().all(|c| c.is_ascii_alphanumeric()))
            .map(|e| e.to_ascii_lowercase());

        match extension {
            Some(ext) => format!("upload-{}.{}", Uuid::new_v4(), ext),
            None => format!("upload-{}", Uuid::new_v4()),
        }
    }
}

#[async_trait]
impl TempStore for DiskTempStore {
    async fn allocate(&self, original_name: &str) -> io::Result<PathBuf> {
        fs::create_dir_all(&self.root).await?;

        let path = self.root.join(Self::file_name_for(original_name));
        fs::File::create(&path).await?;

        debug!(path = %path.display(), "Allocated temporary upload file");
        Ok(path)
    }

    async fn remove(&self, path: &Path) -> io::Result<()> {
        match fs::remove_file(path).await {
            Ok(()) => {
                debug!(path = %path.display(), "Removed temporary upload file");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_allocate_then_remove() {
        let temp_dir = TempDir::new().unwrap();
        let store = DiskTempStore::new(temp_dir.path().join("uploads"));

        let path = store.allocate("Quarterly Report.PDF").await.unwrap();
        assert!(path.exists());
        assert!(path.starts_with(store.root()));
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("pdf"));

        store.remove(&path).await.unwrap();
        assert!(!path.exists());

        // Removing twice is not an error.
        store.remove(&path).await.unwrap();
    }

    #[test]
    fn test_file_name_ignores_client_path() {
        let name = DiskTempStore::file_name_for("../../etc/passwd");
        assert!(name.starts_with("upload-"));
        assert!(!name.contains('/'));

        let name = DiskTempStore::file_name_for("slides.pptx");
        assert!(name.ends_with(".pptx"));

        let name = DiskTempStore::file_name_for("weird.ext with space");
        assert!(!name.contains(' '));
    }
}
