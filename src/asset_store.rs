/// Disk-backed asset store
///
/// Persists photo blobs under a cache directory, keyed by generated
/// references of the form `{millis}_{sanitized-original-name}`. The
/// collision token makes distinct uploads of the same filename distinct
/// references; an existing reference is never overwritten.
use crate::error::{ServiceError, ServiceResult};
use std::path::{Path, PathBuf};
use tokio::{fs, io::AsyncWriteExt};

#[derive(Clone)]
pub struct AssetStore {
    base_dir: PathBuf,
}

impl AssetStore {
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Create the cache directory if it does not exist yet
    pub async fn ensure_dir(&self) -> ServiceResult<()> {
        fs::create_dir_all(&self.base_dir).await?;
        Ok(())
    }

    /// Resolve a reference to its on-disk path.
    ///
    /// References are single path components; anything that could escape
    /// the cache directory does not resolve.
    fn blob_path(&self, reference: &str) -> Option<PathBuf> {
        if reference.is_empty()
            || reference == ".."
            || reference.contains('/')
            || reference.contains('\\')
        {
            return None;
        }
        Some(self.base_dir.join(reference))
    }

    /// Persist bytes under a newly generated reference
    pub async fn store(&self, data: &[u8], original_name: &str) -> ServiceResult<String> {
        let sanitized = sanitize_name(original_name);
        let mut token = chrono::Utc::now().timestamp_millis();

        loop {
            let reference = format!("{}_{}", token, sanitized);
            let path = self.base_dir.join(&reference);

            // create_new refuses to clobber an existing reference
            match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(mut file) => {
                    file.write_all(data).await.map_err(|e| {
                        ServiceError::Storage(format!("Failed to write blob {}: {}", reference, e))
                    })?;
                    file.flush().await.map_err(|e| {
                        ServiceError::Storage(format!("Failed to flush blob {}: {}", reference, e))
                    })?;
                    return Ok(reference);
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    token += 1;
                }
                Err(e) => {
                    return Err(ServiceError::Storage(format!(
                        "Failed to create blob {}: {}",
                        reference, e
                    )))
                }
            }
        }
    }

    /// Read a blob's bytes; missing references fail with NotFound
    pub async fn read(&self, reference: &str) -> ServiceResult<Vec<u8>> {
        let path = self
            .blob_path(reference)
            .ok_or_else(|| ServiceError::NotFound("Photo file missing".to_string()))?;

        match fs::read(&path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(ServiceError::NotFound("Photo file missing".to_string()))
            }
            Err(e) => Err(ServiceError::Storage(format!(
                "Failed to read blob {}: {}",
                reference, e
            ))),
        }
    }

    /// Delete a blob; absence is not an error
    pub async fn remove(&self, reference: &str) -> ServiceResult<()> {
        let Some(path) = self.blob_path(reference) else {
            return Ok(());
        };

        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ServiceError::Storage(format!(
                "Failed to delete blob {}: {}",
                reference, e
            ))),
        }
    }

    /// Check whether a reference currently resolves to a file
    pub async fn exists(&self, reference: &str) -> bool {
        self.blob_path(reference).map(|p| p.exists()).unwrap_or(false)
    }
}

/// Collapse whitespace runs to underscores and drop any path components
fn sanitize_name(original: &str) -> String {
    let base = Path::new(original)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let sanitized: Vec<&str> = base.split_whitespace().collect();
    if sanitized.is_empty() {
        "upload".to_string()
    } else {
        sanitized.join("_")
    }
}
