use std::path::{Path, PathBuf};

use async_trait::async_trait;
use revlens_core::{AnalysisResult, ProductReview};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::key::{EntityKind, StoreKey};
use crate::{ReviewStore, StoreError};

/// Pretty-printed JSON documents under a root directory:
///
/// ```text
/// <root>/ParsedReviews/reviews_<id>.json
/// <root>/AnalysisResults/analysis_<id>.json
/// ```
///
/// Writes go to a temp file in the target folder and are renamed into place,
/// so readers never see a half-written document.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn path_for(&self, key: &StoreKey) -> PathBuf {
        self.root.join(key.kind().folder()).join(key.file_name())
    }

    /// Writes `value` under `key`, replacing any previous document, and
    /// returns its absolute path.
    ///
    /// # Errors
    ///
    /// [`StoreError::Serialize`] if `value` cannot be encoded,
    /// [`StoreError::Io`] on any filesystem failure.
    pub async fn save<T>(&self, key: &StoreKey, value: &T) -> Result<PathBuf, StoreError>
    where
        T: Serialize + Sync + ?Sized,
    {
        let bytes = serde_json::to_vec_pretty(value)?;
        let path = self.path_for(key);
        let dir = path
            .parent()
            .map_or_else(|| self.root.clone(), Path::to_path_buf);

        fs::create_dir_all(&dir).await.map_err(|e| StoreError::io(&dir, e))?;

        let temp_path = dir.join(format!(".{}.tmp", Uuid::new_v4()));
        if let Err(e) = write_new(&temp_path, &bytes).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e);
        }
        if let Err(e) = fs::rename(&temp_path, &path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(StoreError::io(&path, e));
        }

        let absolute = fs::canonicalize(&path)
            .await
            .map_err(|e| StoreError::io(&path, e))?;
        tracing::debug!(path = %absolute.display(), bytes = bytes.len(), "document saved");
        Ok(absolute)
    }

    /// Reads the document stored under `key`.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] if nothing was saved under `key`,
    /// [`StoreError::Deserialize`] if the file is not a valid `T`,
    /// [`StoreError::Io`] on any other filesystem failure.
    pub async fn load<T>(&self, key: &StoreKey) -> Result<T, StoreError>
    where
        T: DeserializeOwned,
    {
        let path = self.path_for(key);
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound { path });
            }
            Err(e) => return Err(StoreError::io(&path, e)),
        };
        serde_json::from_slice(&bytes).map_err(|source| StoreError::Deserialize { path, source })
    }
}

async fn write_new(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let mut file = fs::OpenOptions::new()
        .create_new(true)
        .write(true)
        .open(path)
        .await
        .map_err(|e| StoreError::io(path, e))?;
    file.write_all(bytes)
        .await
        .map_err(|e| StoreError::io(path, e))?;
    file.flush().await.map_err(|e| StoreError::io(path, e))?;
    Ok(())
}

#[async_trait]
impl ReviewStore for JsonFileStore {
    async fn save_reviews(
        &self,
        product_id: &str,
        reviews: &[ProductReview],
    ) -> Result<PathBuf, StoreError> {
        let key = StoreKey::new(EntityKind::Reviews, product_id)?;
        self.save(&key, reviews).await
    }

    async fn save_analysis(
        &self,
        product_id: &str,
        result: &AnalysisResult,
    ) -> Result<PathBuf, StoreError> {
        let key = StoreKey::new(EntityKind::Analysis, product_id)?;
        self.save(&key, result).await
    }

    async fn load_reviews(&self, product_id: &str) -> Result<Vec<ProductReview>, StoreError> {
        let key = StoreKey::new(EntityKind::Reviews, product_id)?;
        self.load(&key).await
    }

    async fn load_analysis(&self, product_id: &str) -> Result<AnalysisResult, StoreError> {
        let key = StoreKey::new(EntityKind::Analysis, product_id)?;
        self.load(&key).await
    }
}
