use crate::error::AppError;
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::path::PathBuf;
use tokio::fs;

/// A media object as reported by a listing.
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub key: String,
    pub size: i64,
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn upload(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<(), AppError>;
    async fn list(&self, prefix: &str) -> Result<Vec<StoredObject>, AppError>;
    async fn delete(&self, key: &str) -> Result<(), AppError>;

    /// Browser-reachable URL for a stored object.
    fn public_url(&self, key: &str) -> String;
}

pub struct LocalStorage {
    base_path: PathBuf,
    public_base_url: String,
}

impl LocalStorage {
    pub async fn new(
        base_path: impl Into<PathBuf>,
        public_base_url: impl Into<String>,
    ) -> Result<Self, AppError> {
        let base_path = base_path.into();
        if !base_path.exists() {
            fs::create_dir_all(&base_path).await?;
        }
        Ok(Self {
            base_path,
            public_base_url: public_base_url.into(),
        })
    }
}

#[async_trait]
impl ObjectStore for LocalStorage {
    async fn upload(&self, key: &str, data: Vec<u8>, _content_type: &str) -> Result<(), AppError> {
        let path = self.base_path.join(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(path, data).await?;
        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<StoredObject>, AppError> {
        let dir = self.base_path.join(prefix.trim_end_matches('/'));
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut objects = Vec::new();
        let mut entries = fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let metadata = entry.metadata().await?;
            if !metadata.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            objects.push(StoredObject {
                key: format!("{}{}", prefix, name),
                size: metadata.len() as i64,
            });
        }
        objects.sort_by(|a, b| a.key.cmp(&b.key));

        Ok(objects)
    }

    async fn delete(&self, key: &str) -> Result<(), AppError> {
        let path = self.base_path.join(key);
        if path.exists() {
            fs::remove_file(path).await?;
        }
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url.trim_end_matches('/'), key)
    }
}

/// Client for the hosted object store's HTTP API.
pub struct BucketStorage {
    client: Client,
    base_url: String,
    bucket: String,
    api_key: Secret<String>,
}

impl BucketStorage {
    pub fn new(
        base_url: impl Into<String>,
        bucket: impl Into<String>,
        api_key: Secret<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            bucket: bucket.into(),
            api_key,
        }
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.api_key.expose_secret())
    }
}

#[async_trait]
impl ObjectStore for BucketStorage {
    async fn upload(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<(), AppError> {
        let url = format!("{}/object/{}/{}", self.base_url, self.bucket, key);
        let response = self
            .client
            .post(&url)
            .header(AUTHORIZATION, self.bearer())
            .header(CONTENT_TYPE, content_type)
            .body(data)
            .send()
            .await
            .map_err(|e| {
                AppError::InternalError(anyhow::anyhow!("Object store unreachable: {}", e))
            })?;

        if !response.status().is_success() {
            return Err(AppError::InternalError(anyhow::anyhow!(
                "Object upload failed with {}",
                response.status()
            )));
        }
        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<StoredObject>, AppError> {
        #[derive(Deserialize)]
        struct BucketEntry {
            name: String,
            #[serde(default)]
            size: i64,
        }

        let url = format!("{}/object/list/{}", self.base_url, self.bucket);
        let response = self
            .client
            .post(&url)
            .header(AUTHORIZATION, self.bearer())
            .json(&serde_json::json!({ "prefix": prefix }))
            .send()
            .await
            .map_err(|e| {
                AppError::InternalError(anyhow::anyhow!("Object store unreachable: {}", e))
            })?;

        if !response.status().is_success() {
            return Err(AppError::InternalError(anyhow::anyhow!(
                "Object listing failed with {}",
                response.status()
            )));
        }

        let entries: Vec<BucketEntry> = response.json().await.map_err(|e| {
            AppError::InternalError(anyhow::anyhow!("Malformed object listing: {}", e))
        })?;

        Ok(entries
            .into_iter()
            .map(|entry| StoredObject {
                key: entry.name,
                size: entry.size,
            })
            .collect())
    }

    async fn delete(&self, key: &str) -> Result<(), AppError> {
        let url = format!("{}/object/{}/{}", self.base_url, self.bucket, key);
        let response = self
            .client
            .delete(&url)
            .header(AUTHORIZATION, self.bearer())
            .send()
            .await
            .map_err(|e| {
                AppError::InternalError(anyhow::anyhow!("Object store unreachable: {}", e))
            })?;

        if response.status().as_u16() == 404 {
            return Err(AppError::NotFound(anyhow::anyhow!("Object not found: {}", key)));
        }

        if !response.status().is_success() {
            return Err(AppError::InternalError(anyhow::anyhow!(
                "Object delete failed with {}",
                response.status()
            )));
        }
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/object/public/{}/{}", self.base_url, self.bucket, key)
    }
}
