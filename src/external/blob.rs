use std::path::PathBuf;

use async_trait::async_trait;
use reqwest::Client;
use tracing::info;

use crate::config::BlobConfig;
use crate::error::AppError;
use crate::external::dto;

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Stores the file and returns the URL it can be fetched from.
    async fn upload(
        &self,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, AppError>;
}

pub struct HttpBlobStore {
    client: Client,
    config: BlobConfig,
}

impl HttpBlobStore {
    pub fn new(config: BlobConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .build()
            .map_err(|e| AppError::Upstream(format!("Failed to build http client: {}", e)))?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl BlobStore for HttpBlobStore {
    async fn upload(
        &self,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, AppError> {
        let mut request = self
            .client
            .post(&self.config.upload_url)
            .header("Content-Type", content_type)
            .header("X-File-Name", file_name)
            .body(bytes);
        if let Some(api_key) = &self.config.api_key {
            request = request.header("Authorization", format!("Bearer {}", api_key));
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("blob upload failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!("blob store error {}: {}", status, body)));
        }

        let parsed: dto::UploadResponse = response
            .json()
            .await
            .map_err(|e| {
                AppError::Upstream(format!("Failed to parse blob store response: {}", e))
            })?;
        info!("uploaded {} to blob store", file_name);
        Ok(parsed.url)
    }
}

/// Writes uploads under a local directory. Used when no blob service is
/// configured.
pub struct LocalBlobStore {
    root: PathBuf,
    public_base: String,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>, public_base: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base: public_base.into(),
        }
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn upload(
        &self,
        file_name: &str,
        _content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, AppError> {
        let stored_name = format!("{}-{}", uuid::Uuid::new_v4(), sanitize(file_name));
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| {
                AppError::Upstream(format!("cannot create {}: {}", self.root.display(), e))
            })?;
        let path = self.root.join(&stored_name);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| AppError::Upstream(format!("cannot write {}: {}", path.display(), e)))?;
        info!("stored {} at {}", file_name, path.display());
        Ok(format!("{}/{}", self.public_base.trim_end_matches('/'), stored_name))
    }
}

fn sanitize(file_name: &str) -> String {
    let cleaned: String = file_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.trim_matches('.').is_empty() {
        "notes".to_string()
    } else {
        cleaned
    }
}
