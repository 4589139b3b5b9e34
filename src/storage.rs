//! Document storage - where rendered certificates are uploaded.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("storage rejected upload with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Identity and public link of an uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredObject {
    pub id: String,
    pub view_link: String,
}

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn upload_file(&self, filename: &str, file_data: &[u8]) -> Result<StoredObject, StorageError>;

    fn get_asset_url(&self, key: &str) -> String;
}

#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    pub supabase_url: String,
    pub supabase_key: String,
    pub bucket_name: String,
    /// Folder inside the bucket that receives certificates.
    pub folder: String,
}

impl SupabaseConfig {
    /// Object key for a file name, sanitized and placed under the folder.
    pub fn object_key(&self, filename: &str) -> String {
        let safe = sanitize_filename::sanitize(filename);
        let folder = self.folder.trim_matches('/');
        if folder.is_empty() {
            safe
        } else {
            format!("{folder}/{safe}")
        }
    }

    pub fn public_url(&self, key: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.supabase_url.trim_end_matches('/'),
            self.bucket_name,
            key
        )
    }

    fn upload_url(&self, key: &str) -> String {
        format!(
            "{}/storage/v1/object/{}/{}",
            self.supabase_url.trim_end_matches('/'),
            self.bucket_name,
            key
        )
    }
}

/// Supabase Storage over its REST API.
pub struct SupabaseStorage {
    config: SupabaseConfig,
    client: reqwest::Client,
}

impl SupabaseStorage {
    pub fn new(config: SupabaseConfig, client: reqwest::Client) -> Self {
        Self { config, client }
    }
}

#[async_trait]
impl ObjectStorage for SupabaseStorage {
    async fn upload_file(&self, filename: &str, file_data: &[u8]) -> Result<StoredObject, StorageError> {
        let key = self.config.object_key(filename);
        log::debug!("Uploading {} ({} bytes)", key, file_data.len());

        let response = self
            .client
            .post(self.config.upload_url(&key))
            .bearer_auth(&self.config.supabase_key)
            .header("apikey", &self.config.supabase_key)
            .header("Content-Type", "application/pdf")
            .header("x-upsert", "true")
            .body(file_data.to_vec())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let id = response
            .json::<serde_json::Value>()
            .await
            .ok()
            .and_then(|v| v.get("Id").and_then(|id| id.as_str()).map(str::to_string))
            .unwrap_or_else(|| key.clone());

        log::info!("Uploaded {}", key);
        Ok(StoredObject {
            id,
            view_link: self.get_asset_url(&key),
        })
    }

    fn get_asset_url(&self, key: &str) -> String {
        self.config.public_url(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(folder: &str) -> SupabaseConfig {
        SupabaseConfig {
            supabase_url: "https://test.supabase.co/".to_string(),
            supabase_key: "service-key".to_string(),
            bucket_name: "certificados".to_string(),
            folder: folder.to_string(),
        }
    }

    #[test]
    fn test_object_key_and_public_url() {
        let config = config("/2025/");
        let key = config.object_key("Certificate_Ana_Ruiz_ACME_1144.pdf");
        assert_eq!(key, "2025/Certificate_Ana_Ruiz_ACME_1144.pdf");
        assert_eq!(
            config.public_url(&key),
            "https://test.supabase.co/storage/v1/object/public/certificados/2025/Certificate_Ana_Ruiz_ACME_1144.pdf"
        );
    }

    #[test]
    fn test_object_key_without_folder() {
        assert_eq!(config("").object_key("a.pdf"), "a.pdf");
    }

    #[test]
    fn test_supabase_config_debug_format() {
        let debug_str = format!("{:?}", config("x"));
        assert!(debug_str.contains("SupabaseConfig"));
        assert!(debug_str.contains("test.supabase.co"));
    }
}
