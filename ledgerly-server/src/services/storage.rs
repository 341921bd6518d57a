//! Client for the external object-storage service.
//!
//! The storage service owns the bytes; this service only requests
//! time-limited credentials from it (a signed upload token before the browser
//! transfers the file, a signed download URL afterwards for the classifier).

use crate::config::StorageConfig;
use anyhow::Result;
use chrono::Utc;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

pub struct StorageClient {
    http: Client,
    endpoint: String,
    bucket: String,
    service_key: Secret<String>,
}

#[derive(Debug, Deserialize)]
struct SignedUploadResponse {
    token: String,
}

#[derive(Debug, Deserialize)]
struct SignedUrlResponse {
    #[serde(rename = "signedURL", alias = "signedUrl")]
    signed_url: String,
}

#[derive(Debug, Deserialize)]
struct StorageErrorResponse {
    #[serde(default)]
    message: String,
}

impl StorageClient {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            http: Client::new(),
            endpoint: config.endpoint.clone(),
            bucket: config.bucket.clone(),
            service_key: config.service_key.clone(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Request a time-limited upload token for an object path.
    pub async fn create_signed_upload(&self, path: &str) -> Result<String> {
        let url = format!(
            "{}/object/upload/sign/{}/{}",
            self.endpoint, self.bucket, path
        );

        let response = self
            .http
            .post(&url)
            .bearer_auth(self.service_key.expose_secret())
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to request signed upload for {}: {}", path, e);
                anyhow::anyhow!("Storage request failed: {}", e)
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let err: StorageErrorResponse = response.json().await.unwrap_or(StorageErrorResponse {
                message: String::new(),
            });
            anyhow::bail!(
                "Failed to create signed upload URL ({}): {}",
                status,
                err.message
            );
        }

        let signed: SignedUploadResponse = response
            .json()
            .await
            .map_err(|e| anyhow::anyhow!("Invalid storage response: {}", e))?;

        Ok(signed.token)
    }

    /// Request a time-limited signed download URL for an object path.
    pub async fn create_signed_url(&self, path: &str, expires_in_secs: i64) -> Result<String> {
        let url = format!("{}/object/sign/{}/{}", self.endpoint, self.bucket, path);

        let response = self
            .http
            .post(&url)
            .bearer_auth(self.service_key.expose_secret())
            .json(&json!({ "expiresIn": expires_in_secs }))
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to request signed URL for {}: {}", path, e);
                anyhow::anyhow!("Storage request failed: {}", e)
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let err: StorageErrorResponse = response.json().await.unwrap_or(StorageErrorResponse {
                message: String::new(),
            });
            anyhow::bail!("Failed to sign download URL ({}): {}", status, err.message);
        }

        let signed: SignedUrlResponse = response
            .json()
            .await
            .map_err(|e| anyhow::anyhow!("Invalid storage response: {}", e))?;

        Ok(signed.signed_url)
    }
}

/// Build a collision-resistant object path for an upload, namespaced by
/// client and timestamped: `clients/<client_id>/<millis>_<sanitized name>`.
pub fn build_object_path(client_id: Uuid, filename: &str) -> String {
    let ts = Utc::now().timestamp_millis();
    format!("clients/{}/{}_{}", client_id, ts, sanitize_filename(filename))
}

/// Restrict a filename to a safe character set; anything outside
/// `[A-Za-z0-9._-]` becomes an underscore.
pub fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_keeps_safe_characters() {
        assert_eq!(
            sanitize_filename("Bank_Statement-2026.01.csv"),
            "Bank_Statement-2026.01.csv"
        );
    }

    #[test]
    fn sanitize_replaces_unsafe_characters() {
        assert_eq!(
            sanitize_filename("april report (final) ₹.xlsx"),
            "april_report__final___.xlsx"
        );
    }

    #[test]
    fn object_path_is_namespaced_by_client() {
        let client_id = Uuid::new_v4();
        let path = build_object_path(client_id, "statement.csv");

        assert!(path.starts_with(&format!("clients/{}/", client_id)));
        assert!(path.ends_with("_statement.csv"));
    }
}
