//! Client for the external AI classification service.
//!
//! The trigger is fire-and-forget: the upload already succeeded by the time
//! this runs, so failures here are logged and counted but never surfaced to
//! the uploader. Results come back later through the signed webhook.

use crate::config::ClassifierConfig;
use crate::services::metrics::CLASSIFIER_TRIGGERS_TOTAL;
use anyhow::Result;
use reqwest::Client;
use serde::Serialize;
use uuid::Uuid;

pub struct ClassifierClient {
    http: Client,
    url: Option<String>,
}

/// Payload posted to the classifier after a finalized upload.
#[derive(Debug, Clone, Serialize)]
pub struct ClassificationRequest {
    pub client_id: Uuid,
    pub signed_url: String,
    pub file_id: Uuid,
    pub accountant_id: Uuid,
}

impl ClassifierClient {
    pub fn new(config: &ClassifierConfig) -> Self {
        Self {
            http: Client::new(),
            url: config.url.clone(),
        }
    }

    /// Notify the classifier about a newly uploaded file. The response body
    /// is ignored; only the status is checked for logging.
    pub async fn notify(&self, request: &ClassificationRequest) -> Result<()> {
        let Some(url) = self.url.as_deref() else {
            tracing::warn!(
                file_id = %request.file_id,
                "CLASSIFIER_URL not configured; skipping classification trigger"
            );
            CLASSIFIER_TRIGGERS_TOTAL
                .with_label_values(&["skipped"])
                .inc();
            return Ok(());
        };

        let response = self
            .http
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Classifier request failed: {}", e))?;

        if !response.status().is_success() {
            anyhow::bail!("Classifier responded with status {}", response.status());
        }

        tracing::info!(
            file_id = %request.file_id,
            client_id = %request.client_id,
            "Classification triggered"
        );
        CLASSIFIER_TRIGGERS_TOTAL.with_label_values(&["sent"]).inc();

        Ok(())
    }
}
