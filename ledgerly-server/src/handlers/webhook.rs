use crate::services::ingest::{self, InvalidEvent};
use crate::services::metrics::{WEBHOOK_BATCHES_TOTAL, WEBHOOK_EVENTS_TOTAL};
use crate::startup::AppState;
use axum::{body::Bytes, extract::State, http::HeaderMap, Json};
use ledgerly_core::error::AppError;
use ledgerly_core::utils::signature::verify_signature;
use secrecy::ExposeSecret;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, instrument, warn};

#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub ok: bool,
    pub inserted: u64,
    pub invalids: Vec<InvalidEvent>,
}

/// Ingest a batch of classification results from the external AI service.
///
/// The HMAC is computed over the raw request bytes, so this handler takes the
/// body as `Bytes` and only parses JSON after the signature checks out.
#[instrument(skip_all)]
pub async fn classification_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookResponse>, AppError> {
    let secret = state.config.webhook.secret.as_ref().ok_or_else(|| {
        AppError::Configuration(anyhow::anyhow!("WEBHOOK_SECRET is not configured"))
    })?;

    let provided = headers
        .get("x-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Authentication(anyhow::anyhow!("Missing x-signature header")))?;

    if !verify_signature(secret.expose_secret(), &body, provided)? {
        WEBHOOK_BATCHES_TOTAL.with_label_values(&["rejected"]).inc();
        warn!("Webhook delivery rejected: signature mismatch");
        return Err(AppError::Authentication(anyhow::anyhow!(
            "Invalid signature"
        )));
    }

    let payload: Value = serde_json::from_slice(&body)
        .map_err(|e| AppError::Validation(anyhow::anyhow!("Invalid JSON: {}", e)))?;

    let events = ingest::extract_events(payload)?;
    let (rows, invalids) = ingest::map_events(events);

    if rows.is_empty() {
        WEBHOOK_BATCHES_TOTAL.with_label_values(&["rejected"]).inc();
        WEBHOOK_EVENTS_TOTAL
            .with_label_values(&["invalid"])
            .inc_by(invalids.len() as f64);
        return Err(AppError::Validation(anyhow::anyhow!(
            "No valid events in payload"
        )));
    }

    let inserted = state.db.insert_transactions(&rows).await?;

    WEBHOOK_BATCHES_TOTAL.with_label_values(&["accepted"]).inc();
    WEBHOOK_EVENTS_TOTAL
        .with_label_values(&["inserted"])
        .inc_by(inserted as f64);
    WEBHOOK_EVENTS_TOTAL
        .with_label_values(&["invalid"])
        .inc_by(invalids.len() as f64);

    info!(
        inserted,
        invalid = invalids.len(),
        "Classification batch ingested"
    );

    Ok(Json(WebhookResponse {
        ok: true,
        inserted,
        invalids,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn response_shape_carries_invalids_by_index() {
        let response = WebhookResponse {
            ok: true,
            inserted: 2,
            invalids: vec![InvalidEvent {
                index: 1,
                error: "missing client_id".to_string(),
            }],
        };

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(
            value,
            json!({
                "ok": true,
                "inserted": 2,
                "invalids": [{"index": 1, "error": "missing client_id"}]
            })
        );
    }
}
