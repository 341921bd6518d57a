//! Classification webhook payload handling.
//!
//! Batches arrive as either a bare JSON array of events or an object with an
//! `events` array. Events are soft-validated individually: a bad event is
//! demoted to an entry in the `invalids` list instead of failing the batch.

use crate::models::NewTransaction;
use chrono::{DateTime, Utc};
use ledgerly_core::error::AppError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// One classification result event as delivered by the external AI service.
/// All fields are optional at the wire level; required fields are enforced
/// during mapping so each event can be rejected individually.
#[derive(Debug, Deserialize)]
pub struct ClassificationEvent {
    pub accountant_id: Option<Uuid>,
    pub client_id: Option<Uuid>,
    pub file_id: Option<Uuid>,
    pub category_id: Option<i32>,
    pub reason: Option<String>,
    pub confidence: Option<String>,
    pub tx_amount: Option<Decimal>,
    pub tx_narration: Option<String>,
    pub tx_timestamp: Option<DateTime<Utc>>,
}

/// A rejected event, reported back to the sender by index.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct InvalidEvent {
    pub index: usize,
    pub error: String,
}

/// Pull the event list out of a verified payload. Accepts a bare array or an
/// object carrying an `events` array; anything else is a validation error.
pub fn extract_events(payload: Value) -> Result<Vec<Value>, AppError> {
    match payload {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => match map.remove("events") {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(AppError::Validation(anyhow::anyhow!(
                "Expected an array payload or an object with an `events` array"
            ))),
        },
        _ => Err(AppError::Validation(anyhow::anyhow!(
            "Expected an array payload or an object with an `events` array"
        ))),
    }
}

/// Map raw events to insert rows, collecting per-event rejections.
///
/// The override fields (`updated_category_id`, `updated_by`) are never set
/// from webhook data; only the manual override path writes them.
pub fn map_events(events: Vec<Value>) -> (Vec<NewTransaction>, Vec<InvalidEvent>) {
    let mut rows = Vec::new();
    let mut invalids = Vec::new();

    for (index, value) in events.into_iter().enumerate() {
        let event: ClassificationEvent = match serde_json::from_value(value) {
            Ok(event) => event,
            Err(e) => {
                invalids.push(InvalidEvent {
                    index,
                    error: format!("malformed event: {}", e),
                });
                continue;
            }
        };

        let mut missing = Vec::new();
        if event.accountant_id.is_none() {
            missing.push("accountant_id");
        }
        if event.client_id.is_none() {
            missing.push("client_id");
        }
        if event.file_id.is_none() {
            missing.push("file_id");
        }

        if !missing.is_empty() {
            invalids.push(InvalidEvent {
                index,
                error: format!("missing {}", missing.join(", ")),
            });
            continue;
        }

        rows.push(NewTransaction {
            client_id: event.client_id.unwrap_or_default(),
            file_id: event.file_id.unwrap_or_default(),
            accountant_id: event.accountant_id.unwrap_or_default(),
            tx_amount: event.tx_amount,
            tx_narration: event.tx_narration,
            tx_timestamp: event.tx_timestamp,
            category_id_by_ai: event.category_id,
            reason: event.reason,
            confidence: event.confidence,
        });
    }

    (rows, invalids)
}
