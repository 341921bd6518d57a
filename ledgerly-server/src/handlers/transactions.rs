use crate::middleware::AccountantId;
use crate::models::{CategoryPatch, TransactionWithNames};
use crate::services::summary::{self, FileSummary, TxnView};
use crate::startup::AppState;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use ledgerly_core::error::AppError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    #[default]
    CreatedDesc,
    CreatedAsc,
    CategoryAsc,
    CategoryDesc,
}

#[derive(Debug, Deserialize)]
pub struct ListTransactionsQuery {
    #[serde(default)]
    pub sort: SortMode,
}

/// One transaction in the review listing, with both category names and the
/// resolved effective fields.
#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    pub id: Uuid,
    pub client_id: Uuid,
    pub file_id: Uuid,
    pub tx_amount: Option<Decimal>,
    pub tx_narration: Option<String>,
    pub tx_timestamp: Option<DateTime<Utc>>,
    pub category_id_by_ai: Option<i32>,
    pub updated_category_id: Option<i32>,
    pub ai_category_name: Option<String>,
    pub updated_category_name: Option<String>,
    pub effective_category_id: Option<i32>,
    pub effective_category_name: Option<String>,
    pub reason: Option<String>,
    pub confidence: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<TransactionWithNames> for TransactionResponse {
    fn from(row: TransactionWithNames) -> Self {
        let effective_category_id = row.effective_category_id();
        let effective_category_name = row.effective_category_name().map(|s| s.to_string());
        Self {
            id: row.id,
            client_id: row.client_id,
            file_id: row.file_id,
            tx_amount: row.tx_amount,
            tx_narration: row.tx_narration,
            tx_timestamp: row.tx_timestamp,
            category_id_by_ai: row.category_id_by_ai,
            updated_category_id: row.updated_category_id,
            ai_category_name: row.ai_category_name,
            updated_category_name: row.updated_category_name,
            effective_category_id,
            effective_category_name,
            reason: row.reason,
            confidence: row.confidence,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApplyOverridesResponse {
    pub updated: Vec<Uuid>,
}

/// Sort listing rows. `sort_by` is stable, so ties keep the store's base
/// order (creation time, then id).
pub fn sort_transactions(rows: &mut [TransactionWithNames], mode: SortMode) {
    match mode {
        SortMode::CreatedAsc => rows.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        SortMode::CreatedDesc => rows.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortMode::CategoryAsc => rows.sort_by(|a, b| {
            a.effective_category_name()
                .unwrap_or("")
                .cmp(b.effective_category_name().unwrap_or(""))
        }),
        SortMode::CategoryDesc => rows.sort_by(|a, b| {
            b.effective_category_name()
                .unwrap_or("")
                .cmp(a.effective_category_name().unwrap_or(""))
        }),
    }
}

pub async fn list_transactions(
    State(state): State<AppState>,
    _accountant: AccountantId,
    Path((client_id, file_id)): Path<(Uuid, Uuid)>,
    Query(query): Query<ListTransactionsQuery>,
) -> Result<Json<Vec<TransactionResponse>>, AppError> {
    let mut rows = state
        .db
        .list_transactions_by_file(client_id, file_id)
        .await?;

    sort_transactions(&mut rows, query.sort);

    Ok(Json(rows.into_iter().map(TransactionResponse::from).collect()))
}

/// Apply accountant category overrides to transactions in one file.
///
/// Patches whose target row is outside the client/file scope fail
/// individually; the store reports every failure while leaving successful
/// patches in place.
pub async fn apply_overrides(
    State(state): State<AppState>,
    accountant: AccountantId,
    Path((client_id, file_id)): Path<(Uuid, Uuid)>,
    Json(patches): Json<Vec<CategoryPatch>>,
) -> Result<Json<ApplyOverridesResponse>, AppError> {
    if patches.is_empty() {
        return Ok(Json(ApplyOverridesResponse { updated: vec![] }));
    }

    let updated = state
        .db
        .apply_overrides(client_id, file_id, accountant.0, &patches)
        .await?;

    Ok(Json(ApplyOverridesResponse { updated }))
}

pub async fn transactions_summary(
    State(state): State<AppState>,
    _accountant: AccountantId,
    Path((client_id, file_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<FileSummary>, AppError> {
    let rows = state
        .db
        .list_transactions_by_file(client_id, file_id)
        .await?;

    let views: Vec<TxnView<'_>> = rows
        .iter()
        .map(|row| TxnView {
            category: row.effective_category_name(),
            amount: row.tx_amount,
        })
        .collect();

    Ok(Json(summary::summarize(&views)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn row(
        created_secs: i64,
        ai_name: Option<&str>,
        updated_name: Option<&str>,
    ) -> TransactionWithNames {
        let created = Utc.timestamp_opt(created_secs, 0).unwrap();
        TransactionWithNames {
            id: Uuid::new_v4(),
            client_id: Uuid::new_v4(),
            file_id: Uuid::new_v4(),
            accountant_id: Uuid::new_v4(),
            tx_amount: None,
            tx_narration: None,
            tx_timestamp: None,
            category_id_by_ai: None,
            updated_category_id: None,
            reason: None,
            confidence: None,
            created_at: created,
            updated_at: created,
            updated_by: None,
            ai_category_name: ai_name.map(|s| s.to_string()),
            updated_category_name: updated_name.map(|s| s.to_string()),
        }
    }

    #[test]
    fn sorts_by_creation_time() {
        let mut rows = vec![row(30, None, None), row(10, None, None), row(20, None, None)];

        sort_transactions(&mut rows, SortMode::CreatedAsc);
        let times: Vec<i64> = rows.iter().map(|r| r.created_at.timestamp()).collect();
        assert_eq!(times, vec![10, 20, 30]);

        sort_transactions(&mut rows, SortMode::CreatedDesc);
        let times: Vec<i64> = rows.iter().map(|r| r.created_at.timestamp()).collect();
        assert_eq!(times, vec![30, 20, 10]);
    }

    #[test]
    fn sorts_by_effective_category_name_with_override_precedence() {
        // AI says "Zz" but the override "Aa" must drive the sort position.
        let mut rows = vec![
            row(1, Some("Mm"), None),
            row(2, Some("Zz"), Some("Aa")),
        ];

        sort_transactions(&mut rows, SortMode::CategoryAsc);
        assert_eq!(rows[0].effective_category_name(), Some("Aa"));

        sort_transactions(&mut rows, SortMode::CategoryDesc);
        assert_eq!(rows[0].effective_category_name(), Some("Mm"));
    }

    #[test]
    fn category_sort_keeps_base_order_for_ties() {
        let first = row(10, Some("Same"), None);
        let second = row(20, Some("Same"), None);
        let first_id = first.id;
        let second_id = second.id;

        let mut rows = vec![first, second];
        sort_transactions(&mut rows, SortMode::CategoryAsc);

        assert_eq!(rows[0].id, first_id);
        assert_eq!(rows[1].id, second_id);
    }

    #[test]
    fn response_resolves_effective_fields() {
        let mut r = row(1, Some("Groceries"), None);
        r.category_id_by_ai = Some(4);

        let response = TransactionResponse::from(r);
        assert_eq!(response.effective_category_id, Some(4));
        assert_eq!(response.effective_category_name.as_deref(), Some("Groceries"));
    }
}
