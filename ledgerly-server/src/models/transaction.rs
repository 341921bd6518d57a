use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A classified statement transaction joined with its AI-category and
/// override-category names. Both name lookups are independent and optional.
///
/// Rows are created only by the classification webhook (bulk insert) and
/// mutated only by the override path (`updated_category_id`, `updated_by`,
/// `updated_at`); never deleted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TransactionWithNames {
    pub id: Uuid,
    pub client_id: Uuid,
    pub file_id: Uuid,
    pub accountant_id: Uuid,
    pub tx_amount: Option<Decimal>,
    pub tx_narration: Option<String>,
    pub tx_timestamp: Option<DateTime<Utc>>,
    pub category_id_by_ai: Option<i32>,
    pub updated_category_id: Option<i32>,
    pub reason: Option<String>,
    pub confidence: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub updated_by: Option<Uuid>,
    pub ai_category_name: Option<String>,
    pub updated_category_name: Option<String>,
}

impl TransactionWithNames {
    /// The category used everywhere a transaction is displayed or
    /// aggregated: the accountant override wins over the AI assignment.
    pub fn effective_category_id(&self) -> Option<i32> {
        self.updated_category_id.or(self.category_id_by_ai)
    }

    pub fn effective_category_name(&self) -> Option<&str> {
        self.updated_category_name
            .as_deref()
            .or(self.ai_category_name.as_deref())
    }
}

/// A verified webhook event mapped to an insert row. The override fields are
/// never populated here; only the manual override path sets them.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub client_id: Uuid,
    pub file_id: Uuid,
    pub accountant_id: Uuid,
    pub tx_amount: Option<Decimal>,
    pub tx_narration: Option<String>,
    pub tx_timestamp: Option<DateTime<Utc>>,
    pub category_id_by_ai: Option<i32>,
    pub reason: Option<String>,
    pub confidence: Option<String>,
}

/// One accountant override for a single transaction.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryPatch {
    pub id: Uuid,
    pub updated_category_id: Option<i32>,
}
