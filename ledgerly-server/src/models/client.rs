use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// An accountant-scoped client. Never hard-deleted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Client {
    pub id: Uuid,
    pub accountant_id: Uuid,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: String,
    pub phone_number: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a client.
#[derive(Debug, Clone)]
pub struct NewClient {
    pub accountant_id: Uuid,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: String,
    pub phone_number: Option<String>,
}

/// Partial update for a client; `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdateClient {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
}
