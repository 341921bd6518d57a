use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// An uploaded statement file. Belongs to exactly one client and one
/// uploading accountant; immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct File {
    pub id: Uuid,
    pub client_id: Uuid,
    pub accountant_id: Uuid,
    pub name: String,
    pub storage_path: String,
    pub size: i64,
    pub uploaded_at: DateTime<Utc>,
}

/// Input for recording a finalized upload.
#[derive(Debug, Clone)]
pub struct NewFile {
    pub client_id: Uuid,
    pub accountant_id: Uuid,
    pub name: String,
    pub storage_path: String,
    pub size: i64,
}
