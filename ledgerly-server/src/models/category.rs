use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A transaction category. Global, not tenant-scoped; names are unique by
/// convention only, duplicates are permitted at this layer.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub id: i32,
    pub name: String,
}
