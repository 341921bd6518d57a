use crate::models::Category;
use crate::startup::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use ledgerly_core::error::AppError;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
}

pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<Category>>, AppError> {
    let categories = state.db.list_categories().await?;
    Ok(Json(categories))
}

/// Create a category ad hoc from the review UI. Names are trimmed; blank
/// names are rejected. Duplicate names are deliberately allowed.
pub async fn create_category(
    State(state): State<AppState>,
    Json(request): Json<CreateCategoryRequest>,
) -> Result<impl IntoResponse, AppError> {
    let name = normalized_name(&request.name).ok_or_else(|| {
        AppError::Validation(anyhow::anyhow!("Category name must not be blank"))
    })?;

    let category = state.db.create_category(name).await?;

    Ok((StatusCode::CREATED, Json(category)))
}

fn normalized_name(raw: &str) -> Option<&str> {
    let name = raw.trim();
    (!name.is_empty()).then_some(name)
}

#[cfg(test)]
mod tests {
    use super::normalized_name;

    #[test]
    fn blank_and_whitespace_names_are_rejected() {
        assert_eq!(normalized_name(""), None);
        assert_eq!(normalized_name("   "), None);
        assert_eq!(normalized_name("\t\n"), None);
    }

    #[test]
    fn names_are_trimmed_not_rewritten() {
        assert_eq!(normalized_name("  Food & Dining "), Some("Food & Dining"));
    }
}
