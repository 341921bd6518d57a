use crate::services::storage::build_object_path;
use crate::startup::AppState;
use axum::{extract::State, Json};
use ledgerly_core::error::AppError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedUploadRequest {
    pub client_id: Option<Uuid>,
    pub filename: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SignedUploadResponse {
    pub bucket: String,
    pub path: String,
    pub token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignDownloadRequest {
    pub path: String,
    #[serde(default = "default_expires_in")]
    pub expires_in: i64,
}

fn default_expires_in() -> i64 {
    300
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignDownloadResponse {
    pub signed_url: String,
}

/// Issue a time-limited upload credential for a client file.
pub async fn signed_upload(
    State(state): State<AppState>,
    Json(request): Json<SignedUploadRequest>,
) -> Result<Json<SignedUploadResponse>, AppError> {
    let (client_id, filename) = match (request.client_id, request.filename) {
        (Some(client_id), Some(filename)) if !filename.is_empty() => (client_id, filename),
        _ => {
            return Err(AppError::Validation(anyhow::anyhow!(
                "Missing clientId or filename"
            )))
        }
    };

    let path = build_object_path(client_id, &filename);

    let token = state
        .storage
        .create_signed_upload(&path)
        .await
        .map_err(AppError::Internal)?;

    Ok(Json(SignedUploadResponse {
        bucket: state.storage.bucket().to_string(),
        path,
        token,
    }))
}

/// Issue a time-limited download URL for an already-uploaded object.
pub async fn sign_download(
    State(state): State<AppState>,
    Json(request): Json<SignDownloadRequest>,
) -> Result<Json<SignDownloadResponse>, AppError> {
    if request.path.is_empty() {
        return Err(AppError::Validation(anyhow::anyhow!("Missing path")));
    }

    let signed_url = state
        .storage
        .create_signed_url(&request.path, request.expires_in)
        .await
        .map_err(AppError::Internal)?;

    Ok(Json(SignDownloadResponse { signed_url }))
}
