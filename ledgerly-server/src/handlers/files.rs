use crate::middleware::AccountantId;
use crate::models::{File, NewFile};
use crate::services::classifier::ClassificationRequest;
use crate::services::metrics::CLASSIFIER_TRIGGERS_TOTAL;
use crate::startup::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use ledgerly_core::error::AppError;
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct FinalizeUploadRequest {
    pub name: String,
    /// Object path returned by the signed-upload endpoint and used for the
    /// physical transfer.
    pub path: String,
    pub size: i64,
}

pub async fn list_files(
    State(state): State<AppState>,
    _accountant: AccountantId,
    Path(client_id): Path<Uuid>,
) -> Result<Json<Vec<File>>, AppError> {
    let files = state.db.list_files_by_client(client_id).await?;
    Ok(Json(files))
}

/// Record a completed upload and trigger classification.
///
/// The file row is the durable outcome; the signed-URL request and the
/// classifier notification run on a spawned task and are best-effort. A lost
/// trigger leaves the file without transactions until the batch is re-sent.
pub async fn finalize_upload(
    State(state): State<AppState>,
    accountant: AccountantId,
    Path(client_id): Path<Uuid>,
    Json(request): Json<FinalizeUploadRequest>,
) -> Result<impl IntoResponse, AppError> {
    if request.name.is_empty() || request.path.is_empty() {
        return Err(AppError::Validation(anyhow::anyhow!(
            "Missing file name or storage path"
        )));
    }

    let file = state
        .db
        .create_file(&NewFile {
            client_id,
            accountant_id: accountant.0,
            name: request.name,
            storage_path: request.path,
            size: request.size,
        })
        .await?;

    let storage = state.storage.clone();
    let classifier = state.classifier.clone();
    let download_ttl = state.config.storage.download_ttl_secs;
    let trigger = file.clone();

    tokio::spawn(async move {
        let signed_url = match storage
            .create_signed_url(&trigger.storage_path, download_ttl)
            .await
        {
            Ok(url) => url,
            Err(e) => {
                tracing::error!(
                    file_id = %trigger.id,
                    error = %e,
                    "Failed to sign download URL for classification trigger"
                );
                CLASSIFIER_TRIGGERS_TOTAL
                    .with_label_values(&["failed"])
                    .inc();
                return;
            }
        };

        if let Err(e) = classifier
            .notify(&ClassificationRequest {
                client_id: trigger.client_id,
                signed_url,
                file_id: trigger.id,
                accountant_id: trigger.accountant_id,
            })
            .await
        {
            tracing::error!(
                file_id = %trigger.id,
                error = %e,
                "Failed to notify classifier"
            );
            CLASSIFIER_TRIGGERS_TOTAL
                .with_label_values(&["failed"])
                .inc();
        }
    });

    Ok((StatusCode::CREATED, Json(file)))
}
