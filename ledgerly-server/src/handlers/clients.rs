use crate::middleware::AccountantId;
use crate::models::{Client, NewClient, UpdateClient};
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
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateClientRequest {
    #[validate(length(min = 1, message = "first_name must not be blank"))]
    pub first_name: String,
    pub last_name: Option<String>,
    #[validate(email)]
    pub email: String,
    pub phone_number: Option<String>,
}

#[derive(Debug, Deserialize, Validate, Default)]
pub struct UpdateClientRequest {
    #[validate(length(min = 1, message = "first_name must not be blank"))]
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub phone_number: Option<String>,
}

pub async fn create_client(
    State(state): State<AppState>,
    accountant: AccountantId,
    Json(request): Json<CreateClientRequest>,
) -> Result<impl IntoResponse, AppError> {
    request.validate()?;

    let client = state
        .db
        .create_client(&NewClient {
            accountant_id: accountant.0,
            first_name: request.first_name,
            last_name: request.last_name,
            email: request.email,
            phone_number: request.phone_number,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(client)))
}

pub async fn list_clients(
    State(state): State<AppState>,
    accountant: AccountantId,
) -> Result<Json<Vec<Client>>, AppError> {
    let clients = state.db.list_clients(accountant.0).await?;
    Ok(Json(clients))
}

pub async fn get_client(
    State(state): State<AppState>,
    accountant: AccountantId,
    Path(client_id): Path<Uuid>,
) -> Result<Json<Client>, AppError> {
    let client = state
        .db
        .get_client(accountant.0, client_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Client {} not found", client_id)))?;

    Ok(Json(client))
}

pub async fn update_client(
    State(state): State<AppState>,
    accountant: AccountantId,
    Path(client_id): Path<Uuid>,
    Json(request): Json<UpdateClientRequest>,
) -> Result<Json<Client>, AppError> {
    request.validate()?;

    let client = state
        .db
        .update_client(
            accountant.0,
            client_id,
            &UpdateClient {
                first_name: request.first_name,
                last_name: request.last_name,
                email: request.email,
                phone_number: request.phone_number,
            },
        )
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Client {} not found", client_id)))?;

    Ok(Json(client))
}
