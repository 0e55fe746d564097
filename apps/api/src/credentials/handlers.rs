use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SaveCredentialRequest {
    pub api_key: String,
}

/// Never echoes the key itself.
#[derive(Debug, Serialize)]
pub struct CredentialStatus {
    pub configured: bool,
}

/// GET /api/v1/credential
pub async fn handle_status(
    State(state): State<AppState>,
) -> Result<Json<CredentialStatus>, AppError> {
    let configured = state.credentials.load().await?.is_some();
    Ok(Json(CredentialStatus { configured }))
}

/// PUT /api/v1/credential
pub async fn handle_save(
    State(state): State<AppState>,
    Json(request): Json<SaveCredentialRequest>,
) -> Result<Json<CredentialStatus>, AppError> {
    state.credentials.save(&request.api_key).await?;
    Ok(Json(CredentialStatus { configured: true }))
}

/// DELETE /api/v1/credential
pub async fn handle_clear(
    State(state): State<AppState>,
) -> Result<Json<CredentialStatus>, AppError> {
    state.credentials.clear().await?;
    Ok(Json(CredentialStatus { configured: false }))
}
