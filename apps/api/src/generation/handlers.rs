//! Axum route handlers for the Generation API.

use axum::{extract::State, Json};
use chrono::{Local, Utc};
use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use crate::assets::ReferenceStatus;
use crate::errors::AppError;
use crate::gemini_client::ImagePayload;
use crate::generation::generator::{generate_page, GenerateRequest};
use crate::output::{data_uri, download_file_name, next_output_path, resolve_session, save_image};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub id: Uuid,
    pub mime_type: String,
    pub data: String,
    pub data_uri: String,
    pub file_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved_path: Option<String>,
    /// Set when `save` was requested but writing the file failed; the image
    /// is still returned.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub save_error: Option<String>,
    pub references: Vec<ReferenceStatus>,
    pub unmatched_characters: Vec<String>,
}

/// POST /api/v1/pages/generate
///
/// Validates the page, compiles the prompt, attaches whatever reference images
/// exist, and calls the generation endpoint. With `save: true` the image is
/// also written under OUTPUT_DIR; a failed save is reported in `save_error`
/// rather than discarding the generated image.
pub async fn handle_generate(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, AppError> {
    let page = generate_page(
        &state.gemini,
        state.assets.as_ref(),
        state.credentials.as_ref(),
        &request,
    )
    .await?;

    let file_name = download_file_name(&page.image, Utc::now());

    let (saved_path, save_error) = if request.save {
        match save_to_output_dir(&state, &page.image, &file_name).await {
            Ok(path) => (Some(path), None),
            Err(e) => {
                warn!("Page {}: generated image could not be saved: {:#}", page.id, e);
                (None, Some(format!("{e:#}")))
            }
        }
    } else {
        (None, None)
    };

    Ok(Json(GenerateResponse {
        id: page.id,
        data_uri: data_uri(&page.image),
        mime_type: page.image.mime_type,
        data: page.image.data,
        file_name,
        saved_path,
        save_error,
        references: page.references,
        unmatched_characters: page.unmatched_characters,
    }))
}

async fn save_to_output_dir(
    state: &AppState,
    image: &ImagePayload,
    file_name: &str,
) -> anyhow::Result<String> {
    let path = next_output_path(
        &state.config.output_dir,
        file_name,
        resolve_session(None).as_deref(),
        Local::now().date_naive(),
    )
    .await?;
    save_image(image, &path).await?;
    Ok(path.display().to_string())
}
