//! Axum route handlers for page documents: validation, prompt preview, and
//! the bundled example.

use axum::Json;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::page::example::EXAMPLE_PAGE_YAML;
use crate::page::{compile, parse_page};

#[derive(Debug, Deserialize)]
pub struct PageRequest {
    pub yaml: String,
}

#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    pub valid: bool,
    pub panel_count: usize,
}

#[derive(Debug, Serialize)]
pub struct PromptResponse {
    pub prompt: String,
    pub panel_count: usize,
}

#[derive(Debug, Serialize)]
pub struct ExampleResponse {
    pub yaml: &'static str,
}

/// POST /api/v1/pages/validate
pub async fn handle_validate(
    Json(request): Json<PageRequest>,
) -> Result<Json<ValidateResponse>, AppError> {
    let page = parse_page(&request.yaml)?;
    Ok(Json(ValidateResponse {
        valid: true,
        panel_count: page.panels.len(),
    }))
}

/// POST /api/v1/pages/prompt
///
/// Returns the compiled prompt without calling the generation endpoint.
pub async fn handle_prompt(
    Json(request): Json<PageRequest>,
) -> Result<Json<PromptResponse>, AppError> {
    let page = parse_page(&request.yaml)?;
    Ok(Json(PromptResponse {
        prompt: compile(&page),
        panel_count: page.panels.len(),
    }))
}

/// GET /api/v1/pages/example
pub async fn handle_example() -> Json<ExampleResponse> {
    Json(ExampleResponse {
        yaml: EXAMPLE_PAGE_YAML,
    })
}
