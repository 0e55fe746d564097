//! Page generation — orchestrates one request end to end.
//!
//! Flow: resolve credential → parse_page → compile → load_reference_assets →
//!       GeminiClient::generate → GeneratedPage.
//!
//! Everything is passed in explicitly; nothing is read from ambient state.
//! Validation failures (no credential, bad markup) return before any network
//! call. Missing reference images only reduce coverage.

use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::assets::{load_reference_assets, AssetStore, ReferenceStatus};
use crate::credentials::CredentialStore;
use crate::errors::AppError;
use crate::gemini_client::{GeminiClient, ImagePayload};
use crate::page::{compile, parse_page};

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// Request body for page generation.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateRequest {
    pub yaml: String,
    /// Overrides the stored credential for this request only.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Also write the image under OUTPUT_DIR.
    #[serde(default)]
    pub save: bool,
}

/// Result of a successful generation.
#[derive(Debug, Clone)]
pub struct GeneratedPage {
    pub id: Uuid,
    pub image: ImagePayload,
    pub prompt: String,
    pub references: Vec<ReferenceStatus>,
    /// Panel character names with no `character_infos` entry.
    pub unmatched_characters: Vec<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Generation pipeline
// ────────────────────────────────────────────────────────────────────────────

/// Explicit key if non-blank, else the stored key.
pub async fn resolve_credential(
    explicit: Option<&str>,
    store: &dyn CredentialStore,
) -> Result<String, AppError> {
    if let Some(key) = explicit.map(str::trim).filter(|k| !k.is_empty()) {
        return Ok(key.to_string());
    }

    store
        .load()
        .await?
        .ok_or_else(|| AppError::Validation("API key is not configured".to_string()))
}

/// Runs the full pipeline for one page.
///
/// Steps:
/// 1. resolve_credential() → key (Validation if absent)
/// 2. parse_page() → PageSpec (Validation if malformed)
/// 3. compile() → prompt
/// 4. load_reference_assets() → Found/Missing per character
/// 5. gemini.generate() → ImagePayload
pub async fn generate_page(
    gemini: &GeminiClient,
    assets: &dyn AssetStore,
    credentials: &dyn CredentialStore,
    request: &GenerateRequest,
) -> Result<GeneratedPage, AppError> {
    let id = Uuid::new_v4();

    // Step 1: Credential
    let credential = resolve_credential(request.api_key.as_deref(), credentials).await?;

    // Step 2: Markup
    let page = parse_page(&request.yaml)?;

    let unmatched_characters = page.unmatched_panel_characters();
    for name in &unmatched_characters {
        warn!(
            "Page {}: panel character {} has no character_infos entry; it will not get a reference image",
            id, name
        );
    }

    // Step 3: Prompt
    let prompt = compile(&page);
    info!(
        "Page {}: compiled prompt ({} chars, {} panels)",
        id,
        prompt.chars().count(),
        page.panels.len()
    );

    // Step 4: Reference images
    let references = load_reference_assets(assets, &page.characters).await;
    info!(
        "Page {}: loaded {}/{} reference images",
        id,
        references.found_count(),
        page.characters.len()
    );

    // Step 5: Generate
    let image = gemini
        .generate(&references.found_parts(), &prompt, &credential)
        .await?;

    Ok(GeneratedPage {
        id,
        image,
        prompt,
        references: references.statuses(),
        unmatched_characters,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
