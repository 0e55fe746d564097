use std::sync::Arc;

use crate::assets::AssetStore;
use crate::config::Config;
use crate::credentials::CredentialStore;
use crate::gemini_client::GeminiClient;

/// Shared application state injected into all route handlers via Axum extractors.
/// Everything here is read-only per request; the credential store serializes
/// its own file access.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub gemini: GeminiClient,
    /// Reference image source — local directory or HTTP base, picked from `ASSETS_BASE`.
    pub assets: Arc<dyn AssetStore>,
    pub credentials: Arc<dyn CredentialStore>,
}
