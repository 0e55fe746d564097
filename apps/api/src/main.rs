use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use manga_api::assets::store_for_base;
use manga_api::config::Config;
use manga_api::credentials::FileCredentialStore;
use manga_api::gemini_client::GeminiClient;
use manga_api::routes::build_router;
use manga_api::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Manga API v{}", env!("CARGO_PKG_VERSION"));

    // Generation client
    let gemini = GeminiClient::new(
        &config.gemini_api_base,
        &config.gemini_model,
        config.gemini_timeout,
    )?;
    info!("Generation client initialized (model: {})", gemini.model());

    // Reference images
    let assets = store_for_base(&config.assets_base, reqwest::Client::new());
    info!("Reference images from {}", config.assets_base);

    // Credential store
    let credentials = Arc::new(FileCredentialStore::new(config.credentials_path.clone()));
    info!("Credential store at {}", config.credentials_path.display());

    let state = AppState {
        config: config.clone(),
        gemini,
        assets,
        credentials,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
