//! Reference assets — per-character images that anchor visual identity.
//!
//! Each `CharacterIdentity` maps to `<KEY>_ORIGIN.png`, where KEY is the
//! upper-cased name with all whitespace removed. Loading is best-effort:
//! every character gets an explicit `Found` or `Missing` entry, failures are
//! logged at warn level, and nothing here aborts a generation.
//!
//! Stores are pluggable behind `AssetStore`: a local directory or an HTTP
//! base URL, chosen from `ASSETS_BASE` at startup.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;
use futures::future::join_all;
use reqwest::Client;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::gemini_client::{ImagePart, InlineImage, DEFAULT_MIME_TYPE};
use crate::models::page::CharacterIdentity;

const ASSET_SUFFIX: &str = "_ORIGIN.png";

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("asset not available (status {0})")]
    Status(u16),

    #[error("asset is empty")]
    Empty,
}

/// Raw bytes of an asset plus the media type the store reported, if any.
#[derive(Debug, Clone)]
pub struct AssetBytes {
    pub bytes: Bytes,
    pub content_type: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Store trait and backends
// ────────────────────────────────────────────────────────────────────────────

/// Read-only storage addressed by asset file name.
#[async_trait]
pub trait AssetStore: Send + Sync {
    async fn fetch(&self, file_name: &str) -> Result<AssetBytes, AssetError>;

    /// Human-readable location of `file_name`, for log lines.
    fn locate(&self, file_name: &str) -> String;
}

/// Assets on the local filesystem under `base_dir`.
pub struct FsAssetStore {
    base_dir: PathBuf,
}

impl FsAssetStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }
}

#[async_trait]
impl AssetStore for FsAssetStore {
    async fn fetch(&self, file_name: &str) -> Result<AssetBytes, AssetError> {
        let bytes = tokio::fs::read(self.base_dir.join(file_name)).await?;
        Ok(AssetBytes {
            bytes: Bytes::from(bytes),
            content_type: None,
        })
    }

    fn locate(&self, file_name: &str) -> String {
        self.base_dir.join(file_name).display().to_string()
    }
}

/// Assets served over HTTP under `base_url`.
pub struct HttpAssetStore {
    client: Client,
    base_url: String,
}

impl HttpAssetStore {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl AssetStore for HttpAssetStore {
    async fn fetch(&self, file_name: &str) -> Result<AssetBytes, AssetError> {
        let response = self.client.get(self.locate(file_name)).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AssetError::Status(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        Ok(AssetBytes {
            bytes: response.bytes().await?,
            content_type,
        })
    }

    fn locate(&self, file_name: &str) -> String {
        format!("{}/{}", self.base_url, file_name)
    }
}

/// `http(s)://` bases select the HTTP store; anything else is a directory.
pub fn store_for_base(base: &str, client: Client) -> Arc<dyn AssetStore> {
    if base.starts_with("http://") || base.starts_with("https://") {
        Arc::new(HttpAssetStore::new(client, base))
    } else {
        Arc::new(FsAssetStore::new(base))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Lookup results
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub enum AssetLookup {
    Found(ImagePart),
    Missing(String),
}

/// One entry per requested character, in request order.
#[derive(Debug, Clone, Default)]
pub struct ReferenceAssets {
    pub entries: Vec<(String, AssetLookup)>,
}

/// Serializable per-character outcome for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct ReferenceStatus {
    pub name: String,
    pub file_name: String,
    pub loaded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ReferenceAssets {
    /// Found images only, still in request order.
    pub fn found_parts(&self) -> Vec<ImagePart> {
        self.entries
            .iter()
            .filter_map(|(_, lookup)| match lookup {
                AssetLookup::Found(part) => Some(part.clone()),
                AssetLookup::Missing(_) => None,
            })
            .collect()
    }

    pub fn found_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|(_, lookup)| matches!(lookup, AssetLookup::Found(_)))
            .count()
    }

    pub fn statuses(&self) -> Vec<ReferenceStatus> {
        self.entries
            .iter()
            .map(|(name, lookup)| ReferenceStatus {
                name: name.clone(),
                file_name: asset_file_name(name),
                loaded: matches!(lookup, AssetLookup::Found(_)),
                reason: match lookup {
                    AssetLookup::Found(_) => None,
                    AssetLookup::Missing(reason) => Some(reason.clone()),
                },
            })
            .collect()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Loading
// ────────────────────────────────────────────────────────────────────────────

/// Characters that could leave the asset directory or alter an asset URL.
const UNSAFE_KEY_CHARS: &[char] = &['/', '\\', '.', '?', '#', '%'];

/// Upper-cased name with whitespace and path/URL separators removed.
pub fn asset_key(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace() && !UNSAFE_KEY_CHARS.contains(c))
        .flat_map(char::to_uppercase)
        .collect()
}

pub fn asset_file_name(name: &str) -> String {
    format!("{}{}", asset_key(name), ASSET_SUFFIX)
}

/// Fetches every character's reference image concurrently. Results come
/// back in input order regardless of completion order.
pub async fn load_reference_assets(
    store: &dyn AssetStore,
    characters: &[CharacterIdentity],
) -> ReferenceAssets {
    let lookups = join_all(
        characters
            .iter()
            .map(|character| load_one(store, &character.name)),
    )
    .await;

    ReferenceAssets {
        entries: characters
            .iter()
            .map(|c| c.name.clone())
            .zip(lookups)
            .collect(),
    }
}

async fn load_one(store: &dyn AssetStore, name: &str) -> AssetLookup {
    let file_name = asset_file_name(name);

    let fetched = store.fetch(&file_name).await.and_then(|asset| {
        if asset.bytes.is_empty() {
            Err(AssetError::Empty)
        } else {
            Ok(asset)
        }
    });

    match fetched {
        Ok(asset) => {
            debug!(
                "Loaded reference image for {}: {} bytes",
                name,
                asset.bytes.len()
            );
            AssetLookup::Found(InlineImage {
                mime_type: image_mime_type(asset.content_type.as_deref()),
                data: STANDARD.encode(&asset.bytes),
            })
        }
        Err(e) => {
            warn!(
                "Reference image for {} not loaded ({}): {}",
                name,
                store.locate(&file_name),
                e
            );
            AssetLookup::Missing(e.to_string())
        }
    }
}

/// Uses the reported type when it is an image type, else PNG.
fn image_mime_type(content_type: Option<&str>) -> String {
    content_type
        .and_then(|ct| ct.split(';').next())
        .map(str::trim)
        .filter(|ct| ct.starts_with("image/"))
        .unwrap_or(DEFAULT_MIME_TYPE)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn identity(name: &str) -> CharacterIdentity {
        CharacterIdentity {
            name: name.to_string(),
            base_prompt: None,
        }
    }

    #[test]
    fn test_asset_key_uppercases_and_strips_whitespace() {
        assert_eq!(asset_key("Claude Code"), "CLAUDECODE");
        assert_eq!(asset_key(" ten\t2 "), "TEN2");
        assert_eq!(asset_file_name("ten"), "TEN_ORIGIN.png");
    }

    #[test]
    fn test_asset_key_drops_path_and_url_separators() {
        assert_eq!(asset_key("../x"), "X");
        assert_eq!(asset_key("..\\ten"), "TEN");
        assert_eq!(asset_file_name("ten?v=1#frag"), "TENV=1FRAG_ORIGIN.png");
        assert_eq!(asset_file_name("a%2Fb"), "A2FB_ORIGIN.png");
    }

    #[tokio::test]
    async fn test_name_cannot_escape_asset_directory() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("characters");
        std::fs::create_dir_all(&base).unwrap();
        std::fs::write(dir.path().join("X_ORIGIN.png"), b"outside").unwrap();
        let store = FsAssetStore::new(&base);

        let assets = load_reference_assets(&store, &[identity("../x")]).await;

        assert!(assets.found_parts().is_empty());
        assert!(store.locate(&asset_file_name("../x")).starts_with(base.to_str().unwrap()));
    }

    #[test]
    fn test_image_mime_type() {
        assert_eq!(image_mime_type(None), "image/png");
        assert_eq!(image_mime_type(Some("image/jpeg")), "image/jpeg");
        assert_eq!(image_mime_type(Some("image/webp; charset=binary")), "image/webp");
        assert_eq!(image_mime_type(Some("text/html")), "image/png");
    }

    #[test]
    fn test_store_for_base_selects_backend() {
        let client = Client::new();
        let http = store_for_base("https://cdn.example.com/characters/", client.clone());
        assert_eq!(
            http.locate("TEN_ORIGIN.png"),
            "https://cdn.example.com/characters/TEN_ORIGIN.png"
        );
        let fs = store_for_base("public/characters", client);
        assert!(fs.locate("TEN_ORIGIN.png").ends_with("TEN_ORIGIN.png"));
    }

    #[tokio::test]
    async fn test_missing_asset_shortens_found_parts() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("TEN_ORIGIN.png"), b"png-bytes").unwrap();
        let store = FsAssetStore::new(dir.path());

        let assets = load_reference_assets(
            &store,
            &[identity("ten"), identity("Claude Code")],
        )
        .await;

        assert_eq!(assets.entries.len(), 2);
        assert!(matches!(assets.entries[1].1, AssetLookup::Missing(_)));

        let parts = assets.found_parts();
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].mime_type, "image/png");
        assert_eq!(parts[0].data, STANDARD.encode(b"png-bytes"));
        assert_eq!(assets.found_count(), 1);
    }

    #[tokio::test]
    async fn test_found_parts_keep_input_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("A_ORIGIN.png"), b"a").unwrap();
        std::fs::write(dir.path().join("B_ORIGIN.png"), b"b").unwrap();
        std::fs::write(dir.path().join("C_ORIGIN.png"), b"c").unwrap();
        let store = FsAssetStore::new(dir.path());

        let assets =
            load_reference_assets(&store, &[identity("c"), identity("a"), identity("b")]).await;

        let data: Vec<String> = assets.found_parts().into_iter().map(|p| p.data).collect();
        assert_eq!(
            data,
            vec![STANDARD.encode(b"c"), STANDARD.encode(b"a"), STANDARD.encode(b"b")]
        );
    }

    #[tokio::test]
    async fn test_empty_file_is_missing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("TEN_ORIGIN.png"), b"").unwrap();
        let store = FsAssetStore::new(dir.path());

        let assets = load_reference_assets(&store, &[identity("TEN")]).await;
        assert!(assets.found_parts().is_empty());

        let statuses = assets.statuses();
        assert!(!statuses[0].loaded);
        assert_eq!(statuses[0].reason.as_deref(), Some("asset is empty"));
    }

    #[tokio::test]
    async fn test_no_characters_yields_no_parts() {
        let store = FsAssetStore::new("does-not-exist");
        let assets = load_reference_assets(&store, &[]).await;
        assert!(assets.entries.is_empty());
    }

    #[tokio::test]
    async fn test_http_store_reads_content_type_and_skips_404() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/characters/TEN_ORIGIN.png");
                then.status(200)
                    .header("content-type", "image/jpeg")
                    .body("jpeg-bytes");
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/characters/CLAUDECODE_ORIGIN.png");
                then.status(404);
            })
            .await;

        let store = HttpAssetStore::new(Client::new(), &server.url("/characters/"));
        let assets =
            load_reference_assets(&store, &[identity("TEN"), identity("CLAUDECODE")]).await;

        let parts = assets.found_parts();
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].mime_type, "image/jpeg");
        assert_eq!(parts[0].data, STANDARD.encode(b"jpeg-bytes"));

        let statuses = assets.statuses();
        assert_eq!(statuses[1].file_name, "CLAUDECODE_ORIGIN.png");
        assert_eq!(
            statuses[1].reason.as_deref(),
            Some("asset not available (status 404)")
        );
    }
}
