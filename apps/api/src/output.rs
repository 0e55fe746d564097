//! Output helpers — turning a generated image into something displayable,
//! downloadable, or saved on disk.
//!
//! Saved pages land in `OUTPUT_DIR/YYYY-MM/DD/<session>/<file>`. A session
//! folder groups pages generated together; without an explicit session the
//! next free number in the day folder is used.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, NaiveDate, Utc};
use tracing::info;

use crate::gemini_client::ImagePayload;

/// Environment fallback for the session folder name.
pub const SESSION_ENV: &str = "MANGA_SESSION_ID";

/// `data:` URI that a browser can display directly.
pub fn data_uri(image: &ImagePayload) -> String {
    format!("data:{};base64,{}", image.mime_type, image.data)
}

pub fn extension_for(mime_type: &str) -> &'static str {
    match mime_type {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/webp" => "webp",
        "image/gif" => "gif",
        _ => "png",
    }
}

/// `manga_<unix millis>.<ext>`
pub fn download_file_name(image: &ImagePayload, now: DateTime<Utc>) -> String {
    format!(
        "manga_{}.{}",
        now.timestamp_millis(),
        extension_for(&image.mime_type)
    )
}

/// Explicit session, else `MANGA_SESSION_ID`, else None (auto-numbering).
pub fn resolve_session(explicit: Option<String>) -> Option<String> {
    explicit
        .or_else(|| std::env::var(SESSION_ENV).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Builds (and creates) the session folder for `date` and returns the path
/// of `file_name` inside it.
pub async fn next_output_path(
    output_dir: &Path,
    file_name: &str,
    session: Option<&str>,
    date: NaiveDate,
) -> Result<PathBuf> {
    let date_dir = output_dir
        .join(date.format("%Y-%m").to_string())
        .join(date.format("%d").to_string());

    let folder = match session {
        Some(session) => date_dir.join(session),
        None => date_dir.join(next_session_number(&date_dir).await?.to_string()),
    };

    tokio::fs::create_dir_all(&folder)
        .await
        .with_context(|| format!("Failed to create output folder {}", folder.display()))?;

    Ok(folder.join(file_name))
}

/// One past the largest all-digit directory name in `date_dir` (1 if none).
async fn next_session_number(date_dir: &Path) -> Result<u64> {
    let mut entries = match tokio::fs::read_dir(date_dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(1),
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read {}", date_dir.display()))
        }
    };

    let mut highest = 0u64;
    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_dir() {
            continue;
        }
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if !name.is_empty() && name.chars().all(|c| c.is_ascii_digit()) {
            if let Ok(n) = name.parse::<u64>() {
                highest = highest.max(n);
            }
        }
    }

    Ok(highest + 1)
}

/// Decodes the payload and writes the image bytes to `path`.
pub async fn save_image(image: &ImagePayload, path: &Path) -> Result<()> {
    let bytes = STANDARD
        .decode(image.data.as_bytes())
        .context("Generated image data is not valid base64")?;

    tokio::fs::write(path, &bytes)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;

    info!("Saved {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    use crate::gemini_client::InlineImage;

    fn image(mime_type: &str, data: &str) -> ImagePayload {
        InlineImage {
            mime_type: mime_type.to_string(),
            data: data.to_string(),
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, 2).unwrap()
    }

    #[test]
    fn test_data_uri() {
        assert_eq!(
            data_uri(&image("image/png", "QUJD")),
            "data:image/png;base64,QUJD"
        );
    }

    #[test]
    fn test_download_file_name_uses_millis_and_extension() {
        let now = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        assert_eq!(
            download_file_name(&image("image/png", ""), now),
            "manga_1700000000123.png"
        );
        assert_eq!(
            download_file_name(&image("image/jpeg", ""), now),
            "manga_1700000000123.jpg"
        );
    }

    #[test]
    fn test_resolve_session_prefers_explicit() {
        assert_eq!(resolve_session(Some(" 7 ".to_string())).as_deref(), Some("7"));
    }

    #[tokio::test]
    async fn test_first_session_is_one() {
        let dir = tempfile::tempdir().unwrap();
        let path = next_output_path(dir.path(), "page.png", None, date())
            .await
            .unwrap();
        assert_eq!(path, dir.path().join("2025-11").join("02").join("1").join("page.png"));
        assert!(path.parent().unwrap().is_dir());
    }

    #[tokio::test]
    async fn test_next_session_skips_past_highest_number() {
        let dir = tempfile::tempdir().unwrap();
        let day = dir.path().join("2025-11").join("02");
        std::fs::create_dir_all(day.join("1")).unwrap();
        std::fs::create_dir_all(day.join("4")).unwrap();
        std::fs::create_dir_all(day.join("notes")).unwrap();
        std::fs::write(day.join("9"), b"file, not a folder").unwrap();

        let path = next_output_path(dir.path(), "page.png", None, date())
            .await
            .unwrap();
        assert_eq!(path, day.join("5").join("page.png"));
    }

    #[tokio::test]
    async fn test_explicit_session_folder() {
        let dir = tempfile::tempdir().unwrap();
        let path = next_output_path(dir.path(), "page.png", Some("episode-3"), date())
            .await
            .unwrap();
        assert_eq!(
            path,
            dir.path().join("2025-11").join("02").join("episode-3").join("page.png")
        );
    }

    #[tokio::test]
    async fn test_save_image_writes_decoded_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        save_image(&image("image/png", "QUJD"), &path).await.unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"ABC");
    }

    #[tokio::test]
    async fn test_save_image_rejects_bad_base64() {
        let dir = tempfile::tempdir().unwrap();
        let err = save_image(&image("image/png", "not base64!"), &dir.path().join("x.png"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not valid base64"));
    }
}
