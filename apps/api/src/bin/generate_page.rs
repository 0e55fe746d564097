use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use manga_api::assets::store_for_base;
use manga_api::config::Config;
use manga_api::credentials::FileCredentialStore;
use manga_api::gemini_client::GeminiClient;
use manga_api::generation::generator::{generate_page, GenerateRequest};
use manga_api::output::{extension_for, next_output_path, resolve_session, save_image};
use manga_api::page::{compile, parse_page};

/// Generate one manga page image from a YAML page description.
///
///   generate-page pages/episode1.yaml --session-folder 3
#[derive(Parser, Debug)]
#[command(name = "generate-page")]
#[command(about = "Compile a YAML manga page into a prompt and render it with Gemini")]
struct Args {
    /// YAML page description
    yaml_path: PathBuf,

    /// Session folder under OUTPUT_DIR/YYYY-MM/DD (defaults to MANGA_SESSION_ID, then the next free number)
    #[arg(long)]
    session_folder: Option<String>,

    /// Root directory for generated pages
    #[arg(long, env = "OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Reference image directory or http(s) base URL
    #[arg(long, env = "ASSETS_BASE")]
    assets_base: Option<String>,

    /// Gemini API key (falls back to the credential store)
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Print the compiled prompt and exit without calling the API
    #[arg(long, default_value_t = false)]
    print_prompt: bool,
}

/// `<yaml stem>_generated.<ext>`
fn output_file_name(yaml_path: &Path, mime_type: &str) -> String {
    let stem = yaml_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("page");
    format!("{stem}_generated.{}", extension_for(mime_type))
}

/// Loads `.env` (or `env_file`) before parsing so clap's `env` fallbacks,
/// `GEMINI_API_KEY` included, see it too. Real environment variables win.
fn parse_args<I, T>(env_file: Option<&Path>, argv: I) -> Result<Args, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    match env_file {
        Some(path) => dotenvy::from_path(path).ok(),
        None => dotenvy::dotenv().ok().map(|_| ()),
    };
    Args::try_parse_from(argv)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = parse_args(None, std::env::args_os()).unwrap_or_else(|e| e.exit());
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("manga_api={}", &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let yaml = tokio::fs::read_to_string(&args.yaml_path)
        .await
        .with_context(|| format!("Failed to read {}", args.yaml_path.display()))?;

    if args.print_prompt {
        let page = parse_page(&yaml)?;
        println!("{}", compile(&page));
        return Ok(());
    }

    let gemini = GeminiClient::new(
        &config.gemini_api_base,
        &config.gemini_model,
        config.gemini_timeout,
    )?;
    let assets_base = args.assets_base.unwrap_or(config.assets_base);
    let assets = store_for_base(&assets_base, reqwest::Client::new());
    let credentials = FileCredentialStore::new(config.credentials_path);

    info!(
        "Generating {} with {} (references from {})",
        args.yaml_path.display(),
        gemini.model(),
        assets_base
    );

    let request = GenerateRequest {
        yaml,
        api_key: args.api_key,
        save: true,
    };
    let page = generate_page(&gemini, assets.as_ref(), &credentials, &request).await?;

    for reference in page.references.iter().filter(|r| !r.loaded) {
        eprintln!(
            "Missing reference image for {}: {}",
            reference.name,
            reference.reason.as_deref().unwrap_or("not found")
        );
    }

    let output_dir = args.output_dir.unwrap_or(config.output_dir);
    let path = next_output_path(
        &output_dir,
        &output_file_name(&args.yaml_path, &page.image.mime_type),
        resolve_session(args.session_folder).as_deref(),
        Local::now().date_naive(),
    )
    .await?;
    save_image(&page.image, &path).await?;

    eprintln!("Saved: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_file_name_uses_yaml_stem() {
        assert_eq!(
            output_file_name(Path::new("pages/ep1.yaml"), "image/png"),
            "ep1_generated.png"
        );
        assert_eq!(
            output_file_name(Path::new("ep2.yml"), "image/jpeg"),
            "ep2_generated.jpg"
        );
    }

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from([
            "generate-page",
            "page.yaml",
            "--session-folder",
            "7",
            "--print-prompt",
        ])
        .unwrap();
        assert_eq!(args.yaml_path, PathBuf::from("page.yaml"));
        assert_eq!(args.session_folder.as_deref(), Some("7"));
        assert!(args.print_prompt);
    }

    #[test]
    fn test_api_key_read_from_env_file() {
        if std::env::var_os("GEMINI_API_KEY").is_some() {
            // A real environment variable takes precedence over the file.
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let env_file = dir.path().join(".env");
        std::fs::write(&env_file, "GEMINI_API_KEY=from-dotenv\n").unwrap();

        let args = parse_args(Some(&env_file), ["generate-page", "page.yaml"]).unwrap();

        assert_eq!(args.api_key.as_deref(), Some("from-dotenv"));
    }
}
