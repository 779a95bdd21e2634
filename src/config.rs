use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::catalog::spotify::{DEFAULT_ACCOUNTS_URL, DEFAULT_API_URL};
use crate::engine::DEFAULT_TOP_N;

/// File name of the model bundle inside the data directory.
pub const MODEL_FILE_NAME: &str = "song_recommendation_model.json";

/// Default number of concurrent catalog lookups.
pub const DEFAULT_ENRICH_CONCURRENCY: usize = 4;

/// Returns the default model bundle path.
/// Uses the platform data directory: ~/.local/share/melodix/ on Linux.
pub fn default_model_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("melodix")
        .join(MODEL_FILE_NAME)
}

/// Central configuration loaded from environment variables.
///
/// All secrets come from env vars (never hardcoded). The .env file
/// is loaded automatically at startup via dotenvy.
pub struct Config {
    /// Path of the model bundle (MELODIX_MODEL_PATH)
    pub model_path: PathBuf,
    /// Spotify app credentials: optional. Without them, artwork and play
    /// links fall back to placeholders and search links.
    pub spotify_client_id: String,
    pub spotify_client_secret: String,
    pub spotify_api_url: String,
    pub spotify_accounts_url: String,
    /// Recommendations per request unless overridden on the command line
    pub top_n: usize,
    /// Maximum concurrent catalog lookups during enrichment
    pub enrich_concurrency: usize,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Everything has a default; only malformed numbers are errors.
    pub fn load() -> Result<Self> {
        let model_path = env::var("MELODIX_MODEL_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_model_path());

        Ok(Self {
            model_path,
            spotify_client_id: env::var("SPOTIFY_CLIENT_ID").unwrap_or_default(),
            spotify_client_secret: env::var("SPOTIFY_CLIENT_SECRET").unwrap_or_default(),
            spotify_api_url: env::var("SPOTIFY_API_URL")
                .unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            spotify_accounts_url: env::var("SPOTIFY_ACCOUNTS_URL")
                .unwrap_or_else(|_| DEFAULT_ACCOUNTS_URL.to_string()),
            top_n: positive_var("MELODIX_TOP_N", DEFAULT_TOP_N)?,
            enrich_concurrency: positive_var(
                "MELODIX_ENRICH_CONCURRENCY",
                DEFAULT_ENRICH_CONCURRENCY,
            )?,
        })
    }

    /// Whether both Spotify credentials are set.
    pub fn has_spotify(&self) -> bool {
        !self.spotify_client_id.is_empty() && !self.spotify_client_secret.is_empty()
    }

    /// Check that the model bundle exists.
    /// Call this before any command that serves recommendations.
    pub fn require_model(&self) -> Result<()> {
        if !self.model_path.exists() {
            anyhow::bail!(
                "Model bundle not found: {}\n\
                 Run `melodix build --input songs.json` to create it,\n\
                 or set MELODIX_MODEL_PATH to an existing bundle.",
                self.model_path.display()
            );
        }
        Ok(())
    }
}

/// Read a positive integer env var, using `default` when it's unset.
fn positive_var(name: &str, default: usize) -> Result<usize> {
    match env::var(name) {
        Ok(raw) => parse_positive(name, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_positive(name: &str, raw: &str) -> Result<usize> {
    let value: usize = raw
        .trim()
        .parse()
        .with_context(|| format!("{name} must be a positive integer, got '{raw}'"))?;
    if value == 0 {
        anyhow::bail!("{name} must be at least 1");
    }
    Ok(value)
}
