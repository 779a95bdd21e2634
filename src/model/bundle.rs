// Model bundle: the corpus and its fitted vectorizer, stored as one JSON
// document.
//
// `melodix build` produces the bundle from raw lyrics; every other command
// loads it once at startup. A bundle that can't be loaded or fails
// validation is a fatal startup error, never a per-request one.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stop_words::{get, LANGUAGE};
use tracing::info;

use super::corpus::{CorpusEntry, RawSong};
use super::vectorizer::TfidfVectorizer;
use crate::text::normalize;

/// Bundle format understood by this build.
pub const FORMAT_VERSION: u32 = 1;

/// Options for building a bundle from raw songs.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Keep only the first `limit` songs of the input.
    pub limit: Option<usize>,
    /// Drop English stop words from the vocabulary.
    pub remove_stop_words: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            limit: None,
            remove_stop_words: true,
        }
    }
}

/// The precomputed recommendation model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelBundle {
    pub format_version: u32,
    pub built_at: DateTime<Utc>,
    pub corpus: Vec<CorpusEntry>,
    pub vectorizer: TfidfVectorizer,
}

impl ModelBundle {
    /// Build a bundle from raw songs: normalize each song's text into its
    /// fingerprint, then fit the vectorizer over all fingerprints.
    pub fn build(songs: Vec<RawSong>, options: &BuildOptions) -> Self {
        let take = options.limit.unwrap_or(songs.len());

        let corpus: Vec<CorpusEntry> = songs
            .into_iter()
            .take(take)
            .map(|raw| CorpusEntry {
                text: normalize(&raw.text),
                song: raw.song,
                artist: raw.artist,
            })
            .collect();

        let stop_words: HashSet<String> = if options.remove_stop_words {
            get(LANGUAGE::English).into_iter().collect()
        } else {
            HashSet::new()
        };

        let fingerprints: Vec<&str> = corpus.iter().map(|e| e.text.as_str()).collect();
        let vectorizer = TfidfVectorizer::fit(&fingerprints, &stop_words);

        info!(
            songs = corpus.len(),
            vocabulary = vectorizer.vocabulary_len(),
            stop_words = options.remove_stop_words,
            "Built model bundle"
        );

        Self {
            format_version: FORMAT_VERSION,
            built_at: Utc::now(),
            corpus,
            vectorizer,
        }
    }

    /// Load and validate a bundle from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read model bundle {}", path.display()))?;
        let bundle = Self::from_json(&json)
            .with_context(|| format!("Invalid model bundle {}", path.display()))?;

        info!(
            path = %path.display(),
            songs = bundle.corpus.len(),
            vocabulary = bundle.vectorizer.vocabulary_len(),
            "Loaded model bundle"
        );

        Ok(bundle)
    }

    /// Parse and validate a bundle from its JSON form.
    pub fn from_json(json: &str) -> Result<Self> {
        let bundle: ModelBundle =
            serde_json::from_str(json).context("Failed to parse model bundle JSON")?;

        if bundle.format_version != FORMAT_VERSION {
            anyhow::bail!(
                "Unsupported model bundle format version {} (expected {})",
                bundle.format_version,
                FORMAT_VERSION
            );
        }
        bundle
            .vectorizer
            .validate()
            .context("Model bundle vectorizer failed validation")?;

        Ok(bundle)
    }

    /// Write the bundle to disk, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create directory {}", parent.display())
                })?;
            }
        }

        let json = serde_json::to_string(self).context("Failed to serialize model bundle")?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write model bundle {}", path.display()))?;

        info!(path = %path.display(), "Saved model bundle");
        Ok(())
    }
}

/// Read raw songs (a JSON array of `{song, artist, text}`) from disk.
pub fn load_raw_songs(path: &Path) -> Result<Vec<RawSong>> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read songs file {}", path.display()))?;
    serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse songs file {}", path.display()))
}
