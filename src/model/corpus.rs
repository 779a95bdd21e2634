// Corpus records: the fixed comparison set of songs.

use serde::{Deserialize, Serialize};

/// One song in the corpus with its precomputed textual fingerprint.
///
/// `text` is already normalized (lowercased, lemmatized) at build time.
/// Titles are not unique: the same song name can appear under several
/// artists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusEntry {
    pub song: String,
    pub artist: String,
    pub text: String,
}

/// A raw song record as fed to `melodix build`: lyrics or metadata that
/// haven't been normalized yet. Extra fields in the input (links, ids) are
/// ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct RawSong {
    pub song: String,
    pub artist: String,
    pub text: String,
}

/// Sorted, deduplicated song titles in the corpus.
pub fn unique_titles(corpus: &[CorpusEntry]) -> Vec<&str> {
    let mut titles: Vec<&str> = corpus.iter().map(|e| e.song.as_str()).collect();
    titles.sort_unstable();
    titles.dedup();
    titles
}
