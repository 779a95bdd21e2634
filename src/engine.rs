// Recommendation engine: the immutable context every request runs against.
//
// The engine owns the corpus, the fitted vectorizer, and the corpus's
// projection into feature space. It is built once at startup (from a model
// bundle) and shared read-only; `recommend` is a pure function of the engine
// and the request, so concurrent calls need no locking.

use anyhow::{Context, Result};
use rand::seq::IndexedRandom;
use thiserror::Error;
use tracing::{debug, warn};

use crate::model::bundle::ModelBundle;
use crate::model::corpus::{unique_titles, CorpusEntry};
use crate::model::vectorizer::TfidfVectorizer;
use crate::mood::{augment, Mood};
use crate::ranking::select::{same_title, select, Recommendation};
use crate::ranking::similarity::{CorpusIndex, RankError};

/// Number of recommendations returned when the caller doesn't say.
pub const DEFAULT_TOP_N: usize = 5;

/// Which text stands in for the query song.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QuerySource {
    /// Use the song title itself as the query text.
    #[default]
    Title,
    /// Use the stored fingerprint of the first corpus entry with this title,
    /// falling back to the title when there's no such entry.
    Fingerprint,
}

/// One recommendation request.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub query_song: String,
    pub mood: Option<Mood>,
    pub top_n: usize,
    pub query_source: QuerySource,
}

impl Request {
    pub fn new(query_song: impl Into<String>) -> Self {
        Self {
            query_song: query_song.into(),
            mood: None,
            top_n: DEFAULT_TOP_N,
            query_source: QuerySource::Title,
        }
    }

    pub fn with_mood(mut self, mood: Option<Mood>) -> Self {
        self.mood = mood;
        self
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    pub fn with_query_source(mut self, query_source: QuerySource) -> Self {
        self.query_source = query_source;
        self
    }
}

/// What a successful request produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// At least one recommendation, best first.
    Found(Vec<Recommendation>),
    /// Nothing survived filtering. Not an error.
    NoneFound,
}

impl Outcome {
    fn from_vec(recommendations: Vec<Recommendation>) -> Self {
        if recommendations.is_empty() {
            Outcome::NoneFound
        } else {
            Outcome::Found(recommendations)
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Outcome::NoneFound)
    }

    /// The recommendations, empty for `NoneFound`.
    pub fn into_vec(self) -> Vec<Recommendation> {
        match self {
            Outcome::Found(recommendations) => recommendations,
            Outcome::NoneFound => Vec::new(),
        }
    }
}

/// The single failure signal a caller can see from `recommend`.
#[derive(Debug, Error, PartialEq)]
pub enum RecommendError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("recommendation computation failed: {0}")]
    Computation(String),
}

impl From<RankError> for RecommendError {
    fn from(err: RankError) -> Self {
        RecommendError::Computation(err.to_string())
    }
}

/// Corpus + vectorizer + cached corpus projection.
#[derive(Debug, Clone)]
pub struct RecommendationEngine {
    corpus: Vec<CorpusEntry>,
    vectorizer: TfidfVectorizer,
    index: CorpusIndex,
}

impl RecommendationEngine {
    /// Validate the vectorizer and precompute the corpus projection.
    ///
    /// Failure here means the model can't serve requests at all.
    pub fn new(corpus: Vec<CorpusEntry>, vectorizer: TfidfVectorizer) -> Result<Self> {
        vectorizer
            .validate()
            .context("Vectorizer is not usable for recommendations")?;
        let index = CorpusIndex::build(&corpus, &vectorizer);
        Ok(Self {
            corpus,
            vectorizer,
            index,
        })
    }

    pub fn from_bundle(bundle: ModelBundle) -> Result<Self> {
        Self::new(bundle.corpus, bundle.vectorizer)
    }

    pub fn corpus(&self) -> &[CorpusEntry] {
        &self.corpus
    }

    pub fn vectorizer(&self) -> &TfidfVectorizer {
        &self.vectorizer
    }

    /// Sorted, unique titles available to pick from.
    pub fn song_titles(&self) -> Vec<&str> {
        unique_titles(&self.corpus)
    }

    /// A uniformly random title, or `None` for an empty corpus.
    pub fn random_song(&self) -> Option<&str> {
        self.song_titles().choose(&mut rand::rng()).copied()
    }

    /// Recommend songs similar to the request's query song.
    ///
    /// Mood keywords are appended to the query text, the result is ranked by
    /// cosine similarity against every corpus fingerprint, and the top
    /// distinct titles (excluding the query song) are returned. When the
    /// query shares no vocabulary with the corpus, every score is zero and
    /// the result is the first `top_n` eligible titles in corpus order.
    pub fn recommend(&self, request: &Request) -> Result<Outcome, RecommendError> {
        if request.top_n == 0 {
            return Err(RecommendError::InvalidRequest(
                "top_n must be at least 1".to_string(),
            ));
        }

        if self.index.is_empty() {
            debug!(song = %request.query_song, "Corpus is empty; nothing to recommend");
            return Ok(Outcome::NoneFound);
        }

        let base_query = self.query_text(request);
        let augmented = augment(base_query, request.mood);

        let candidates = self
            .index
            .rank(&augmented, &self.corpus, &self.vectorizer)
            .inspect_err(|e| warn!(song = %request.query_song, error = %e, "Ranking failed"))?;

        let recommendations = select(candidates, &request.query_song, request.top_n);

        debug!(
            song = %request.query_song,
            mood = ?request.mood,
            returned = recommendations.len(),
            "Recommendation request complete"
        );

        Ok(Outcome::from_vec(recommendations))
    }

    fn query_text<'a>(&'a self, request: &'a Request) -> &'a str {
        match request.query_source {
            QuerySource::Title => &request.query_song,
            QuerySource::Fingerprint => {
                match self
                    .corpus
                    .iter()
                    .find(|e| same_title(&e.song, &request.query_song))
                {
                    Some(entry) => &entry.text,
                    None => {
                        debug!(
                            song = %request.query_song,
                            "No corpus entry for song; querying by title"
                        );
                        &request.query_song
                    }
                }
            }
        }
    }
}
