// Cosine similarity ranking over the corpus feature space.
//
// The corpus projection is computed once, when the index is built, and kept
// read-only for the life of the engine. Each request only projects its own
// query and takes one sparse dot product per corpus entry.

use thiserror::Error;
use tracing::debug;

use crate::model::corpus::CorpusEntry;
use crate::model::vectorizer::{SparseVector, TfidfVectorizer};
use crate::text::normalize;

/// A corpus entry scored against one query. Lives only for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate<'a> {
    /// Position in the corpus; the tie-break key.
    pub index: usize,
    pub song: &'a str,
    pub artist: &'a str,
    pub score: f64,
}

/// Failures inside vectorization or similarity computation.
#[derive(Debug, Error, PartialEq)]
pub enum RankError {
    #[error("corpus has {corpus} entries but the index holds {vectors} vectors")]
    LengthMismatch { corpus: usize, vectors: usize },

    #[error("vector for corpus entry {index} uses column {column}, outside the {dimension}-column feature space")]
    ColumnOutOfRange {
        index: usize,
        column: usize,
        dimension: usize,
    },

    #[error("similarity for corpus entry {index} is not a finite number")]
    NonFiniteScore { index: usize },
}

/// Cosine similarity between two sparse vectors.
///
/// Returns 0.0 when either vector is zero (the 0/0 case), so a query with no
/// known vocabulary ties every candidate at zero instead of failing.
pub fn cosine_similarity(a: &SparseVector, b: &SparseVector) -> f64 {
    let denom = a.norm() * b.norm();
    if denom < f64::EPSILON {
        0.0
    } else {
        (a.dot(b) / denom).clamp(-1.0, 1.0)
    }
}

/// The corpus projected into the vectorizer's feature space.
#[derive(Debug, Clone)]
pub struct CorpusIndex {
    vectors: Vec<SparseVector>,
}

impl CorpusIndex {
    /// Project every corpus fingerprint with the fitted vectorizer.
    pub fn build(corpus: &[CorpusEntry], vectorizer: &TfidfVectorizer) -> Self {
        let vectors: Vec<SparseVector> = corpus
            .iter()
            .map(|entry| vectorizer.transform(&entry.text))
            .collect();

        let empty = vectors.iter().filter(|v| v.is_zero()).count();
        debug!(
            entries = vectors.len(),
            empty_fingerprints = empty,
            "Projected corpus into feature space"
        );

        Self { vectors }
    }

    /// Wrap precomputed vectors.
    pub fn from_vectors(vectors: Vec<SparseVector>) -> Self {
        Self { vectors }
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Score every corpus entry against the (mood-augmented) query.
    ///
    /// The query is normalized the same way corpus fingerprints were, then
    /// projected with the frozen vectorizer. Candidates come back in corpus
    /// order, one per entry.
    pub fn rank<'a>(
        &self,
        augmented_query: &str,
        corpus: &'a [CorpusEntry],
        vectorizer: &TfidfVectorizer,
    ) -> Result<Vec<Candidate<'a>>, RankError> {
        if corpus.len() != self.len() {
            return Err(RankError::LengthMismatch {
                corpus: corpus.len(),
                vectors: self.len(),
            });
        }

        let dimension = vectorizer.dimension();
        for (index, vector) in self.vectors.iter().enumerate() {
            if let Some(column) = vector.max_column().filter(|&c| c >= dimension) {
                return Err(RankError::ColumnOutOfRange {
                    index,
                    column,
                    dimension,
                });
            }
        }

        let query = normalize(augmented_query);
        let query_vector = vectorizer.transform(&query);

        if query_vector.is_zero() {
            debug!(query = %query, "Query has no terms in the vocabulary; all scores are 0");
        }

        corpus
            .iter()
            .zip(&self.vectors)
            .enumerate()
            .map(|(index, (entry, vector))| {
                let score = cosine_similarity(&query_vector, vector);
                if !score.is_finite() {
                    return Err(RankError::NonFiniteScore { index });
                }
                Ok(Candidate {
                    index,
                    song: &entry.song,
                    artist: &entry.artist,
                    score,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn entry(song: &str, text: &str) -> CorpusEntry {
        CorpusEntry {
            song: song.to_string(),
            artist: "Artist".to_string(),
            text: text.to_string(),
        }
    }

    fn setup() -> (Vec<CorpusEntry>, TfidfVectorizer) {
        let corpus = vec![
            entry("Sunny", "happy upbeat love"),
            entry("Storm", "sad heartbreak rain"),
            entry("Party", "party dance night"),
        ];
        let texts: Vec<&str> = corpus.iter().map(|e| e.text.as_str()).collect();
        let vectorizer = TfidfVectorizer::fit(&texts, &HashSet::new());
        (corpus, vectorizer)
    }

    #[test]
    fn test_cosine_identical() {
        let a = SparseVector::from_pairs([(0, 1.0), (2, 3.0)]);
        assert!((cosine_similarity(&a, &a) - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_cosine_orthogonal() {
        let a = SparseVector::from_pairs([(0, 1.0)]);
        let b = SparseVector::from_pairs([(1, 1.0)]);
        assert!(cosine_similarity(&a, &b).abs() < 1e-10);
    }

    #[test]
    fn test_cosine_zero_vector_is_zero() {
        let zero = SparseVector::default();
        let b = SparseVector::from_pairs([(1, 1.0)]);
        assert_eq!(cosine_similarity(&zero, &b), 0.0);
        assert_eq!(cosine_similarity(&zero, &zero), 0.0);
    }

    #[test]
    fn test_cosine_opposite_is_negative_one() {
        let a = SparseVector::from_pairs([(0, 1.0)]);
        let b = SparseVector::from_pairs([(0, -2.0)]);
        assert!((cosine_similarity(&a, &b) + 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_rank_one_candidate_per_entry_in_corpus_order() {
        let (corpus, vectorizer) = setup();
        let index = CorpusIndex::build(&corpus, &vectorizer);
        let candidates = index.rank("happy love", &corpus, &vectorizer).unwrap();

        let indices: Vec<usize> = candidates.iter().map(|c| c.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert!(candidates[0].score > 0.5);
        assert_eq!(candidates[1].score, 0.0);
        assert_eq!(candidates[2].score, 0.0);
    }

    #[test]
    fn test_rank_normalizes_query() {
        let (corpus, vectorizer) = setup();
        let index = CorpusIndex::build(&corpus, &vectorizer);
        let candidates = index.rank("PARTIES, Dancing?", &corpus, &vectorizer).unwrap();
        // "parties" lemmatizes to "party"
        assert!(candidates[2].score > 0.0);
    }

    #[test]
    fn test_rank_unknown_vocabulary_scores_zero() {
        let (corpus, vectorizer) = setup();
        let index = CorpusIndex::build(&corpus, &vectorizer);
        let candidates = index.rank("spaceship quantum", &corpus, &vectorizer).unwrap();
        assert!(candidates.iter().all(|c| c.score == 0.0));
        assert_eq!(candidates.len(), 3);
    }

    #[test]
    fn test_index_len_tracks_corpus() {
        let (corpus, vectorizer) = setup();
        let index = CorpusIndex::build(&corpus, &vectorizer);
        assert_eq!(index.len(), 3);
        assert!(!index.is_empty());
        assert!(CorpusIndex::build(&[], &vectorizer).is_empty());
    }

    #[test]
    fn test_rank_length_mismatch() {
        let (corpus, vectorizer) = setup();
        let index = CorpusIndex::build(&corpus[..2], &vectorizer);
        let err = index.rank("happy", &corpus, &vectorizer).unwrap_err();
        assert_eq!(
            err,
            RankError::LengthMismatch {
                corpus: 3,
                vectors: 2
            }
        );
    }

    #[test]
    fn test_rank_column_out_of_range() {
        let (corpus, vectorizer) = setup();
        let dimension = vectorizer.dimension();
        let vectors = vec![
            SparseVector::from_pairs([(0, 1.0)]),
            SparseVector::from_pairs([(dimension + 10, 1.0)]),
            SparseVector::default(),
        ];
        let index = CorpusIndex::from_vectors(vectors);
        let err = index.rank("happy", &corpus, &vectorizer).unwrap_err();
        assert!(matches!(err, RankError::ColumnOutOfRange { index: 1, .. }));
    }

    #[test]
    fn test_rank_non_finite_score() {
        let (corpus, vectorizer) = setup();
        let mut vectors: Vec<SparseVector> = corpus
            .iter()
            .map(|e| vectorizer.transform(&e.text))
            .collect();
        vectors[0] = SparseVector::from_pairs([(vectorizer.dimension() - 1, f64::NAN)]);
        let index = CorpusIndex::from_vectors(vectors);
        let err = index.rank("happy", &corpus, &vectorizer).unwrap_err();
        assert_eq!(err, RankError::NonFiniteScore { index: 0 });
    }
}
