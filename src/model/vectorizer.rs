// TF-IDF vectorizer: projects text into a fixed, sparse term-weighted
// feature space.
//
// The vocabulary and IDF weights are fitted once over the corpus when the
// model bundle is built, then frozen. Query terms that aren't in the
// vocabulary are dropped on transform (closed vocabulary).
//
// Weighting follows the usual smooth-IDF convention:
//
//   idf(t) = ln((1 + n) / (1 + df(t))) + 1
//
// and every transformed vector is L2-normalized, so cosine similarity between
// two non-zero vectors reduces to their dot product.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Shortest token the analyzer keeps. Single characters carry no signal.
const MIN_TOKEN_CHARS: usize = 2;

/// A sparse vector: (column, weight) pairs sorted by column, zeros omitted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    entries: Vec<(usize, f64)>,
}

impl SparseVector {
    /// Build a sparse vector from (column, weight) pairs in any order.
    /// Zero weights are dropped; duplicate columns are summed.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (usize, f64)>) -> Self {
        let mut merged: BTreeMap<usize, f64> = BTreeMap::new();
        for (col, weight) in pairs {
            *merged.entry(col).or_insert(0.0) += weight;
        }
        Self {
            entries: merged.into_iter().filter(|(_, w)| *w != 0.0).collect(),
        }
    }

    pub fn entries(&self) -> &[(usize, f64)] {
        &self.entries
    }

    pub fn is_zero(&self) -> bool {
        self.entries.is_empty()
    }

    /// Highest column index present, if any.
    pub fn max_column(&self) -> Option<usize> {
        self.entries.last().map(|(col, _)| *col)
    }

    pub fn norm(&self) -> f64 {
        self.entries.iter().map(|(_, w)| w * w).sum::<f64>().sqrt()
    }

    /// Dot product via a merge join over the sorted columns.
    pub fn dot(&self, other: &SparseVector) -> f64 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0;
        while i < self.entries.len() && j < other.entries.len() {
            let (col_a, w_a) = self.entries[i];
            let (col_b, w_b) = other.entries[j];
            match col_a.cmp(&col_b) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += w_a * w_b;
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }

    fn l2_normalized(mut self) -> Self {
        let norm = self.norm();
        if norm > 0.0 {
            for (_, w) in &mut self.entries {
                *w /= norm;
            }
        }
        self
    }
}

/// A fitted TF-IDF model: vocabulary (term → column) plus per-column IDF.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f64>,
}

impl TfidfVectorizer {
    /// Fit a vectorizer over a set of documents.
    ///
    /// Terms in `stop_words` never enter the vocabulary. Columns are assigned
    /// in lexicographic term order so the same corpus always yields the same
    /// feature space.
    pub fn fit<S: AsRef<str>>(documents: &[S], stop_words: &HashSet<String>) -> Self {
        let mut document_frequency: BTreeMap<String, usize> = BTreeMap::new();

        for doc in documents {
            let terms: BTreeSet<String> = analyze(doc.as_ref())
                .filter(|t| !stop_words.contains(t))
                .collect();
            for term in terms {
                *document_frequency.entry(term).or_insert(0) += 1;
            }
        }

        let n = documents.len() as f64;
        let mut vocabulary = BTreeMap::new();
        let mut idf = Vec::with_capacity(document_frequency.len());

        for (column, (term, df)) in document_frequency.into_iter().enumerate() {
            idf.push(((1.0 + n) / (1.0 + df as f64)).ln() + 1.0);
            vocabulary.insert(term, column);
        }

        debug!(
            documents = documents.len(),
            vocabulary = vocabulary.len(),
            "Fitted TF-IDF vectorizer"
        );

        Self { vocabulary, idf }
    }

    /// Check that every vocabulary column is in range and unique, and that
    /// every IDF weight is finite and positive.
    pub fn validate(&self) -> Result<()> {
        let dimension = self.idf.len();
        let mut seen = vec![false; dimension];

        for (term, &column) in &self.vocabulary {
            if column >= dimension {
                anyhow::bail!(
                    "Vocabulary term '{term}' maps to column {column}, but the IDF table has only {dimension} entries"
                );
            }
            if seen[column] {
                anyhow::bail!("Vocabulary column {column} is assigned to more than one term");
            }
            seen[column] = true;
        }

        if let Some((column, weight)) = self
            .idf
            .iter()
            .enumerate()
            .find(|(_, w)| !w.is_finite() || **w <= 0.0)
        {
            anyhow::bail!("IDF weight for column {column} is invalid: {weight}");
        }

        Ok(())
    }

    /// Project text into the fitted feature space. Out-of-vocabulary terms
    /// are ignored; text with no known terms maps to the zero vector.
    pub fn transform(&self, text: &str) -> SparseVector {
        let mut counts: HashMap<usize, f64> = HashMap::new();
        for term in analyze(text) {
            if let Some(&column) = self.vocabulary.get(&term) {
                *counts.entry(column).or_insert(0.0) += 1.0;
            }
        }

        SparseVector::from_pairs(
            counts
                .into_iter()
                .map(|(column, tf)| (column, tf * self.idf[column])),
        )
        .l2_normalized()
    }

    /// Number of columns in the feature space.
    pub fn dimension(&self) -> usize {
        self.idf.len()
    }

    pub fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }

    /// IDF weight of a term, or `None` if it's out of vocabulary.
    pub fn idf_of(&self, term: &str) -> Option<f64> {
        self.vocabulary.get(term).map(|&column| self.idf[column])
    }
}

/// Analyzer shared by fit and transform: lowercase, split into runs of
/// word characters (alphanumeric or underscore), drop one-character tokens.
fn analyze(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|token| token.chars().count() >= MIN_TOKEN_CHARS)
        .map(str::to_lowercase)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fit(docs: &[&str]) -> TfidfVectorizer {
        TfidfVectorizer::fit(docs, &HashSet::new())
    }

    #[test]
    fn test_vocabulary_is_sorted() {
        let v = fit(&["zebra apple", "mango"]);
        assert_eq!(v.vocabulary["apple"], 0);
        assert_eq!(v.vocabulary["mango"], 1);
        assert_eq!(v.vocabulary["zebra"], 2);
        assert_eq!(v.dimension(), 3);
    }

    #[test]
    fn test_smooth_idf_values() {
        // n = 3; "love" in 3 docs, "rain" in 1 doc
        let v = fit(&["love rain", "love", "love"]);
        let idf_love = v.idf_of("love").unwrap();
        let idf_rain = v.idf_of("rain").unwrap();
        assert!((idf_love - 1.0).abs() < 1e-12);
        assert!((idf_rain - ((4.0_f64 / 2.0).ln() + 1.0)).abs() < 1e-12);
        assert!(idf_rain > idf_love, "Rare terms should weigh more");
    }

    #[test]
    fn test_stop_words_excluded_from_vocabulary() {
        let stop: HashSet<String> = ["the".to_string()].into();
        let v = TfidfVectorizer::fit(&["the night", "the day"], &stop);
        assert!(v.idf_of("the").is_none());
        assert_eq!(v.vocabulary_len(), 2);
    }

    #[test]
    fn test_single_char_tokens_dropped() {
        let v = fit(&["a b cd"]);
        assert_eq!(v.vocabulary_len(), 1);
        assert!(v.idf_of("cd").is_some());
    }

    #[test]
    fn test_transform_is_unit_length() {
        let v = fit(&["happy upbeat love", "sad heartbreak rain"]);
        let vec = v.transform("happy happy love");
        assert!((vec.norm() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_transform_ignores_unknown_terms() {
        let v = fit(&["happy upbeat love"]);
        assert!(v.transform("spaceship quantum").is_zero());
        assert_eq!(v.transform("happy spaceship"), v.transform("happy"));
    }

    #[test]
    fn test_transform_empty_text() {
        let v = fit(&["happy"]);
        assert!(v.transform("").is_zero());
    }

    #[test]
    fn test_fit_no_documents() {
        let v = fit(&[]);
        assert_eq!(v.dimension(), 0);
        assert!(v.transform("anything").is_zero());
    }

    fn from_json(json: &str) -> TfidfVectorizer {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_validate_accepts_fitted() {
        assert!(fit(&["love rain", "rain sun"]).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range_column() {
        let v = from_json(r#"{"vocabulary":{"love":3},"idf":[1.0]}"#);
        assert!(v.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_duplicate_column() {
        let v = from_json(r#"{"vocabulary":{"love":0,"rain":0},"idf":[1.0]}"#);
        assert!(v.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_non_positive_idf() {
        let zero = from_json(r#"{"vocabulary":{"love":0},"idf":[0.0]}"#);
        assert!(zero.validate().is_err());
        let negative = from_json(r#"{"vocabulary":{"love":0},"idf":[-1.5]}"#);
        assert!(negative.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_non_finite_idf() {
        let mut v = fit(&["love"]);
        v.idf[0] = f64::NAN;
        assert!(v.validate().is_err());
    }

    #[test]
    fn test_sparse_dot_merges_columns() {
        let a = SparseVector::from_pairs([(0, 1.0), (2, 2.0), (5, 1.0)]);
        let b = SparseVector::from_pairs([(2, 3.0), (5, 4.0), (7, 1.0)]);
        assert!((a.dot(&b) - 10.0).abs() < 1e-12);
        assert_eq!(a.max_column(), Some(5));
    }

    #[test]
    fn test_sparse_from_pairs_sums_and_drops_zeros() {
        let v = SparseVector::from_pairs([(3, 1.0), (1, 0.0), (3, 2.0)]);
        assert_eq!(v.entries(), &[(3, 3.0)]);
    }
}
