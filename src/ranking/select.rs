// Result selection: turns scored candidates into the final top-N list.
//
// Order by score (stable, so ties keep corpus order), drop the query song
// itself, keep only the first occurrence of each title, truncate.

use std::cmp::Ordering;
use std::collections::HashSet;

use serde::Serialize;

use super::similarity::Candidate;

/// One recommended song. Enrichment (artwork, links) is attached later by
/// the caller and isn't part of ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub song: String,
    pub artist: String,
    pub score: f64,
}

/// Pick the top `top_n` recommendations from a request's candidates.
///
/// - The query song never recommends itself (case-insensitive title match).
/// - Titles are unique in the result; when the same title appears under
///   several artists, the best-ranked one wins.
/// - Fewer than `top_n` survivors is fine: the result is never padded.
pub fn select(
    mut candidates: Vec<Candidate<'_>>,
    query_song: &str,
    top_n: usize,
) -> Vec<Recommendation> {
    candidates.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));

    let mut seen: HashSet<&str> = HashSet::new();

    candidates
        .into_iter()
        .filter(|c| !same_title(c.song, query_song))
        .filter(|c| seen.insert(c.song))
        .take(top_n)
        .map(|c| Recommendation {
            song: c.song.to_string(),
            artist: c.artist.to_string(),
            score: c.score,
        })
        .collect()
}

/// Case-insensitive title equality, Unicode-aware.
pub fn same_title(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cand<'a>(index: usize, song: &'a str, artist: &'a str, score: f64) -> Candidate<'a> {
        Candidate {
            index,
            song,
            artist,
            score,
        }
    }

    fn songs(recs: &[Recommendation]) -> Vec<&str> {
        recs.iter().map(|r| r.song.as_str()).collect()
    }

    #[test]
    fn test_orders_by_score_descending() {
        let candidates = vec![
            cand(0, "A", "x", 0.1),
            cand(1, "B", "x", 0.9),
            cand(2, "C", "x", 0.5),
        ];
        assert_eq!(songs(&select(candidates, "Q", 5)), vec!["B", "C", "A"]);
    }

    #[test]
    fn test_ties_keep_corpus_order() {
        let candidates = vec![
            cand(0, "A", "x", 0.5),
            cand(1, "B", "x", 0.5),
            cand(2, "C", "x", 0.5),
        ];
        assert_eq!(songs(&select(candidates, "Q", 5)), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_excludes_query_song_case_insensitively() {
        let candidates = vec![
            cand(0, "Hello", "x", 1.0),
            cand(1, "HELLO", "y", 0.9),
            cand(2, "Other", "z", 0.1),
        ];
        assert_eq!(songs(&select(candidates, "hello", 5)), vec!["Other"]);
    }

    #[test]
    fn test_dedup_keeps_best_ranked_artist() {
        let candidates = vec![
            cand(0, "Angel", "Low", 0.2),
            cand(1, "Angel", "High", 0.8),
            cand(2, "Devil", "x", 0.5),
        ];
        let recs = select(candidates, "Q", 5);
        assert_eq!(songs(&recs), vec!["Angel", "Devil"]);
        assert_eq!(recs[0].artist, "High");
    }

    #[test]
    fn test_dedup_happens_before_truncation() {
        let candidates = vec![
            cand(0, "A", "x", 0.9),
            cand(1, "A", "y", 0.8),
            cand(2, "B", "z", 0.7),
        ];
        assert_eq!(songs(&select(candidates, "Q", 2)), vec!["A", "B"]);
    }

    #[test]
    fn test_truncates_to_top_n() {
        let candidates = (0..10)
            .map(|i| cand(i, ["A", "B", "C", "D", "E", "F", "G", "H", "I", "J"][i], "x", 0.5))
            .collect();
        assert_eq!(select(candidates, "Q", 3).len(), 3);
    }

    #[test]
    fn test_same_title_ignores_case() {
        assert!(same_title("Ça Ira", "ÇA IRA"));
        assert!(!same_title("Angel", "Angels"));
    }

    #[test]
    fn test_never_pads() {
        let candidates = vec![cand(0, "A", "x", 0.5)];
        assert_eq!(select(candidates, "Q", 5).len(), 1);
    }

    #[test]
    fn test_empty_when_everything_filtered() {
        let candidates = vec![cand(0, "Q", "x", 0.5), cand(1, "q", "y", 0.4)];
        assert!(select(candidates, "Q", 5).is_empty());
        assert!(select(Vec::new(), "Q", 5).is_empty());
    }
}
