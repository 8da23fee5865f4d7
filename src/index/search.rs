//! Brute-force cosine similarity search over the vector index

use serde::Serialize;
use std::cmp::Ordering;
use std::path::PathBuf;

use super::store::VectorIndex;
use crate::core::{SearchError, SearchResult};

/// Upper bound on results per query, whatever the client asks for
pub const MAX_LIMIT: usize = 1000;

/// Default similarity cut-off
pub const DEFAULT_THRESHOLD: f32 = 0.3;

/// Coarse relevance bucket for a similarity score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Relevance {
    High,
    Medium,
    Low,
}

impl Relevance {
    pub fn from_similarity(similarity: f32) -> Self {
        if similarity > 0.8 {
            Relevance::High
        } else if similarity > 0.6 {
            Relevance::Medium
        } else {
            Relevance::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Relevance::High => "high",
            Relevance::Medium => "medium",
            Relevance::Low => "low",
        }
    }
}

/// A ranked match
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub path: PathBuf,
    pub similarity: f32,
    pub relevance: Relevance,
}

/// Clamp a client-requested limit into `[1, MAX_LIMIT]`
pub fn clamp_limit(requested: i64) -> usize {
    requested.clamp(1, MAX_LIMIT as i64) as usize
}

/// Cosine similarity; zero when either vector has no magnitude
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(-1.0, 1.0)
}

/// Score every entry against `query`, keep those at or above `threshold`,
/// and return the best `limit` (already clamped by the caller or here).
///
/// Equal scores are ordered by path. Fails with [`SearchError::NotIndexed`]
/// when the index has never been built, so callers can tell "no index"
/// apart from "no matches".
pub fn search(
    index: &VectorIndex,
    query: &[f32],
    limit: usize,
    threshold: f32,
) -> SearchResult<Vec<SearchHit>> {
    if !index.is_built() {
        return Err(SearchError::NotIndexed);
    }
    if query.len() != index.dimension() {
        return Err(SearchError::DimensionMismatch {
            expected: index.dimension(),
            actual: query.len(),
        });
    }

    let mut hits: Vec<SearchHit> = index
        .entries()
        .filter_map(|entry| {
            let similarity = cosine_similarity(query, &entry.embedding);
            (similarity >= threshold).then(|| SearchHit {
                path: entry.path.clone(),
                similarity,
                relevance: Relevance::from_similarity(similarity),
            })
        })
        .collect();

    hits.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.path.cmp(&b.path))
    });
    hits.truncate(limit.clamp(1, MAX_LIMIT));

    Ok(hits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::embedding::{Embedder, HashEmbedder};
    use chrono::Utc;

    fn build(docs: &[(&str, &str)]) -> (VectorIndex, HashEmbedder) {
        let embedder = HashEmbedder::default();
        let mut index = VectorIndex::new(embedder.dimension());
        for (path, content) in docs {
            index
                .upsert(PathBuf::from(path), embedder.embed(content), content.to_string(), Utc::now())
                .unwrap();
        }
        (index, embedder)
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert!((cosine_similarity(&[1.0, 0.0], &[-2.0, 0.0]) + 1.0).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        // Unnormalized inputs
        assert!((cosine_similarity(&[3.0, 4.0], &[6.0, 8.0]) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_relevance_buckets() {
        assert_eq!(Relevance::from_similarity(0.95), Relevance::High);
        assert_eq!(Relevance::from_similarity(0.8), Relevance::Medium);
        assert_eq!(Relevance::from_similarity(0.61), Relevance::Medium);
        assert_eq!(Relevance::from_similarity(0.6), Relevance::Low);
        assert_eq!(Relevance::from_similarity(-0.2), Relevance::Low);
    }

    #[test]
    fn test_clamp_limit() {
        assert_eq!(clamp_limit(5000), MAX_LIMIT);
        assert_eq!(clamp_limit(0), 1);
        assert_eq!(clamp_limit(-7), 1);
        assert_eq!(clamp_limit(25), 25);
    }

    #[test]
    fn test_unbuilt_index_reports_not_indexed() {
        let index = VectorIndex::new(8);
        let err = search(&index, &[0.0; 8], 10, 0.3).unwrap_err();
        assert!(matches!(err, SearchError::NotIndexed));
    }

    #[test]
    fn test_ranks_best_match_first() {
        let (index, embedder) = build(&[
            ("a.js", "function add(a,b){return a+b}"),
            ("b.py", "def subtract(a,b): return a-b"),
        ]);
        let hits = search(&index, &embedder.embed("add two numbers"), 1, DEFAULT_THRESHOLD).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].path, PathBuf::from("a.js"));
    }

    #[test]
    fn test_threshold_monotonic() {
        let (index, embedder) = build(&[
            ("auth.rs", "fn login(user: &User, password: &str) -> Session"),
            ("db.rs", "fn open_database_connection(url: &str) -> Connection"),
            ("user.rs", "struct User { name: String, password_hash: String }"),
            ("readme.md", "Login flow for users with a password"),
        ]);
        let query = embedder.embed("user login password");

        let mut previous = usize::MAX;
        for step in 0..=10 {
            let threshold = step as f32 / 10.0;
            let count = search(&index, &query, MAX_LIMIT, threshold).unwrap().len();
            assert!(count <= previous, "threshold {threshold} grew results");
            previous = count;
        }
    }

    #[test]
    fn test_ties_ordered_by_path() {
        let (index, embedder) = build(&[
            ("z.rs", "parse config"),
            ("a.rs", "parse config"),
            ("m.rs", "parse config"),
        ]);
        let hits = search(&index, &embedder.embed("parse config"), 10, 0.0).unwrap();
        let paths: Vec<_> = hits.iter().map(|h| h.path.to_string_lossy().to_string()).collect();
        assert_eq!(paths, vec!["a.rs", "m.rs", "z.rs"]);
        assert!(hits.iter().all(|h| h.relevance == Relevance::High));
    }

    #[test]
    fn test_limit_is_clamped() {
        let docs: Vec<(String, String)> = (0..5)
            .map(|i| (format!("f{i}.rs"), "parse config file".to_string()))
            .collect();
        let refs: Vec<(&str, &str)> = docs.iter().map(|(p, c)| (p.as_str(), c.as_str())).collect();
        let (index, embedder) = build(&refs);
        let query = embedder.embed("parse config");

        assert_eq!(search(&index, &query, 0, 0.0).unwrap().len(), 1);
        assert_eq!(search(&index, &query, 5000, 0.0).unwrap().len(), 5);
    }

    #[test]
    fn test_no_matches_is_empty_success() {
        let (index, embedder) = build(&[("a.rs", "parse config")]);
        let hits = search(&index, &embedder.embed("zebra giraffe"), 10, 0.3).unwrap();
        assert!(hits.is_empty());
    }
}
