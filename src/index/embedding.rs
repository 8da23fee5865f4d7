//! Text embeddings
//!
//! The [`Embedder`] trait is the only thing the rest of the index sees, so a
//! model-backed implementation can replace [`HashEmbedder`] without touching
//! storage or search.

use std::collections::HashMap;

/// Dimensionality of the built-in embedder
pub const EMBEDDING_DIM: usize = 384;

/// Maps text to a fixed-length, L2-normalized vector.
///
/// Implementations must be deterministic: the same text always yields the
/// same vector, bit for bit.
pub trait Embedder: Send + Sync {
    fn dimension(&self) -> usize;

    fn embed(&self, text: &str) -> Vec<f32>;
}

/// Feature-hashing embedder over identifier-aware tokens.
///
/// Each token is hashed with FNV-1a into one of `dimension` buckets and
/// weighted by `1 + ln(tf)`. It captures lexical overlap only.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self { dimension: dimension.max(1) }
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(EMBEDDING_DIM)
    }
}

impl Embedder for HashEmbedder {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];

        let mut counts: HashMap<String, u32> = HashMap::new();
        for token in tokenize(text) {
            *counts.entry(token).or_insert(0) += 1;
        }

        if counts.is_empty() {
            let fallback = text.trim().to_lowercase();
            vector[bucket(&fallback, self.dimension)] = 1.0;
            return vector;
        }

        // Accumulate in a fixed order so float addition is reproducible
        let mut terms: Vec<(String, u32)> = counts.into_iter().collect();
        terms.sort_unstable_by(|a, b| a.0.cmp(&b.0));
        for (term, tf) in terms {
            vector[bucket(&term, self.dimension)] += 1.0 + (tf as f32).ln();
        }

        normalize(&mut vector);
        vector
    }
}

/// Common keywords and English filler that carry no meaning for search
const STOP_WORDS: &[&str] = &[
    "an", "and", "are", "as", "at", "be", "by", "const", "def", "else", "false", "fn", "for",
    "from", "function", "if", "import", "in", "is", "it", "let", "new", "none", "not", "null",
    "of", "on", "or", "pub", "return", "self", "that", "the", "this", "to", "true", "use",
    "var", "was", "with",
];

/// Split text into lowercase search tokens.
///
/// Splits on anything that is not alphanumeric, then on camelCase
/// boundaries. Tokens shorter than two characters, numbers and stop words
/// are dropped; a trailing plural `s` is folded.
pub fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();

    for word in text.split(|c: char| !c.is_alphanumeric()) {
        for part in split_camel_case(word) {
            let lower = part.to_lowercase();
            if lower.chars().count() < 2 || lower.chars().all(|c| c.is_numeric()) {
                continue;
            }
            if STOP_WORDS.contains(&lower.as_str()) {
                continue;
            }
            tokens.push(fold_plural(lower));
        }
    }

    tokens
}

fn split_camel_case(word: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut prev: Option<char> = None;

    for (idx, ch) in word.char_indices() {
        if let Some(p) = prev {
            if ch.is_uppercase() && (p.is_lowercase() || p.is_numeric()) {
                parts.push(&word[start..idx]);
                start = idx;
            }
        }
        prev = Some(ch);
    }
    if start < word.len() {
        parts.push(&word[start..]);
    }

    parts
}

fn fold_plural(token: String) -> String {
    if token.len() > 3 && token.ends_with('s') && !token.ends_with("ss") {
        token[..token.len() - 1].to_string()
    } else {
        token
    }
}

fn bucket(term: &str, dimension: usize) -> usize {
    (fnv1a_hash(term.as_bytes()) % dimension as u64) as usize
}

/// FNV-1a hash function, stable across platforms and releases
fn fnv1a_hash(data: &[u8]) -> u64 {
    const FNV_OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const FNV_PRIME: u64 = 0x100000001b3;

    let mut hash = FNV_OFFSET_BASIS;
    for byte in data {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Scale a vector to unit length in place. Zero vectors are left unchanged.
pub fn normalize(vector: &mut [f32]) {
    let norm = l2_norm(vector);
    if norm > 0.0 {
        for value in vector.iter_mut() {
            *value /= norm;
        }
    }
}

pub fn l2_norm(vector: &[f32]) -> f32 {
    vector.iter().map(|v| v * v).sum::<f32>().sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic() {
        let embedder = HashEmbedder::default();
        let text = "fn parse_config(path: &Path) -> Result<Config>";
        let a = embedder.embed(text);
        let b = embedder.embed(text);
        assert_eq!(a.len(), EMBEDDING_DIM);
        assert!(a.iter().zip(&b).all(|(x, y)| x.to_bits() == y.to_bits()));
    }

    #[test]
    fn test_unit_norm() {
        let embedder = HashEmbedder::default();
        let samples = [
            "",
            "   ",
            "a b c",
            "1234",
            "function add(a,b){return a+b}",
            "def subtract(a,b): return a-b",
            "The quick brown fox jumps over the lazy dog. The dog sleeps.",
        ];
        for sample in samples {
            let norm = l2_norm(&embedder.embed(sample));
            assert!((norm - 1.0).abs() < 1e-5, "{sample:?} has norm {norm}");
        }
    }

    #[test]
    fn test_tokenize_identifiers() {
        assert_eq!(tokenize("parseHttpRequest"), vec!["parse", "http", "request"]);
        assert_eq!(tokenize("read_file_lines"), vec!["read", "file", "line"]);
        assert_eq!(tokenize("function add(a,b){return a+b}"), vec!["add"]);
        assert_eq!(tokenize("add two numbers"), vec!["add", "two", "number"]);
        assert_eq!(tokenize("class 42 x"), vec!["class"]);
    }

    #[test]
    fn test_shared_terms_score_higher() {
        let embedder = HashEmbedder::default();
        let query = embedder.embed("add two numbers");
        let add = embedder.embed("function add(a,b){return a+b}");
        let sub = embedder.embed("def subtract(a,b): return a-b");

        let dot = |x: &[f32], y: &[f32]| x.iter().zip(y).map(|(a, b)| a * b).sum::<f32>();
        assert!(dot(&query, &add) > dot(&query, &sub));
        assert!(dot(&query, &add) > 0.3);
    }

    #[test]
    fn test_custom_dimension() {
        let embedder = HashEmbedder::new(16);
        assert_eq!(embedder.dimension(), 16);
        assert_eq!(embedder.embed("hello world").len(), 16);
    }
}
