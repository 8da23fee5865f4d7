//! Codebase indexing and semantic search
//!
//! [`SemanticIndexer`] owns one [`VectorIndex`] plus the embedder that fills
//! it. Several indexers can live side by side, one per base directory.

pub mod context;
pub mod embedding;
pub mod search;
pub mod store;
pub mod walker;

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::config::{IndexConfig, SearchConfig};
use crate::core::{paths, SearchError, SearchResult};
use context::MatchContext;
use embedding::{Embedder, HashEmbedder};
use search::{Relevance, MAX_LIMIT};
use store::{IndexStatus, VectorIndex};
use walker::WalkOptions;

/// Outcome of a completed indexing run
#[derive(Debug, Clone)]
pub struct IndexReport {
    pub root: PathBuf,
    /// Files embedded and stored
    pub indexed: usize,
    /// Files discovered by the walk, including skipped ones
    pub total_files: usize,
    pub skipped: Vec<(PathBuf, String)>,
    pub limit_reached: bool,
    pub timestamp: DateTime<Utc>,
    pub time_taken_ms: u64,
}

/// An indexing run that stopped, with the progress made before it did
#[derive(Debug)]
pub struct IndexFailure {
    pub error: SearchError,
    pub indexed: usize,
}

impl From<SearchError> for IndexFailure {
    fn from(error: SearchError) -> Self {
        Self { error, indexed: 0 }
    }
}

/// One search result with its display context
#[derive(Debug, Clone)]
pub struct SearchMatch {
    pub path: PathBuf,
    pub similarity: f32,
    pub relevance: Relevance,
    pub context: MatchContext,
    pub preview: String,
}

pub struct SemanticIndexer {
    base_dir: PathBuf,
    embedder: Box<dyn Embedder>,
    index: VectorIndex,
    walk_options: WalkOptions,
    search_config: SearchConfig,
    root: Option<PathBuf>,
}

impl SemanticIndexer {
    /// Create an indexer confined to `base_dir` using the built-in embedder
    pub fn new(base_dir: PathBuf, index_config: &IndexConfig, search_config: SearchConfig) -> Self {
        Self::with_embedder(base_dir, index_config, search_config, Box::new(HashEmbedder::default()))
    }

    pub fn with_embedder(
        base_dir: PathBuf,
        index_config: &IndexConfig,
        search_config: SearchConfig,
        embedder: Box<dyn Embedder>,
    ) -> Self {
        let index = VectorIndex::new(embedder.dimension());
        Self {
            base_dir,
            embedder,
            index,
            walk_options: WalkOptions::from_config(index_config),
            search_config,
            root: None,
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Root of the most recent successful indexing run
    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    pub fn status(&self) -> IndexStatus {
        self.index.status()
    }

    pub fn index_codebase(&mut self, raw_root: &str, force: bool) -> Result<IndexReport, IndexFailure> {
        self.index_codebase_with(raw_root, force, |_| {})
    }

    /// Walk `raw_root` (resolved inside the base directory) and upsert every
    /// readable candidate file. `on_file` sees each discovered path.
    ///
    /// `force` clears the index first. Without it, entries are replaced in
    /// place and entries for files that vanished from disk stay behind.
    pub fn index_codebase_with<F>(
        &mut self,
        raw_root: &str,
        force: bool,
        mut on_file: F,
    ) -> Result<IndexReport, IndexFailure>
    where
        F: FnMut(&Path),
    {
        let start_time = Instant::now();

        let root = paths::validate(raw_root, &self.base_dir).map_err(|e| {
            warn!("{}", e);
            e
        })?;
        if !root.is_dir() {
            return Err(SearchError::RootNotFound(root).into());
        }

        info!("Indexing {} (force: {})", root.display(), force);
        if force {
            self.index.clear();
        }

        let mut walk = walker::walk(&root, self.walk_options.clone());
        let mut indexed = 0;
        let mut total_files = 0;
        let mut skipped = Vec::new();

        for file in walk.by_ref() {
            total_files += 1;
            on_file(&file.path);

            if file.oversized {
                let reason = format!(
                    "{} bytes exceeds the {} byte limit",
                    file.size, self.walk_options.max_file_size
                );
                self.skip(file.path, reason, &mut skipped);
                continue;
            }

            // Stray non-UTF-8 bytes become U+FFFD rather than dropping the file
            let content = match std::fs::read(&file.path) {
                Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
                Err(e) => {
                    self.skip(file.path, e.to_string(), &mut skipped);
                    continue;
                }
            };

            let embedding = self.embedder.embed(&content);
            self.index
                .upsert(file.path.clone(), embedding, content, Utc::now())
                .map_err(|error| IndexFailure { error, indexed })?;
            debug!("Indexed {}", file.path.display());
            indexed += 1;
        }

        let limit_reached = walk.limit_reached();
        self.root = Some(root.clone());

        let report = IndexReport {
            root,
            indexed,
            total_files,
            skipped,
            limit_reached,
            timestamp: Utc::now(),
            time_taken_ms: start_time.elapsed().as_millis() as u64,
        };
        info!(
            "Indexed {} of {} files in {}ms",
            report.indexed, report.total_files, report.time_taken_ms
        );

        Ok(report)
    }

    /// Record a file the run could not embed and drop any stale entry for it
    fn skip(&mut self, path: PathBuf, reason: String, skipped: &mut Vec<(PathBuf, String)>) {
        let err = SearchError::FileRead { path: path.clone(), reason: reason.clone() };
        warn!("{}", err);
        if self.index.remove(&path).is_some() {
            debug!("Dropped stale entry for {}", path.display());
        }
        skipped.push((path, reason));
    }

    /// Rank indexed files against `query`.
    ///
    /// `limit` is clamped to `[1, MAX_LIMIT]`; missing values fall back to
    /// the configured defaults.
    pub fn semantic_search(
        &self,
        query: &str,
        limit: Option<i64>,
        threshold: Option<f32>,
    ) -> SearchResult<Vec<SearchMatch>> {
        if query.trim().is_empty() {
            return Err(SearchError::MalformedRequest("query must not be empty".to_string()));
        }
        let threshold = threshold.unwrap_or(self.search_config.default_threshold);
        if !threshold.is_finite() {
            return Err(SearchError::MalformedRequest("threshold must be a finite number".to_string()));
        }
        let limit = match limit {
            Some(requested) => search::clamp_limit(requested),
            None => self.search_config.default_limit.clamp(1, MAX_LIMIT),
        };

        let query_embedding = self.embedder.embed(query);
        let hits = search::search(&self.index, &query_embedding, limit, threshold)?;
        debug!("Query {:?} matched {} files", query, hits.len());

        let matches = hits
            .into_iter()
            .filter_map(|hit| {
                let entry = self.index.get(&hit.path)?;
                Some(SearchMatch {
                    context: context::extract_context(&entry.content, query),
                    preview: context::preview(&entry.content, self.search_config.preview_chars),
                    path: hit.path,
                    similarity: hit.similarity,
                    relevance: hit.relevance,
                })
            })
            .collect();

        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn indexer(base: &Path) -> SemanticIndexer {
        SemanticIndexer::new(base.to_path_buf(), &IndexConfig::default(), SearchConfig::default())
    }

    fn scratch() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().canonicalize().unwrap();
        (dir, base)
    }

    #[test]
    fn test_index_then_search() {
        let (_dir, base) = scratch();
        fs::write(base.join("a.js"), "function add(a,b){return a+b}").unwrap();
        fs::write(base.join("b.py"), "def subtract(a,b): return a-b").unwrap();

        let mut indexer = indexer(&base);
        let report = indexer.index_codebase(".", false).unwrap();
        assert_eq!(report.indexed, 2);
        assert_eq!(report.total_files, 2);

        let matches = indexer.semantic_search("add two numbers", Some(1), None).unwrap();
        assert_eq!(matches.len(), 1);
        assert!(matches[0].path.ends_with("a.js"));
        assert_eq!(matches[0].context.lines[0].line_number, 1);
        assert_eq!(matches[0].preview, "function add(a,b){return a+b}");
    }

    #[test]
    fn test_search_before_index() {
        let (_dir, base) = scratch();
        let indexer = indexer(&base);
        let err = indexer.semantic_search("anything", None, None).unwrap_err();
        assert!(matches!(err, SearchError::NotIndexed));
    }

    #[test]
    fn test_blank_query_rejected() {
        let (_dir, base) = scratch();
        let indexer = indexer(&base);
        let err = indexer.semantic_search("  ", None, None).unwrap_err();
        assert!(matches!(err, SearchError::MalformedRequest(_)));
        let err = indexer.semantic_search("x", None, Some(f32::NAN)).unwrap_err();
        assert!(matches!(err, SearchError::MalformedRequest(_)));
    }

    #[test]
    fn test_traversal_rejected_without_side_effects() {
        let (_dir, base) = scratch();
        let mut indexer = indexer(&base);
        let failure = indexer.index_codebase("../../", false).unwrap_err();
        assert!(matches!(failure.error, SearchError::AccessDenied { .. }));
        assert_eq!(failure.indexed, 0);
        assert!(!indexer.status().indexed);
        assert!(indexer.root().is_none());
    }

    #[test]
    fn test_missing_root() {
        let (_dir, base) = scratch();
        let mut indexer = indexer(&base);
        let failure = indexer.index_codebase("does-not-exist", false).unwrap_err();
        assert!(matches!(failure.error, SearchError::RootNotFound(_)));
    }

    #[test]
    fn test_oversized_file_counted_not_indexed() {
        let (_dir, base) = scratch();
        fs::write(base.join("small.js"), "const x = 1;").unwrap();
        fs::write(base.join("huge.js"), vec![b'a'; 2 * 1024 * 1024]).unwrap();

        let mut config = IndexConfig::default();
        config.max_file_size_mb = 1;
        let mut indexer = SemanticIndexer::new(base.clone(), &config, SearchConfig::default());

        let report = indexer.index_codebase(".", false).unwrap();
        assert_eq!(report.indexed, 1);
        assert_eq!(report.total_files, 2);
        assert_eq!(report.skipped.len(), 1);
        assert!(report.skipped[0].0.ends_with("huge.js"));
    }

    #[test]
    fn test_reindex_replaces_entries() {
        let (_dir, base) = scratch();
        let file = base.join("lib.rs");
        fs::write(&file, "fn parse_config() {}").unwrap();

        let mut indexer = indexer(&base);
        indexer.index_codebase(".", false).unwrap();
        fs::write(&file, "fn render_template() {}").unwrap();
        indexer.index_codebase(".", false).unwrap();

        assert_eq!(indexer.status().count, 1);
        let matches = indexer.semantic_search("render template", None, None).unwrap();
        assert_eq!(matches.len(), 1);
        assert!(indexer.semantic_search("parse config", None, None).unwrap().is_empty());
    }

    #[test]
    fn test_force_drops_deleted_files() {
        let (_dir, base) = scratch();
        fs::write(base.join("keep.rs"), "fn keep() {}").unwrap();
        fs::write(base.join("gone.rs"), "fn gone() {}").unwrap();

        let mut indexer = indexer(&base);
        indexer.index_codebase(".", false).unwrap();
        fs::remove_file(base.join("gone.rs")).unwrap();

        indexer.index_codebase(".", false).unwrap();
        assert_eq!(indexer.status().count, 2);

        indexer.index_codebase(".", true).unwrap();
        assert_eq!(indexer.status().count, 1);
    }

    #[test]
    fn test_file_growing_past_limit_is_dropped() {
        let (_dir, base) = scratch();
        let file = base.join("grow.js");
        fs::write(&file, "let a = 1;").unwrap();

        let mut config = IndexConfig::default();
        config.max_file_size_mb = 1;
        let mut indexer = SemanticIndexer::new(base.clone(), &config, SearchConfig::default());
        indexer.index_codebase(".", false).unwrap();
        assert_eq!(indexer.status().count, 1);

        fs::write(&file, vec![b'a'; 2 * 1024 * 1024]).unwrap();
        let report = indexer.index_codebase(".", false).unwrap();
        assert_eq!(report.indexed, 0);
        assert_eq!(indexer.status().count, 0);
    }

    #[test]
    fn test_embedding_idempotent_across_reindex() {
        let (_dir, base) = scratch();
        let file = base.join("same.py");
        fs::write(&file, "def greet(name): print(name)").unwrap();

        let mut indexer = indexer(&base);
        indexer.index_codebase(".", false).unwrap();
        let first = indexer.index.get(&file).unwrap().embedding.clone();
        indexer.index_codebase(".", false).unwrap();
        let second = indexer.index.get(&file).unwrap().embedding.clone();
        assert_eq!(first, second);
    }

    #[test]
    fn test_non_utf8_file_still_indexed() {
        let (_dir, base) = scratch();
        let mut bytes = b"// caf".to_vec();
        bytes.push(0xe9);
        bytes.extend_from_slice(b"\nfn brew_coffee() {}\n");
        fs::write(base.join("latin1.rs"), bytes).unwrap();

        let mut indexer = indexer(&base);
        let report = indexer.index_codebase(".", false).unwrap();
        assert_eq!(report.indexed, 1);
        assert!(report.skipped.is_empty());

        let matches = indexer.semantic_search("brew coffee", None, None).unwrap();
        assert_eq!(matches.len(), 1);
        assert!(matches[0].preview.contains('\u{FFFD}'));
    }
}
