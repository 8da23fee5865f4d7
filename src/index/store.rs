//! In-memory vector index keyed by file path

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::core::{SearchError, SearchResult};

/// One indexed file
#[derive(Debug, Clone)]
pub struct IndexEntry {
    pub path: PathBuf,
    pub embedding: Vec<f32>,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// Snapshot of the index state
#[derive(Debug, Clone, PartialEq)]
pub struct IndexStatus {
    pub indexed: bool,
    pub count: usize,
    pub last_updated: Option<DateTime<Utc>>,
}

/// Owns every [`IndexEntry`]. Paths are unique; writing an existing path
/// replaces its entry. All embeddings share one dimension for the lifetime
/// of the index.
#[derive(Debug)]
pub struct VectorIndex {
    dimension: usize,
    entries: HashMap<PathBuf, IndexEntry>,
    built: bool,
    last_updated: Option<DateTime<Utc>>,
}

impl VectorIndex {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            entries: HashMap::new(),
            built: false,
            last_updated: None,
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Insert or replace the entry for `path` and mark the index queryable.
    ///
    /// A replacement never moves the entry's timestamp backwards.
    pub fn upsert(
        &mut self,
        path: PathBuf,
        embedding: Vec<f32>,
        content: String,
        timestamp: DateTime<Utc>,
    ) -> SearchResult<()> {
        if embedding.len() != self.dimension {
            return Err(SearchError::DimensionMismatch {
                expected: self.dimension,
                actual: embedding.len(),
            });
        }

        let timestamp = match self.entries.get(&path) {
            Some(existing) if existing.timestamp > timestamp => existing.timestamp,
            _ => timestamp,
        };

        self.entries.insert(
            path.clone(),
            IndexEntry {
                path,
                embedding,
                content,
                timestamp,
            },
        );
        self.built = true;
        self.last_updated = Some(self.last_updated.map_or(timestamp, |t| t.max(timestamp)));

        Ok(())
    }

    /// Drop the entry for `path`, returning it if present
    pub fn remove(&mut self, path: &Path) -> Option<IndexEntry> {
        self.entries.remove(path)
    }

    /// Forget everything; the index reports unbuilt until the next upsert
    pub fn clear(&mut self) {
        self.entries.clear();
        self.built = false;
        self.last_updated = None;
    }

    pub fn entries(&self) -> impl Iterator<Item = &IndexEntry> {
        self.entries.values()
    }

    pub fn get(&self, path: &Path) -> Option<&IndexEntry> {
        self.entries.get(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Queryable means at least one successful upsert and at least one entry
    pub fn is_built(&self) -> bool {
        self.built && !self.is_empty()
    }

    pub fn status(&self) -> IndexStatus {
        IndexStatus {
            indexed: self.is_built(),
            count: self.len(),
            last_updated: self.last_updated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn unit(dim: usize, hot: usize) -> Vec<f32> {
        let mut v = vec![0.0; dim];
        v[hot] = 1.0;
        v
    }

    #[test]
    fn test_new_index_is_unbuilt() {
        let index = VectorIndex::new(4);
        let status = index.status();
        assert!(!status.indexed);
        assert_eq!(status.count, 0);
        assert!(status.last_updated.is_none());
    }

    #[test]
    fn test_upsert_replaces() {
        let mut index = VectorIndex::new(4);
        let path = PathBuf::from("/repo/a.rs");
        let t0 = Utc::now();

        index.upsert(path.clone(), unit(4, 0), "old".into(), t0).unwrap();
        index.upsert(path.clone(), unit(4, 1), "new".into(), t0 + Duration::seconds(1)).unwrap();

        assert_eq!(index.len(), 1);
        let entry = index.get(&path).unwrap();
        assert_eq!(entry.content, "new");
        assert_eq!(entry.embedding, unit(4, 1));
        assert!(index.status().indexed);
    }

    #[test]
    fn test_timestamp_never_regresses() {
        let mut index = VectorIndex::new(2);
        let path = PathBuf::from("a.py");
        let later = Utc::now();
        let earlier = later - Duration::minutes(5);

        index.upsert(path.clone(), unit(2, 0), "x".into(), later).unwrap();
        index.upsert(path.clone(), unit(2, 1), "y".into(), earlier).unwrap();

        assert_eq!(index.get(&path).unwrap().timestamp, later);
        assert_eq!(index.status().last_updated, Some(later));
    }

    #[test]
    fn test_dimension_mismatch_rejected() {
        let mut index = VectorIndex::new(3);
        let err = index
            .upsert(PathBuf::from("a"), vec![1.0; 5], String::new(), Utc::now())
            .unwrap_err();
        assert!(matches!(err, SearchError::DimensionMismatch { expected: 3, actual: 5 }));
        assert!(!index.status().indexed);
    }

    #[test]
    fn test_remove_and_clear() {
        let mut index = VectorIndex::new(2);
        index.upsert(PathBuf::from("a"), unit(2, 0), "a".into(), Utc::now()).unwrap();
        index.upsert(PathBuf::from("b"), unit(2, 1), "b".into(), Utc::now()).unwrap();

        assert!(index.remove(Path::new("a")).is_some());
        assert!(index.remove(Path::new("a")).is_none());
        assert_eq!(index.len(), 1);

        index.clear();
        assert!(index.is_empty());
        assert!(!index.status().indexed);
    }
}
