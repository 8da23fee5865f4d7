//! Error taxonomy for indexing and search

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the indexing and search core.
///
/// File- and directory-level variants are recovered by the walker and the
/// indexer (logged, then skipped). The rest fail the single request that
/// produced them.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Access denied: {} is outside {}", .path.display(), .base.display())]
    AccessDenied { path: PathBuf, base: PathBuf },

    #[error("Codebase not indexed. Run index_codebase first.")]
    NotIndexed,

    #[error("Root path does not exist or is not a directory: {}", .0.display())]
    RootNotFound(PathBuf),

    #[error("Failed to read file {}: {reason}", .path.display())]
    FileRead { path: PathBuf, reason: String },

    #[error("Failed to read directory {}: {reason}", .path.display())]
    DirectoryRead { path: PathBuf, reason: String },

    #[error("Embedding has {actual} dimensions, index expects {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Malformed request: {0}")]
    MalformedRequest(String),
}

impl SearchError {
    /// Short machine-readable name, reported in the `error` field of tool results.
    pub fn kind(&self) -> &'static str {
        match self {
            SearchError::AccessDenied { .. } => "AccessDenied",
            SearchError::NotIndexed => "NotIndexed",
            SearchError::RootNotFound(_) => "RootNotFound",
            SearchError::FileRead { .. } => "FileReadError",
            SearchError::DirectoryRead { .. } => "DirectoryReadError",
            SearchError::DimensionMismatch { .. } => "DimensionMismatch",
            SearchError::MalformedRequest(_) => "MalformedRequest",
        }
    }
}

pub type SearchResult<T> = std::result::Result<T, SearchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        assert_eq!(SearchError::NotIndexed.kind(), "NotIndexed");
        let err = SearchError::AccessDenied {
            path: PathBuf::from("/etc"),
            base: PathBuf::from("/work"),
        };
        assert_eq!(err.kind(), "AccessDenied");
        assert!(err.to_string().contains("/etc"));
    }
}
