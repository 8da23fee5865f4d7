//! Directory walking with file count and size ceilings

use ignore::gitignore::Gitignore;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::config::IndexConfig;
use crate::core::SearchError;

/// Directory names that are never descended into
pub const IGNORED_DIRS: [&str; 4] = ["node_modules", ".git", "dist", "build"];

/// Options controlling a single walk
#[derive(Debug, Clone)]
pub struct WalkOptions {
    pub extensions: HashSet<String>,
    pub ignored_dirs: HashSet<String>,
    pub max_files: usize,
    pub max_file_size: u64,
    pub respect_gitignore: bool,
}

impl WalkOptions {
    pub fn from_config(config: &IndexConfig) -> Self {
        let extensions = config
            .extensions
            .iter()
            .map(|e| e.trim_start_matches('.').to_lowercase())
            .collect();

        let ignored_dirs = IGNORED_DIRS
            .iter()
            .map(|d| d.to_string())
            .chain(config.exclude_dirs.iter().cloned())
            .collect();

        Self {
            extensions,
            ignored_dirs,
            max_files: config.max_files,
            max_file_size: config.max_file_size_bytes(),
            respect_gitignore: config.respect_gitignore,
        }
    }
}

/// A candidate source file found by the walker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFile {
    pub path: PathBuf,
    pub size: u64,
    /// Larger than the size ceiling; counted but not meant to be embedded
    pub oversized: bool,
}

/// Lazy depth-first walk over a directory tree.
///
/// Single pass: the iterator reads the filesystem as it advances and never
/// revisits entries. Unreadable directories and files are logged and skipped.
pub struct Walk {
    entries: walkdir::IntoIter,
    options: WalkOptions,
    gitignore: Gitignore,
    found: usize,
    limit_reached: bool,
}

/// Start walking `root`
pub fn walk(root: &Path, options: WalkOptions) -> Walk {
    let gitignore_path = root.join(".gitignore");
    let gitignore = if options.respect_gitignore && gitignore_path.exists() {
        Gitignore::new(&gitignore_path).0
    } else {
        Gitignore::empty()
    };

    let entries = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter();

    Walk {
        entries,
        options,
        gitignore,
        found: 0,
        limit_reached: false,
    }
}

impl Walk {
    /// True once the walk stopped early at `max_files`
    pub fn limit_reached(&self) -> bool {
        self.limit_reached
    }

    fn has_allowed_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| self.options.extensions.contains(&e.to_lowercase()))
            .unwrap_or(false)
    }
}

impl Iterator for Walk {
    type Item = DiscoveredFile;

    fn next(&mut self) -> Option<Self::Item> {
        if self.found >= self.options.max_files {
            if !self.limit_reached {
                warn!("File limit of {} reached, stopping walk", self.options.max_files);
                self.limit_reached = true;
            }
            return None;
        }

        loop {
            let entry = match self.entries.next()? {
                Ok(entry) => entry,
                Err(e) => {
                    let err = SearchError::DirectoryRead {
                        path: e.path().map(Path::to_path_buf).unwrap_or_default(),
                        reason: e.to_string(),
                    };
                    warn!("{}", err);
                    continue;
                }
            };

            let path = entry.path();
            let file_type = entry.file_type();

            if file_type.is_dir() {
                if entry.depth() == 0 {
                    continue;
                }
                let name = entry.file_name().to_string_lossy();
                if self.options.ignored_dirs.contains(name.as_ref())
                    || self.gitignore.matched(path, true).is_ignore()
                {
                    debug!("Skipping directory {}", path.display());
                    self.entries.skip_current_dir();
                }
                continue;
            }

            if !file_type.is_file() || !self.has_allowed_extension(path) {
                continue;
            }
            if self.gitignore.matched(path, false).is_ignore() {
                continue;
            }

            let size = match entry.metadata() {
                Ok(meta) => meta.len(),
                Err(e) => {
                    let err = SearchError::FileRead {
                        path: path.to_path_buf(),
                        reason: e.to_string(),
                    };
                    warn!("{}", err);
                    continue;
                }
            };

            self.found += 1;
            return Some(DiscoveredFile {
                path: path.to_path_buf(),
                size,
                oversized: size > self.options.max_file_size,
            });
        }
    }
}
