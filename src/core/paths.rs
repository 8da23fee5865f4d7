//! Path validation: keeps every traversal inside a base directory.

use std::path::{Component, Path, PathBuf};

use super::error::{SearchError, SearchResult};

/// Resolve `raw` against `base` and make sure the result stays inside `base`.
///
/// `base` is expected to be absolute (callers canonicalize it once at startup).
/// Resolution is lexical, so `..` cannot climb out even when the target does
/// not exist yet. Existing targets are additionally canonicalized so a symlink
/// pointing outside the base is rejected too.
pub fn validate(raw: &str, base: &Path) -> SearchResult<PathBuf> {
    let base = normalize(base);
    let joined = if Path::new(raw).is_absolute() {
        PathBuf::from(raw)
    } else {
        base.join(raw)
    };
    let resolved = normalize(&joined);

    if !resolved.starts_with(&base) {
        return Err(SearchError::AccessDenied { path: resolved, base });
    }

    if let Ok(real) = resolved.canonicalize() {
        let real_base = base.canonicalize().unwrap_or_else(|_| base.clone());
        if !real.starts_with(&real_base) {
            return Err(SearchError::AccessDenied { path: real, base });
        }
    }

    Ok(resolved)
}

/// Lexically normalize a path: drop `.` and fold `..` into the parent.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // Popping past the root is a no-op, like the OS does
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
