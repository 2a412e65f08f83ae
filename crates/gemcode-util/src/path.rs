//! Path utilities.
//!
//! Every tool resolves model-supplied paths through [`safe_join`] before
//! touching the filesystem, so path traversal never leaves the workspace
//! root.

use std::path::{Path, PathBuf};

/// Check if a path is within a base directory.
///
/// This is used for security checks to prevent path traversal.
pub fn is_within(path: &Path, base: &Path) -> bool {
    // Canonicalize both paths if possible
    let canonical_path = path.canonicalize().ok();
    let canonical_base = base.canonicalize().ok();

    match (canonical_path, canonical_base) {
        (Some(p), Some(b)) => p.starts_with(&b),
        _ => {
            // The path may not exist yet (e.g. a file about to be written),
            // so fall back to a lexical prefix check
            path.starts_with(base)
        }
    }
}

/// Normalize a path by removing `.` and `..` components.
///
/// Unlike `canonicalize`, this doesn't require the path to exist.
pub fn normalize(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();

    for component in path.components() {
        match component {
            std::path::Component::ParentDir => {
                result.pop();
            }
            std::path::Component::CurDir => {
                // Skip `.`
            }
            _ => {
                result.push(component);
            }
        }
    }

    result
}

/// Join a model-supplied path onto the workspace root, preventing traversal.
///
/// Returns `None` if the resulting path would be outside the root. Absolute
/// arguments are accepted but still have to land inside the root.
pub fn safe_join(base: &Path, path: &Path) -> Option<PathBuf> {
    let result = base.join(path);
    let normalized = normalize(&result);

    if is_within(&normalized, base) {
        Some(normalized)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_is_within() {
        let base = PathBuf::from("/home/user/project");
        assert!(is_within(Path::new("/home/user/project/src"), &base));
        assert!(!is_within(Path::new("/home/user/other"), &base));
    }

    #[test]
    fn test_is_within_existing_dirs() {
        let dir = tempdir().unwrap();
        let inside = dir.path().join("sub");
        std::fs::create_dir(&inside).unwrap();

        assert!(is_within(&inside, dir.path()));
        assert!(!is_within(dir.path(), &inside));
    }

    #[test]
    fn test_normalize() {
        let path = Path::new("/home/user/./project/../project/src");
        let normalized = normalize(path);
        assert_eq!(normalized, PathBuf::from("/home/user/project/src"));
    }

    #[test]
    fn test_safe_join() {
        let base = PathBuf::from("/home/user/project");

        // Safe join
        let result = safe_join(&base, Path::new("src/main.rs"));
        assert_eq!(result, Some(PathBuf::from("/home/user/project/src/main.rs")));

        // Traversal attempt
        let result = safe_join(&base, Path::new("../../../etc/passwd"));
        assert!(result.is_none());
    }

    #[test]
    fn test_safe_join_dot() {
        let base = PathBuf::from("/home/user/project");
        let result = safe_join(&base, Path::new("."));
        assert_eq!(result, Some(base));
    }

    #[test]
    fn test_safe_join_absolute_inside() {
        let base = PathBuf::from("/home/user/project");
        let result = safe_join(&base, Path::new("/home/user/project/lib.py"));
        assert_eq!(result, Some(PathBuf::from("/home/user/project/lib.py")));
    }

    #[test]
    fn test_safe_join_absolute_outside() {
        let base = PathBuf::from("/home/user/project");
        assert!(safe_join(&base, Path::new("/etc/passwd")).is_none());
    }

    #[test]
    fn test_safe_join_sneaky_traversal() {
        let base = PathBuf::from("/home/user/project");
        assert!(safe_join(&base, Path::new("src/../../project-evil")).is_none());
    }
}
