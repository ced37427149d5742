//! Recursive enumeration of candidate route files.
//!
//! # Responsibilities
//! - Walk the route directory depth-first, yielding absolute file paths
//! - Traverse directories without yielding them
//! - Stop at the first enumeration error
//!
//! # Design Decisions
//! - Unsorted walks follow the platform's directory-listing order, which is
//!   not stable across platforms; `sorted` orders entries by file name
//! - Symlinks are followed; a link cycle surfaces as an error
//! - Each call to [`walk`] starts a fresh traversal

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Error raised while enumerating the route directory.
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("cannot resolve route directory {path}: {source}")]
    Root {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read route directory: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Lazy iterator over the regular files below a route directory.
pub struct RouteFiles {
    inner: walkdir::IntoIter,
    failed: bool,
}

/// Start a depth-first walk of `root`.
pub fn walk(root: &Path, sorted: bool) -> Result<RouteFiles, DiscoveryError> {
    let root = std::path::absolute(root).map_err(|source| DiscoveryError::Root {
        path: root.to_path_buf(),
        source,
    })?;

    let mut walker = WalkDir::new(root).follow_links(true);
    if sorted {
        walker = walker.sort_by_file_name();
    }

    Ok(RouteFiles {
        inner: walker.into_iter(),
        failed: false,
    })
}

impl Iterator for RouteFiles {
    type Item = Result<PathBuf, DiscoveryError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        loop {
            match self.inner.next()? {
                Ok(entry) if entry.file_type().is_file() => return Some(Ok(entry.into_path())),
                Ok(_) => continue,
                Err(e) => {
                    self.failed = true;
                    return Some(Err(DiscoveryError::Walk(e)));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    #[test]
    fn test_yields_nested_files_only() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("a.toml"));
        touch(&dir.path().join("nested/b.toml"));
        touch(&dir.path().join("nested/deeper/c.toml"));
        fs::create_dir_all(dir.path().join("empty")).unwrap();

        let files: Vec<PathBuf> = walk(dir.path(), true).unwrap().map(Result::unwrap).collect();

        assert_eq!(files.len(), 3);
        assert!(files.iter().all(|p| p.is_absolute() && p.is_file()));
    }

    #[test]
    fn test_sorted_walk_is_depth_first_by_name() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("b.toml"));
        touch(&dir.path().join("a/z.toml"));
        touch(&dir.path().join("c.toml"));

        let names: Vec<String> = walk(dir.path(), true)
            .unwrap()
            .map(|p| p.unwrap().strip_prefix(dir.path()).unwrap().display().to_string())
            .collect();

        let expected: Vec<String> = vec![
            Path::new("a").join("z.toml").display().to_string(),
            "b.toml".to_string(),
            "c.toml".to_string(),
        ];
        assert_eq!(names, expected);
    }

    #[test]
    fn test_each_walk_restarts() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("a.toml"));

        assert_eq!(walk(dir.path(), false).unwrap().count(), 1);
        assert_eq!(walk(dir.path(), false).unwrap().count(), 1);
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut files = walk(&dir.path().join("missing"), false).unwrap();

        assert!(matches!(files.next(), Some(Err(DiscoveryError::Walk(_)))));
        assert!(files.next().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_error_mid_walk_stops_iteration() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("a.toml"));
        fs::create_dir_all(dir.path().join("b")).unwrap();
        std::os::unix::fs::symlink(dir.path(), dir.path().join("b/loop")).unwrap();
        touch(&dir.path().join("c.toml"));

        let mut files = walk(dir.path(), true).unwrap();

        let first = files.next().unwrap().unwrap();
        assert!(first.ends_with("a.toml"));
        assert!(matches!(files.next(), Some(Err(DiscoveryError::Walk(_)))));
        // c.toml is never reached
        assert!(files.next().is_none());
        assert!(files.next().is_none());
    }
}
