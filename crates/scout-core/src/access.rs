//! Access filtering
//!
//! The indexer asks an [`AccessFilter`] before touching any file. A denied
//! path is treated exactly like a path that does not exist.

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::path::{Path, PathBuf};

/// Yes/no decision per absolute path
pub trait AccessFilter: Send + Sync {
    fn is_accessible(&self, path: &Path) -> bool;
}

impl<F> AccessFilter for F
where
    F: Fn(&Path) -> bool + Send + Sync,
{
    fn is_accessible(&self, path: &Path) -> bool {
        self(path)
    }
}

/// Filter that accepts every path
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl AccessFilter for AllowAll {
    fn is_accessible(&self, _path: &Path) -> bool {
        true
    }
}

/// Gitignore-style filter driven by an ignore file in each workspace root
///
/// Paths outside every root are allowed. A root without the ignore file, or
/// with one that fails to parse, allows everything beneath it.
pub struct IgnoreFileFilter {
    matchers: Vec<(PathBuf, Gitignore)>,
}

impl IgnoreFileFilter {
    pub fn new(roots: &[PathBuf], file_name: &str) -> Self {
        let matchers = roots
            .iter()
            .filter_map(|root| {
                let ignore_file = root.join(file_name);
                if !ignore_file.is_file() {
                    return None;
                }
                let mut builder = GitignoreBuilder::new(root);
                if let Some(e) = builder.add(&ignore_file) {
                    tracing::warn!("Ignoring {}: {}", ignore_file.display(), e);
                    return None;
                }
                match builder.build() {
                    Ok(gitignore) => Some((root.clone(), gitignore)),
                    Err(e) => {
                        tracing::warn!("Ignoring {}: {}", ignore_file.display(), e);
                        None
                    }
                }
            })
            .collect();

        Self { matchers }
    }

    /// Number of roots that have an active ignore file
    pub fn active_roots(&self) -> usize {
        self.matchers.len()
    }
}

impl AccessFilter for IgnoreFileFilter {
    fn is_accessible(&self, path: &Path) -> bool {
        !self.matchers.iter().any(|(root, gitignore)| {
            path.starts_with(root)
                && gitignore
                    .matched_path_or_any_parents(path, false)
                    .is_ignore()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allow_all() {
        assert!(AllowAll.is_accessible(Path::new("/anything/at/all")));
    }

    #[test]
    fn test_closure_filter() {
        let filter = |p: &Path| !p.to_string_lossy().contains("secret");
        assert!(filter.is_accessible(Path::new("/ws/a.ts")));
        assert!(!filter.is_accessible(Path::new("/ws/secret.ts")));
    }

    #[test]
    fn test_ignore_file_rules() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_path_buf();
        std::fs::write(root.join(".scoutignore"), "secret/\n*.env\n").unwrap();

        let filter = IgnoreFileFilter::new(&[root.clone()], ".scoutignore");
        assert_eq!(filter.active_roots(), 1);

        assert!(filter.is_accessible(&root.join("src/app.ts")));
        assert!(!filter.is_accessible(&root.join("secret/keys.ts")));
        assert!(!filter.is_accessible(&root.join("secret/deep/nested.ts")));
        assert!(!filter.is_accessible(&root.join("prod.env")));
        assert!(!filter.is_accessible(&root.join("config/local.env")));
        assert!(filter.is_accessible(Path::new("/elsewhere/prod.env")));
    }

    #[test]
    fn test_missing_ignore_file_allows_everything() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_path_buf();

        let filter = IgnoreFileFilter::new(&[root.clone()], ".scoutignore");
        assert_eq!(filter.active_roots(), 0);
        assert!(filter.is_accessible(&root.join("prod.env")));
    }
}
