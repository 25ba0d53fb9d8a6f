//! Filesystem access used by the sorter
//!
//! `FileRepository` is the seam between the orchestrator and the disk:
//! building the source tree, creating directories and copying files.
//! `LocalRepository` is the real implementation.

pub mod error;

pub use error::RepoError;

use crate::domain::{BasicExtractor, Directory, MetadataExtractor, normalize_extension, normalize_extension_str};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Name given to the root node of a source tree
pub const SOURCE_ROOT_NAME: &str = "root";

/// Filesystem operations needed by a sorting run
pub trait FileRepository: Send + Sync {
    /// Build the tree of eligible files under `root`
    ///
    /// Extensions are compared case-insensitively with or without a leading
    /// dot. An empty list admits every file.
    ///
    /// # Errors
    ///
    /// Returns `RepoError` if `root` is missing, not a directory, or cannot be read.
    fn build_tree(&self, root: &Path, allowed_extensions: &[String]) -> Result<Directory, RepoError>;

    /// Absolute, symlink-free form of a source root such as `.` or `../x`
    ///
    /// # Errors
    ///
    /// Returns `RepoError::Resolve` if the path does not exist or cannot be read.
    fn resolve_root(&self, root: &Path) -> Result<PathBuf, RepoError> {
        fs::canonicalize(root).map_err(|source| RepoError::Resolve {
            path: root.to_path_buf(),
            source,
        })
    }

    /// Create the destination root and return its path
    ///
    /// # Errors
    ///
    /// Returns `RepoError::EmptyDestination` for an empty path, or
    /// `RepoError::CreateDir` if the directory cannot be created.
    fn create_new_entry(&self, dest: &Path) -> Result<PathBuf, RepoError> {
        if dest.as_os_str().is_empty() {
            return Err(RepoError::EmptyDestination);
        }
        self.create_directory(dest)?;
        Ok(dest.to_path_buf())
    }

    /// Create `path` and any missing ancestors; succeeds if it already exists
    ///
    /// # Errors
    ///
    /// Returns `RepoError::CreateDir` on I/O failure.
    fn create_directory(&self, path: &Path) -> Result<(), RepoError>;

    /// Copy `from` to the file path `to`, creating its parent if needed
    ///
    /// # Errors
    ///
    /// Returns `RepoError::Copy` if the source is unreadable or the target
    /// is unwritable.
    fn copy_file(&self, from: &Path, to: &Path) -> Result<(), RepoError>;
}

/// Repository backed by the local filesystem
#[derive(Debug, Clone, Default)]
pub struct LocalRepository<E: MetadataExtractor = BasicExtractor> {
    extractor: E,
}

impl LocalRepository {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            extractor: BasicExtractor,
        }
    }
}

impl<E: MetadataExtractor> LocalRepository<E> {
    /// Use a different metadata extractor
    #[must_use]
    pub const fn with_extractor(extractor: E) -> Self {
        Self { extractor }
    }
}

impl<E: MetadataExtractor> FileRepository for LocalRepository<E> {
    fn build_tree(&self, root: &Path, allowed_extensions: &[String]) -> Result<Directory, RepoError> {
        if root.exists() && !root.is_dir() {
            return Err(RepoError::NotADirectory(root.to_path_buf()));
        }

        let allowed: HashSet<String> = allowed_extensions
            .iter()
            .map(|e| normalize_extension_str(e))
            .collect();

        // Open directories from the root down to the current entry's parent
        let mut stack = vec![Directory::new(SOURCE_ROOT_NAME, root)];

        for entry in WalkDir::new(root).min_depth(1).follow_links(true).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => {
                    return Err(RepoError::ReadTree {
                        path: root.to_path_buf(),
                        source: e,
                    });
                }
                Err(e) => {
                    warn!(error = %e, "skipping unreadable entry");
                    continue;
                }
            };

            while stack.len() > entry.depth() {
                close_top(&mut stack);
            }

            let path = entry.path();
            if entry.file_type().is_dir() {
                let name = entry.file_name().to_string_lossy().into_owned();
                stack.push(Directory::new(name, path));
            } else if entry.file_type().is_file()
                && (allowed.is_empty() || allowed.contains(&normalize_extension(path)))
                && let Some(parent) = stack.last_mut()
            {
                parent.add_file(self.extractor.extract(path));
            }
        }

        while stack.len() > 1 {
            close_top(&mut stack);
        }
        let tree = stack.pop().unwrap_or_else(|| Directory::new(SOURCE_ROOT_NAME, root));
        debug!(root = %root.display(), files = tree.file_count(), "built source tree");
        Ok(tree)
    }

    fn create_directory(&self, path: &Path) -> Result<(), RepoError> {
        fs::create_dir_all(path).map_err(|source| RepoError::CreateDir {
            path: path.to_path_buf(),
            source,
        })
    }

    fn copy_file(&self, from: &Path, to: &Path) -> Result<(), RepoError> {
        if let Some(parent) = to.parent() {
            self.create_directory(parent)?;
        }
        fs::copy(from, to).map_err(|source| RepoError::Copy {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            source,
        })?;
        debug!(from = %from.display(), to = %to.display(), "copied file");
        Ok(())
    }
}

/// Pop the innermost open directory and attach it to its parent
fn close_top(stack: &mut Vec<Directory>) {
    if stack.len() < 2 {
        return;
    }
    if let Some(done) = stack.pop()
        && let Some(parent) = stack.last_mut()
    {
        parent.add_subdirectory(done);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Metadata;
    use tempfile::TempDir;

    fn exts(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_string()).collect()
    }

    fn sample_tree() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("a/b")).unwrap();
        fs::create_dir_all(root.join("empty")).unwrap();
        fs::write(root.join("top.png"), b"png").unwrap();
        fs::write(root.join("notes.txt"), b"text").unwrap();
        fs::write(root.join("a/b/deep.MP3"), b"mp3!").unwrap();
        fs::write(root.join("a/skip.exe"), b"exe").unwrap();
        dir
    }

    #[test]
    fn test_build_tree_filters_extensions() {
        let dir = sample_tree();
        let repo = LocalRepository::new();
        let tree = repo.build_tree(dir.path(), &exts(&["png", ".mp3"])).unwrap();

        assert_eq!(tree.name, SOURCE_ROOT_NAME);
        assert_eq!(tree.files.len(), 1);
        assert_eq!(tree.files[0].name, "top.png");
        assert_eq!(tree.files[0].size(), 3);

        let deep = tree.find_directory(&["a", "b"]).unwrap();
        assert_eq!(deep.files.len(), 1);
        assert!(matches!(deep.files[0].metadata, Metadata::Audio { size: 4, .. }));

        assert!(tree.find_directory(&["a"]).unwrap().files.is_empty());
        assert!(!tree.find_directory(&["empty"]).unwrap().has_files());
        assert_eq!(tree.file_count(), 2);
    }

    #[test]
    fn test_build_tree_is_sorted_and_complete() {
        let dir = sample_tree();
        let tree = LocalRepository::new().build_tree(dir.path(), &[]).unwrap();
        let names: Vec<&str> = tree.subdirectories.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["a", "empty"]);
        assert_eq!(tree.file_count(), 4);
    }

    #[test]
    fn test_build_tree_missing_root() {
        let dir = TempDir::new().unwrap();
        let err = LocalRepository::new()
            .build_tree(&dir.path().join("nope"), &[])
            .unwrap_err();
        assert!(matches!(err, RepoError::ReadTree { .. }));
    }

    #[test]
    fn test_resolve_root_is_absolute() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("a/b")).unwrap();
        let repo = LocalRepository::new();

        let resolved = repo.resolve_root(&dir.path().join("a/b/..")).unwrap();
        assert!(resolved.is_absolute());
        assert_eq!(resolved, fs::canonicalize(dir.path().join("a")).unwrap());

        let tree = repo.build_tree(&resolved, &[]).unwrap();
        assert_eq!(tree.path, resolved);

        let err = repo.resolve_root(&dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, RepoError::Resolve { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_build_tree_follows_symlinked_files() {
        let dir = TempDir::new().unwrap();
        let outside = dir.path().join("outside.png");
        fs::write(&outside, b"png").unwrap();
        let root = dir.path().join("root");
        fs::create_dir_all(&root).unwrap();
        std::os::unix::fs::symlink(&outside, root.join("linked.png")).unwrap();

        let tree = LocalRepository::new().build_tree(&root, &exts(&["png"])).unwrap();
        assert_eq!(tree.files.len(), 1);
        assert_eq!(tree.files[0].name, "linked.png");
        assert_eq!(tree.files[0].size(), 3);
    }

    #[test]
    fn test_build_tree_rejects_file_root() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("f.png");
        fs::write(&file, b"x").unwrap();
        let err = LocalRepository::new().build_tree(&file, &[]).unwrap_err();
        assert!(matches!(err, RepoError::NotADirectory(_)));
    }

    #[test]
    fn test_create_new_entry() {
        let dir = TempDir::new().unwrap();
        let repo = LocalRepository::new();
        let target = dir.path().join("x/y/z");
        assert_eq!(repo.create_new_entry(&target).unwrap(), target);
        assert!(target.is_dir());
        // idempotent
        assert!(repo.create_new_entry(&target).is_ok());
        assert!(matches!(
            repo.create_new_entry(Path::new("")),
            Err(RepoError::EmptyDestination)
        ));
    }

    #[test]
    fn test_copy_file_creates_parent() {
        let dir = TempDir::new().unwrap();
        let from = dir.path().join("in.bin");
        fs::write(&from, b"payload").unwrap();
        let to = dir.path().join("out/nested/in.bin");

        let repo = LocalRepository::new();
        repo.copy_file(&from, &to).unwrap();
        assert_eq!(fs::read(&to).unwrap(), b"payload");

        let err = repo.copy_file(&dir.path().join("missing"), &to).unwrap_err();
        assert!(matches!(err, RepoError::Copy { .. }));
    }
}
