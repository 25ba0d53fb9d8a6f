//! Filesystem repository errors
//!
//! Every variant keeps the path involved so a skipped file or a failed run
//! can be traced back to the entry that caused it.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepoError {
    /// The source tree could not be walked
    #[error("Cannot read directory tree at {}: {source}", .path.display())]
    ReadTree {
        path: PathBuf,
        source: walkdir::Error,
    },

    /// The source root could not be turned into an absolute path
    #[error("Cannot resolve source {}: {source}", .path.display())]
    Resolve { path: PathBuf, source: io::Error },

    /// The source root exists but is not a directory
    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("Cannot create directory {}: {source}", .path.display())]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("Cannot copy {} to {}: {source}", .from.display(), .to.display())]
    Copy {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },

    /// An empty destination path was given
    #[error("Destination path cannot be empty")]
    EmptyDestination,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_copy_error_keeps_source() {
        let err = RepoError::Copy {
            from: PathBuf::from("/a/x.png"),
            to: PathBuf::from("/b/x.png"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.to_string(), "Cannot copy /a/x.png to /b/x.png: denied");
        assert!(err.source().is_some());
    }

    #[test]
    fn test_empty_destination_message() {
        assert_eq!(
            RepoError::EmptyDestination.to_string(),
            "Destination path cannot be empty"
        );
    }
}
