use crate::registry::RegistryError;
use crate::repository::RepoError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that stop a sorting run before it starts
///
/// Per-file and per-filter failures never surface here; they are counted
/// as skipped files or labelled `error`.
#[derive(Debug, Error)]
pub enum SortError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Repo(#[from] RepoError),

    #[error("No filters configured; at least one filter is required")]
    NoFilters,

    #[error("Cannot derive a destination for source {}", .0.display())]
    InvalidSource(PathBuf),

    #[error("Failed to start worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}
