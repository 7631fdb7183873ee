//! Shared error types for the services crate.
//!
//! Every variant is a recoverable, expected outcome of caller input; the
//! presentation layer decides how to react (for example, treating
//! `TargetNotFound` as "no target configured for today").

use thiserror::Error;

use study_core::StudyDay;
use study_core::model::{SubjectError, TargetError};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `CatalogService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("subject already exists: {0}")]
    DuplicateSubject(String),

    #[error("subject not found: {0}")]
    SubjectNotFound(String),

    /// Chapter-level failures: duplicate chapter, chapter not found, empty
    /// names.
    #[error(transparent)]
    Subject(#[from] SubjectError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `PlannerService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PlannerError {
    #[error("no study target for {0}")]
    TargetNotFound(StudyDay),

    #[error(transparent)]
    Target(#[from] TargetError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}
