//! Storage layer error types
//!
//! Every failure the mock can report is a variant here. The mock never
//! swallows a condition or degrades to a partial answer: a test relying on it
//! has to see the failure.

use std::path::PathBuf;

use thiserror::Error;

use crate::storage::types::InvalidNameError;

/// the main error type for mock operations
#[derive(Debug, Error)]
pub enum StorageError {
    /// a ref, node, commit, tag, branch, pull request, issue or repository
    /// does not resolve
    #[error("{kind} not found: {key}")]
    NotFound { kind: &'static str, key: String },

    /// a commit id, node id, tag name or number is already taken
    #[error("{kind} already exists: {key}")]
    DuplicateId { kind: &'static str, key: String },

    /// `HEAD` was asked for but no commit is flagged as head
    #[error("no commit is marked as HEAD")]
    NoHead,

    /// a blob operation was applied to a directory node
    #[error("node {0} is a directory, not a file")]
    NotAFile(String),

    /// a tree operation was applied to a file node
    #[error("node {0} is a file, not a directory")]
    NotADirectory(String),

    /// a declared path would descend through a file, or replace a directory
    /// with a file
    #[error("structural conflict at {path}: {reason}")]
    StructuralConflict { path: String, reason: String },

    /// the same file path was declared twice in one commit
    #[error("path declared twice in one commit: {0}")]
    DuplicatePath(String),

    /// a declared path has no segments
    #[error("invalid path: '{0}'")]
    InvalidPath(String),

    /// invalid `owner/name` repository key
    #[error("invalid repository name: {0}")]
    InvalidRepoName(#[from] InvalidNameError),

    /// the registry refuses to hand out an existing repository twice
    #[error("repository already exists: {0}")]
    RepositoryExists(String),

    /// no number is left for an auto-numbered item
    #[error("no {0} numbers left to assign")]
    SequenceExhausted(&'static str),

    /// unknown commit status state
    #[error("invalid status state: '{0}'")]
    InvalidStatusState(String),

    /// fixture document could not be parsed
    #[error("fixture error: {0}")]
    Fixture(#[from] serde_json::Error),

    /// fixture file could not be read
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StorageError {
    pub(crate) fn not_found(kind: &'static str, key: impl ToString) -> Self {
        StorageError::NotFound {
            kind,
            key: key.to_string(),
        }
    }

    pub(crate) fn duplicate(kind: &'static str, key: impl ToString) -> Self {
        StorageError::DuplicateId {
            kind,
            key: key.to_string(),
        }
    }

    pub(crate) fn conflict(path: impl Into<String>, reason: impl Into<String>) -> Self {
        StorageError::StructuralConflict {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// check if this error indicates the resource doesn't exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound { .. } | StorageError::NoHead)
    }

    /// check if this error is a conflict with existing state
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            StorageError::DuplicateId { .. }
                | StorageError::DuplicatePath(_)
                | StorageError::StructuralConflict { .. }
                | StorageError::RepositoryExists(_)
        )
    }
}

/// result type alias for mock operations
pub type StorageResult<T> = Result<T, StorageError>;
