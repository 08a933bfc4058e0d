//! object graph and repository state for the mock
//!
//! this module holds everything one mock repository knows and answers
//! queries against it with the platform's Git Data API semantics. It never
//! performs I/O and never blocks beyond its own lock.
//!
//!  # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Repository                           │
//! │  (commits, HEAD, refs, statuses, pull requests, issues)     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!        ┌─────────────────────┼─────────────────────┐
//!        │                     │                     │
//!        ▼                     ▼                     ▼
//!  ┌─────────────┐       ┌─────────────┐       ┌─────────────┐
//!  │   commit    │       │    refs     │       │   tracker   │
//!  │ (+statuses) │       │(tags/heads) │       │ (PRs/issues)│
//!  └─────────────┘       └─────────────┘       └─────────────┘
//!         │
//!         ▼
//!  ┌─────────────┐       ┌─────────────┐
//!  │    tree     │──────▶│    blob     │
//!  │(directories)│       │   (files)   │
//!  └─────────────┘       └─────────────┘
//!  ```
//!
//! # Usage
//!
//! ```ignore
//! use ghmock::storage::{CommitSpec, FileSpec, RepoName, Repository};
//!
//! let repo = Repository::new(RepoName::new("f110/gh-test")?);
//! repo.add_commit(
//!     CommitSpec::new()
//!         .head()
//!         .file(FileSpec::new("README.md").body("README")),
//! )?;
//!
//! // walk the tree one level at a time, like an API client would
//! let head = repo.get_commit("HEAD")?;
//! let root = repo.get_tree(&head.tree_id, false)?;
//! let readme = repo.get_blob(&root.entry("README.md").unwrap().sha)?;
//! ```

mod blob;
mod commit;
mod error;
mod refs;
mod repository;
mod status;
mod tree;
mod types;

// Re-export public API
pub use blob::{Blob, FileSpec};
pub use commit::{CommitInfo, CommitSpec};
pub use error::{StorageError, StorageResult};
pub use refs::{BranchSpec, RefSpec, Reference, TagSpec, HEAD};
pub use repository::{Repository, RepositoryStats, DEFAULT_AUTHOR, DEFAULT_BRANCH};
pub use status::{combined_state, CombinedStatus, NewStatus, Status, StatusState};
pub use tree::{FileNode, Tree, TreeBuilder, TreeEntry, TreeListing};
pub use types::{generate_sha, CommitId, InvalidNameError, NodeId, NodeKind, RepoName};
