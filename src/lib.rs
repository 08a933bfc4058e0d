//! ghmock - an in-process mock of a hosted Git platform's API
//!
//! A test declares a small fixture (commits with files, tags, branches, pull
//! requests, issues) and the mock answers API calls against it the way the
//! real service would, without any network access. Commits are expanded into
//! a tree of directory and file nodes that clients walk one level at a time,
//! exactly as they walk the platform's Git Data API.
//!
//! # Example
//!
//! ```
//! use ghmock::mock::{Mock, RepositoryFixture};
//! use ghmock::storage::{CommitSpec, FileSpec, TagSpec};
//!
//! let mock = Mock::new();
//! let repo = mock
//!     .load_fixture(
//!         "f110/gh-test",
//!         RepositoryFixture::new()
//!             .commit(CommitSpec::new().head().file(FileSpec::new("README.md").body("README")))
//!             .tag(TagSpec::new("v1.0.0")),
//!     )
//!     .unwrap();
//!
//! let head = repo.get_commit("HEAD").unwrap();
//! let root = repo.get_tree(&head.tree_id, false).unwrap();
//! let readme = repo.get_blob(&root.entry("README.md").unwrap().sha).unwrap();
//! assert_eq!(readme.content, b"README");
//! ```

pub mod mock;
pub mod storage;
pub mod tracker;
