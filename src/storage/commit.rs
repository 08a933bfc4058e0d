//!  Commit declaration and commit metadata
//!
//! a fixture declares a commit with a [`CommitSpec`]. Adding it to a
//! repository expands the declared files into a [`Tree`] and stores a
//! commit record; queries hand out [`CommitInfo`] copies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::blob::FileSpec;
use crate::storage::error::StorageResult;
use crate::storage::status::Status;
use crate::storage::tree::{Tree, TreeBuilder};
use crate::storage::types::{CommitId, NodeId};

/// builder-style declaration of a commit
///
/// ```ignore
/// let commit = CommitSpec::new()
///     .head()
///     .file(FileSpec::new("README.md").body("README"))
///     .file(FileSpec::new(".github/CODEOWNERS"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitSpec {
    /// explicit commit id; generated when absent
    #[serde(default)]
    pub id: Option<CommitId>,
    /// parent commits, oldest parent first; they must already exist
    #[serde(default)]
    pub parents: Vec<CommitId>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub author: Option<String>,
    /// make this commit HEAD
    #[serde(default)]
    pub head: bool,
    #[serde(default)]
    pub files: Vec<FileSpec>,
}

impl CommitSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(CommitId::new(id));
        self
    }

    /// add a parent commit
    pub fn parent(mut self, parent: CommitId) -> Self {
        self.parents.push(parent);
        self
    }

    /// set multiple parents (for merge commits)
    pub fn parents(mut self, parents: Vec<CommitId>) -> Self {
        self.parents = parents;
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// flag the commit as HEAD
    pub fn head(mut self) -> Self {
        self.head = true;
        self
    }

    pub fn file(mut self, file: FileSpec) -> Self {
        self.files.push(file);
        self
    }

    pub fn files(mut self, files: impl IntoIterator<Item = FileSpec>) -> Self {
        self.files.extend(files);
        self
    }
}

/// A commit as the repository stores it.
#[derive(Debug, Clone)]
pub(crate) struct Commit {
    pub(crate) id: CommitId,
    pub(crate) parents: Vec<CommitId>,
    pub(crate) tree: Tree,
    pub(crate) is_head: bool,
    pub(crate) message: String,
    pub(crate) author: String,
    pub(crate) timestamp: DateTime<Utc>,
    pub(crate) statuses: Vec<Status>,
}

impl Commit {
    /// expand a declaration into a commit, building its tree
    ///
    /// The id is resolved here so a failed tree build never consumes it.
    pub(crate) fn from_spec(spec: CommitSpec, default_author: &str) -> StorageResult<Self> {
        let tree = TreeBuilder::from_files(spec.files)?;
        Ok(Self {
            id: spec.id.unwrap_or_else(CommitId::generate),
            parents: spec.parents,
            tree,
            is_head: spec.head,
            message: spec.message,
            author: spec.author.unwrap_or_else(|| default_author.to_string()),
            timestamp: Utc::now(),
            statuses: Vec::new(),
        })
    }

    pub fn info(&self) -> CommitInfo {
        CommitInfo {
            id: self.id.clone(),
            tree_id: self.tree.root_id().clone(),
            parent_ids: self.parents.clone(),
            message: self.message.clone(),
            author: self.author.clone(),
            timestamp: self.timestamp,
            is_head: self.is_head,
        }
    }
}

/// information about a commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitInfo {
    pub id: CommitId,
    /// root tree node; the starting point for tree queries
    pub tree_id: NodeId,
    pub parent_ids: Vec<CommitId>,
    pub message: String,
    pub author: String,
    pub timestamp: DateTime<Utc>,
    pub is_head: bool,
}

impl CommitInfo {
    /// check if this is a merge commit (has multiple parents)
    pub fn is_merge(&self) -> bool {
        self.parent_ids.len() > 1
    }

    /// get the first (or only) parent
    pub fn first_parent(&self) -> Option<&CommitId> {
        self.parent_ids.first()
    }

    /// get a short summary of the commit (first line of message)
    pub fn summary(&self) -> &str {
        self.message.lines().next().unwrap_or(&self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_builder() {
        let spec = CommitSpec::new()
            .id("c1")
            .head()
            .message("initial\n\nbody")
            .file(FileSpec::new("README.md").body("README"))
            .files(vec![FileSpec::new("a/b"), FileSpec::new("a/c")]);
        assert_eq!(spec.id, Some(CommitId::new("c1")));
        assert!(spec.head);
        assert_eq!(spec.files.len(), 3);
    }

    #[test]
    fn test_from_spec_builds_tree() {
        let spec = CommitSpec::new().file(FileSpec::new("a/b")).file(FileSpec::new("c"));
        let commit = Commit::from_spec(spec, "tester").unwrap();
        assert_eq!(commit.tree.root().name(), "");
        assert_eq!(commit.tree.files().len(), 2);
        assert_eq!(commit.info().author, "tester");
        assert!(!commit.info().is_head);
        assert_eq!(commit.id.as_str().len(), 40);
    }

    #[test]
    fn test_commit_info_helpers() {
        let spec = CommitSpec::new()
            .message("merge feature\n\ndetails")
            .parents(vec![CommitId::new("p1"), CommitId::new("p2")]);
        let info = Commit::from_spec(spec, "tester").unwrap().info();
        assert!(info.is_merge());
        assert_eq!(info.first_parent(), Some(&CommitId::new("p1")));
        assert_eq!(info.summary(), "merge feature");
    }

    #[test]
    fn test_spec_from_json() {
        let spec: CommitSpec = serde_json::from_str(
            r#"{"head": true, "files": [{"path": "README.md", "body": "README"}]}"#,
        )
        .unwrap();
        assert!(spec.head);
        assert!(spec.id.is_none());
        assert_eq!(spec.files[0].path, "README.md");
    }
}
