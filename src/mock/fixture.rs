//! Declarative repository fixtures.
//!
//! A fixture lists what a repository should contain before a test starts.
//! It can be built in code with chained setters or kept as a JSON document
//! next to the test:
//!
//! ```json
//! {
//!   "commits": [
//!     { "head": true, "files": [{ "path": "README.md", "body": "README" }] }
//!   ],
//!   "tags": [{ "name": "v1.0.0", "commit": "HEAD" }],
//!   "pull_requests": [{ "number": 1, "title": "feature", "base": { "ref": "master" } }]
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::storage::{
    BranchSpec, CommitSpec, Repository, StorageError, StorageResult, TagSpec,
};
use crate::tracker::{NewIssue, NewPullRequest};

/// everything a repository is seeded with
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryFixture {
    /// added in order, so parents must come before children
    pub commits: Vec<CommitSpec>,
    pub branches: Vec<BranchSpec>,
    pub tags: Vec<TagSpec>,
    pub pull_requests: Vec<NewPullRequest>,
    pub issues: Vec<NewIssue>,
}

impl RepositoryFixture {
    pub fn new() -> Self {
        Self::default()
    }

    /// parse a fixture from a JSON document
    pub fn from_json_str(json: &str) -> StorageResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// read and parse a fixture file
    pub fn from_path(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| StorageError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn commit(mut self, commit: CommitSpec) -> Self {
        self.commits.push(commit);
        self
    }

    pub fn branch(mut self, branch: BranchSpec) -> Self {
        self.branches.push(branch);
        self
    }

    pub fn tag(mut self, tag: TagSpec) -> Self {
        self.tags.push(tag);
        self
    }

    pub fn pull_request(mut self, pr: NewPullRequest) -> Self {
        self.pull_requests.push(pr);
        self
    }

    pub fn issue(mut self, issue: NewIssue) -> Self {
        self.issues.push(issue);
        self
    }

    /// seed `repo`: commits first, then branches and tags (which resolve
    /// against the commits), then pull requests and issues
    ///
    /// Stops at the first failing entry; entries before it stay applied.
    pub fn apply(self, repo: &Repository) -> StorageResult<()> {
        let counts = (self.commits.len(), self.pull_requests.len(), self.issues.len());

        repo.add_commits(self.commits)?;
        for branch in self.branches {
            repo.create_branch(&branch.name, &branch.commit)?;
        }
        for tag in self.tags {
            repo.create_tag(&tag.name, &tag.commit)?;
        }
        for pr in self.pull_requests {
            repo.create_pull_request(pr)?;
        }
        for issue in self.issues {
            repo.create_issue(issue)?;
        }

        debug!(
            repo = %repo.name(),
            commits = counts.0,
            pull_requests = counts.1,
            issues = counts.2,
            "applied fixture"
        );
        Ok(())
    }
}
