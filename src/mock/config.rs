//! Mock configuration options.

use serde::{Deserialize, Serialize};

use crate::storage::{DEFAULT_AUTHOR, DEFAULT_BRANCH};

/// what [`Mock::repository`](crate::mock::Mock::repository) does when the
/// key is already registered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExistingRepoPolicy {
    /// hand out the existing repository
    #[default]
    Reuse,
    /// fail with `RepositoryExists`
    Fail,
}

/// Mock configuration options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MockConfig {
    /// Branch name that resolves to HEAD unless declared.
    pub default_branch: String,
    /// Author recorded on commits that do not name one.
    pub author: String,
    /// Behaviour when a repository key is registered twice.
    pub existing_repo: ExistingRepoPolicy,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            default_branch: DEFAULT_BRANCH.to_string(),
            author: DEFAULT_AUTHOR.to_string(),
            existing_repo: ExistingRepoPolicy::default(),
        }
    }
}

impl MockConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default branch name.
    pub fn default_branch(mut self, name: impl Into<String>) -> Self {
        self.default_branch = name.into();
        self
    }

    /// Set the commit author.
    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    /// Set the existing-repository policy.
    pub fn existing_repo(mut self, policy: ExistingRepoPolicy) -> Self {
        self.existing_repo = policy;
        self
    }
}
