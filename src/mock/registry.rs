//! Repository registry.

use std::collections::HashMap;

use parking_lot::RwLock;
use tracing::debug;

use crate::mock::config::{ExistingRepoPolicy, MockConfig};
use crate::mock::fixture::RepositoryFixture;
use crate::storage::{RepoName, Repository, StorageError, StorageResult};

/// The mock platform: every repository a test has declared.
///
/// Thread-safe; repositories handed out are shared handles.
pub struct Mock {
    config: MockConfig,
    repos: RwLock<HashMap<RepoName, Repository>>,
}

impl Default for Mock {
    fn default() -> Self {
        Self::new()
    }
}

impl Mock {
    pub fn new() -> Self {
        Self::with_config(MockConfig::default())
    }

    pub fn with_config(config: MockConfig) -> Self {
        Self {
            config,
            repos: RwLock::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &MockConfig {
        &self.config
    }

    /// Register the repository `key` (`owner/name`) or, depending on the
    /// configured policy, hand out the one already registered.
    pub fn repository(&self, key: &str) -> StorageResult<Repository> {
        let name = RepoName::new(key)?;
        let mut repos = self.repos.write();

        if let Some(existing) = repos.get(&name) {
            return match self.config.existing_repo {
                ExistingRepoPolicy::Reuse => Ok(existing.clone()),
                ExistingRepoPolicy::Fail => Err(StorageError::RepositoryExists(name.to_string())),
            };
        }

        let repo = Repository::with_settings(
            name.clone(),
            self.config.default_branch.clone(),
            self.config.author.clone(),
        );
        debug!(repo = %name, "registered repository");
        repos.insert(name, repo.clone());
        Ok(repo)
    }

    /// Look up a registered repository.
    pub fn get(&self, key: &str) -> StorageResult<Repository> {
        let name = RepoName::new(key)?;
        self.repos
            .read()
            .get(&name)
            .cloned()
            .ok_or_else(|| StorageError::not_found("repository", name))
    }

    /// Look up a repository by its owner and name as they appear in an API
    /// path.
    pub fn lookup(&self, owner: &str, repo: &str) -> StorageResult<Repository> {
        self.get(&format!("{}/{}", owner, repo))
    }

    pub fn contains(&self, key: &str) -> bool {
        RepoName::new(key).is_ok_and(|name| self.repos.read().contains_key(&name))
    }

    /// Registered repository names, sorted.
    pub fn names(&self) -> Vec<RepoName> {
        let mut names: Vec<RepoName> = self.repos.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Register `key` and seed it from a fixture.
    pub fn load_fixture(&self, key: &str, fixture: RepositoryFixture) -> StorageResult<Repository> {
        let repo = self.repository(key)?;
        fixture.apply(&repo)?;
        Ok(repo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{CommitSpec, FileSpec, NewStatus, StatusState, TagSpec};
    use crate::tracker::{NewIssue, NewPullRequest, PullRequestPatch};

    #[test]
    fn test_repository_is_idempotent_by_default() {
        let mock = Mock::new();
        let a = mock.repository("f110/gh-test").unwrap();
        a.create_issue(NewIssue::new()).unwrap();

        let b = mock.repository("f110/gh-test").unwrap();
        assert_eq!(b.stats().issues, 1);
        assert_eq!(mock.names().len(), 1);
    }

    #[test]
    fn test_fail_policy() {
        let mock = Mock::with_config(MockConfig::new().existing_repo(ExistingRepoPolicy::Fail));
        mock.repository("f110/gh-test").unwrap();
        let result = mock.repository("f110/gh-test");
        assert!(matches!(result, Err(StorageError::RepositoryExists(_))));
    }

    #[test]
    fn test_invalid_key() {
        let mock = Mock::new();
        assert!(matches!(
            mock.repository("gh-test"),
            Err(StorageError::InvalidRepoName(_))
        ));
        assert!(!mock.contains("gh-test"));
    }

    #[test]
    fn test_get_and_lookup() {
        let mock = Mock::new();
        assert!(mock.get("f110/gh-test").unwrap_err().is_not_found());
        mock.repository("f110/gh-test").unwrap();
        assert!(mock.contains("f110/gh-test"));
        assert_eq!(mock.lookup("f110", "gh-test").unwrap().name().name(), "gh-test");
    }

    #[test]
    fn test_config_reaches_repositories() {
        let mock = Mock::with_config(MockConfig::new().default_branch("master").author("ci"));
        let repo = mock.repository("f110/gh-test").unwrap();
        let head = repo.add_commit(CommitSpec::new()).unwrap();

        assert_eq!(head.author, "ci");
        assert_eq!(repo.resolve_ref("master").unwrap().id, head.id);
        assert!(repo.resolve_ref("main").unwrap_err().is_not_found());
        let pr = repo.create_pull_request(NewPullRequest::new()).unwrap();
        assert_eq!(pr.base.name, "master");
    }

    #[test]
    fn test_end_to_end_session() {
        let mock = Mock::new();
        let fixture = RepositoryFixture::new()
            .commit(
                CommitSpec::new()
                    .head()
                    .files(vec![
                        FileSpec::new(".github/CODEOWNERS"),
                        FileSpec::new("/docs/sample/README.md"),
                        FileSpec::new("README.md").body("README"),
                    ]),
            )
            .tag(TagSpec::new("v1.0.0"))
            .pull_request(
                NewPullRequest::new()
                    .number(1)
                    .title("feature")
                    .body("PR description")
                    .base("master")
                    .head(None, "feature-1"),
            );
        mock.load_fixture("f110/gh-test", fixture).unwrap();

        // what a routing layer would do per request
        let repo = mock.lookup("f110", "gh-test").unwrap();
        let commit = repo.get_commit("HEAD").unwrap();
        let root = repo.get_tree(&commit.tree_id, false).unwrap();
        let readme = root.entry("README.md").unwrap();
        assert_eq!(repo.get_blob(&readme.sha).unwrap().text(), Some("README"));

        let reference = repo.get_ref("tags/v1.0.0").unwrap();
        assert_eq!(reference.sha, commit.id);

        let status = repo
            .create_status("HEAD", NewStatus::new(StatusState::Success))
            .unwrap();
        assert_eq!(status.state.as_str(), "success");

        let pr = repo
            .edit_pull_request(1, PullRequestPatch::default().base("main"))
            .unwrap();
        assert_eq!(pr.title, "feature");
        assert_eq!(pr.base.name, "main");

        repo.add_pull_request_comment(1, "Comment").unwrap();
        assert_eq!(mock.get("f110/gh-test").unwrap().get_pull_request(1).unwrap().comments.len(), 1);
    }
}
