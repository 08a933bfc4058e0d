//!   Mock repository state and query engine.
//!
//!  This is the central component of the mock. One `Repository` owns
//!  everything a hosted repository holds: commits and their trees, the HEAD
//!  pointer, tags and branches, pull requests, issues and commit statuses.
//!  Every API call the routing layer receives ends up as exactly one method
//!  call here.
//!
//! Commits refer to their parents, and refs to their commits, by id; the
//! lookup always goes through the repository, so nothing outside it holds a
//! writable reference to its state.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::storage::blob::Blob;
use crate::storage::commit::{Commit, CommitInfo, CommitSpec};
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::refs::{RefSpec, RefTable, Reference};
use crate::storage::status::{self, CombinedStatus, NewStatus, Status};
use crate::storage::tree::{FileNode, NodeIndex, TreeListing};
use crate::storage::types::{CommitId, NodeId, RepoName};
use crate::tracker::{
    Comment, Issue, IssuePatch, NewIssue, NewPullRequest, Numbered, PullRequest,
    PullRequestPatch, State,
};

/// branch name that resolves to HEAD unless declared explicitly
pub const DEFAULT_BRANCH: &str = "main";

/// author recorded on commits that do not name one
pub const DEFAULT_AUTHOR: &str = "ghmock";

/// A mock repository.
///
/// Clone this to share it: clones are handles to the same state. Every
/// mutation holds the write lock for its whole duration, so concurrent
/// callers cannot race on numbering or HEAD. Queries hand out owned copies.
#[derive(Clone)]
pub struct Repository {
    inner: Arc<RepositoryInner>,
}

struct RepositoryInner {
    name: RepoName,
    default_branch: String,
    author: String,
    state: RwLock<RepoState>,
}

struct RepoState {
    commits: HashMap<CommitId, Commit>,
    /// insertion order, for listing
    commit_order: Vec<CommitId>,
    head: Option<CommitId>,
    /// node id -> (owning commit, position in its tree)
    nodes: HashMap<NodeId, (CommitId, NodeIndex)>,
    refs: RefTable,
    pulls: Numbered<PullRequest>,
    issues: Numbered<Issue>,
    last_comment_id: u64,
    last_status_id: u64,
}

impl RepoState {
    fn new() -> Self {
        Self {
            commits: HashMap::new(),
            commit_order: Vec::new(),
            head: None,
            nodes: HashMap::new(),
            refs: RefTable::default(),
            pulls: Numbered::new("pull request"),
            issues: Numbered::new("issue"),
            last_comment_id: 0,
            last_status_id: 0,
        }
    }

    fn head(&self) -> StorageResult<&Commit> {
        let id = self.head.as_ref().ok_or(StorageError::NoHead)?;
        self.commit(id)
    }

    fn commit(&self, id: &CommitId) -> StorageResult<&Commit> {
        self.commits
            .get(id)
            .ok_or_else(|| StorageError::not_found("commit", id))
    }

    /// follow any accepted ref spelling to its commit id
    fn resolve(&self, reference: &str, default_branch: &str) -> StorageResult<CommitId> {
        let id = match RefSpec::parse(reference) {
            RefSpec::Head => self.head()?.id.clone(),
            RefSpec::Tag(name) => self
                .refs
                .tag(name)
                .cloned()
                .ok_or_else(|| StorageError::not_found("tag", name))?,
            RefSpec::Branch(name) => match self.refs.branch(name) {
                Some(id) => id.clone(),
                None if name == default_branch => self.head()?.id.clone(),
                None => return Err(StorageError::not_found("branch", name)),
            },
            RefSpec::Bare(name) => {
                let literal = CommitId::new(name);
                if self.commits.contains_key(&literal) {
                    literal
                } else if let Some(id) = self.refs.branch(name) {
                    id.clone()
                } else if name == default_branch && self.head.is_some() {
                    self.head()?.id.clone()
                } else if let Some(id) = self.refs.tag(name) {
                    id.clone()
                } else {
                    return Err(StorageError::not_found("ref", name));
                }
            }
        };
        Ok(id)
    }

    fn node(&self, id: &NodeId) -> StorageResult<(&Commit, NodeIndex, &FileNode)> {
        let (commit_id, index) = self
            .nodes
            .get(id)
            .ok_or_else(|| StorageError::not_found("node", id))?;
        let commit = self.commit(commit_id)?;
        let node = commit
            .tree
            .node(*index)
            .ok_or_else(|| StorageError::not_found("node", id))?;
        Ok((commit, *index, node))
    }

    fn next_comment_id(&mut self) -> u64 {
        self.last_comment_id += 1;
        self.last_comment_id
    }

    fn next_status_id(&mut self) -> u64 {
        self.last_status_id += 1;
        self.last_status_id
    }
}

impl Repository {
    /// Create an empty repository.
    pub fn new(name: RepoName) -> Self {
        Self::with_settings(name, DEFAULT_BRANCH, DEFAULT_AUTHOR)
    }

    /// Create an empty repository with a custom default branch and author.
    pub fn with_settings(
        name: RepoName,
        default_branch: impl Into<String>,
        author: impl Into<String>,
    ) -> Self {
        Self {
            inner: Arc::new(RepositoryInner {
                name,
                default_branch: default_branch.into(),
                author: author.into(),
                state: RwLock::new(RepoState::new()),
            }),
        }
    }

    pub fn name(&self) -> &RepoName {
        &self.inner.name
    }

    pub fn default_branch(&self) -> &str {
        &self.inner.default_branch
    }

    /// Execute a function with read access to the state.
    fn with_state<F, T>(&self, f: F) -> StorageResult<T>
    where
        F: FnOnce(&RepoState) -> StorageResult<T>,
    {
        let state = self.inner.state.read();
        f(&state)
    }

    /// Execute a function with write access to the state.
    fn with_state_mut<F, T>(&self, f: F) -> StorageResult<T>
    where
        F: FnOnce(&mut RepoState) -> StorageResult<T>,
    {
        let mut state = self.inner.state.write();
        f(&mut state)
    }

    // ==================== Commits ====================

    /// Add a commit, building its tree from the declared files.
    ///
    /// Fails with `DuplicateId` if the commit id or an explicit file id is
    /// already used in this repository, and with `NotFound` if a parent does
    /// not exist. A commit flagged head takes HEAD over from the previous
    /// holder; the first commit of a repository becomes HEAD regardless.
    /// Nothing is stored unless every check passes.
    pub fn add_commit(&self, spec: CommitSpec) -> StorageResult<CommitInfo> {
        let commit = Commit::from_spec(spec, &self.inner.author)?;

        self.with_state_mut(|state| {
            if state.commits.contains_key(&commit.id) {
                return Err(StorageError::duplicate("commit", &commit.id));
            }
            if let Some(parent) = commit.parents.iter().find(|p| !state.commits.contains_key(*p)) {
                return Err(StorageError::not_found("commit", parent));
            }
            if let Some((_, node)) = commit
                .tree
                .indexed_nodes()
                .find(|(_, node)| state.nodes.contains_key(node.id()))
            {
                return Err(StorageError::duplicate("node", node.id()));
            }

            let mut commit = commit;
            let take_head = commit.is_head || state.head.is_none();
            if take_head {
                if let Some(previous) = state.head.take() {
                    if let Some(previous) = state.commits.get_mut(&previous) {
                        previous.is_head = false;
                    }
                }
                commit.is_head = true;
                state.head = Some(commit.id.clone());
            }

            for (index, node) in commit.tree.indexed_nodes() {
                state.nodes.insert(node.id().clone(), (commit.id.clone(), index));
            }

            debug!(
                repo = %self.inner.name,
                commit = %commit.id,
                nodes = commit.tree.node_count(),
                head = take_head,
                "added commit"
            );

            let info = commit.info();
            state.commit_order.push(commit.id.clone());
            state.commits.insert(commit.id.clone(), commit);
            Ok(info)
        })
    }

    /// Add several commits in order, stopping at the first failure.
    pub fn add_commits<I>(&self, specs: I) -> StorageResult<Vec<CommitInfo>>
    where
        I: IntoIterator<Item = CommitSpec>,
    {
        specs.into_iter().map(|spec| self.add_commit(spec)).collect()
    }

    /// Get the HEAD commit.
    pub fn head(&self) -> StorageResult<CommitInfo> {
        self.with_state(|state| Ok(state.head()?.info()))
    }

    /// Resolve a ref (`HEAD`, tag, branch or commit id) to its commit.
    pub fn resolve_ref(&self, reference: &str) -> StorageResult<CommitInfo> {
        trace!(repo = %self.inner.name, reference, "resolve ref");
        self.with_state(|state| {
            let id = state.resolve(reference, &self.inner.default_branch)?;
            Ok(state.commit(&id)?.info())
        })
    }

    /// Get a commit's metadata and root tree id.
    ///
    /// `reference` may be anything [`Repository::resolve_ref`] accepts; the
    /// platform's clients routinely ask for `HEAD`.
    pub fn get_commit(&self, reference: &str) -> StorageResult<CommitInfo> {
        self.resolve_ref(reference)
    }

    /// First-parent history from HEAD, newest first.
    pub fn history(&self, limit: Option<usize>) -> StorageResult<Vec<CommitInfo>> {
        self.with_state(|state| {
            let mut commits = Vec::new();
            let mut next = state.head.clone();
            while let Some(id) = next {
                if limit.is_some_and(|limit| commits.len() >= limit) {
                    break;
                }
                let commit = state.commit(&id)?;
                next = commit.parents.first().cloned();
                commits.push(commit.info());
            }
            Ok(commits)
        })
    }

    /// Every commit in the order it was added.
    pub fn list_commits(&self) -> Vec<CommitInfo> {
        let state = self.inner.state.read();
        state
            .commit_order
            .iter()
            .filter_map(|id| state.commits.get(id))
            .map(Commit::info)
            .collect()
    }

    pub fn commit_count(&self) -> usize {
        self.inner.state.read().commits.len()
    }

    // ==================== Trees and blobs ====================

    /// List a directory node.
    ///
    /// Only the direct children are returned unless `recursive` is set, in
    /// which case every descendant comes back with its path relative to the
    /// listed directory. Fails with `NotFound` for unknown ids and
    /// `NotADirectory` for file nodes.
    pub fn get_tree(&self, id: &NodeId, recursive: bool) -> StorageResult<TreeListing> {
        trace!(repo = %self.inner.name, tree = %id, recursive, "get tree");
        self.with_state(|state| {
            let (commit, index, _) = state.node(id)?;
            commit.tree.list(index, recursive)
        })
    }

    /// Get the raw content of a file node.
    pub fn get_blob(&self, id: &NodeId) -> StorageResult<Blob> {
        trace!(repo = %self.inner.name, blob = %id, "get blob");
        self.with_state(|state| {
            let (_, _, node) = state.node(id)?;
            if node.is_dir() {
                return Err(StorageError::NotAFile(id.to_string()));
            }
            Ok(Blob {
                sha: id.clone(),
                content: node.body().to_vec(),
            })
        })
    }

    // ==================== Refs ====================

    /// Look up a tag or branch ref.
    pub fn get_ref(&self, reference: &str) -> StorageResult<Reference> {
        self.with_state(|state| match RefSpec::parse(reference) {
            RefSpec::Tag(name) => {
                let sha = state.resolve(reference, &self.inner.default_branch)?;
                Ok(Reference::tag(name, sha))
            }
            RefSpec::Branch(name) => {
                let sha = state.resolve(reference, &self.inner.default_branch)?;
                Ok(Reference::branch(name, sha))
            }
            RefSpec::Head | RefSpec::Bare(_) => Err(StorageError::not_found("ref", reference)),
        })
    }

    /// Create a lightweight tag pointing at the commit `target` resolves to.
    pub fn create_tag(&self, name: &str, target: &str) -> StorageResult<Reference> {
        self.with_state_mut(|state| {
            let sha = state.resolve(target, &self.inner.default_branch)?;
            state.refs.create_tag(name, sha.clone())?;
            debug!(repo = %self.inner.name, tag = name, commit = %sha, "created tag");
            Ok(Reference::tag(name, sha))
        })
    }

    /// Create a branch pointing at the commit `target` resolves to.
    pub fn create_branch(&self, name: &str, target: &str) -> StorageResult<Reference> {
        self.with_state_mut(|state| {
            let sha = state.resolve(target, &self.inner.default_branch)?;
            state.refs.create_branch(name, sha.clone())?;
            debug!(repo = %self.inner.name, branch = name, commit = %sha, "created branch");
            Ok(Reference::branch(name, sha))
        })
    }

    pub fn list_tags(&self) -> Vec<Reference> {
        self.inner.state.read().refs.tags()
    }

    /// Declared branches, plus the default branch at HEAD when it was not
    /// declared and a HEAD exists.
    pub fn list_branches(&self) -> Vec<Reference> {
        let state = self.inner.state.read();
        let mut branches = state.refs.branches();
        let default = &self.inner.default_branch;
        if state.refs.branch(default).is_none() {
            if let Some(head) = &state.head {
                branches.push(Reference::branch(default, head.clone()));
                branches.sort_by(|a, b| a.name.cmp(&b.name));
            }
        }
        branches
    }

    // ==================== Statuses ====================

    /// Append a status to the commit `reference` resolves to.
    pub fn create_status(&self, reference: &str, new: NewStatus) -> StorageResult<Status> {
        self.with_state_mut(|state| {
            let sha = state.resolve(reference, &self.inner.default_branch)?;
            let id = state.next_status_id();
            let status = Status::from_new(id, new);
            let commit = state
                .commits
                .get_mut(&sha)
                .ok_or_else(|| StorageError::not_found("commit", &sha))?;
            commit.statuses.push(status.clone());
            debug!(
                repo = %self.inner.name,
                commit = %sha,
                state = %status.state,
                context = %status.context,
                "created status"
            );
            Ok(status)
        })
    }

    /// Statuses of the commit `reference` resolves to, newest first.
    pub fn list_statuses(&self, reference: &str) -> StorageResult<Vec<Status>> {
        self.with_state(|state| {
            let sha = state.resolve(reference, &self.inner.default_branch)?;
            Ok(state.commit(&sha)?.statuses.iter().rev().cloned().collect())
        })
    }

    /// The combined state of the commit `reference` resolves to.
    pub fn combined_status(&self, reference: &str) -> StorageResult<CombinedStatus> {
        self.with_state(|state| {
            let sha = state.resolve(reference, &self.inner.default_branch)?;
            let statuses = &state.commit(&sha)?.statuses;
            Ok(CombinedStatus {
                state: status::combined_state(statuses),
                total_count: statuses.len(),
                sha,
            })
        })
    }

    // ==================== Pull requests ====================

    /// Create a pull request, numbering it when no number is given.
    pub fn create_pull_request(&self, new: NewPullRequest) -> StorageResult<PullRequest> {
        let default_base = self.inner.default_branch.as_str();
        self.with_state_mut(|state| {
            let number = new.number;
            let pr = state
                .pulls
                .insert(number, |n| PullRequest::from_new(n, new, default_base))?;
            debug!(repo = %self.inner.name, number = pr.number, "created pull request");
            Ok(pr.clone())
        })
    }

    pub fn get_pull_request(&self, number: u64) -> StorageResult<PullRequest> {
        self.with_state(|state| state.pulls.get(number).cloned())
    }

    /// Apply the fields present in `patch`, leaving the rest untouched.
    pub fn edit_pull_request(&self, number: u64, patch: PullRequestPatch) -> StorageResult<PullRequest> {
        self.with_state_mut(|state| {
            let pr = state.pulls.get_mut(number)?;
            pr.apply(patch);
            debug!(repo = %self.inner.name, number, "edited pull request");
            Ok(pr.clone())
        })
    }

    /// Pull requests in number order, optionally only those in `filter` state.
    pub fn list_pull_requests(&self, filter: Option<State>) -> Vec<PullRequest> {
        let state = self.inner.state.read();
        state
            .pulls
            .list()
            .into_iter()
            .filter(|pr| filter.map_or(true, |s| pr.state == s))
            .cloned()
            .collect()
    }

    /// Append a comment to a pull request.
    pub fn add_pull_request_comment(&self, number: u64, body: &str) -> StorageResult<Comment> {
        self.with_state_mut(|state| {
            state.pulls.get(number)?;
            let id = state.next_comment_id();
            let pr = state.pulls.get_mut(number)?;
            let comment = pr.push_comment(Comment::new(id, body)).clone();
            debug!(repo = %self.inner.name, number, comment = id, "commented on pull request");
            Ok(comment)
        })
    }

    pub fn pull_request_comments(&self, number: u64) -> StorageResult<Vec<Comment>> {
        self.with_state(|state| Ok(state.pulls.get(number)?.comments.clone()))
    }

    // ==================== Issues ====================

    /// Create an issue, numbering it when no number is given.
    pub fn create_issue(&self, new: NewIssue) -> StorageResult<Issue> {
        self.with_state_mut(|state| {
            let number = new.number;
            let issue = state.issues.insert(number, |n| Issue::from_new(n, new))?;
            debug!(repo = %self.inner.name, number = issue.number, "created issue");
            Ok(issue.clone())
        })
    }

    pub fn get_issue(&self, number: u64) -> StorageResult<Issue> {
        self.with_state(|state| state.issues.get(number).cloned())
    }

    /// Apply the fields present in `patch`, leaving the rest untouched.
    pub fn edit_issue(&self, number: u64, patch: IssuePatch) -> StorageResult<Issue> {
        self.with_state_mut(|state| {
            let issue = state.issues.get_mut(number)?;
            issue.apply(patch);
            debug!(repo = %self.inner.name, number, "edited issue");
            Ok(issue.clone())
        })
    }

    pub fn list_issues(&self, filter: Option<State>) -> Vec<Issue> {
        let state = self.inner.state.read();
        state
            .issues
            .list()
            .into_iter()
            .filter(|issue| filter.map_or(true, |s| issue.state == s))
            .cloned()
            .collect()
    }

    /// Append a comment to an issue.
    pub fn add_issue_comment(&self, number: u64, body: &str) -> StorageResult<Comment> {
        self.with_state_mut(|state| {
            state.issues.get(number)?;
            let id = state.next_comment_id();
            let issue = state.issues.get_mut(number)?;
            let comment = issue.push_comment(Comment::new(id, body)).clone();
            debug!(repo = %self.inner.name, number, comment = id, "commented on issue");
            Ok(comment)
        })
    }

    pub fn issue_comments(&self, number: u64) -> StorageResult<Vec<Comment>> {
        self.with_state(|state| Ok(state.issues.get(number)?.comments.clone()))
    }

    /// Get repository statistics.
    pub fn stats(&self) -> RepositoryStats {
        let state = self.inner.state.read();
        RepositoryStats {
            commits: state.commits.len(),
            nodes: state.nodes.len(),
            tags: state.refs.tags().len(),
            pull_requests: state.pulls.len(),
            issues: state.issues.len(),
        }
    }
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("name", &self.inner.name)
            .field("stats", &self.stats())
            .finish()
    }
}

/// Repository statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepositoryStats {
    pub commits: usize,
    /// tree nodes across all commits, roots included
    pub nodes: usize,
    pub tags: usize,
    pub pull_requests: usize,
    pub issues: usize,
}
