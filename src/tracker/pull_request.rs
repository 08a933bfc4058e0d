//! Pull requests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::RepoName;
use crate::tracker::comment::Comment;
use crate::tracker::issue::State;

/// one side of a pull request
///
/// `repo` is set when the branch lives in another repository (a fork).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchRef {
    #[serde(default)]
    pub repo: Option<RepoName>,
    #[serde(rename = "ref")]
    pub name: String,
}

impl BranchRef {
    /// a branch in the pull request's own repository
    pub fn local(name: impl Into<String>) -> Self {
        Self {
            repo: None,
            name: name.into(),
        }
    }

    pub fn new(repo: Option<RepoName>, name: impl Into<String>) -> Self {
        Self {
            repo,
            name: name.into(),
        }
    }

    pub fn is_fork(&self) -> bool {
        self.repo.is_some()
    }
}

/// builder-style pull request declaration, also the input of create
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPullRequest {
    #[serde(default)]
    pub number: Option<u64>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    /// defaults to the repository's default branch
    #[serde(default)]
    pub base: Option<BranchRef>,
    #[serde(default)]
    pub head: Option<BranchRef>,
}

impl NewPullRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn number(mut self, number: u64) -> Self {
        self.number = Some(number);
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn base(mut self, name: impl Into<String>) -> Self {
        self.base = Some(BranchRef::local(name));
        self
    }

    /// set the head branch, optionally in another repository
    pub fn head(mut self, repo: Option<RepoName>, name: impl Into<String>) -> Self {
        self.head = Some(BranchRef::new(repo, name));
        self
    }
}

/// fields to change on a pull request; absent fields stay as they are
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub base: Option<BranchRef>,
    #[serde(default)]
    pub head: Option<BranchRef>,
    #[serde(default)]
    pub state: Option<State>,
}

impl PullRequestPatch {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn base(mut self, name: impl Into<String>) -> Self {
        self.base = Some(BranchRef::local(name));
        self
    }

    pub fn head(mut self, head: BranchRef) -> Self {
        self.head = Some(head);
        self
    }

    pub fn state(mut self, state: State) -> Self {
        self.state = Some(state);
        self
    }
}

/// A pull request as the repository stores it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PullRequest {
    pub number: u64,
    pub title: String,
    pub body: String,
    pub base: BranchRef,
    pub head: BranchRef,
    pub state: State,
    /// oldest first
    pub comments: Vec<Comment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PullRequest {
    pub(crate) fn from_new(number: u64, new: NewPullRequest, default_base: &str) -> Self {
        let now = Utc::now();
        Self {
            number,
            title: new.title,
            body: new.body,
            base: new.base.unwrap_or_else(|| BranchRef::local(default_base)),
            head: new.head.unwrap_or_default(),
            state: State::Open,
            comments: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub(crate) fn apply(&mut self, patch: PullRequestPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(body) = patch.body {
            self.body = body;
        }
        if let Some(base) = patch.base {
            self.base = base;
        }
        if let Some(head) = patch.head {
            self.head = head;
        }
        if let Some(state) = patch.state {
            self.state = state;
        }
        self.updated_at = Utc::now();
    }

    pub(crate) fn push_comment(&mut self, comment: Comment) -> &Comment {
        self.updated_at = comment.created_at;
        self.comments.push(comment);
        &self.comments[self.comments.len() - 1]
    }
}
