//! Issues.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::tracker::comment::Comment;

/// open/closed state of an issue or pull request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum State {
    #[default]
    Open,
    Closed,
}

impl State {
    pub fn is_open(&self) -> bool {
        matches!(self, State::Open)
    }
}

/// builder-style issue declaration, also the input of create-issue
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewIssue {
    /// explicit number; the next in sequence when absent
    #[serde(default)]
    pub number: Option<u64>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
}

impl NewIssue {
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
}

/// fields to change on an issue; absent fields stay as they are
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuePatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub state: Option<State>,
}

impl IssuePatch {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn state(mut self, state: State) -> Self {
        self.state = Some(state);
        self
    }
}

/// An issue as the repository stores it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub number: u64,
    pub title: String,
    pub body: String,
    pub state: State,
    /// oldest first
    pub comments: Vec<Comment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Issue {
    pub(crate) fn from_new(number: u64, new: NewIssue) -> Self {
        let now = Utc::now();
        Self {
            number,
            title: new.title,
            body: new.body,
            state: State::Open,
            comments: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub(crate) fn apply(&mut self, patch: IssuePatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(body) = patch.body {
            self.body = body;
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_touches_only_present_fields() {
        let mut issue = Issue::from_new(1, NewIssue::new().title("bug").body("it broke"));
        issue.apply(IssuePatch::default().state(State::Closed));
        assert_eq!(issue.title, "bug");
        assert_eq!(issue.body, "it broke");
        assert_eq!(issue.state, State::Closed);

        issue.apply(IssuePatch::default().title("renamed"));
        assert_eq!(issue.title, "renamed");
        assert_eq!(issue.state, State::Closed);
    }

    #[test]
    fn test_comments_keep_order() {
        let mut issue = Issue::from_new(1, NewIssue::new());
        issue.push_comment(Comment::new(1, "first"));
        let second = issue.push_comment(Comment::new(2, "second")).clone();
        assert_eq!(second.body, "second");
        let bodies: Vec<&str> = issue.comments.iter().map(|c| c.body.as_str()).collect();
        assert_eq!(bodies, vec!["first", "second"]);
    }

    #[test]
    fn test_new_issue_from_json() {
        let new: NewIssue = serde_json::from_str(r#"{"number": 4, "title": "x"}"#).unwrap();
        assert_eq!(new.number, Some(4));
        assert_eq!(new.title, "x");
        assert!(new.body.is_empty());
    }
}
