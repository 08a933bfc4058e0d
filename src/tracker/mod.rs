//! Pull requests and issues.
//!
//! Both are numbered conversations owned by a repository: a number unique
//! within its kind, a few editable fields, and an append-only comment list.
//! Pull requests and issues number independently.

mod comment;
mod issue;
mod numbering;
mod pull_request;

pub use comment::Comment;
pub use issue::{Issue, IssuePatch, NewIssue, State};
pub(crate) use numbering::Numbered;
pub use pull_request::{BranchRef, NewPullRequest, PullRequest, PullRequestPatch};
