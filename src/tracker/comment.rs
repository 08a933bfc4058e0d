//! Conversation comments.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// a comment on a pull request or issue
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comment {
    /// unique across the whole repository
    pub id: u64,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub(crate) fn new(id: u64, body: impl Into<String>) -> Self {
        Self {
            id,
            body: body.into(),
            created_at: Utc::now(),
        }
    }
}
