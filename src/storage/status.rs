//! Commit statuses.
//!
//! Statuses are the one part of a commit that changes after it is added:
//! each create-status call appends a record. Nothing is deduplicated or
//! capped.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::error::StorageError;
use crate::storage::types::CommitId;

/// state of a commit status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusState {
    #[default]
    Pending,
    Success,
    Failure,
    Error,
}

impl StatusState {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusState::Pending => "pending",
            StatusState::Success => "success",
            StatusState::Failure => "failure",
            StatusState::Error => "error",
        }
    }
}

impl fmt::Display for StatusState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatusState {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(StatusState::Pending),
            "success" => Ok(StatusState::Success),
            "failure" => Ok(StatusState::Failure),
            "error" => Ok(StatusState::Error),
            other => Err(StorageError::InvalidStatusState(other.to_string())),
        }
    }
}

/// input of a create-status call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewStatus {
    pub state: StatusState,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub target_url: Option<String>,
    #[serde(default = "default_context")]
    pub context: String,
}

fn default_context() -> String {
    "default".to_string()
}

impl NewStatus {
    pub fn new(state: StatusState) -> Self {
        Self {
            state,
            description: None,
            target_url: None,
            context: default_context(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn target_url(mut self, url: impl Into<String>) -> Self {
        self.target_url = Some(url.into());
        self
    }

    pub fn context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }
}

/// a stored status record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Status {
    pub id: u64,
    pub state: StatusState,
    pub description: Option<String>,
    pub target_url: Option<String>,
    pub context: String,
    pub created_at: DateTime<Utc>,
}

impl Status {
    pub(crate) fn from_new(id: u64, new: NewStatus) -> Self {
        Self {
            id,
            state: new.state,
            description: new.description,
            target_url: new.target_url,
            context: new.context,
            created_at: Utc::now(),
        }
    }
}

/// the combined state of a commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CombinedStatus {
    pub sha: CommitId,
    pub state: StatusState,
    /// number of statuses recorded for the commit, superseded ones included
    pub total_count: usize,
}

/// reduce a commit's statuses (oldest first) to one state
///
/// Only the latest status of each context counts. Any failure or error wins,
/// then any pending; no statuses at all reads as pending.
pub fn combined_state(statuses: &[Status]) -> StatusState {
    let mut latest: Vec<&Status> = Vec::new();
    for status in statuses.iter().rev() {
        if !latest.iter().any(|s| s.context == status.context) {
            latest.push(status);
        }
    }

    if latest.is_empty() {
        return StatusState::Pending;
    }
    if latest.iter().any(|s| s.state == StatusState::Error) {
        return StatusState::Error;
    }
    if latest.iter().any(|s| s.state == StatusState::Failure) {
        return StatusState::Failure;
    }
    if latest.iter().any(|s| s.state == StatusState::Pending) {
        return StatusState::Pending;
    }
    StatusState::Success
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(id: u64, state: StatusState, context: &str) -> Status {
        Status::from_new(id, NewStatus::new(state).context(context))
    }

    #[test]
    fn test_parse_state() {
        assert_eq!("success".parse::<StatusState>().unwrap(), StatusState::Success);
        assert!(matches!(
            "green".parse::<StatusState>(),
            Err(StorageError::InvalidStatusState(s)) if s == "green"
        ));
    }

    #[test]
    fn test_new_status_from_json_defaults() {
        let new: NewStatus = serde_json::from_str(r#"{"state": "success"}"#).unwrap();
        assert_eq!(new.state, StatusState::Success);
        assert_eq!(new.context, "default");
        assert!(new.description.is_none());
    }

    #[test]
    fn test_combined_empty_is_pending() {
        assert_eq!(combined_state(&[]), StatusState::Pending);
    }

    #[test]
    fn test_combined_latest_per_context_wins() {
        let statuses = vec![
            status(1, StatusState::Failure, "ci"),
            status(2, StatusState::Success, "ci"),
            status(3, StatusState::Success, "lint"),
        ];
        assert_eq!(combined_state(&statuses), StatusState::Success);
    }

    #[test]
    fn test_combined_failure_and_pending() {
        let statuses = vec![
            status(1, StatusState::Pending, "ci"),
            status(2, StatusState::Failure, "lint"),
        ];
        assert_eq!(combined_state(&statuses), StatusState::Failure);

        let statuses = vec![
            status(1, StatusState::Pending, "ci"),
            status(2, StatusState::Success, "lint"),
        ];
        assert_eq!(combined_state(&statuses), StatusState::Pending);
    }
}
