//!  Tag and branch references.
//!
//! refs are names pointing at commits. Resolution accepts the spellings the
//! platform's API accepts:
//! - `HEAD`
//! - `tags/<name>` or `refs/tags/<name>`
//! - `heads/<name>` or `refs/heads/<name>`
//! - anything else: a literal commit id, then a branch, then a tag
//!
//! This module parses ref strings and stores the name tables; following a ref
//! to its commit happens in the repository, which owns the commits.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::storage::error::{StorageError, StorageResult};
use crate::storage::types::CommitId;

/// the sentinel ref naming the HEAD commit
pub const HEAD: &str = "HEAD";

/// A parsed ref string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefSpec<'a> {
    Head,
    Tag(&'a str),
    Branch(&'a str),
    /// unqualified: commit id, branch or tag
    Bare(&'a str),
}

impl<'a> RefSpec<'a> {
    pub fn parse(reference: &'a str) -> Self {
        if reference == HEAD {
            return RefSpec::Head;
        }
        let reference = reference.strip_prefix("refs/").unwrap_or(reference);
        if let Some(name) = reference.strip_prefix("tags/") {
            RefSpec::Tag(name)
        } else if let Some(name) = reference.strip_prefix("heads/") {
            RefSpec::Branch(name)
        } else {
            RefSpec::Bare(reference)
        }
    }
}

/// a fixture's tag declaration: a name and the ref it points at
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagSpec {
    pub name: String,
    /// any ref the repository can resolve, usually a commit id or `HEAD`
    #[serde(default = "head_ref")]
    pub commit: String,
}

impl TagSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            commit: head_ref(),
        }
    }

    pub fn commit(mut self, reference: impl Into<String>) -> Self {
        self.commit = reference.into();
        self
    }
}

/// a fixture's branch declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchSpec {
    pub name: String,
    #[serde(default = "head_ref")]
    pub commit: String,
}

impl BranchSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            commit: head_ref(),
        }
    }

    pub fn commit(mut self, reference: impl Into<String>) -> Self {
        self.commit = reference.into();
        self
    }
}

fn head_ref() -> String {
    HEAD.to_string()
}

/// result of a get-ref query
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reference {
    /// fully qualified, e.g. `refs/tags/v1.0.0`
    #[serde(rename = "ref")]
    pub name: String,
    /// the commit the ref points at
    pub sha: CommitId,
    /// always `commit`: tags are lightweight
    #[serde(rename = "type")]
    pub object_type: &'static str,
}

impl Reference {
    pub(crate) fn tag(name: &str, sha: CommitId) -> Self {
        Self {
            name: format!("refs/tags/{}", name),
            sha,
            object_type: "commit",
        }
    }

    pub(crate) fn branch(name: &str, sha: CommitId) -> Self {
        Self {
            name: format!("refs/heads/{}", name),
            sha,
            object_type: "commit",
        }
    }
}

/// tag and branch name tables
#[derive(Debug, Default, Clone)]
pub(crate) struct RefTable {
    tags: HashMap<String, CommitId>,
    branches: HashMap<String, CommitId>,
}

impl RefTable {
    pub fn tag(&self, name: &str) -> Option<&CommitId> {
        self.tags.get(name)
    }

    pub fn branch(&self, name: &str) -> Option<&CommitId> {
        self.branches.get(name)
    }

    pub fn create_tag(&mut self, name: &str, target: CommitId) -> StorageResult<()> {
        if self.tags.contains_key(name) {
            return Err(StorageError::duplicate("tag", name));
        }
        self.tags.insert(name.to_string(), target);
        Ok(())
    }

    pub fn create_branch(&mut self, name: &str, target: CommitId) -> StorageResult<()> {
        if self.branches.contains_key(name) {
            return Err(StorageError::duplicate("branch", name));
        }
        self.branches.insert(name.to_string(), target);
        Ok(())
    }

    /// all tags, by name
    pub fn tags(&self) -> Vec<Reference> {
        let mut refs: Vec<Reference> = self
            .tags
            .iter()
            .map(|(name, sha)| Reference::tag(name, sha.clone()))
            .collect();
        refs.sort_by(|a, b| a.name.cmp(&b.name));
        refs
    }

    /// all explicitly declared branches, by name
    pub fn branches(&self) -> Vec<Reference> {
        let mut refs: Vec<Reference> = self
            .branches
            .iter()
            .map(|(name, sha)| Reference::branch(name, sha.clone()))
            .collect();
        refs.sort_by(|a, b| a.name.cmp(&b.name));
        refs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_spellings() {
        assert_eq!(RefSpec::parse("HEAD"), RefSpec::Head);
        assert_eq!(RefSpec::parse("tags/v1.0.0"), RefSpec::Tag("v1.0.0"));
        assert_eq!(RefSpec::parse("refs/tags/v1.0.0"), RefSpec::Tag("v1.0.0"));
        assert_eq!(RefSpec::parse("heads/main"), RefSpec::Branch("main"));
        assert_eq!(RefSpec::parse("refs/heads/feature/x"), RefSpec::Branch("feature/x"));
        assert_eq!(RefSpec::parse("main"), RefSpec::Bare("main"));
        assert_eq!(RefSpec::parse("head"), RefSpec::Bare("head"));
    }

    #[test]
    fn test_duplicate_tag_rejected() {
        let mut table = RefTable::default();
        table.create_tag("v1", CommitId::new("a")).unwrap();
        let result = table.create_tag("v1", CommitId::new("b"));
        assert!(matches!(result, Err(StorageError::DuplicateId { kind: "tag", .. })));
        assert_eq!(table.tag("v1"), Some(&CommitId::new("a")));
    }

    #[test]
    fn test_tags_and_branches_are_separate() {
        let mut table = RefTable::default();
        table.create_tag("same", CommitId::new("a")).unwrap();
        table.create_branch("same", CommitId::new("b")).unwrap();
        assert_eq!(table.tag("same"), Some(&CommitId::new("a")));
        assert_eq!(table.branch("same"), Some(&CommitId::new("b")));
    }

    #[test]
    fn test_listing_sorted_and_qualified() {
        let mut table = RefTable::default();
        table.create_tag("v2", CommitId::new("b")).unwrap();
        table.create_tag("v1", CommitId::new("a")).unwrap();
        let names: Vec<String> = table.tags().into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["refs/tags/v1", "refs/tags/v2"]);
        assert_eq!(table.tags()[0].object_type, "commit");
    }

    #[test]
    fn test_tag_spec_defaults_to_head() {
        let spec: TagSpec = serde_json::from_str(r#"{"name": "v1.0.0"}"#).unwrap();
        assert_eq!(spec.commit, "HEAD");
        assert_eq!(TagSpec::new("v1").commit("abc").commit, "abc");
    }
}
