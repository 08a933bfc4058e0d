//! core identifier and name types shared by the object graph and the
//! repository state.

use std::fmt;

use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// generate a fresh 40 hex digit object id.
///
/// ids are identities, not digests: two nodes with identical bytes still get
/// different ids. A ULID supplies the first 128 bits and the random half of a
/// second ULID pads it out to the width of a SHA-1.
pub fn generate_sha() -> String {
    let head = Ulid::new().0;
    let tail = Ulid::new().random() as u32;
    format!("{:032x}{:08x}", head, tail)
}

/// Identifier of a commit.
///
/// Keeps commit ids and node ids apart at the type level even though both are
/// opaque strings on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommitId(String);

impl CommitId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// a fresh, never before seen commit id
    pub fn generate() -> Self {
        Self(generate_sha())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// short form of the commit ID
    pub fn short(&self) -> &str {
        let end = self.0.char_indices().nth(7).map_or(self.0.len(), |(i, _)| i);
        &self.0[..end]
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for CommitId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Identifier of a tree node (directory or file).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn generate() -> Self {
        Self(generate_sha())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// what a tree node is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Regular,
    Directory,
}

impl NodeKind {
    /// the git object type the platform reports for this kind
    pub fn object_type(&self) -> &'static str {
        match self {
            NodeKind::Regular => "blob",
            NodeKind::Directory => "tree",
        }
    }

    /// the git file mode the platform reports for this kind
    pub fn mode(&self) -> &'static str {
        match self {
            NodeKind::Regular => "100644",
            NodeKind::Directory => "040000",
        }
    }

    pub fn is_dir(&self) -> bool {
        matches!(self, NodeKind::Directory)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.object_type())
    }
}

/// A validated repository key of the form `owner/name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RepoName {
    owner: String,
    name: String,
}

impl RepoName {
    /// parse and validate an `owner/name` key
    pub fn new(key: impl AsRef<str>) -> Result<Self, InvalidNameError> {
        let key = key.as_ref();
        if key.is_empty() {
            return Err(InvalidNameError::Empty);
        }

        let (owner, name) = key
            .split_once('/')
            .ok_or_else(|| InvalidNameError::MissingOwner(key.to_string()))?;

        if owner.is_empty() || name.is_empty() {
            return Err(InvalidNameError::MissingOwner(key.to_string()));
        }
        if let Some(position) = name.find('/') {
            return Err(InvalidNameError::InvalidCharacter {
                char: '/',
                position: owner.len() + 1 + position,
            });
        }
        if let Some((position, c)) = key.char_indices().find(|(_, c)| c.is_whitespace()) {
            return Err(InvalidNameError::InvalidCharacter { char: c, position });
        }

        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for RepoName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl TryFrom<String> for RepoName {
    type Error = InvalidNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RepoName> for String {
    fn from(value: RepoName) -> Self {
        value.to_string()
    }
}

/// error type for invalid repository keys
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidNameError {
    Empty,
    MissingOwner(String),
    InvalidCharacter { char: char, position: usize },
}

impl fmt::Display for InvalidNameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "name cannot be empty"),
            Self::MissingOwner(key) => write!(f, "'{}' is not of the form owner/name", key),
            Self::InvalidCharacter { char, position } => {
                write!(f, "invalid character '{}' at position {}", char, position)
            }
        }
    }
}

impl std::error::Error for InvalidNameError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_sha_shape() {
        let sha = generate_sha();
        assert_eq!(sha.len(), 40);
        assert!(sha.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_generated_ids_are_distinct() {
        let a = NodeId::generate();
        let b = NodeId::generate();
        assert_ne!(a, b);
        assert_ne!(CommitId::generate(), CommitId::generate());
    }

    #[test]
    fn test_commit_id_short() {
        let id = CommitId::new("0123456789abcdef");
        assert_eq!(id.short(), "0123456");
        assert_eq!(CommitId::new("abc").short(), "abc");
    }

    #[test]
    fn test_repo_name_valid() {
        let name = RepoName::new("f110/gh-test").unwrap();
        assert_eq!(name.owner(), "f110");
        assert_eq!(name.name(), "gh-test");
        assert_eq!(name.to_string(), "f110/gh-test");
    }

    #[test]
    fn test_repo_name_invalid() {
        assert_eq!(RepoName::new(""), Err(InvalidNameError::Empty));
        assert!(RepoName::new("no-owner").is_err());
        assert!(RepoName::new("/name").is_err());
        assert!(RepoName::new("owner/").is_err());
        assert!(RepoName::new("a/b/c").is_err());
        assert!(RepoName::new("a b/c").is_err());
    }

    #[test]
    fn test_node_kind_wire_names() {
        assert_eq!(NodeKind::Regular.object_type(), "blob");
        assert_eq!(NodeKind::Directory.object_type(), "tree");
        assert_eq!(NodeKind::Directory.mode(), "040000");
    }
}
