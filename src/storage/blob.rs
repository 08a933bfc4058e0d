//! Declared files and blob contents.
//!
//! A commit is declared with a flat list of [`FileSpec`]s, each a full
//! slash separated path. The tree builder turns that list into directory
//! and file nodes; a file node's bytes are handed back out as a [`Blob`].

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::storage::error::{StorageError, StorageResult};
use crate::storage::types::NodeId;

/// a file as a fixture declares it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSpec {
    /// full path, e.g. `.github/CODEOWNERS`
    pub path: String,
    /// file content; fixtures write it as text
    #[serde(default, serialize_with = "body_text::serialize", deserialize_with = "body_text::deserialize")]
    pub body: Vec<u8>,
    /// explicit node id; generated when absent
    #[serde(default)]
    pub id: Option<NodeId>,
}

impl FileSpec {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// set the file content
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// pin the node id instead of generating one
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(NodeId::new(id));
        self
    }

    /// split the path into its non-empty segments
    ///
    /// Leading, trailing and doubled slashes are dropped, so
    /// `/docs//README.md` is `["docs", "README.md"]`.
    pub fn segments(&self) -> StorageResult<Vec<&str>> {
        split_path(&self.path)
    }
}

pub(crate) fn split_path(path: &str) -> StorageResult<Vec<&str>> {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if segments.is_empty() {
        return Err(StorageError::InvalidPath(path.to_string()));
    }
    Ok(segments)
}

/// raw content of a file node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Blob {
    pub sha: NodeId,
    pub content: Vec<u8>,
}

impl Blob {
    pub fn size(&self) -> usize {
        self.content.len()
    }

    /// the content as text, if it is valid UTF-8
    pub fn text(&self) -> Option<&str> {
        std::str::from_utf8(&self.content).ok()
    }
}

mod body_text {
    use super::*;

    pub fn serialize<S: Serializer>(body: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&String::from_utf8_lossy(body))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        String::deserialize(deserializer).map(String::into_bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segments_skip_empty() {
        let file = FileSpec::new("/docs//sample/README.md");
        assert_eq!(file.segments().unwrap(), vec!["docs", "sample", "README.md"]);
    }

    #[test]
    fn test_segments_rejects_empty_path() {
        assert!(matches!(
            FileSpec::new("//").segments(),
            Err(StorageError::InvalidPath(_))
        ));
        assert!(FileSpec::new("").segments().is_err());
    }

    #[test]
    fn test_file_spec_from_json() {
        let file: FileSpec =
            serde_json::from_str(r#"{"path": "README.md", "body": "README", "id": "abc"}"#).unwrap();
        assert_eq!(file.body, b"README");
        assert_eq!(file.id, Some(NodeId::new("abc")));

        let bare: FileSpec = serde_json::from_str(r#"{"path": ".github/CODEOWNERS"}"#).unwrap();
        assert!(bare.body.is_empty());
        assert!(bare.id.is_none());
    }

    #[test]
    fn test_blob_text() {
        let blob = Blob {
            sha: NodeId::new("1"),
            content: b"README".to_vec(),
        };
        assert_eq!(blob.text(), Some("README"));
        assert_eq!(blob.size(), 6);
    }
}
