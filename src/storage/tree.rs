//!  tree construction and level-by-level tree queries.
//!
//! A fixture declares a commit's files as a flat list of full paths. The
//! platform's Git Data API, however, exposes a commit as a root tree whose
//! entries are the *direct* children only; a client discovers deeper levels
//! by asking for each subtree by id. This module bridges the two:
//!
//! - [`TreeBuilder`] expands the flat list into a hierarchy of directory and
//!   file nodes, deduplicating directories by name within a level
//! - [`Tree`] is the immutable result, an arena of nodes rooted at an
//!   empty-named directory, answering listing queries
//!
//! sibling order is insertion order. Nothing here sorts.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::storage::blob::{split_path, FileSpec};
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::types::{NodeId, NodeKind};

/// position of a node inside its [`Tree`]
pub(crate) type NodeIndex = usize;

const ROOT: NodeIndex = 0;

/// a directory or file in a commit's tree
#[derive(Debug, Clone)]
pub struct FileNode {
    id: NodeId,
    /// the path segment at this level, empty for the root
    name: String,
    kind: NodeKind,
    body: Vec<u8>,
    children: Vec<NodeIndex>,
    /// name -> child, directories only
    by_name: HashMap<String, NodeIndex>,
}

impl FileNode {
    fn directory(id: NodeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            kind: NodeKind::Directory,
            body: Vec::new(),
            children: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    fn regular(id: NodeId, name: impl Into<String>, body: Vec<u8>) -> Self {
        Self {
            id,
            name: name.into(),
            kind: NodeKind::Regular,
            body,
            children: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    pub fn id(&self) -> &NodeId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// file content, empty for directories
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn is_dir(&self) -> bool {
        self.kind.is_dir()
    }
}

/// Builds a commit's tree from its declared files.
///
/// # Usage Pattern
///
/// ```ignore
/// let mut builder = TreeBuilder::new();
/// builder.insert(FileSpec::new("README.md").body("README"))?;
/// builder.insert(FileSpec::new(".github/CODEOWNERS"))?;
/// let tree = builder.build();
/// ```
///
/// each insert either succeeds completely or leaves the builder untouched.
#[derive(Debug)]
pub struct TreeBuilder {
    nodes: Vec<FileNode>,
    ids: HashSet<NodeId>,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeBuilder {
    /// start with a lone root directory
    pub fn new() -> Self {
        let root = NodeId::generate();
        Self {
            ids: HashSet::from([root.clone()]),
            nodes: vec![FileNode::directory(root, "")],
        }
    }

    /// build a tree from a whole file list, stopping at the first bad entry
    pub fn from_files<I>(files: I) -> StorageResult<Tree>
    where
        I: IntoIterator<Item = FileSpec>,
    {
        let mut builder = Self::new();
        for file in files {
            builder.insert(file)?;
        }
        Ok(builder.build())
    }

    /// add one declared file, creating missing parent directories
    ///
    /// Fails with `StructuralConflict` if a parent segment is an existing
    /// file or the file's own name is an existing directory, with
    /// `DuplicatePath` if the same path was already inserted, and with
    /// `DuplicateId` if an explicit id is already used in this tree.
    pub fn insert(&mut self, file: FileSpec) -> StorageResult<NodeId> {
        let FileSpec { path, body, id } = file;
        let segments = split_path(&path)?;
        let (leaf, dirs) = segments
            .split_last()
            .ok_or_else(|| StorageError::InvalidPath(path.clone()))?;

        // walk the part of the path that already exists
        let mut current = ROOT;
        let mut depth = 0;
        while depth < dirs.len() {
            let Some(&child) = self.nodes[current].by_name.get(dirs[depth]) else {
                break;
            };
            if !self.nodes[child].is_dir() {
                return Err(StorageError::conflict(
                    dirs[..=depth].join("/"),
                    "path continues below an existing file",
                ));
            }
            current = child;
            depth += 1;
        }

        if depth == dirs.len() {
            if let Some(&existing) = self.nodes[current].by_name.get(*leaf) {
                let path = segments.join("/");
                return Err(if self.nodes[existing].is_dir() {
                    StorageError::conflict(path, "a directory with this name already exists")
                } else {
                    StorageError::DuplicatePath(path)
                });
            }
        }

        let id = match id {
            Some(id) if self.ids.contains(&id) => return Err(StorageError::duplicate("node", id)),
            Some(id) => id,
            None => NodeId::generate(),
        };

        // nothing below can fail, so the builder only changes on success
        for dir in &dirs[depth..] {
            current = self.attach(current, FileNode::directory(NodeId::generate(), *dir));
        }
        self.attach(current, FileNode::regular(id.clone(), *leaf, body));

        Ok(id)
    }

    fn attach(&mut self, parent: NodeIndex, node: FileNode) -> NodeIndex {
        let index = self.nodes.len();
        self.ids.insert(node.id.clone());
        self.nodes[parent].by_name.insert(node.name.clone(), index);
        self.nodes[parent].children.push(index);
        self.nodes.push(node);
        index
    }

    /// freeze the builder into a tree
    pub fn build(self) -> Tree {
        Tree { nodes: self.nodes }
    }
}

/// An immutable commit tree.
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<FileNode>,
}

impl Tree {
    pub fn root(&self) -> &FileNode {
        &self.nodes[ROOT]
    }

    pub fn root_id(&self) -> &NodeId {
        &self.nodes[ROOT].id
    }

    /// number of nodes, the root included
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// true when the root has no children
    pub fn is_empty(&self) -> bool {
        self.nodes[ROOT].children.is_empty()
    }

    pub(crate) fn node(&self, index: NodeIndex) -> Option<&FileNode> {
        self.nodes.get(index)
    }

    /// every node with its arena index, root first
    pub(crate) fn indexed_nodes(&self) -> impl Iterator<Item = (NodeIndex, &FileNode)> {
        self.nodes.iter().enumerate()
    }

    /// find a node by id with a linear scan
    pub fn find(&self, id: &NodeId) -> Option<&FileNode> {
        self.nodes.iter().find(|n| &n.id == id)
    }

    /// list a directory: direct children, or the whole subtree when
    /// `recursive` is set
    ///
    /// Recursive entries carry paths relative to the listed directory and
    /// appear parent before children.
    pub(crate) fn list(&self, index: NodeIndex, recursive: bool) -> StorageResult<TreeListing> {
        let dir = self
            .nodes
            .get(index)
            .ok_or_else(|| StorageError::not_found("tree", index))?;
        if !dir.is_dir() {
            return Err(StorageError::NotADirectory(dir.id.to_string()));
        }

        let entries = if recursive {
            self.walk(index)
                .into_iter()
                .map(|(child, path)| self.entry(child, path))
                .collect()
        } else {
            dir.children
                .iter()
                .map(|&c| self.entry(c, self.nodes[c].name.clone()))
                .collect()
        };

        Ok(TreeListing {
            sha: dir.id.clone(),
            entries,
            truncated: false,
        })
    }

    /// every node below `index` with its path relative to it, parents
    /// before children and siblings in declaration order
    fn walk(&self, index: NodeIndex) -> Vec<(NodeIndex, String)> {
        let mut out = Vec::new();
        let mut stack: Vec<(NodeIndex, String)> = self.nodes[index]
            .children
            .iter()
            .rev()
            .map(|&c| (c, self.nodes[c].name.clone()))
            .collect();

        while let Some((child, path)) = stack.pop() {
            let node = &self.nodes[child];
            if node.is_dir() {
                stack.extend(
                    node.children
                        .iter()
                        .rev()
                        .map(|&c| (c, format!("{}/{}", path, self.nodes[c].name))),
                );
            }
            out.push((child, path));
        }
        out
    }

    fn entry(&self, index: NodeIndex, path: String) -> TreeEntry {
        let node = &self.nodes[index];
        TreeEntry {
            path,
            sha: node.id.clone(),
            kind: node.kind,
            size: (!node.is_dir()).then_some(node.body.len()),
        }
    }

    /// full paths and contents of every file in the tree
    pub fn files(&self) -> Vec<(String, &[u8])> {
        self.walk(ROOT)
            .into_iter()
            .map(|(index, path)| (path, &self.nodes[index]))
            .filter(|(_, node)| !node.is_dir())
            .map(|(path, node)| (path, node.body()))
            .collect()
    }
}

/// one entry of a tree listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeEntry {
    /// the name, or for recursive listings the path below the listed tree
    pub path: String,
    pub sha: NodeId,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    /// byte length, files only
    pub size: Option<usize>,
}

impl TreeEntry {
    pub fn mode(&self) -> &'static str {
        self.kind.mode()
    }

    pub fn is_dir(&self) -> bool {
        self.kind.is_dir()
    }
}

/// result of a get-tree query
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeListing {
    pub sha: NodeId,
    pub entries: Vec<TreeEntry>,
    pub truncated: bool,
}

impl TreeListing {
    /// look up an entry by its path
    pub fn entry(&self, path: &str) -> Option<&TreeEntry> {
        self.entries.iter().find(|e| e.path == path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(paths: &[&str]) -> Tree {
        TreeBuilder::from_files(paths.iter().map(|p| FileSpec::new(*p))).unwrap()
    }

    #[test]
    fn test_empty_tree_has_root() {
        let tree = TreeBuilder::new().build();
        assert!(tree.is_empty());
        assert_eq!(tree.root().name(), "");
        assert!(tree.root().is_dir());
        assert_eq!(tree.node_count(), 1);
    }

    #[test]
    fn test_directories_deduplicated() {
        let tree = build(&["a/x", "a/y"]);
        let root = tree.list(ROOT, false).unwrap();
        assert_eq!(root.entries.len(), 1);
        assert_eq!(root.entries[0].path, "a");
        assert!(root.entries[0].is_dir());

        let a = tree.find(&root.entries[0].sha).unwrap();
        assert_eq!(a.children.len(), 2);
        // root, a, x, y
        assert_eq!(tree.node_count(), 4);
    }

    #[test]
    fn test_listing_is_one_level() {
        let tree = build(&[".github/CODEOWNERS", "docs/sample/README.md", "README.md"]);
        let root = tree.list(ROOT, false).unwrap();
        let paths: Vec<&str> = root.entries.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec![".github", "docs", "README.md"]);
        assert!(root.entries.iter().all(|e| !e.path.contains('/')));
    }

    #[test]
    fn test_recursive_listing_reconstructs_paths() {
        let tree = build(&["docs/sample/README.md", ".build/mirror.cue", ".build/test.cue"]);
        let all = tree.list(ROOT, true).unwrap();
        let paths: Vec<&str> = all.entries.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "docs",
                "docs/sample",
                "docs/sample/README.md",
                ".build",
                ".build/mirror.cue",
                ".build/test.cue",
            ]
        );
    }

    #[test]
    fn test_deep_path_listing_uses_constant_stack() {
        let depth = 2_000;
        let path = vec!["d"; depth].join("/");
        let tree = TreeBuilder::from_files(vec![FileSpec::new(path.as_str())]).unwrap();

        // a stack this small cannot hold one frame per level
        let (entries, files) = std::thread::Builder::new()
            .stack_size(128 * 1024)
            .spawn(move || {
                let all = tree.list(ROOT, true).unwrap();
                (all.entries.len(), tree.files().len())
            })
            .unwrap()
            .join()
            .unwrap();
        assert_eq!(entries, depth);
        assert_eq!(files, 1);
    }

    #[test]
    fn test_files_round_trip_declared_set() {
        let mut builder = TreeBuilder::new();
        builder.insert(FileSpec::new("README.md").body("README")).unwrap();
        builder.insert(FileSpec::new("src/lib.rs").body("fn main() {}")).unwrap();
        builder.insert(FileSpec::new("src/empty")).unwrap();
        let tree = builder.build();

        let files = tree.files();
        assert_eq!(
            files,
            vec![
                ("README.md".to_string(), &b"README"[..]),
                ("src/lib.rs".to_string(), &b"fn main() {}"[..]),
                ("src/empty".to_string(), &b""[..]),
            ]
        );
    }

    #[test]
    fn test_explicit_id_kept() {
        let mut builder = TreeBuilder::new();
        let id = builder.insert(FileSpec::new("a/b.txt").id("pinned")).unwrap();
        assert_eq!(id, NodeId::new("pinned"));
        let tree = builder.build();
        assert_eq!(tree.find(&id).unwrap().name(), "b.txt");
    }

    #[test]
    fn test_duplicate_explicit_id_rejected() {
        let mut builder = TreeBuilder::new();
        builder.insert(FileSpec::new("a").id("same")).unwrap();
        let result = builder.insert(FileSpec::new("b").id("same"));
        assert!(matches!(result, Err(StorageError::DuplicateId { .. })));
    }

    #[test]
    fn test_identical_content_gets_distinct_ids() {
        let mut builder = TreeBuilder::new();
        let a = builder.insert(FileSpec::new("a").body("same")).unwrap();
        let b = builder.insert(FileSpec::new("b").body("same")).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_file_as_directory_conflict() {
        let mut builder = TreeBuilder::new();
        builder.insert(FileSpec::new("a/b")).unwrap();
        let before = builder.nodes.len();

        let result = builder.insert(FileSpec::new("a/b/c/d"));
        match result {
            Err(StorageError::StructuralConflict { path, .. }) => assert_eq!(path, "a/b"),
            other => panic!("expected structural conflict, got {:?}", other),
        }
        // failed insert left nothing behind
        assert_eq!(builder.nodes.len(), before);
    }

    #[test]
    fn test_file_over_directory_conflict() {
        let mut builder = TreeBuilder::new();
        builder.insert(FileSpec::new("a/b")).unwrap();
        let result = builder.insert(FileSpec::new("a"));
        assert!(matches!(result, Err(StorageError::StructuralConflict { .. })));
    }

    #[test]
    fn test_duplicate_path_rejected() {
        let mut builder = TreeBuilder::new();
        builder.insert(FileSpec::new("docs/README.md")).unwrap();
        let result = builder.insert(FileSpec::new("/docs/README.md"));
        assert!(matches!(result, Err(StorageError::DuplicatePath(p)) if p == "docs/README.md"));
    }

    #[test]
    fn test_list_file_is_not_a_directory() {
        let tree = build(&["README.md"]);
        let result = tree.list(1, false);
        assert!(matches!(result, Err(StorageError::NotADirectory(_))));
    }

    #[test]
    fn test_entry_sizes() {
        let mut builder = TreeBuilder::new();
        builder.insert(FileSpec::new("dir/f").body("1234")).unwrap();
        let tree = builder.build();
        let all = tree.list(ROOT, true).unwrap();
        assert_eq!(all.entry("dir").unwrap().size, None);
        assert_eq!(all.entry("dir/f").unwrap().size, Some(4));
        assert_eq!(all.entry("dir/f").unwrap().mode(), "100644");
    }
}
