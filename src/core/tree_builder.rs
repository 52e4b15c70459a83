//! Builds the nested, path-keyed hierarchy from a flat record list.

use std::collections::HashMap;

use serde::ser::{Serialize, SerializeMap, Serializer};

use super::FileRecord;

/// A node of the hierarchy: a folder or a processed file.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum TreeNode {
    Directory(Directory),
    Leaf(FileRecord),
}

impl TreeNode {
    pub fn is_directory(&self) -> bool {
        matches!(self, TreeNode::Directory(_))
    }

    pub fn as_directory(&self) -> Option<&Directory> {
        match self {
            TreeNode::Directory(dir) => Some(dir),
            TreeNode::Leaf(_) => None,
        }
    }

    pub fn as_leaf(&self) -> Option<&FileRecord> {
        match self {
            TreeNode::Leaf(record) => Some(record),
            TreeNode::Directory(_) => None,
        }
    }
}

/// Children keyed by path segment, kept in first-insertion order.
///
/// Serializes as a JSON object whose keys follow that order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Directory {
    entries: Vec<(String, TreeNode)>,
    index: HashMap<String, usize>,
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&TreeNode> {
        self.index.get(name).map(|&i| &self.entries[i].1)
    }

    /// Looks up a node by its `/`-separated path below this directory.
    pub fn find(&self, path: &str) -> Option<&TreeNode> {
        let mut segments = path.split('/');
        let first = segments.next()?;
        let mut node = self.get(first)?;
        for segment in segments {
            node = node.as_directory()?.get(segment)?;
        }
        Some(node)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TreeNode)> {
        self.entries.iter().map(|(name, node)| (name.as_str(), node))
    }

    /// Number of files anywhere below this directory.
    pub fn leaf_count(&self) -> usize {
        self.iter()
            .map(|(_, node)| match node {
                TreeNode::Directory(dir) => dir.leaf_count(),
                TreeNode::Leaf(_) => 1,
            })
            .sum()
    }

    /// Number of folders anywhere below this directory.
    pub fn folder_count(&self) -> usize {
        self.iter()
            .filter_map(|(_, node)| node.as_directory())
            .map(|dir| 1 + dir.folder_count())
            .sum()
    }

    /// Re-joins the segments of every leaf, depth-first in stored order.
    pub fn leaf_paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        self.collect_leaf_paths("", &mut paths);
        paths
    }

    fn collect_leaf_paths(&self, prefix: &str, paths: &mut Vec<String>) {
        for (name, node) in self.iter() {
            let path = if prefix.is_empty() {
                name.to_string()
            } else {
                format!("{prefix}/{name}")
            };
            match node {
                TreeNode::Directory(dir) => dir.collect_leaf_paths(&path, paths),
                TreeNode::Leaf(_) => paths.push(path),
            }
        }
    }

    fn push(&mut self, name: &str, node: TreeNode) {
        self.index.insert(name.to_string(), self.entries.len());
        self.entries.push((name.to_string(), node));
    }

    /// Returns the child folder `name`, creating it if the slot is free.
    /// `None` when the slot already holds a file.
    fn child_dir_mut(&mut self, name: &str) -> Option<&mut Directory> {
        let i = match self.index.get(name) {
            Some(&i) => i,
            None => {
                self.push(name, TreeNode::Directory(Directory::default()));
                self.entries.len() - 1
            }
        };
        match &mut self.entries[i].1 {
            TreeNode::Directory(dir) => Some(dir),
            TreeNode::Leaf(_) => None,
        }
    }
}

impl Serialize for Directory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, node) in &self.entries {
            map.serialize_entry(name, node)?;
        }
        map.end()
    }
}

/// Stateless builder for the hierarchy.
pub struct TreeBuilder;

impl TreeBuilder {
    /// Builds the root directory for `records`.
    ///
    /// The first record to claim a slot keeps it: exact duplicates and paths
    /// that would turn a file into a folder (or the reverse) are dropped.
    pub fn build(records: &[FileRecord]) -> Directory {
        let mut root = Directory::default();
        for record in records {
            Self::insert(&mut root, record);
        }
        root
    }

    fn insert(root: &mut Directory, record: &FileRecord) {
        let segments: Vec<&str> = record.path.split('/').collect();
        let Some((leaf, parents)) = segments.split_last() else {
            return;
        };

        let mut current = root;
        for segment in parents {
            match current.child_dir_mut(segment) {
                Some(dir) => current = dir,
                None => {
                    tracing::warn!(
                        "Skipping {}: '{}' is already a file in the tree",
                        record.path,
                        segment
                    );
                    return;
                }
            }
        }

        if current.contains(leaf) {
            tracing::warn!("Skipping {}: path already present in the tree", record.path);
            return;
        }
        current.push(leaf, TreeNode::Leaf(record.clone()));
    }
}
