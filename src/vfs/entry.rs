use serde::{Deserialize, Serialize};

use crate::core::utils;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EntryType {
    File,
    Directory,
}

/// A node of the virtual tree.
///
/// Serialized as `{"name": .., "type": "dir", "contents": [..]}` for
/// directories and `{"name": .., "type": "file"}` for files. File payloads are
/// not part of the node; they live in the store under their own key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Node {
    #[serde(rename = "dir")]
    Directory(Directory),
    #[serde(rename = "file")]
    File(FileNode),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Directory {
    pub name: String,
    #[serde(default)]
    pub contents: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileNode {
    pub name: String,
}

impl Node {
    pub fn dir<S: Into<String>>(name: S) -> Node {
        Node::Directory(Directory {
            name: name.into(),
            contents: Vec::new(),
        })
    }

    pub fn file<S: Into<String>>(name: S) -> Node {
        Node::File(FileNode { name: name.into() })
    }

    pub fn name(&self) -> &str {
        match self {
            Node::Directory(dir) => &dir.name,
            Node::File(file) => &file.name,
        }
    }

    pub fn set_name<S: Into<String>>(&mut self, name: S) {
        match self {
            Node::Directory(dir) => dir.name = name.into(),
            Node::File(file) => file.name = name.into(),
        }
    }

    pub fn entry_type(&self) -> EntryType {
        match self {
            Node::Directory(_) => EntryType::Directory,
            Node::File(_) => EntryType::File,
        }
    }

    pub fn is_file(&self) -> bool {
        self.entry_type() == EntryType::File
    }

    pub fn is_dir(&self) -> bool {
        self.entry_type() == EntryType::Directory
    }

    /// Case-insensitive name match.
    pub fn is_named(&self, name: &str) -> bool {
        utils::same_name(self.name(), name)
    }

    pub fn contents(&self) -> Option<&[Node]> {
        match self {
            Node::Directory(dir) => Some(&dir.contents),
            Node::File(_) => None,
        }
    }

    pub fn contents_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Directory(dir) => Some(&mut dir.contents),
            Node::File(_) => None,
        }
    }
}
