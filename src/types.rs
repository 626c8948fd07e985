use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A resolved `owner/repo` pair, derived once from a raw URL string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoRef {
    pub owner: String,
    pub repo: String,
}

impl RepoRef {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }

    /// Cache key shared by the analysis and file-explanation caches.
    pub fn cache_key(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// One entry of GitHub's recursive git-tree listing. Only `blob` entries
/// (files) are retained as the working path list; `tree` entries are
/// reconstructed from file paths instead.
#[derive(Debug, Clone, Deserialize)]
pub struct TreeEntry {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl TreeEntry {
    pub fn is_blob(&self) -> bool {
        self.kind == "blob"
    }
}

/// The subset of GitHub repository metadata the prompts use.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RepoMeta {
    pub full_name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub default_branch: String,
    #[serde(default)]
    pub language: Option<String>,
}

/// A node of the reconstructed folder/file hierarchy.
///
/// `path` is the `/`-joined sequence of ancestor names down to and including
/// this node; a folder's path is a prefix of every descendant's path, and no
/// node path repeats within one tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FileTreeNode {
    Folder {
        name: String,
        path: String,
        children: Vec<FileTreeNode>,
    },
    File {
        name: String,
        path: String,
    },
}

impl FileTreeNode {
    pub fn path(&self) -> &str {
        match self {
            FileTreeNode::Folder { path, .. } | FileTreeNode::File { path, .. } => path,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            FileTreeNode::Folder { name, .. } | FileTreeNode::File { name, .. } => name,
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self, FileTreeNode::Folder { .. })
    }
}

/// A single generated explanation, immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    pub title: String,
    pub content: String,
}

impl Explanation {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }
}

/// The full result of analyzing one repository. Folder summaries keep the
/// pre-order sequence they were generated in.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoAnalysis {
    pub repo_name: String,
    pub tree: Vec<FileTreeNode>,
    pub overview: Explanation,
    pub folders: IndexMap<String, Explanation>,
}
