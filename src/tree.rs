//! Rebuilds a folder/file hierarchy from GitHub's flat list of blob paths.

use std::collections::HashMap;

use crate::types::FileTreeNode;

// Children are accumulated as lightweight slots so a folder's children can be
// appended while its own parent is still being walked; the slots are
// materialized into `FileTreeNode`s once every path has been processed.
enum Slot {
    File { name: String, path: String },
    Folder { name: String, path: String },
}

/// Builds the nested tree from an ordered list of file paths.
///
/// Folders and files preserve first-seen order. Folder prefixes are
/// deduplicated through a prefix map, so a folder is attached to its parent
/// exactly once; duplicate file paths are kept as-is. Paths are not
/// validated, whatever GitHub reports is passed through unmodified.
pub fn build_file_tree(paths: &[String]) -> Vec<FileTreeNode> {
    let mut root: Vec<Slot> = Vec::new();
    let mut children: HashMap<String, Vec<Slot>> = HashMap::new();

    for file_path in paths {
        let parts: Vec<&str> = file_path.split('/').collect();
        let mut current = String::new();
        let mut parent: Option<String> = None;

        for (index, part) in parts.iter().enumerate() {
            if current.is_empty() {
                current.push_str(part);
            } else {
                current.push('/');
                current.push_str(part);
            }

            let is_leaf = index == parts.len() - 1;
            if is_leaf {
                let slot = Slot::File {
                    name: (*part).to_string(),
                    path: current.clone(),
                };
                match &parent {
                    Some(folder) => children.entry(folder.clone()).or_default().push(slot),
                    None => root.push(slot),
                }
            } else {
                if !children.contains_key(&current) {
                    children.insert(current.clone(), Vec::new());
                    let slot = Slot::Folder {
                        name: (*part).to_string(),
                        path: current.clone(),
                    };
                    match &parent {
                        Some(folder) => children.entry(folder.clone()).or_default().push(slot),
                        None => root.push(slot),
                    }
                }
                parent = Some(current.clone());
            }
        }
    }

    materialize(root, &mut children)
}

fn materialize(slots: Vec<Slot>, children: &mut HashMap<String, Vec<Slot>>) -> Vec<FileTreeNode> {
    slots
        .into_iter()
        .map(|slot| match slot {
            Slot::File { name, path } => FileTreeNode::File { name, path },
            Slot::Folder { name, path } => {
                let nested = children.remove(&path).unwrap_or_default();
                let nested = materialize(nested, children);
                FileTreeNode::Folder {
                    name,
                    path,
                    children: nested,
                }
            }
        })
        .collect()
}

/// Collects every folder path in pre-order, the sequence folder summaries
/// are generated in.
pub fn list_folder_paths(nodes: &[FileTreeNode]) -> Vec<String> {
    let mut folders = Vec::new();
    collect_folder_paths(nodes, &mut folders);
    folders
}

fn collect_folder_paths(nodes: &[FileTreeNode], out: &mut Vec<String>) {
    for node in nodes {
        if let FileTreeNode::Folder { path, children, .. } = node {
            out.push(path.clone());
            collect_folder_paths(children, out);
        }
    }
}
