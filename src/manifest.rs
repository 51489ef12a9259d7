//! Manifest document: a point-in-time snapshot of a repository's document tree.
//!
//! The manifest is a JSON array of tagged nodes. Files carry a download
//! reference, directories carry their children under `content`. Input is
//! validated at the deserialization boundary so the rest of the crate can
//! trust the tree shape.

use serde::{Deserialize, Deserializer, Serialize, de};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::error::ManifestError;

/// Extension a file entry must carry to be kept as a document leaf.
pub const DOCUMENT_EXTENSION: &str = ".md";

/// Returns true when a file name or link target names a Markdown document.
pub fn is_document(name: &str) -> bool {
    name.ends_with(DOCUMENT_EXTENSION)
}

/// A single entry in the mirrored repository tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum TreeNode {
    /// Document leaf.
    #[serde(rename = "file")]
    File {
        name: String,
        path: String,
        download_url: String,
    },
    /// Directory with its children in remote listing order.
    #[serde(rename = "dir")]
    Directory {
        name: String,
        path: String,
        #[serde(rename = "content")]
        children: Vec<TreeNode>,
    },
}

impl TreeNode {
    /// Display name of the entry.
    pub fn name(&self) -> &str {
        match self {
            Self::File { name, .. } | Self::Directory { name, .. } => name,
        }
    }

    /// Slash separated path from the tree root.
    pub fn path(&self) -> &str {
        match self {
            Self::File { path, .. } | Self::Directory { path, .. } => path,
        }
    }

    /// Children of a directory, `None` for files.
    pub fn children(&self) -> Option<&[TreeNode]> {
        match self {
            Self::File { .. } => None,
            Self::Directory { children, .. } => Some(children),
        }
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, Self::Directory { .. })
    }
}

/// Untrusted shape of a node as it appears on the wire.
///
/// Manifests written by older tooling omit `path` on file nodes; it is
/// derived from the parent directory after parsing.
#[derive(Deserialize)]
struct WireNode {
    #[serde(rename = "type")]
    kind: String,
    name: String,
    #[serde(default)]
    path: Option<String>,
    download_url: Option<String>,
    #[serde(alias = "children")]
    content: Option<Vec<TreeNode>>,
}

impl TryFrom<WireNode> for TreeNode {
    type Error = String;

    fn try_from(wire: WireNode) -> Result<Self, Self::Error> {
        let path = wire.path.unwrap_or_default();
        let label = if path.is_empty() { &wire.name } else { &path };

        match wire.kind.as_str() {
            "file" => {
                if wire.content.is_some() {
                    return Err(format!("file node '{}' has children", label));
                }
                let download_url = wire
                    .download_url
                    .ok_or_else(|| format!("file node '{}' has no download_url", label))?;
                Ok(Self::File {
                    name: wire.name,
                    path,
                    download_url,
                })
            }
            "dir" => {
                if path.is_empty() {
                    return Err(format!("directory node '{}' has no path", wire.name));
                }
                let children = wire
                    .content
                    .ok_or_else(|| format!("directory node '{}' has no children", path))?;
                Ok(Self::Directory {
                    name: wire.name,
                    path,
                    children,
                })
            }
            other => Err(format!("unknown node type '{}' at '{}'", other, label)),
        }
    }
}

/// Gives path-less file nodes the path `<parent>/<name>`.
fn derive_missing_paths(nodes: &mut [TreeNode], parent: &str) {
    for node in nodes {
        match node {
            TreeNode::File { name, path, .. } if path.is_empty() => {
                *path = if parent.is_empty() {
                    name.clone()
                } else {
                    format!("{}/{}", parent, name)
                };
            }
            TreeNode::File { .. } => {}
            TreeNode::Directory { path, children, .. } => {
                derive_missing_paths(children, path);
            }
        }
    }
}

impl<'de> Deserialize<'de> for TreeNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        WireNode::deserialize(deserializer)?
            .try_into()
            .map_err(de::Error::custom)
    }
}

/// Ordered sequence of top level nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    roots: Vec<TreeNode>,
}

impl Manifest {
    pub fn new(roots: Vec<TreeNode>) -> Self {
        Self { roots }
    }

    pub fn roots(&self) -> &[TreeNode] {
        &self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Parses and validates a manifest document.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Malformed`] on shape mismatch and
    /// [`ManifestError::DuplicatePath`] when two nodes share a path.
    pub fn from_json(json: &str) -> Result<Self, ManifestError> {
        let mut manifest: Self = serde_json::from_str(json)?;
        derive_missing_paths(&mut manifest.roots, "");
        manifest.check_unique_paths()?;
        Ok(manifest)
    }

    /// Serializes the manifest with two-space indentation.
    pub fn to_json_pretty(&self) -> Result<String, ManifestError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reads and validates a manifest file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let json = fs::read_to_string(path.as_ref())?;
        Self::from_json(&json)
    }

    /// Writes the manifest file, replacing any previous snapshot.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<(), ManifestError> {
        fs::write(path.as_ref(), self.to_json_pretty()?)?;
        Ok(())
    }

    /// Visits every node depth-first in document order.
    pub fn walk(&self) -> Vec<&TreeNode> {
        let mut nodes = Vec::new();
        Self::collect(&self.roots, &mut nodes);
        nodes
    }

    /// Returns all document leaves depth-first in document order.
    pub fn documents(&self) -> Vec<&TreeNode> {
        self.walk()
            .into_iter()
            .filter(|node| !node.is_directory())
            .collect()
    }

    fn collect<'a>(nodes: &'a [TreeNode], out: &mut Vec<&'a TreeNode>) {
        for node in nodes {
            out.push(node);
            if let Some(children) = node.children() {
                Self::collect(children, out);
            }
        }
    }

    fn check_unique_paths(&self) -> Result<(), ManifestError> {
        let mut seen = HashSet::new();
        for node in self.walk() {
            if !seen.insert(node.path()) {
                return Err(ManifestError::DuplicatePath(node.path().to_string()));
            }
        }
        Ok(())
    }
}
