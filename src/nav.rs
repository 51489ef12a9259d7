//! Navigation tree: the collapsible sidebar model.
//!
//! Built either from a manifest, where every directory's children are known
//! up front and expansion is a pure visibility flip, or live from a
//! [`TreeListing`], where a directory is listed at its first expansion and
//! the result is kept for the life of the tree.

use tracing::debug;

use crate::error::NavError;
use crate::manifest::{Manifest, TreeNode};
use crate::remote::{EntryClass, RemoteEntry, TreeListing};

/// Clickable document entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLeaf {
    pub name: String,
    pub path: String,
    /// What [`Engine::load_document`](crate::Engine::load_document) is called with.
    pub target: String,
}

/// Collapsible directory entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavGroup {
    pub name: String,
    pub path: String,
    pub expanded: bool,
    /// `None` until a live tree lists the directory.
    children: Option<Vec<NavNode>>,
}

impl NavGroup {
    pub fn children(&self) -> Option<&[NavNode]> {
        self.children.as_deref()
    }

    pub fn is_loaded(&self) -> bool {
        self.children.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavNode {
    Group(NavGroup),
    Leaf(NavLeaf),
}

impl NavNode {
    pub fn path(&self) -> &str {
        match self {
            Self::Group(group) => &group.path,
            Self::Leaf(leaf) => &leaf.path,
        }
    }

    fn from_tree(node: &TreeNode) -> Self {
        match node {
            TreeNode::File {
                name,
                path,
                download_url,
            } => Self::Leaf(NavLeaf {
                name: name.clone(),
                path: path.clone(),
                target: download_url.clone(),
            }),
            TreeNode::Directory {
                name,
                path,
                children,
            } => Self::Group(NavGroup {
                name: name.clone(),
                path: path.clone(),
                expanded: false,
                children: Some(children.iter().map(Self::from_tree).collect()),
            }),
        }
    }

    fn from_entry(entry: RemoteEntry) -> Option<Self> {
        match entry.classify() {
            EntryClass::Document => Some(Self::Leaf(NavLeaf {
                name: entry.name,
                path: entry.path,
                target: entry.download_url.unwrap_or_default(),
            })),
            EntryClass::Directory => Some(Self::Group(NavGroup {
                name: entry.name,
                path: entry.path,
                expanded: false,
                children: None,
            })),
            EntryClass::Skipped => None,
        }
    }
}

/// The navigation tree with per-directory expansion state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavTree {
    roots: Vec<NavNode>,
}

impl NavTree {
    /// Builds a fully loaded tree with every directory collapsed.
    pub fn from_manifest(manifest: &Manifest) -> Self {
        Self {
            roots: manifest.roots().iter().map(NavNode::from_tree).collect(),
        }
    }

    /// Lists `root` and builds a live tree whose directories load on demand.
    ///
    /// # Errors
    ///
    /// Returns [`NavError::Listing`] if the root listing fails.
    pub fn open_live<L: TreeListing>(listing: &L, root: &str) -> Result<Self, NavError> {
        let roots = list_nodes(listing, root)?;
        Ok(Self { roots })
    }

    pub fn roots(&self) -> &[NavNode] {
        &self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn group(&self, path: &str) -> Option<&NavGroup> {
        find_group(&self.roots, path)
    }

    /// Flips a loaded directory between expanded and collapsed.
    ///
    /// Returns the new expansion state.
    ///
    /// # Errors
    ///
    /// Returns [`NavError::UnknownDirectory`] for unknown paths and
    /// [`NavError::NotLoaded`] when expanding a live directory that has not
    /// been listed yet.
    pub fn toggle(&mut self, path: &str) -> Result<bool, NavError> {
        let group = find_group_mut(&mut self.roots, path)
            .ok_or_else(|| NavError::UnknownDirectory(path.to_string()))?;

        if !group.expanded && group.children.is_none() {
            return Err(NavError::NotLoaded(path.to_string()));
        }

        group.expanded = !group.expanded;
        Ok(group.expanded)
    }

    /// Flips a directory, listing it first if this is its first expansion.
    ///
    /// Returns the new expansion state. Later toggles reuse the stored
    /// listing and issue no requests.
    ///
    /// # Errors
    ///
    /// Returns [`NavError::Listing`] if the listing fails; the directory then
    /// stays collapsed and unloaded, so a later toggle retries.
    pub fn toggle_live<L: TreeListing>(&mut self, path: &str, listing: &L) -> Result<bool, NavError> {
        let group = find_group_mut(&mut self.roots, path)
            .ok_or_else(|| NavError::UnknownDirectory(path.to_string()))?;

        if !group.expanded && group.children.is_none() {
            debug!(path, "First expansion, listing directory");
            group.children = Some(list_nodes(listing, path)?);
        }

        group.expanded = !group.expanded;
        Ok(group.expanded)
    }

    /// Expands every loaded directory on the way to `path`.
    pub fn reveal(&mut self, path: &str) {
        let mut prefix = String::new();
        for segment in path.split('/') {
            if !prefix.is_empty() {
                prefix.push('/');
            }
            prefix.push_str(segment);
            if let Some(group) = find_group_mut(&mut self.roots, &prefix)
                && group.children.is_some()
            {
                group.expanded = true;
            }
        }
    }

    /// Expands the listed directories that exist and are loaded.
    pub fn restore_expanded(&mut self, paths: &[String]) {
        for path in paths {
            if let Some(group) = find_group_mut(&mut self.roots, path)
                && group.children.is_some()
            {
                group.expanded = true;
            }
        }
    }

    pub fn collapse_all(&mut self) {
        fn collapse(nodes: &mut [NavNode]) {
            for node in nodes {
                if let NavNode::Group(group) = node {
                    group.expanded = false;
                    if let Some(children) = group.children.as_mut() {
                        collapse(children);
                    }
                }
            }
        }
        collapse(&mut self.roots);
    }

    /// Paths of expanded directories in tree order.
    pub fn expanded_paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        walk_groups(&self.roots, &mut |group| {
            if group.expanded {
                paths.push(group.path.clone());
            }
        });
        paths
    }

    /// Every loaded leaf, depth-first.
    pub fn leaves(&self) -> Vec<&NavLeaf> {
        let mut leaves = Vec::new();
        collect_leaves(&self.roots, false, &mut leaves);
        leaves
    }

    /// Leaves whose ancestors are all expanded.
    pub fn visible_leaves(&self) -> Vec<&NavLeaf> {
        let mut leaves = Vec::new();
        collect_leaves(&self.roots, true, &mut leaves);
        leaves
    }

    /// Finds a leaf by its tree path or its fetch target.
    pub fn leaf(&self, path_or_target: &str) -> Option<&NavLeaf> {
        self.leaves()
            .into_iter()
            .find(|leaf| leaf.path == path_or_target || leaf.target == path_or_target)
    }
}

fn list_nodes<L: TreeListing>(listing: &L, path: &str) -> Result<Vec<NavNode>, NavError> {
    let entries = listing.list(path).map_err(|source| NavError::Listing {
        path: path.to_string(),
        source,
    })?;
    Ok(entries.into_iter().filter_map(NavNode::from_entry).collect())
}

fn find_group<'a>(nodes: &'a [NavNode], path: &str) -> Option<&'a NavGroup> {
    for node in nodes {
        if let NavNode::Group(group) = node {
            if group.path == path {
                return Some(group);
            }
            if let Some(found) = group.children.as_deref().and_then(|c| find_group(c, path)) {
                return Some(found);
            }
        }
    }
    None
}

fn find_group_mut<'a>(nodes: &'a mut [NavNode], path: &str) -> Option<&'a mut NavGroup> {
    for node in nodes {
        if let NavNode::Group(group) = node {
            if group.path == path {
                return Some(group);
            }
            if let Some(children) = group.children.as_deref_mut()
                && let Some(found) = find_group_mut(children, path)
            {
                return Some(found);
            }
        }
    }
    None
}

fn walk_groups<'a>(nodes: &'a [NavNode], visit: &mut impl FnMut(&'a NavGroup)) {
    for node in nodes {
        if let NavNode::Group(group) = node {
            visit(group);
            if let Some(children) = group.children.as_deref() {
                walk_groups(children, visit);
            }
        }
    }
}

fn collect_leaves<'a>(nodes: &'a [NavNode], visible_only: bool, out: &mut Vec<&'a NavLeaf>) {
    for node in nodes {
        match node {
            NavNode::Leaf(leaf) => out.push(leaf),
            NavNode::Group(group) => {
                if visible_only && !group.expanded {
                    continue;
                }
                if let Some(children) = group.children.as_deref() {
                    collect_leaves(children, visible_only, out);
                }
            }
        }
    }
}
