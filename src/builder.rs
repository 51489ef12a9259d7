//! Manifest builder: mirrors a remote directory tree into a [`Manifest`].

use tracing::{debug, info};

use crate::error::BuildError;
use crate::manifest::{Manifest, TreeNode};
use crate::remote::{EntryClass, TreeListing};

/// Walks the remote tree below `root_path` and returns its document snapshot.
///
/// Traversal is depth-first in the order the host lists entries, with one
/// outstanding request at a time. Non-document files are dropped; every
/// directory is kept, including empty ones.
///
/// # Errors
///
/// Returns [`BuildError`] for the first listing that fails. There is no
/// partial result.
///
/// # Examples
///
/// ```no_run
/// use docnav::{GitHubContents, build_manifest, remote::GITHUB_API};
///
/// let listing = GitHubContents::new(GITHUB_API, "owner", "repo", "gh-pages");
/// let manifest = build_manifest(&listing, "topics")?;
/// manifest.write("directory.json")?;
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn build_manifest<L: TreeListing>(listing: &L, root_path: &str) -> Result<Manifest, BuildError> {
    let roots = walk(listing, root_path)?;
    let manifest = Manifest::new(roots);
    info!(
        root = root_path,
        documents = manifest.documents().len(),
        "Manifest built"
    );
    Ok(manifest)
}

fn walk<L: TreeListing>(listing: &L, path: &str) -> Result<Vec<TreeNode>, BuildError> {
    let entries = listing.list(path).map_err(|source| BuildError {
        path: path.to_string(),
        source,
    })?;
    debug!(path, entries = entries.len(), "Listed directory");

    let mut nodes = Vec::with_capacity(entries.len());
    for entry in entries {
        match entry.classify() {
            EntryClass::Document => nodes.push(TreeNode::File {
                name: entry.name,
                path: entry.path,
                download_url: entry.download_url.unwrap_or_default(),
            }),
            EntryClass::Directory => {
                let children = walk(listing, &entry.path)?;
                nodes.push(TreeNode::Directory {
                    name: entry.name,
                    path: entry.path,
                    children,
                });
            }
            EntryClass::Skipped => {}
        }
    }

    Ok(nodes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ListingError;
    use crate::remote::RemoteEntry;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// In-memory listing that records every request.
    struct FakeListing {
        dirs: HashMap<String, Vec<RemoteEntry>>,
        requests: RefCell<Vec<String>>,
    }

    impl FakeListing {
        fn new(dirs: &[(&str, Vec<RemoteEntry>)]) -> Self {
            Self {
                dirs: dirs
                    .iter()
                    .map(|(path, entries)| (path.to_string(), entries.clone()))
                    .collect(),
                requests: RefCell::new(Vec::new()),
            }
        }
    }

    impl TreeListing for FakeListing {
        fn list(&self, path: &str) -> Result<Vec<RemoteEntry>, ListingError> {
            self.requests.borrow_mut().push(path.to_string());
            self.dirs
                .get(path)
                .cloned()
                .ok_or_else(|| ListingError::NotACollection {
                    path: path.to_string(),
                })
        }
    }

    fn raw(path: &str) -> String {
        format!("https://raw.example.com/{}", path)
    }

    fn sample() -> FakeListing {
        FakeListing::new(&[
            (
                "topics",
                vec![
                    RemoteEntry::dir("b", "topics/b"),
                    RemoteEntry::file("z.md", "topics/z.md", &raw("topics/z.md")),
                    RemoteEntry::file("logo.png", "topics/logo.png", &raw("topics/logo.png")),
                    RemoteEntry::dir("a", "topics/a"),
                ],
            ),
            (
                "topics/b",
                vec![
                    RemoteEntry::file("2.md", "topics/b/2.md", &raw("topics/b/2.md")),
                    RemoteEntry::file("1.md", "topics/b/1.md", &raw("topics/b/1.md")),
                ],
            ),
            ("topics/a", vec![]),
        ])
    }

    #[test]
    fn test_build_keeps_remote_order_and_drops_non_documents() {
        // Arrange
        let listing = sample();

        // Act
        let manifest = build_manifest(&listing, "topics").expect("Should build");

        // Assert
        let paths: Vec<&str> = manifest.walk().iter().map(|n| n.path()).collect();
        assert_eq!(
            paths,
            vec!["topics/b", "topics/b/2.md", "topics/b/1.md", "topics/z.md", "topics/a"]
        );
    }

    #[test]
    fn test_build_depth_first_request_order() {
        // Arrange
        let listing = sample();

        // Act
        build_manifest(&listing, "topics").expect("Should build");

        // Assert: child directory fully walked before the next sibling
        assert_eq!(
            *listing.requests.borrow(),
            vec!["topics", "topics/b", "topics/a"]
        );
    }

    #[test]
    fn test_build_children_presence_invariant() {
        // Arrange
        let listing = sample();

        // Act
        let manifest = build_manifest(&listing, "topics").expect("Should build");

        // Assert
        for node in manifest.walk() {
            match node {
                TreeNode::Directory { .. } => assert!(node.children().is_some()),
                TreeNode::File { download_url, .. } => {
                    assert!(node.children().is_none());
                    assert!(download_url.starts_with("https://"));
                }
            }
        }
        let empty = manifest
            .walk()
            .into_iter()
            .find(|n| n.path() == "topics/a")
            .expect("Empty directory should be kept");
        assert_eq!(empty.children(), Some(&[][..]));
    }

    #[test]
    fn test_build_root_failure_is_fatal() {
        // Arrange
        let listing = FakeListing::new(&[]);

        // Act
        let result = build_manifest(&listing, "topics");

        // Assert
        let err = result.expect_err("Root failure must abort the build");
        assert_eq!(err.path, "topics");
    }

    #[test]
    fn test_build_nested_failure_aborts_whole_build() {
        // Arrange
        let listing = FakeListing::new(&[(
            "topics",
            vec![
                RemoteEntry::file("a.md", "topics/a.md", &raw("topics/a.md")),
                RemoteEntry::dir("gone", "topics/gone"),
            ],
        )]);

        // Act
        let result = build_manifest(&listing, "topics");

        // Assert
        let err = result.expect_err("Nested failure must abort the build");
        assert_eq!(err.path, "topics/gone");
    }
}
