//! Shared test utilities for integration tests.
//!
//! Provides helpers for laying out temporary documentation sites and a
//! scripted remote tree listing used across multiple test files.

#![allow(dead_code)]

use anyhow::Result;
use docnav::{
    DocumentSource, FetchError, FetchErrorKind, ListingError, RemoteEntry, TreeListing,
};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;
use tempfile::TempDir;

/// Manifest of the sample site: one root document and two nested directories.
pub const SAMPLE_MANIFEST: &str = r#"[
  {"type": "file", "name": "index.md", "path": "index.md", "download_url": "index.md"},
  {"type": "dir", "name": "topics", "path": "topics", "content": [
    {"type": "dir", "name": "x", "path": "topics/x", "content": [
      {"type": "file", "name": "page.md", "path": "topics/x/page.md", "download_url": "topics/x/page.md"},
      {"type": "file", "name": "other.md", "path": "topics/x/other.md", "download_url": "topics/x/other.md"}
    ]},
    {"type": "file", "name": "gone.md", "path": "topics/gone.md", "download_url": "topics/gone.md"}
  ]}
]"#;

/// Creates temporary site with a manifest, documents and one image.
///
/// `topics/gone.md` is listed in the manifest but missing on disk.
///
/// # Errors
///
/// Returns error if directory creation or file write fails
pub fn create_sample_site() -> Result<TempDir> {
    let dir = TempDir::new()?;
    let root = dir.path();

    write_file(root, "directory.json", SAMPLE_MANIFEST)?;
    write_file(root, "index.md", "# Welcome\n\nStart with [the page](topics/x/page.md).\n")?;
    write_file(
        root,
        "topics/x/page.md",
        "# Page\n\n![diagram](img/a.png)\n\nSee [other](other.md#usage) and [site](https://example.com/).\n\n## Usage\n",
    )?;
    write_file(root, "topics/x/other.md", "# Other\n\n## Usage\n\nBack to [page](./page.md).\n")?;
    write_file(root, "topics/x/img/a.png", "not really a png")?;
    write_file(root, ".hidden/secret.txt", "skip me")?;

    Ok(dir)
}

/// Writes file to site, creating parent directories as needed.
///
/// # Errors
///
/// Returns error if directory creation or file write fails
pub fn write_file(root: &Path, path: &str, content: &str) -> Result<()> {
    let file_path = root.join(path);
    if let Some(parent) = file_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(file_path, content)?;
    Ok(())
}

/// Remote listing answering from a fixed table and recording every request.
pub struct ScriptedListing {
    dirs: HashMap<String, Vec<RemoteEntry>>,
    pub requests: RefCell<Vec<String>>,
}

impl ScriptedListing {
    pub fn new() -> Self {
        Self {
            dirs: HashMap::new(),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn with_dir(mut self, path: &str, entries: Vec<RemoteEntry>) -> Self {
        self.dirs.insert(path.to_string(), entries);
        self
    }
}

impl TreeListing for ScriptedListing {
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

/// Listing mirroring the `topics` directory of the sample site.
pub fn sample_listing() -> ScriptedListing {
    ScriptedListing::new()
        .with_dir(
            "topics",
            vec![
                RemoteEntry::dir("x", "topics/x"),
                RemoteEntry::file("gone.md", "topics/gone.md", "topics/gone.md"),
                RemoteEntry::file("logo.png", "topics/logo.png", "topics/logo.png"),
            ],
        )
        .with_dir(
            "topics/x",
            vec![
                RemoteEntry::file("page.md", "topics/x/page.md", "topics/x/page.md"),
                RemoteEntry::file("other.md", "topics/x/other.md", "topics/x/other.md"),
            ],
        )
}

/// Manifest whose leaves carry raw download URLs, as built from GitHub.
pub const REMOTE_MANIFEST: &str = r#"[
  {"type": "dir", "name": "topics", "path": "topics", "content": [
    {"type": "dir", "name": "x", "path": "topics/x", "content": [
      {"type": "file", "name": "a.md", "path": "topics/x/a.md",
       "download_url": "https://raw.example.com/o/r/gh-pages/topics/x/a.md"}
    ]},
    {"type": "dir", "name": "y", "path": "topics/y", "content": [
      {"type": "file", "name": "b.md", "path": "topics/y/b.md",
       "download_url": "https://raw.example.com/o/r/gh-pages/topics/y/b.md"}
    ]}
  ]}
]"#;

/// Document source answering from a fixed table; anything else is a 404.
pub struct MapSource {
    docs: HashMap<String, String>,
}

impl MapSource {
    pub fn new() -> Self {
        Self {
            docs: HashMap::new(),
        }
    }

    pub fn with_doc(mut self, target: &str, text: &str) -> Self {
        self.docs.insert(target.to_string(), text.to_string());
        self
    }
}

impl DocumentSource for MapSource {
    fn fetch(&self, target: &str) -> Result<String, FetchError> {
        self.docs
            .get(target)
            .cloned()
            .ok_or_else(|| FetchError::new(target, FetchErrorKind::Status(404)))
    }
}
