//! Remote tree listing API.
//!
//! A listing maps a directory path to the ordered entries the remote host
//! reports for it. [`GitHubContents`] talks to the GitHub Contents API;
//! tests and alternate hosts implement [`TreeListing`] directly.

use serde::Deserialize;
use std::time::Duration;
use tracing::debug;
use ureq::Agent;

use crate::error::ListingError;
use crate::manifest::is_document;

/// Default HTTP timeout in seconds.
const DEFAULT_TIMEOUT: u64 = 30;

/// Public GitHub REST endpoint.
pub const GITHUB_API: &str = "https://api.github.com";

/// Type of entry in a remote directory listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    File,
    Dir,
    /// Symlinks, submodules and anything else the host reports.
    #[serde(other)]
    Other,
}

/// A single entry of a remote directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteEntry {
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    #[serde(default)]
    pub download_url: Option<String>,
}

/// How an entry participates in the document tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryClass {
    /// Markdown file with a download reference.
    Document,
    /// Directory to descend into.
    Directory,
    /// Not part of the document tree.
    Skipped,
}

impl RemoteEntry {
    pub fn file(name: &str, path: &str, download_url: &str) -> Self {
        Self {
            name: name.to_string(),
            path: path.to_string(),
            entry_type: EntryType::File,
            download_url: Some(download_url.to_string()),
        }
    }

    pub fn dir(name: &str, path: &str) -> Self {
        Self {
            name: name.to_string(),
            path: path.to_string(),
            entry_type: EntryType::Dir,
            download_url: None,
        }
    }

    /// Classifies the entry. Non-document files and files the host gives
    /// no download reference for are skipped.
    pub fn classify(&self) -> EntryClass {
        match self.entry_type {
            EntryType::Dir => EntryClass::Directory,
            EntryType::File if is_document(&self.name) && self.download_url.is_some() => {
                EntryClass::Document
            }
            EntryType::File | EntryType::Other => EntryClass::Skipped,
        }
    }
}

/// Source of directory listings.
pub trait TreeListing {
    /// Lists the entries of `path` in the order the host returns them.
    ///
    /// # Errors
    ///
    /// Returns [`ListingError`] on transport failure, non-success status or
    /// a body that is not a collection of entries.
    fn list(&self, path: &str) -> Result<Vec<RemoteEntry>, ListingError>;
}

impl<T: TreeListing + ?Sized> TreeListing for &T {
    fn list(&self, path: &str) -> Result<Vec<RemoteEntry>, ListingError> {
        (**self).list(path)
    }
}

/// Parses a listing response body.
///
/// # Errors
///
/// Returns [`ListingError::NotACollection`] when the body is valid JSON but
/// not an array, and [`ListingError::Json`] for any other shape problem.
pub fn parse_listing(path: &str, body: &str) -> Result<Vec<RemoteEntry>, ListingError> {
    let value: serde_json::Value = serde_json::from_str(body)?;
    if !value.is_array() {
        return Err(ListingError::NotACollection {
            path: path.to_string(),
        });
    }
    Ok(serde_json::from_value(value)?)
}

/// GitHub Contents API client bound to one repository and branch.
pub struct GitHubContents {
    agent: Agent,
    api_base: String,
    owner: String,
    repo: String,
    branch: String,
}

impl GitHubContents {
    /// Creates a client for `owner/repo` at `branch`.
    pub fn new(
        api_base: &str,
        owner: impl Into<String>,
        repo: impl Into<String>,
        branch: impl Into<String>,
    ) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT)))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            api_base: api_base.trim_end_matches('/').to_owned(),
            owner: owner.into(),
            repo: repo.into(),
            branch: branch.into(),
        }
    }

    /// Builds the contents URL for a repository path.
    pub fn contents_url(&self, path: &str) -> String {
        let path = path.trim_matches('/');
        format!(
            "{}/repos/{}/{}/contents/{}?ref={}",
            self.api_base, self.owner, self.repo, path, self.branch
        )
    }
}

impl TreeListing for GitHubContents {
    fn list(&self, path: &str) -> Result<Vec<RemoteEntry>, ListingError> {
        let url = self.contents_url(path);
        debug!(url = %url, "Listing remote directory");

        let response = self
            .agent
            .get(&url)
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", concat!("docnav/", env!("CARGO_PKG_VERSION")))
            .call()
            .map_err(|e| ListingError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let mut body = response.into_body();

        if status >= 400 {
            let error_body = body
                .read_to_string()
                .unwrap_or_else(|_| String::from("(unable to read error body)"));
            return Err(ListingError::Status {
                status,
                body: error_body,
            });
        }

        let text = body
            .read_to_string()
            .map_err(|e| ListingError::Transport(e.to_string()))?;
        parse_listing(path, &text)
    }
}
