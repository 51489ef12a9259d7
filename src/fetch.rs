//! Document fetch.
//!
//! [`DocumentSource`] returns raw document text for a path or absolute URL.
//! [`SiteFetcher`] serves relative paths from a local site root (or a base
//! URL) and absolute `http(s)` URLs over HTTP.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;
use ureq::Agent;

use crate::error::{FetchError, FetchErrorKind};
use crate::markdown::links::normalize;

/// Default HTTP timeout in seconds.
const DEFAULT_TIMEOUT: u64 = 30;

/// Anything that can return raw document source.
pub trait DocumentSource {
    /// Fetches the text behind `target`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] naming `target` on any failure, including a
    /// non-success HTTP status.
    fn fetch(&self, target: &str) -> Result<String, FetchError>;
}

impl<T: DocumentSource + ?Sized> DocumentSource for &T {
    fn fetch(&self, target: &str) -> Result<String, FetchError> {
        (**self).fetch(target)
    }
}

fn is_http(target: &str) -> bool {
    target.starts_with("http://") || target.starts_with("https://")
}

/// Fetches documents from a local site root, a base URL, or absolute URLs.
pub struct SiteFetcher {
    agent: Agent,
    root: Option<PathBuf>,
    base_url: Option<String>,
}

impl SiteFetcher {
    /// Creates fetcher resolving relative targets nowhere; only absolute URLs work.
    pub fn new() -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT)))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            root: None,
            base_url: None,
        }
    }

    /// Resolves relative targets against a local directory.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Resolves relative targets against a base URL when no root is set.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = Some(base_url.trim_end_matches('/').to_owned());
        self
    }

    fn fetch_http(&self, url: &str, target: &str) -> Result<String, FetchError> {
        debug!(url, "Fetching document");

        let response = self
            .agent
            .get(url)
            .call()
            .map_err(|e| FetchError::new(target, FetchErrorKind::Transport(e.to_string())))?;

        let status = response.status().as_u16();
        if status >= 400 {
            return Err(FetchError::new(target, FetchErrorKind::Status(status)));
        }

        response
            .into_body()
            .read_to_string()
            .map_err(|e| FetchError::new(target, FetchErrorKind::Transport(e.to_string())))
    }

    fn fetch_local(&self, root: &Path, target: &str) -> Result<String, FetchError> {
        // Local reads stay inside the site root
        let relative = normalize(target).ok_or_else(|| {
            FetchError::new(target, FetchErrorKind::Io("path escapes site root".to_string()))
        })?;
        let path = root.join(&relative);
        debug!(path = %path.display(), "Reading document");

        fs::read_to_string(&path).map_err(|e| {
            let kind = if e.kind() == std::io::ErrorKind::NotFound {
                FetchErrorKind::Status(404)
            } else {
                FetchErrorKind::Io(e.to_string())
            };
            FetchError::new(target, kind)
        })
    }
}

impl Default for SiteFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentSource for SiteFetcher {
    fn fetch(&self, target: &str) -> Result<String, FetchError> {
        if is_http(target) {
            return self.fetch_http(target, target);
        }
        if let Some(root) = &self.root {
            return self.fetch_local(root, target);
        }
        if let Some(base) = &self.base_url {
            let url = format!("{}/{}", base, target.trim_start_matches('/'));
            return self.fetch_http(&url, target);
        }
        Err(FetchError::new(target, FetchErrorKind::Unresolvable))
    }
}
