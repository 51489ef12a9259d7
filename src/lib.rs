//! Markdown documentation site generator with a mirrored navigation tree.

mod assets;
mod builder;
pub mod components;
mod config;
pub mod engine;
pub mod error;
mod fetch;
pub mod manifest;
pub mod markdown;
pub mod nav;
pub mod prefs;
pub mod remote;
pub mod site;

pub use assets::write_assets;
pub use builder::build_manifest;
pub use config::{BuildArgs, Command, Config, ManifestArgs, PrefsAction, PrefsArgs, prefs_path};
pub use engine::{DocumentView, Engine, LinkAction, LoadTicket, NavPanel, ViewerState};
pub use error::{BuildError, FetchError, FetchErrorKind, ListingError, ManifestError, NavError};
pub use fetch::{DocumentSource, SiteFetcher};
pub use manifest::{Manifest, TreeNode};
pub use markdown::{MarkdownRenderer, rebase_document, rebase_relative_link};
pub use nav::{NavGroup, NavLeaf, NavNode, NavTree};
pub use prefs::{FileStore, MemoryStore, PreferenceStore, Preferences, Theme};
pub use remote::{GitHubContents, RemoteEntry, TreeListing};
pub use site::{SiteOptions, SiteSummary, generate_site};
