//! Static site writer.
//!
//! Drives the [`Engine`] over every document of the manifest and writes one
//! page per document, each carrying the navigation sidebar with the
//! document's ancestors revealed. Links to known documents are redirected to
//! their generated pages, which is how in-content navigation stays inside the
//! site.

use anyhow::{Context, Result};
use maud::{Markup, html};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::assets::write_assets;
use crate::components::content::document_view;
use crate::components::layout::page_wrapper;
use crate::components::nav::breadcrumb;
use crate::components::sidebar::sidebar;
use crate::components::toc::toc;
use crate::engine::{DEFAULT_HOME, DocumentView, Engine, NavPanel, ViewerState};
use crate::fetch::{DocumentSource, SiteFetcher};
use crate::manifest::{DOCUMENT_EXTENSION, is_document};
use crate::markdown::is_absolute;
use crate::markdown::links::{
    LinkKind, normalize, normalize_url, rewrite_links, strip_suffixes,
};
use crate::nav::NavLeaf;
use crate::prefs::PreferenceStore;

/// Default manifest fetch target.
pub const DEFAULT_MANIFEST: &str = "directory.json";

/// Where the site comes from and where it goes.
#[derive(Debug, Clone)]
pub struct SiteOptions {
    /// Fetch target of the manifest document.
    pub manifest: String,
    /// Local directory relative targets resolve against.
    pub source_root: Option<PathBuf>,
    /// Base URL relative targets resolve against when there is no root.
    pub base_url: Option<String>,
    pub output: PathBuf,
    /// Document written as `index.html`.
    pub home: String,
    /// Fetch documents by their tree path instead of their download URL.
    pub fetch_by_path: bool,
}

impl Default for SiteOptions {
    fn default() -> Self {
        Self {
            manifest: DEFAULT_MANIFEST.to_string(),
            source_root: None,
            base_url: None,
            output: PathBuf::from("dist"),
            home: DEFAULT_HOME.to_string(),
            fetch_by_path: false,
        }
    }
}

/// What a site build produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteSummary {
    /// Document pages written, not counting the index.
    pub pages: usize,
    /// Source paths whose load failed; their pages show the error inline.
    pub failed: Vec<String>,
    pub index: PathBuf,
}

/// Builds the site with a [`SiteFetcher`] configured from `options`.
///
/// # Errors
///
/// Returns error if the output directory or a page cannot be written.
/// Unreadable documents and manifests do not fail the build.
pub fn generate_site(options: &SiteOptions, store: &dyn PreferenceStore) -> Result<SiteSummary> {
    let mut fetcher = SiteFetcher::new();
    if let Some(root) = &options.source_root {
        fetcher = fetcher.with_root(root);
    }
    if let Some(base_url) = &options.base_url {
        fetcher = fetcher.with_base_url(base_url);
    }

    let mut engine = Engine::new(fetcher, store);
    write_site(&mut engine, options)
}

/// Builds the site with an existing engine.
///
/// # Errors
///
/// Returns error if the output directory or a page cannot be written.
pub fn write_site<S: DocumentSource, P: PreferenceStore>(
    engine: &mut Engine<'_, S, P>,
    options: &SiteOptions,
) -> Result<SiteSummary> {
    fs::create_dir_all(&options.output).context("Failed to create output directory")?;
    write_assets(&options.output.join("assets"))?;

    engine.load_manifest(&options.manifest);
    let leaves: Vec<NavLeaf> = match engine.state().nav() {
        NavPanel::Tree(tree) => tree.leaves().into_iter().cloned().collect(),
        _ => Vec::new(),
    };
    let pages = PageIndex::new(&leaves);

    let mut summary = SiteSummary::default();

    for leaf in &leaves {
        let target = if options.fetch_by_path {
            leaf.path.as_str()
        } else {
            leaf.target.as_str()
        };

        engine.restore_expanded();
        engine.reveal(&leaf.path);
        engine.load_document(target);

        if let DocumentView::Failed { message, .. } = engine.state().view() {
            warn!(path = %leaf.path, error = %message, "Document page shows load error");
            summary.failed.push(leaf.path.clone());
        }

        let page = page_path(&leaf.path);
        let markup = render_page(engine.state(), &pages, &page, Some(leaf));
        write_page(&options.output.join(&page), markup)?;
        info!(page = %page, "Generated page");
        summary.pages += 1;
    }

    engine.restore_expanded();
    engine.start(&options.home);
    if let DocumentView::Failed { message, .. } = engine.state().view() {
        warn!(home = %options.home, error = %message, "Index shows load error");
    }
    let index = options.output.join("index.html");
    write_page(&index, render_page(engine.state(), &pages, "index.html", None))?;
    info!(page = "index.html", "Generated index");

    if let Some(root) = &options.source_root {
        let copied = copy_source_assets(root, &options.output)?;
        debug!(copied, "Copied source assets");
    }

    summary.index = index;
    Ok(summary)
}

/// Output path of the page for a document, e.g. `topics/a.html`.
pub fn page_path(source_path: &str) -> String {
    let stem = source_path
        .strip_suffix(DOCUMENT_EXTENSION)
        .unwrap_or(source_path);
    format!("{}.html", stem)
}

/// Relative prefix from a page back to the site root.
fn root_prefix(page: &str) -> String {
    "../".repeat(page.matches('/').count())
}

/// Maps document paths and fetch targets to their generated pages.
struct PageIndex {
    pages: HashMap<String, String>,
}

impl PageIndex {
    fn new(leaves: &[NavLeaf]) -> Self {
        let mut pages = HashMap::new();
        for leaf in leaves {
            let page = page_path(&leaf.path);
            let target = normalize_url(&leaf.target).unwrap_or_else(|| leaf.target.clone());
            pages.insert(target, page.clone());
            pages.insert(leaf.path.clone(), page);
        }
        Self { pages }
    }

    fn page_for(&self, href: &str) -> Option<&str> {
        if !is_document(href) {
            return None;
        }
        if is_absolute(href) {
            let key = normalize_url(href).unwrap_or_else(|| href.to_string());
            return self.pages.get(&key).map(String::as_str);
        }
        let key = normalize(href)?;
        self.pages.get(&key).map(String::as_str)
    }
}

/// Points site-root relative URLs of rendered HTML at `prefix` and document
/// links at their generated pages.
fn relocate(html: &str, pages: &PageIndex, prefix: &str) -> String {
    rewrite_links(html, |url, kind| {
        if kind == LinkKind::Anchor {
            let target = strip_suffixes(url);
            if let Some(page) = pages.page_for(target) {
                return Some(format!("{}{}{}", prefix, page, &url[target.len()..]));
            }
        }
        if is_absolute(url) || prefix.is_empty() {
            None
        } else {
            Some(format!("{}{}", prefix, url))
        }
    })
}

fn render_page(state: &ViewerState, pages: &PageIndex, page: &str, leaf: Option<&NavLeaf>) -> Markup {
    let prefix = root_prefix(page);
    let href = |node: &NavLeaf| format!("{}{}", prefix, page_path(&node.path));
    let current = leaf.map(|l| l.path.as_str());

    let view = match state.view() {
        DocumentView::Rendered { path, html } => DocumentView::Rendered {
            path: path.clone(),
            html: relocate(html, pages, &prefix),
        },
        other => other.clone(),
    };

    let title = leaf.map_or("Home", |l| l.name.as_str());
    let body = html! {
        @if let Some(path) = current {
            (breadcrumb(&format!("{}index.html", prefix), path))
        }
        (document_view(&view))
    };

    page_wrapper(
        title,
        &prefix,
        state.preferences(),
        sidebar(state.nav(), current, &href),
        body,
        toc(state.toc()),
    )
}

fn write_page(path: &Path, markup: Markup) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("Failed to create page directory")?;
    }
    fs::write(path, markup.into_string())
        .with_context(|| format!("Failed to write page {}", path.display()))
}

/// Mirrors non-document files of the source root (images and the like) into
/// the output directory. Hidden entries, JSON manifests and the output
/// directory itself are skipped.
fn copy_source_assets(root: &Path, output: &Path) -> Result<usize> {
    let root = root
        .canonicalize()
        .with_context(|| format!("Failed to resolve source root {}", root.display()))?;
    let output = output
        .canonicalize()
        .with_context(|| format!("Failed to resolve output directory {}", output.display()))?;

    let mut copied = 0;
    let walker = WalkDir::new(&root).into_iter().filter_entry(|entry| {
        let hidden = entry.depth() > 0 && entry.file_name().to_string_lossy().starts_with('.');
        !hidden && !entry.path().starts_with(&output)
    });

    for entry in walker {
        let entry = entry.context("Failed to walk source root")?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if is_document(&name) || name.ends_with(".json") {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(&root)
            .context("Walked entry outside source root")?;
        let dest = output.join(relative);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).context("Failed to create asset directory")?;
        }
        fs::copy(entry.path(), &dest)
            .with_context(|| format!("Failed to copy {}", entry.path().display()))?;
        copied += 1;
    }

    Ok(copied)
}
