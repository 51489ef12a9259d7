//! Navigation and render engine.
//!
//! The [`Engine`] owns the [`ViewerState`]: the navigation panel, the single
//! document view, the current source path and the viewer preferences. All
//! state changes go through its operations.

use tracing::{debug, info, warn};

use crate::error::{FetchError, ManifestError, NavError};
use crate::fetch::DocumentSource;
use crate::manifest::{Manifest, is_document};
use crate::markdown::links::strip_suffixes;
use crate::markdown::{Heading, MarkdownRenderer, rebase_document};
use crate::nav::NavTree;
use crate::prefs::{
    DEFAULT_FONT_SIZE, EXPANDED_KEY, FONT_SIZE_KEY, MAX_FONT_SIZE, MIN_FONT_SIZE,
    PreferenceStore, Preferences, THEME_KEY, Theme, persist,
};
use crate::remote::TreeListing;

/// Document the engine shows first.
pub const DEFAULT_HOME: &str = "index.md";

/// State of the content region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentView {
    Idle,
    Loading { path: String },
    Rendered { path: String, html: String },
    Failed { path: String, message: String },
}

/// State of the navigation panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavPanel {
    /// No manifest loaded yet.
    Empty,
    Tree(NavTree),
    /// Manifest could not be loaded; the message is shown in place of the tree.
    Unavailable(String),
}

/// Outcome of activating a link inside rendered content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkAction {
    /// Default navigation suppressed, document loaded into the content region.
    Intercepted(String),
    /// Link left to open normally.
    Native,
}

/// Handle for one in-flight document load.
#[derive(Debug)]
#[must_use = "a started load has to be finished"]
pub struct LoadTicket {
    token: u64,
    path: String,
}

impl LoadTicket {
    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Everything the viewer remembers during a session.
#[derive(Debug, Clone)]
pub struct ViewerState {
    current_path: Option<String>,
    preferences: Preferences,
    nav: NavPanel,
    view: DocumentView,
    toc: Vec<Heading>,
    latest_token: u64,
}

impl ViewerState {
    fn new(preferences: Preferences) -> Self {
        Self {
            current_path: None,
            preferences,
            nav: NavPanel::Empty,
            view: DocumentView::Idle,
            toc: Vec::new(),
            latest_token: 0,
        }
    }

    /// Source path of the document currently rendered.
    pub fn current_path(&self) -> Option<&str> {
        self.current_path.as_deref()
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    pub fn nav(&self) -> &NavPanel {
        &self.nav
    }

    pub fn view(&self) -> &DocumentView {
        &self.view
    }

    /// Headings of the rendered document.
    pub fn toc(&self) -> &[Heading] {
        &self.toc
    }
}

/// Drives the viewer: loads the manifest, renders documents, applies toggles.
///
/// # Examples
///
/// ```no_run
/// use docnav::{Engine, MemoryStore, SiteFetcher};
///
/// let mut engine = Engine::new(SiteFetcher::new().with_root("site"), MemoryStore::new());
/// engine.load_manifest("directory.json");
/// engine.load_document("index.md");
/// ```
pub struct Engine<'r, S, P> {
    source: S,
    store: P,
    renderer: MarkdownRenderer<'r>,
    state: ViewerState,
}

impl<'r, S: DocumentSource, P: PreferenceStore> Engine<'r, S, P> {
    /// Creates engine with the default renderer, restoring preferences from `store`.
    pub fn new(source: S, store: P) -> Self {
        Self::with_renderer(source, store, MarkdownRenderer::new())
    }

    pub fn with_renderer(source: S, store: P, renderer: MarkdownRenderer<'r>) -> Self {
        let preferences = Preferences::load(&store);
        debug!(
            theme = preferences.theme.as_str(),
            font_size = preferences.font_size,
            "Preferences restored"
        );

        Self {
            source,
            store,
            renderer,
            state: ViewerState::new(preferences),
        }
    }

    pub fn state(&self) -> &ViewerState {
        &self.state
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetches and installs the manifest at `target`.
    ///
    /// Any failure leaves an error navigation panel; the rest of the viewer
    /// keeps working.
    pub fn load_manifest(&mut self, target: &str) -> bool {
        match self.source.fetch(target) {
            Ok(json) => self.load_manifest_json(&json).is_ok(),
            Err(e) => {
                warn!(error = %e, "Failed to load manifest");
                self.state.nav = NavPanel::Unavailable(e.to_string());
                false
            }
        }
    }

    /// Parses manifest JSON and installs it.
    ///
    /// # Errors
    ///
    /// Returns the [`ManifestError`]; the navigation panel then shows it.
    pub fn load_manifest_json(&mut self, json: &str) -> Result<(), ManifestError> {
        match Manifest::from_json(json) {
            Ok(manifest) => {
                self.set_manifest(&manifest);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Manifest rejected");
                self.state.nav = NavPanel::Unavailable(e.to_string());
                Err(e)
            }
        }
    }

    /// Builds the navigation tree from a parsed manifest.
    pub fn set_manifest(&mut self, manifest: &Manifest) {
        let mut tree = NavTree::from_manifest(manifest);
        tree.restore_expanded(&self.state.preferences.expanded);
        info!(documents = tree.leaves().len(), "Navigation tree built");
        self.state.nav = NavPanel::Tree(tree);
    }

    /// Lists `root` live and uses it as the navigation tree.
    ///
    /// # Errors
    ///
    /// Returns [`NavError::Listing`]; the navigation panel then shows it.
    pub fn open_live<L: TreeListing>(&mut self, listing: &L, root: &str) -> Result<(), NavError> {
        match NavTree::open_live(listing, root) {
            Ok(tree) => {
                self.state.nav = NavPanel::Tree(tree);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Live listing failed");
                self.state.nav = NavPanel::Unavailable(e.to_string());
                Err(e)
            }
        }
    }

    /// Flips a directory of a manifest backed tree and persists the expanded set.
    ///
    /// # Errors
    ///
    /// Returns [`NavError`] if the directory is unknown or not yet listed.
    pub fn toggle_directory(&mut self, path: &str) -> Result<bool, NavError> {
        let tree = self.tree_mut(path)?;
        let expanded = tree.toggle(path)?;
        self.persist_expanded();
        Ok(expanded)
    }

    /// Flips a directory of a live tree, listing it on first expansion.
    ///
    /// # Errors
    ///
    /// Returns [`NavError`] if the directory is unknown or its listing fails.
    pub fn toggle_directory_live<L: TreeListing>(
        &mut self,
        path: &str,
        listing: &L,
    ) -> Result<bool, NavError> {
        let tree = self.tree_mut(path)?;
        let expanded = tree.toggle_live(path, listing)?;
        self.persist_expanded();
        Ok(expanded)
    }

    /// Expands the directories leading to a document.
    pub fn reveal(&mut self, path: &str) {
        if let NavPanel::Tree(tree) = &mut self.state.nav {
            tree.reveal(path);
        }
    }

    /// Collapses every directory without touching the persisted set.
    pub fn collapse_all(&mut self) {
        if let NavPanel::Tree(tree) = &mut self.state.nav {
            tree.collapse_all();
        }
    }

    /// Resets expansion to exactly the persisted set.
    pub fn restore_expanded(&mut self) {
        if let NavPanel::Tree(tree) = &mut self.state.nav {
            tree.collapse_all();
            tree.restore_expanded(&self.state.preferences.expanded);
        }
    }

    fn tree_mut(&mut self, path: &str) -> Result<&mut NavTree, NavError> {
        match &mut self.state.nav {
            NavPanel::Tree(tree) => Ok(tree),
            _ => Err(NavError::UnknownDirectory(path.to_string())),
        }
    }

    fn persist_expanded(&mut self) {
        if let NavPanel::Tree(tree) = &self.state.nav {
            let expanded = tree.expanded_paths();
            persist(&self.store, EXPANDED_KEY, &expanded.join("\n"));
            self.state.preferences.expanded = expanded;
        }
    }

    /// Enters `Loading` for `path` and returns the ticket its result must
    /// be delivered with.
    pub fn begin_load(&mut self, path: &str) -> LoadTicket {
        self.state.latest_token += 1;
        self.state.view = DocumentView::Loading {
            path: path.to_string(),
        };
        debug!(path, token = self.state.latest_token, "Loading document");

        LoadTicket {
            token: self.state.latest_token,
            path: path.to_string(),
        }
    }

    /// Delivers a fetch result.
    ///
    /// Returns false and changes nothing when a newer load was started after
    /// this ticket was issued.
    pub fn finish_load(&mut self, ticket: LoadTicket, result: Result<String, FetchError>) -> bool {
        if ticket.token != self.state.latest_token {
            debug!(path = %ticket.path, token = ticket.token, "Discarding stale load");
            return false;
        }

        let path = ticket.path;
        match result {
            Ok(source) => {
                let rebased = rebase_document(&source, &path);
                match self.renderer.render(&rebased) {
                    Ok(html) => {
                        self.state.toc = self.renderer.headings(&rebased);
                        self.state.current_path = Some(path.clone());
                        self.state.view = DocumentView::Rendered { path, html };
                    }
                    Err(e) => {
                        warn!(path = %path, error = %e, "Failed to render document");
                        let message = format!("failed to render {}: {:#}", path, e);
                        self.fail(path, message);
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "Failed to load document");
                self.fail(path, e.to_string());
            }
        }
        true
    }

    fn fail(&mut self, path: String, message: String) {
        self.state.toc.clear();
        self.state.view = DocumentView::Failed { path, message };
    }

    /// Fetches, rebases and renders the document at `path`.
    pub fn load_document(&mut self, path: &str) -> &DocumentView {
        let ticket = self.begin_load(path);
        let result = self.source.fetch(path);
        self.finish_load(ticket, result);
        &self.state.view
    }

    /// Loads the home document.
    pub fn start(&mut self, home: &str) -> &DocumentView {
        self.load_document(home)
    }

    /// Routes a link activated inside rendered content.
    ///
    /// Links to Markdown documents load into the content region; anything
    /// else opens natively.
    pub fn activate_link(&mut self, href: &str) -> LinkAction {
        let target = strip_suffixes(href);
        if target.is_empty() || !is_document(target) {
            return LinkAction::Native;
        }
        self.load_document(target);
        LinkAction::Intercepted(target.to_string())
    }

    /// Switches between day and night and persists the choice.
    pub fn toggle_theme(&mut self) -> Theme {
        let theme = self.state.preferences.theme.toggled();
        self.state.preferences.theme = theme;
        persist(&self.store, THEME_KEY, theme.as_str());
        theme
    }

    pub fn increase_font(&mut self) -> u32 {
        self.set_font_size(self.state.preferences.font_size.saturating_add(1))
    }

    pub fn decrease_font(&mut self) -> u32 {
        self.set_font_size(self.state.preferences.font_size.saturating_sub(1))
    }

    pub fn reset_font(&mut self) -> u32 {
        self.set_font_size(DEFAULT_FONT_SIZE)
    }

    fn set_font_size(&mut self, size: u32) -> u32 {
        let size = size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE);
        self.state.preferences.font_size = size;
        persist(
            &self.store,
            FONT_SIZE_KEY,
            &self.state.preferences.font_size_value(),
        );
        size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchErrorKind;
    use crate::prefs::MemoryStore;
    use std::collections::HashMap;

    struct FakeSource {
        docs: HashMap<String, String>,
    }

    impl FakeSource {
        fn new(docs: &[(&str, &str)]) -> Self {
            Self {
                docs: docs
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            }
        }
    }

    impl DocumentSource for FakeSource {
        fn fetch(&self, target: &str) -> Result<String, FetchError> {
            self.docs
                .get(target)
                .cloned()
                .ok_or_else(|| FetchError::new(target, FetchErrorKind::Status(404)))
        }
    }

    const MANIFEST: &str = r#"[
        {"type":"dir","name":"topics","path":"topics","content":[
            {"type":"file","name":"page.md","path":"topics/page.md","download_url":"topics/page.md"}
        ]}
    ]"#;

    fn engine(docs: &[(&str, &str)]) -> Engine<'static, FakeSource, MemoryStore> {
        Engine::new(FakeSource::new(docs), MemoryStore::new())
    }

    #[test]
    fn test_load_document_rebases_and_renders() {
        // Arrange
        let mut engine = engine(&[("topics/x/page.md", "# Page\n\n![a](img/a.png)")]);

        // Act
        let view = engine.load_document("topics/x/page.md").clone();

        // Assert
        match view {
            DocumentView::Rendered { path, html } => {
                assert_eq!(path, "topics/x/page.md");
                assert!(html.contains("src=\"topics/x/img/a.png\""), "{}", html);
            }
            other => panic!("Expected rendered view, got {:?}", other),
        }
        assert_eq!(engine.state().current_path(), Some("topics/x/page.md"));
        assert_eq!(engine.state().toc().len(), 1);
    }

    #[test]
    fn test_load_failure_keeps_navigation() {
        // Arrange
        let mut engine = engine(&[]);
        engine.load_manifest_json(MANIFEST).expect("Should load manifest");
        let nav_before = engine.state().nav().clone();

        // Act
        let view = engine.load_document("topics/missing.md").clone();

        // Assert
        match view {
            DocumentView::Failed { message, .. } => {
                assert!(message.contains("topics/missing.md"), "{}", message);
                assert!(message.contains("404"), "{}", message);
            }
            other => panic!("Expected failed view, got {:?}", other),
        }
        assert_eq!(engine.state().nav(), &nav_before);
        assert_eq!(engine.state().current_path(), None);
    }

    #[test]
    fn test_failure_then_new_navigation_recovers() {
        // Arrange
        let mut engine = engine(&[("ok.md", "fine")]);
        engine.load_document("missing.md");

        // Act
        let view = engine.load_document("ok.md");

        // Assert
        assert!(matches!(view, DocumentView::Rendered { .. }));
    }

    #[test]
    fn test_stale_completion_is_discarded() {
        // Arrange
        let mut engine = engine(&[]);
        let first = engine.begin_load("slow.md");
        let second = engine.begin_load("fast.md");

        // Act: newer load resolves first, older one afterwards
        let applied_second = engine.finish_load(second, Ok("# Fast".to_string()));
        let applied_first = engine.finish_load(first, Ok("# Slow".to_string()));

        // Assert
        assert!(applied_second);
        assert!(!applied_first);
        assert_eq!(engine.state().current_path(), Some("fast.md"));
    }

    #[test]
    fn test_loading_state_between_begin_and_finish() {
        // Arrange
        let mut engine = engine(&[]);

        // Act
        let ticket = engine.begin_load("a.md");

        // Assert
        assert_eq!(
            engine.state().view(),
            &DocumentView::Loading {
                path: "a.md".to_string()
            }
        );
        assert_eq!(ticket.path(), "a.md");
        assert!(engine.finish_load(ticket, Ok(String::new())));
    }

    #[test]
    fn test_malformed_manifest_shows_error_panel() {
        // Arrange
        let mut engine = engine(&[("directory.json", r#"{"message":"oops"}"#)]);

        // Act
        let loaded = engine.load_manifest("directory.json");

        // Assert
        assert!(!loaded);
        assert!(matches!(engine.state().nav(), NavPanel::Unavailable(_)));
    }

    #[test]
    fn test_missing_manifest_shows_error_panel() {
        // Arrange
        let mut engine = engine(&[]);

        // Act
        let loaded = engine.load_manifest("directory.json");

        // Assert
        assert!(!loaded);
        match engine.state().nav() {
            NavPanel::Unavailable(message) => assert!(message.contains("directory.json")),
            other => panic!("Expected error panel, got {:?}", other),
        }
    }

    #[test]
    fn test_activate_link_intercepts_documents() {
        // Arrange
        let mut engine = engine(&[("topics/b.md", "# B")]);

        // Act
        let doc = engine.activate_link("topics/b.md#section");
        let site = engine.activate_link("https://example.com/");
        let image = engine.activate_link("topics/a.png");

        // Assert
        assert_eq!(doc, LinkAction::Intercepted("topics/b.md".to_string()));
        assert_eq!(site, LinkAction::Native);
        assert_eq!(image, LinkAction::Native);
        assert_eq!(engine.state().current_path(), Some("topics/b.md"));
    }

    #[test]
    fn test_theme_toggle_twice_restores_persisted_value() {
        // Arrange
        let store = MemoryStore::new();
        store.set(THEME_KEY, "night").expect("set");
        let mut engine = Engine::new(FakeSource::new(&[]), &store);

        // Act
        let first = engine.toggle_theme();
        let persisted_after_first = store.get(THEME_KEY);
        let second = engine.toggle_theme();

        // Assert
        assert_eq!(first, Theme::Day);
        assert_eq!(persisted_after_first.as_deref(), Some("day"));
        assert_eq!(second, Theme::Night);
        assert_eq!(store.get(THEME_KEY).as_deref(), Some("night"));
    }

    #[test]
    fn test_font_controls_clamp_and_persist() {
        // Arrange
        let store = MemoryStore::new();
        let mut engine = Engine::new(FakeSource::new(&[]), &store);

        // Act
        for _ in 0..10 {
            engine.increase_font();
        }
        let max = engine.state().preferences().font_size;
        let reset = engine.reset_font();
        let smaller = engine.decrease_font();

        // Assert
        assert_eq!(max, MAX_FONT_SIZE);
        assert_eq!(reset, DEFAULT_FONT_SIZE);
        assert_eq!(smaller, DEFAULT_FONT_SIZE - 1);
        assert_eq!(store.get(FONT_SIZE_KEY).as_deref(), Some("17px"));
    }

    #[test]
    fn test_expanded_directories_persist_and_restore() {
        // Arrange
        let store = MemoryStore::new();
        let mut engine = Engine::new(FakeSource::new(&[]), &store);
        engine.load_manifest_json(MANIFEST).expect("Should load");

        // Act
        engine.toggle_directory("topics").expect("Should toggle");
        let mut reopened = Engine::new(FakeSource::new(&[]), &store);
        reopened.load_manifest_json(MANIFEST).expect("Should load");

        // Assert
        assert_eq!(store.get(EXPANDED_KEY).as_deref(), Some("topics"));
        match reopened.state().nav() {
            NavPanel::Tree(tree) => assert_eq!(tree.expanded_paths(), vec!["topics"]),
            other => panic!("Expected tree, got {:?}", other),
        }
    }
}
