//! Page layout wrapper component

use maud::{DOCTYPE, Markup, html};

use crate::assets::{SCRIPT, STYLESHEET};
use crate::prefs::{EXPANDED_KEY, FONT_SIZE_KEY, Preferences, THEME_KEY};

/// Wraps page content with standard HTML structure
///
/// Provides DOCTYPE, head and the three column shell (sidebar, content,
/// table of contents). The restored theme becomes the `html` class and the
/// restored font size the root font size, so the first paint already
/// reflects the viewer preferences.
///
/// # Arguments
///
/// * `title`: Page title text (without suffix)
/// * `root`: Relative prefix back to the site root, e.g. `../../`
/// * `preferences`: Theme and font size to start with
/// * `sidebar`: Navigation panel markup
/// * `body`: Content region markup
/// * `toc`: Table of contents markup
///
/// # Returns
///
/// Complete HTML document with wrapped content
pub fn page_wrapper(
    title: &str,
    root: &str,
    preferences: &Preferences,
    sidebar: Markup,
    body: Markup,
    toc: Markup,
) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" class=(preferences.theme.as_str())
            style=(format!("font-size: {}", preferences.font_size_value())) {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) " - docnav" }
                link rel="stylesheet" href=(format!("{}assets/{}", root, STYLESHEET));
            }
            body {
                (toolbar(root))
                div class="container" {
                    aside class="sidebar" { (sidebar) }
                    main class="content" { (body) }
                    aside class="toc-panel" { (toc) }
                }
                script src=(format!("{}assets/{}", root, SCRIPT))
                    data-theme-key=(THEME_KEY)
                    data-font-key=(FONT_SIZE_KEY)
                    data-expanded-key=(EXPANDED_KEY) {}
            }
        }
    }
}

/// Top bar with the home link, theme toggle and font controls.
fn toolbar(root: &str) -> Markup {
    html! {
        header class="toolbar" {
            a href=(format!("{}index.html", root)) class="toolbar-home" { "Home" }
            div class="toolbar-controls" {
                button type="button" data-action="toggle-theme" title="Toggle theme" { "◐" }
                button type="button" data-action="font-down" title="Smaller text" { "A-" }
                button type="button" data-action="font-reset" title="Default size" { "A" }
                button type="button" data-action="font-up" title="Larger text" { "A+" }
            }
        }
    }
}
