//! Document content region component

use maud::{Markup, PreEscaped, html};

use crate::engine::DocumentView;

/// Renders the content region for the current document view.
///
/// Rendered HTML is inserted as is. A failed load shows its message inline
/// in the content region only.
pub fn document_view(view: &DocumentView) -> Markup {
    html! {
        @match view {
            DocumentView::Idle => {
                p class="placeholder" { "Select a document" }
            }
            DocumentView::Loading { path } => {
                p class="placeholder" { "Loading " (path) "…" }
            }
            DocumentView::Rendered { html, .. } => {
                article class="markdown-body" { (PreEscaped(html)) }
            }
            DocumentView::Failed { message, .. } => {
                p class="load-error" { (message) }
            }
        }
    }
}
