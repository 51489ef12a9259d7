//! Markdown handling: source rebasing, conversion to HTML and link scanning.
//!
//! Relative references are rebased in the raw source before conversion, the
//! renderer uses comrak with GFM extensions and a highlight callback, and the
//! link scanner lets page writers relocate URLs in the rendered HTML.

pub mod links;
mod rebase;
mod renderer;
mod toc;

pub use rebase::{is_absolute, rebase_document, rebase_relative_link};
pub use renderer::{Highlight, MarkdownRenderer, SyntectHighlighter};
pub use toc::Heading;
