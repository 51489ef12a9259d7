//! Navigation breadcrumb component

use maud::{Markup, html};

/// Renders breadcrumb navigation
///
/// Shows the source path of the current document as a trail of directory
/// names ending with the document name. Directories have no page of their
/// own, so only the site root is a link.
///
/// # Arguments
///
/// * `index_path`: Relative path back to index.html
/// * `path`: Source path of the document
///
/// # Returns
///
/// Breadcrumb navigation markup with separators
pub fn breadcrumb(index_path: &str, path: &str) -> Markup {
    let components = path_components(path);

    html! {
        nav class="breadcrumb" {
            a href=(index_path) class="breadcrumb-link" { "Home" }
            @for (idx, component) in components.iter().enumerate() {
                span class="breadcrumb-separator" { "/" }
                @if idx + 1 == components.len() {
                    span class="breadcrumb-current" { (*component) }
                } @else {
                    span class="breadcrumb-dir" { (*component) }
                }
            }
        }
    }
}

/// Extracts path components from file path
///
/// Splits path string on forward slashes and filters empty components.
pub fn path_components(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}
