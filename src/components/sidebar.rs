//! Collapsible navigation sidebar component

use maud::{Markup, html};

use crate::engine::NavPanel;
use crate::nav::{NavGroup, NavLeaf, NavNode};

/// Renders the navigation panel
///
/// Directories become `<details>` groups, open when expanded in the tree.
/// Leaves become links; `href` decides where each leaf points. A manifest
/// that failed to load shows its error in place of the tree.
///
/// # Arguments
///
/// * `panel`: Navigation panel state
/// * `current`: Source path of the document on this page, highlighted
/// * `href`: Link target for a leaf
pub fn sidebar(panel: &NavPanel, current: Option<&str>, href: &dyn Fn(&NavLeaf) -> String) -> Markup {
    html! {
        nav class="nav-tree" {
            @match panel {
                NavPanel::Empty => {
                    p class="nav-empty" { "No documents" }
                }
                NavPanel::Unavailable(message) => {
                    p class="nav-error" { (message) }
                }
                NavPanel::Tree(tree) => {
                    @if tree.is_empty() {
                        p class="nav-empty" { "No documents" }
                    } @else {
                        (node_list(tree.roots(), current, href))
                    }
                }
            }
        }
    }
}

fn node_list(nodes: &[NavNode], current: Option<&str>, href: &dyn Fn(&NavLeaf) -> String) -> Markup {
    html! {
        ul class="nav-list" {
            @for node in nodes {
                li {
                    @match node {
                        NavNode::Group(group) => {
                            (group_item(group, current, href))
                        }
                        NavNode::Leaf(leaf) => {
                            @let active = current == Some(leaf.path.as_str());
                            a href=(href(leaf)) class=(if active { "nav-leaf active" } else { "nav-leaf" }) {
                                (leaf.name)
                            }
                        }
                    }
                }
            }
        }
    }
}

fn group_item(group: &NavGroup, current: Option<&str>, href: &dyn Fn(&NavLeaf) -> String) -> Markup {
    html! {
        details class="nav-group" open[group.expanded] data-path=(group.path) {
            summary { (group.name) }
            @if let Some(children) = group.children() {
                (node_list(children, current, href))
            }
        }
    }
}
