//! Table of contents component

use maud::{Markup, html};

use crate::markdown::Heading;

/// Renders heading links, indented by level. Empty when there are no headings.
pub fn toc(headings: &[Heading]) -> Markup {
    html! {
        @if !headings.is_empty() {
            nav class="toc" {
                p class="toc-title" { "Contents" }
                ul {
                    @for heading in headings {
                        li class=(format!("toc-level-{}", heading.level)) {
                            a href=(format!("#{}", heading.anchor)) { (heading.text) }
                        }
                    }
                }
            }
        }
    }
}
