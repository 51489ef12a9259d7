//! Table of contents extraction.

use comrak::html::Anchorizer;
use comrak::nodes::NodeValue;
use comrak::{Arena, Options, parse_document};

/// A document heading with the anchor id the renderer gives it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    pub level: u8,
    pub text: String,
    pub anchor: String,
}

/// Collects headings in document order.
///
/// Anchors are generated with the same algorithm the renderer uses for
/// heading ids, so `#anchor` links land on the rendered heading.
pub fn headings(content: &str, options: &Options) -> Vec<Heading> {
    let arena = Arena::new();
    let root = parse_document(&arena, content, options);
    let mut anchorizer = Anchorizer::new();
    let mut result = Vec::new();

    for node in root.descendants() {
        let level = match node.data.borrow().value {
            NodeValue::Heading(ref heading) => heading.level,
            _ => continue,
        };

        let mut text = String::new();
        for child in node.descendants().skip(1) {
            match child.data.borrow().value {
                NodeValue::Text(ref literal) => text.push_str(literal),
                NodeValue::Code(ref code) => text.push_str(&code.literal),
                _ => {}
            }
        }

        let anchor = anchorizer.anchorize(text.clone());
        result.push(Heading {
            level,
            text,
            anchor,
        });
    }

    result
}
