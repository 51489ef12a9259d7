//! Link scanning in rendered HTML.

/// Attribute a rewritten URL came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    /// `<a href="...">`
    Anchor,
    /// `<img src="...">`
    Image,
}

/// Rewrites every `<a href>` and `<img src>` URL in rendered HTML.
///
/// The callback receives the raw attribute value and returns the replacement,
/// or `None` to keep the URL as is.
///
/// # Arguments
///
/// * `html`: HTML from markdown conversion
/// * `rewrite`: Decides the new URL for each link
///
/// # Returns
///
/// HTML with rewritten link URLs
pub fn rewrite_links<F>(html: &str, mut rewrite: F) -> String
where
    F: FnMut(&str, LinkKind) -> Option<String>,
{
    let mut result = String::with_capacity(html.len());
    let mut pos = 0;

    while pos < html.len() {
        let link_pos = html[pos..].find("<a ");
        let img_pos = html[pos..].find("<img ");

        let (tag_start, kind) = match (link_pos, img_pos) {
            (Some(l), Some(i)) if l < i => (pos + l, LinkKind::Anchor),
            (Some(l), None) => (pos + l, LinkKind::Anchor),
            (_, Some(i)) => (pos + i, LinkKind::Image),
            (None, None) => {
                result.push_str(&html[pos..]);
                break;
            }
        };

        result.push_str(&html[pos..tag_start]);

        let tag_end = html[tag_start..]
            .find('>')
            .map_or(html.len(), |p| tag_start + p);
        let attr = match kind {
            LinkKind::Anchor => "href=\"",
            LinkKind::Image => "src=\"",
        };

        // Attribute must belong to this tag, not a later one
        let attr_start = match html[tag_start..tag_end].find(attr) {
            Some(p) => tag_start + p + attr.len(),
            None => {
                result.push_str(&html[tag_start..tag_start + 1]);
                pos = tag_start + 1;
                continue;
            }
        };

        let attr_end = match html[attr_start..].find('"') {
            Some(p) => attr_start + p,
            None => {
                result.push_str(&html[tag_start..attr_start]);
                pos = attr_start;
                continue;
            }
        };

        let url = &html[attr_start..attr_end];
        let replaced = rewrite(url, kind).unwrap_or_else(|| url.to_string());

        result.push_str(&html[tag_start..attr_start]);
        result.push_str(&replaced);

        pos = attr_end;
    }

    result
}

/// Normalizes a slash separated path by resolving `.` and `..` segments.
///
/// Returns `None` when the path escapes its root.
pub fn normalize(path: &str) -> Option<String> {
    let mut components: Vec<&str> = Vec::new();

    for component in path.split('/') {
        match component {
            "" | "." => {}
            ".." => {
                components.pop()?;
            }
            normal => components.push(normal),
        }
    }

    Some(components.join("/"))
}

/// Resolves `.` and `..` segments in the path of a `scheme://host/path` URL.
///
/// Returns `None` for URLs without an authority or whose path escapes the host root.
pub fn normalize_url(url: &str) -> Option<String> {
    let (scheme, rest) = url.split_once("://")?;
    let (host, path) = rest.split_once('/').unwrap_or((rest, ""));
    let path = normalize(path)?;
    Some(format!("{}://{}/{}", scheme, host, path))
}

/// Strips a `#fragment` and `?query` suffix from a link target.
pub fn strip_suffixes(link: &str) -> &str {
    let end = link.find(['#', '?']).unwrap_or(link.len());
    &link[..end]
}
