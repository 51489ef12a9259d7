//! Rebasing of relative references in raw Markdown source.
//!
//! Documents are written with links relative to their own directory. Once
//! rendered into a page that resolves URLs from the site root, every relative
//! image and hyperlink has to be prefixed with the document's directory.

use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Schemes that mark a reference as absolute.
const RECOGNIZED_SCHEMES: &[&str] = &["http", "https", "ftp", "mailto", "data", "tel"];

/// Inline links and images: `[text](target "title")` and `![alt](target)`.
static INLINE_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?P<head>!?\[[^\]\n]*\]\([ \t]*)(?P<url><[^>\n]*>|[^)\s]+)")
        .expect("inline link pattern is valid")
});

/// Reference definitions: `[id]: target "title"`.
static REFERENCE_DEF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^(?P<head> {0,3}\[[^\]\n]+\]:[ \t]*)(?P<url><[^>\n]*>|\S+)")
        .expect("reference definition pattern is valid")
});

/// Returns true when `link` must not be rebased.
///
/// Absolute references start with a recognized scheme or `//`. Fragment-only
/// (`#x`) and root-absolute (`/x`) references already resolve from the site
/// root or the current page.
pub fn is_absolute(link: &str) -> bool {
    if link.is_empty() || link.starts_with('#') || link.starts_with('/') {
        return true;
    }
    match link.split_once(':') {
        Some((scheme, _)) => RECOGNIZED_SCHEMES
            .iter()
            .any(|known| scheme.eq_ignore_ascii_case(known)),
        None => false,
    }
}

/// Rewrites `link` so it resolves from the site root instead of from the
/// directory of `current_document_path`.
///
/// The directory portion is everything before the final `/` of the document
/// path. It is joined to the link with exactly one separator. A document at
/// the root (no `/`) leaves the link as it is.
///
/// # Examples
///
/// ```
/// use docnav::rebase_relative_link;
///
/// assert_eq!(rebase_relative_link("img/a.png", "topics/x/page.md"), "topics/x/img/a.png");
/// assert_eq!(
///     rebase_relative_link("https://host/a.png", "topics/x/page.md"),
///     "https://host/a.png"
/// );
/// ```
pub fn rebase_relative_link(link: &str, current_document_path: &str) -> String {
    if is_absolute(link) {
        return link.to_string();
    }

    let Some((dir, _)) = current_document_path.rsplit_once('/') else {
        return link.to_string();
    };

    let mut relative = link;
    while let Some(rest) = relative.strip_prefix("./") {
        relative = rest;
    }

    format!("{}/{}", dir.trim_end_matches('/'), relative)
}

/// Rebases every relative image, hyperlink and reference definition in
/// `source` against `current_document_path`.
///
/// Fenced code blocks, indented code blocks and inline code spans are copied
/// verbatim.
pub fn rebase_document(source: &str, current_document_path: &str) -> String {
    let mut result = String::with_capacity(source.len() + 64);
    let mut prose = String::new();
    let mut fence: Option<Fence> = None;
    // Whether an indented line here would open a code block
    let mut block_start = true;
    let mut in_indented = false;
    let mut in_list = false;

    for line in source.split_inclusive('\n') {
        if let Some(open) = fence {
            result.push_str(line);
            if open.is_closed_by(line) {
                fence = None;
                block_start = true;
            }
            continue;
        }

        let blank = line.trim().is_empty();
        let indented = is_indented(line);

        if in_indented {
            if blank || indented {
                result.push_str(line);
                continue;
            }
            in_indented = false;
        } else if indented && block_start && !in_list {
            flush(&mut result, &mut prose, current_document_path);
            result.push_str(line);
            in_indented = true;
            continue;
        }

        if let Some(open) = Fence::opening(line) {
            flush(&mut result, &mut prose, current_document_path);
            result.push_str(line);
            fence = Some(open);
            in_list = false;
            continue;
        }

        if !blank && !indented {
            in_list = is_list_item(line);
        }
        block_start = blank;
        prose.push_str(line);
    }

    flush(&mut result, &mut prose, current_document_path);
    result
}

/// An open code fence: its character and run length.
#[derive(Clone, Copy)]
struct Fence {
    marker: char,
    len: usize,
}

impl Fence {
    fn opening(line: &str) -> Option<Self> {
        let trimmed = line.trim_start_matches(' ');
        if line.len() - trimmed.len() > 3 {
            return None;
        }
        let marker = trimmed.chars().next().filter(|c| *c == '`' || *c == '~')?;
        let len = trimmed.chars().take_while(|c| *c == marker).count();
        (len >= 3).then_some(Self { marker, len })
    }

    /// A closing fence uses the same character, at least as many times, and
    /// nothing else.
    fn is_closed_by(self, line: &str) -> bool {
        let trimmed = line.trim_start_matches(' ');
        if line.len() - trimmed.len() > 3 {
            return false;
        }
        let len = trimmed.chars().take_while(|c| *c == self.marker).count();
        len >= self.len && trimmed[len * self.marker.len_utf8()..].trim().is_empty()
    }
}

fn is_indented(line: &str) -> bool {
    line.starts_with("    ") || line.starts_with('\t')
}

fn is_list_item(line: &str) -> bool {
    let trimmed = line.trim_start();
    if ["- ", "* ", "+ "].iter().any(|m| trimmed.starts_with(m)) {
        return true;
    }
    let digits = trimmed.chars().take_while(char::is_ascii_digit).count();
    digits > 0 && (trimmed[digits..].starts_with(". ") || trimmed[digits..].starts_with(") "))
}

fn flush(result: &mut String, prose: &mut String, current_document_path: &str) {
    result.push_str(&rebase_prose(prose, current_document_path));
    prose.clear();
}

/// Byte ranges of inline code spans: a backtick run closed by a run of the
/// same length.
fn code_spans(text: &str) -> Vec<(usize, usize)> {
    let bytes = text.as_bytes();
    let mut spans = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        if bytes[pos] != b'`' {
            pos += 1;
            continue;
        }
        let open_len = bytes[pos..].iter().take_while(|b| **b == b'`').count();
        let mut search = pos + open_len;
        let mut close = None;
        while search < bytes.len() {
            if bytes[search] != b'`' {
                search += 1;
                continue;
            }
            let run = bytes[search..].iter().take_while(|b| **b == b'`').count();
            if run == open_len {
                close = Some(search + run);
                break;
            }
            search += run;
        }
        match close {
            Some(end) => {
                spans.push((pos, end));
                pos = end;
            }
            None => pos += open_len,
        }
    }

    spans
}

fn rebase_prose(text: &str, current_document_path: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let inline = replace_outside_code(&INLINE_LINK, text, current_document_path);
    replace_outside_code(&REFERENCE_DEF, &inline, current_document_path)
}

fn replace_outside_code(pattern: &Regex, text: &str, current_document_path: &str) -> String {
    let spans = code_spans(text);

    pattern
        .replace_all(text, |caps: &Captures| {
            let whole = &caps[0];
            let start = caps.get(0).map_or(0, |m| m.start());
            if spans.iter().any(|(from, to)| start >= *from && start < *to) {
                return whole.to_string();
            }

            let url = &caps["url"];
            let rebased = match url.strip_prefix('<').and_then(|u| u.strip_suffix('>')) {
                Some(inner) => format!("<{}>", rebase_relative_link(inner, current_document_path)),
                None => rebase_relative_link(url, current_document_path),
            };
            format!("{}{}", &caps["head"], rebased)
        })
        .into_owned()
}
