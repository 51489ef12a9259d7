//! Markdown to HTML conversion with a pluggable highlight callback.

use anyhow::{Context, Result};
use comrak::Options;
use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

use super::toc::{self, Heading};

/// Syntax highlighting callback used for fenced code blocks.
pub trait Highlight {
    /// Returns highlighted HTML for `code` written in `language`.
    ///
    /// # Errors
    ///
    /// Returns error if the highlighter fails on the input.
    fn highlight(&self, code: &str, language: &str) -> Result<String>;
}

/// Highlights with syntect, emitting `hljs-` prefixed CSS classes.
pub struct SyntectHighlighter {
    syntax_set: SyntaxSet,
}

impl SyntectHighlighter {
    pub fn new() -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
        }
    }
}

impl Default for SyntectHighlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl Highlight for SyntectHighlighter {
    /// Unknown languages fall back to escaped plain text.
    fn highlight(&self, code: &str, language: &str) -> Result<String> {
        if code.is_empty() {
            return Ok(String::new());
        }

        let syntax = self
            .syntax_set
            .find_syntax_by_token(language)
            .or_else(|| self.syntax_set.find_syntax_by_extension(language));

        let Some(syntax) = syntax else {
            return Ok(html_escape(code));
        };

        let mut generator = ClassedHTMLGenerator::new_with_class_style(
            syntax,
            &self.syntax_set,
            ClassStyle::SpacedPrefixed { prefix: "hljs-" },
        );

        for line in LinesWithEndings::from(code) {
            generator
                .parse_html_for_line_which_includes_newline(line)
                .context("Failed to parse line for syntax highlighting")?;
        }

        Ok(generator.finalize())
    }
}

/// Converts Markdown documents to HTML.
///
/// Enables the GFM extensions (tables, strikethrough, autolinks, task lists,
/// footnotes) plus heading ids so table of contents links resolve. Raw HTML
/// in documents passes through; the documents come from the mirrored
/// repository and are trusted.
pub struct MarkdownRenderer<'a> {
    options: Options<'a>,
    highlighter: Box<dyn Highlight>,
}

impl<'a> MarkdownRenderer<'a> {
    /// Creates renderer with syntect highlighting.
    pub fn new() -> Self {
        Self::with_highlighter(SyntectHighlighter::new())
    }

    /// Creates renderer with a custom highlight callback.
    pub fn with_highlighter(highlighter: impl Highlight + 'static) -> Self {
        let mut options = Options::default();

        options.extension.strikethrough = true;
        options.extension.table = true;
        options.extension.autolink = true;
        options.extension.tasklist = true;
        options.extension.footnotes = true;
        options.extension.header_ids = Some(String::new());

        options.render.unsafe_ = true;

        Self {
            options,
            highlighter: Box::new(highlighter),
        }
    }

    /// Renders markdown content to HTML.
    ///
    /// # Errors
    ///
    /// Returns error if the highlight callback fails.
    pub fn render(&self, content: &str) -> Result<String> {
        let html = comrak::markdown_to_html(content, &self.options);
        self.highlight_code_blocks(&html)
    }

    /// Headings of `content` with the ids [`render`](Self::render) assigns.
    pub fn headings(&self, content: &str) -> Vec<Heading> {
        toc::headings(content, &self.options)
    }

    /// Replaces the body of every `<code class="language-X">` block with
    /// highlighted HTML.
    fn highlight_code_blocks(&self, html: &str) -> Result<String> {
        const OPEN: &str = "<code class=\"language-";

        let mut result = String::with_capacity(html.len());
        let mut last_end = 0;
        let mut search_pos = 0;

        while let Some(found) = html[search_pos..].find(OPEN) {
            let code_start = search_pos + found;
            let lang_start = code_start + OPEN.len();

            let Some(lang_len) = html[lang_start..].find('"') else {
                search_pos = code_start + 1;
                continue;
            };
            let lang_end = lang_start + lang_len;
            let language = &html[lang_start..lang_end];

            let Some(open_len) = html[lang_end..].find('>') else {
                search_pos = code_start + 1;
                continue;
            };
            let content_start = lang_end + open_len + 1;

            let Some(content_len) = html[content_start..].find("</code>") else {
                search_pos = code_start + 1;
                continue;
            };
            let content_end = content_start + content_len;

            let code = html_decode(&html[content_start..content_end]);
            let highlighted = self
                .highlighter
                .highlight(&code, language)
                .context("Failed to highlight code block")?;

            result.push_str(&html[last_end..code_start]);
            result.push_str(OPEN);
            result.push_str(language);
            result.push_str("\">");
            result.push_str(&highlighted);
            result.push_str("</code>");

            last_end = content_end + "</code>".len();
            search_pos = last_end;
        }

        result.push_str(&html[last_end..]);
        Ok(result)
    }
}

impl<'a> Default for MarkdownRenderer<'a> {
    fn default() -> Self {
        Self::new()
    }
}

/// Reverses the entity escaping comrak applies inside code blocks.
fn html_decode(html: &str) -> String {
    html.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
