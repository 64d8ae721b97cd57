//! Markdown rendering for the static page content.

use pulldown_cmark::{html, Options, Parser};

/// Renders CommonMark (plus tables, footnotes and strikethrough) to HTML.
pub fn markdown_to_html(content: &str) -> String {
    let options = Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_HEADING_ATTRIBUTES;
    let parser = Parser::new_ext(content, options);
    let mut out = String::new();
    html::push_html(&mut out, parser);
    out
}
