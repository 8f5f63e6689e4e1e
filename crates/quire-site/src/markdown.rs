//! Markdown to HTML conversion.

use pulldown_cmark::{Options, Parser, html};

/// Extensions enabled for content bodies.
fn parser_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
}

/// Render expanded Markdown to HTML.
///
/// Raw HTML, including shortcode fragments and placeholders, passes through
/// unchanged.
#[must_use]
pub fn render_markdown(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, parser_options());
    let mut output = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut output, parser);
    output
}
