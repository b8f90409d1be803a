//! Markdown → standalone HTML document.
//!
//! GitHub-style extensions are enabled because writeups lean on them:
//! tables for flag/port listings, strikethrough, task lists and footnotes.
//! Fenced code blocks are part of CommonMark itself.

use crate::config::PageFormat;
use crate::templates;
use pulldown_cmark::{html, Options, Parser};

fn markdown_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_FOOTNOTES
}

/// Render a markdown fragment to an HTML body fragment.
pub fn markdown_to_html_body(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, markdown_options());
    let mut body = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut body, parser);
    body
}

/// Render markdown into a complete, styled HTML document.
pub fn markdown_to_html(markdown: &str, title: &str, page: &PageFormat) -> String {
    templates::html_document(title, &markdown_to_html_body(markdown), page)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headings_code_and_tables() {
        let md = "# Title\n\n```python\nprint(1)\n```\n\n| a | b |\n|---|---|\n| 1 | 2 |\n";
        let body = markdown_to_html_body(md);
        assert!(body.contains("<h1>Title</h1>"));
        assert!(body.contains("<pre><code class=\"language-python\">"));
        assert!(body.contains("<table>"));
        assert!(body.contains("<td>2</td>"));
    }

    #[test]
    fn blockquote_and_rule() {
        let body = markdown_to_html_body("> quoted\n\n---\n");
        assert!(body.contains("<blockquote>"));
        assert!(body.contains("<hr />"));
    }

    #[test]
    fn data_url_images_survive() {
        let body = markdown_to_html_body("![d](data:image/png;base64,iVBORw0KGgo=)");
        assert!(
            body.contains(r#"src="data:image/png;base64,iVBORw0KGgo=""#),
            "got: {body}"
        );
    }

    #[test]
    fn full_document_wraps_body() {
        let html = markdown_to_html("**bold**", "t", &PageFormat::a4());
        assert!(html.contains("<strong>bold</strong>"));
        assert!(html.contains("@page"));
        assert!(html.trim_end().ends_with("</html>"));
    }
}
