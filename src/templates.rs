//! Text templates: the writeup title block, the index document, the style
//! sheet and the HTML shell every document is wrapped in.
//!
//! Keeping every piece of generated text here means the look of the output
//! can be changed in one place, and tests can inspect the templates without
//! running a browser.

use crate::config::PageFormat;

/// Label in front of the category in the writeup title block.
pub const CATEGORY_LABEL: &str = "Category";

/// Section heading above the per-category lists in the index.
pub const INDEX_SECTION_HEADING: &str = "Challenges";

/// Footer note of the index document.
pub const GENERATED_NOTE: &str = "Generated automatically";

/// Title block prepended to every writeup: the name as a level-1 heading,
/// the category as a bold field, then a horizontal rule.
pub fn title_block(name: &str, category: &str) -> String {
    format!("# {name}\n\n**{CATEGORY_LABEL}:** {category}\n\n---\n\n")
}

/// Style sheet embedded in every document. `@page` mirrors the print
/// parameters so the CSS and engine page boxes agree.
pub fn stylesheet(page: &PageFormat) -> String {
    format!(
        r#"@page {{
    size: {width}in {height}in;
    margin: {margin}cm;
}}

body {{
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
    line-height: 1.6;
    color: #333;
    font-size: 14px;
}}

h1, h2, h3, h4, h5, h6 {{
    color: #2c3e50;
    margin-top: 2em;
    margin-bottom: 1em;
    page-break-after: avoid;
}}

h1 {{
    border-bottom: 3px solid #3498db;
    padding-bottom: 10px;
    font-size: 28px;
}}

h2 {{
    border-bottom: 2px solid #ecf0f1;
    padding-bottom: 5px;
    font-size: 22px;
}}

h3 {{
    font-size: 18px;
}}

code {{
    background-color: #f8f9fa;
    padding: 2px 4px;
    border-radius: 3px;
    font-family: 'Monaco', 'Menlo', 'Ubuntu Mono', monospace;
    font-size: 12px;
    color: #e74c3c;
}}

pre {{
    background-color: #2c3e50;
    color: #ecf0f1;
    padding: 15px;
    border-radius: 5px;
    overflow-x: auto;
    white-space: pre-wrap;
    word-wrap: break-word;
    margin: 1em 0;
    page-break-inside: avoid;
}}

pre code {{
    background-color: transparent;
    color: inherit;
    padding: 0;
    font-size: 11px;
}}

img {{
    max-width: 100%;
    height: auto;
    margin: 10px 0;
    border-radius: 5px;
    box-shadow: 0 2px 8px rgba(0,0,0,0.1);
    page-break-inside: avoid;
}}

table {{
    border-collapse: collapse;
    width: 100%;
    margin: 1em 0;
    page-break-inside: avoid;
}}

th, td {{
    border: 1px solid #ddd;
    padding: 8px;
    text-align: left;
    font-size: 12px;
}}

th {{
    background-color: #f2f2f2;
    font-weight: bold;
}}

blockquote {{
    border-left: 4px solid #3498db;
    margin: 1em 0;
    padding-left: 1em;
    color: #7f8c8d;
}}
"#,
        width = page.width_in,
        height = page.height_in,
        margin = page.margin_cm,
    )
}

/// Wrap an HTML body fragment in a standalone document with the style sheet
/// inlined, so the engine never fetches anything.
pub fn html_document(title: &str, body: &str, page: &PageFormat) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n<style>\n{css}</style>\n</head>\n<body>\n{body}</body>\n</html>\n",
        title = escape_text(title),
        css = stylesheet(page),
    )
}

/// Minimal HTML text escaping for the `<title>` element.
fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
