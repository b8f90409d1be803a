//! Index document: every discovered writeup grouped by category.
//!
//! ```text
//! # CTF Writeups Collection
//!
//! ## Challenges
//!
//! ### CRYPTO
//!
//! - rsa-baby
//!
//! ### WEB
//!
//! - chal1
//! - chal2
//!
//! **Total challenges:** 3
//! **Categories:** 2
//!
//! ---
//!
//! *Generated automatically*
//! ```
//!
//! Categories and names are sorted independently of discovery order, so the
//! same tree always yields the same index.

use crate::config::ConverterConfig;
use crate::error::ItemError;
use crate::output::{Challenge, OutputKind, RenderedOutput};
use crate::pipeline::engine::RenderEngine;
use crate::pipeline::render;
use crate::templates::{GENERATED_NOTE, INDEX_SECTION_HEADING};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;
use std::path::Path;
use tracing::info;

/// Label used for the index in logs and errors.
pub const INDEX_LABEL: &str = "index";

/// Category → item names, both sorted.
pub fn group_by_category(challenges: &[Challenge]) -> BTreeMap<&str, BTreeSet<&str>> {
    let mut groups: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for c in challenges {
        groups
            .entry(c.category.as_str())
            .or_default()
            .insert(c.name.as_str());
    }
    groups
}

/// Build the markdown text of the index.
///
/// The total counts every discovered writeup, duplicates included.
pub fn build_index_markdown(challenges: &[Challenge], title: &str) -> String {
    let groups = group_by_category(challenges);

    let mut md = format!("# {title}\n\n## {INDEX_SECTION_HEADING}\n\n");
    for (category, names) in &groups {
        let _ = write!(md, "\n### {}\n\n", category.to_uppercase());
        for name in names {
            let _ = writeln!(md, "- {name}");
        }
    }
    let _ = write!(
        md,
        "\n\n**Total challenges:** {}\n**Categories:** {}\n\n---\n\n*{GENERATED_NOTE}*\n",
        challenges.len(),
        groups.len()
    );
    md
}

/// Render the index into `output_dir/{index_file_name}`.
pub async fn render_index(
    engine: &dyn RenderEngine,
    challenges: &[Challenge],
    output_dir: &Path,
    config: &ConverterConfig,
) -> Result<RenderedOutput, ItemError> {
    info!("Rendering index of {} writeups", challenges.len());
    let markdown = build_index_markdown(challenges, &config.collection_title);
    let output = output_dir.join(&config.index_file_name);

    render::render_markdown(
        engine,
        &markdown,
        &config.collection_title,
        &output,
        INDEX_LABEL,
        config,
    )
    .await?;

    info!("Created index {}", output.display());
    Ok(RenderedOutput {
        path: output,
        kind: OutputKind::Index,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn challenge(category: &str, name: &str) -> Challenge {
        let dir = PathBuf::from("/ctf").join(category).join(name);
        Challenge {
            category: category.into(),
            name: name.into(),
            readme: dir.join("README.md"),
            source_dir: dir,
        }
    }

    #[test]
    fn groups_sorted_by_category_then_name() {
        let items = vec![
            challenge("web", "zeta"),
            challenge("crypto", "rsa"),
            challenge("web", "alpha"),
        ];
        let md = build_index_markdown(&items, "Finals");

        assert!(md.starts_with("# Finals\n\n## Challenges\n\n"));
        let crypto = md.find("### CRYPTO").unwrap();
        let web = md.find("### WEB").unwrap();
        assert!(crypto < web);
        let alpha = md.find("- alpha").unwrap();
        let zeta = md.find("- zeta").unwrap();
        assert!(web < alpha && alpha < zeta);
    }

    #[test]
    fn totals_and_footer() {
        let items = vec![
            challenge("web", "a"),
            challenge("web", "b"),
            challenge("pwn", "c"),
        ];
        let md = build_index_markdown(&items, "T");
        assert!(md.contains("**Total challenges:** 3\n**Categories:** 2"));
        assert!(md.trim_end().ends_with("*Generated automatically*"));
        assert!(md.contains("\n---\n"));
    }

    #[test]
    fn empty_collection() {
        let md = build_index_markdown(&[], "T");
        assert!(md.contains("**Total challenges:** 0"));
        assert!(md.contains("**Categories:** 0"));
        assert!(!md.contains("###"));
    }

    #[test]
    fn index_renders_as_markdown_lists() {
        let items = vec![challenge("misc", "sanity check")];
        let body = crate::pipeline::html::markdown_to_html_body(&build_index_markdown(&items, "T"));
        assert!(body.contains("<h3>MISC</h3>"));
        assert!(body.contains("<li>sanity check</li>"));
    }
}
