//! Markdown subset to HTML
//!
//! Supports `##`/`###` headings, `- ` bullet lists, pipe tables (only with
//! the comparison table feature) and paragraphs. Every other line becomes a
//! paragraph. All text is escaped.

use copysmith_core::text::escape_html;
use copysmith_core::{ContentConfig, DisclosurePlacement, FeatureSet, FEATURE_COMPARISON_TABLE};

const CONTAINER_CLASS: &str = "copysmith-content";

/// Where and whether the affiliate disclosure is inserted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisclosureSettings {
    pub enabled: bool,
    pub text: String,
    pub placement: DisclosurePlacement,
}

impl DisclosureSettings {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            text: String::new(),
            placement: DisclosurePlacement::Bottom,
        }
    }
}

impl From<&ContentConfig> for DisclosureSettings {
    fn from(config: &ContentConfig) -> Self {
        Self {
            enabled: config.include_disclosure,
            text: config.disclosure.clone(),
            placement: config.disclosure_placement,
        }
    }
}

fn is_separator_row(line: &str) -> bool {
    line.contains("---") && line.chars().all(|c| matches!(c, '|' | '-' | ':' | ' ' | '\t'))
}

fn split_cells(row: &str) -> Vec<String> {
    row.trim()
        .trim_matches('|')
        .split('|')
        .map(|cell| escape_html(cell.trim()))
        .collect()
}

/// Length of the table starting at `lines[0]`, if one starts there
///
/// A table is a header row, a separator row and at least one data row.
fn table_len(lines: &[&str]) -> Option<usize> {
    if lines.len() < 3 || !lines[0].contains('|') || !is_separator_row(lines[1]) {
        return None;
    }
    let rows = lines[2..]
        .iter()
        .take_while(|line| line.contains('|') && !is_separator_row(line))
        .count();
    (rows > 0).then_some(2 + rows)
}

fn render_table(lines: &[&str]) -> String {
    let mut html = String::from("<div class=\"table-wrapper\"><table class=\"comparison-table\">");

    html.push_str("<thead><tr>");
    for cell in split_cells(lines[0]) {
        html.push_str(&format!("<th>{}</th>", cell));
    }
    html.push_str("</tr></thead><tbody>");

    for row in &lines[2..] {
        html.push_str("<tr>");
        for cell in split_cells(row) {
            html.push_str(&format!("<td>{}</td>", cell));
        }
        html.push_str("</tr>");
    }

    html.push_str("</tbody></table></div>");
    html
}

fn markdown_body(raw_markdown: &str, tables: bool) -> String {
    let lines: Vec<&str> = raw_markdown.lines().map(str::trim).collect();
    let mut out: Vec<String> = Vec::new();
    let mut in_list = false;
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];

        // Blank lines separate blocks but keep an open list open
        if line.is_empty() {
            i += 1;
            continue;
        }

        if let Some(item) = line.strip_prefix("- ") {
            if !in_list {
                out.push("<ul>".to_string());
                in_list = true;
            }
            out.push(format!("<li>{}</li>", escape_html(item.trim())));
            i += 1;
            continue;
        }

        if in_list {
            out.push("</ul>".to_string());
            in_list = false;
        }

        if tables {
            if let Some(len) = table_len(&lines[i..]) {
                out.push(render_table(&lines[i..i + len]));
                i += len;
                continue;
            }
        }

        let block = if let Some(text) = line.strip_prefix("### ") {
            format!("<h3>{}</h3>", escape_html(text.trim()))
        } else if let Some(text) = line.strip_prefix("## ") {
            format!("<h2>{}</h2>", escape_html(text.trim()))
        } else {
            format!("<p>{}</p>", escape_html(line))
        };
        out.push(block);
        i += 1;
    }

    if in_list {
        out.push("</ul>".to_string());
    }

    out.join("\n")
}

/// Render model markdown as HTML wrapped in a single container element
pub fn render(raw_markdown: &str, features: &FeatureSet, disclosure: &DisclosureSettings) -> String {
    let mut content = markdown_body(raw_markdown, features.contains(FEATURE_COMPARISON_TABLE));

    if disclosure.enabled && !disclosure.text.trim().is_empty() {
        let block = format!(
            "<div class=\"affiliate-disclosure\">{}</div>",
            escape_html(&disclosure.text)
        );
        content = match disclosure.placement {
            DisclosurePlacement::Top => format!("{}\n\n{}", block, content),
            DisclosurePlacement::Bottom => format!("{}\n\n{}", content, block),
        };
    }

    format!("<div class=\"{}\">{}</div>", CONTAINER_CLASS, content)
}
