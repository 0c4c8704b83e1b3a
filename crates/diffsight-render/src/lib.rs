//! Rendering for diffsight report contexts.
//!
//! This crate converts an assembled `ReportContext` into human-readable
//! output:
//! - console text for terminal use
//! - a standalone HTML document with per-file hunk snippets
//!
//! Both renderers are plain string builders over the context; the engine
//! itself has no opinion on output format.
//!
//! # Example
//!
//! ```rust
//! use diffsight_render::{render_console, render_html};
//! use diffsight_types::ReportContext;
//! use std::collections::BTreeMap;
//!
//! let context = ReportContext {
//!     report_name: "coverage.xml".to_string(),
//!     diff_name: "main...HEAD".to_string(),
//!     src_stats: BTreeMap::new(),
//!     total_num_lines: 0,
//!     total_num_missing: 0,
//!     total_percent_covered: 100,
//! };
//! let text = render_console(&context);
//! let html = render_html(&context);
//! ```

use diffsight_types::{LineClass, ReportContext, SourceHunk};

/// Horizontal rule used to delimit console report sections.
const CONSOLE_RULE: &str = "-------------";

// ============================================================================
// Console Renderer
// ============================================================================

/// Renders the report context as console text.
///
/// # Example Output
///
/// ```text
/// -------------
/// Diff Coverage
/// Report: coverage.xml
/// Diff: main...HEAD
/// -------------
/// src/a.py (80.0%): Missing line(s) 3
/// -------------
/// Total:    5 line(s)
/// Missing:  1 line(s)
/// Coverage: 80%
/// -------------
/// ```
pub fn render_console(context: &ReportContext) -> String {
    let mut output = String::new();

    output.push_str(CONSOLE_RULE);
    output.push('\n');
    output.push_str("Diff Coverage\n");
    output.push_str(&format!("Report: {}\n", context.report_name));
    output.push_str(&format!("Diff: {}\n", context.diff_name));
    output.push_str(CONSOLE_RULE);
    output.push('\n');

    if context.src_stats.is_empty() {
        output.push_str("No lines with coverage information in this diff.\n");
    } else {
        for (src_path, stats) in &context.src_stats {
            if stats.missing_lines.is_empty() {
                output.push_str(&format!("{} (100%)\n", src_path));
            } else {
                output.push_str(&format!(
                    "{} ({:.1}%): Missing line(s) {}\n",
                    src_path,
                    stats.percent_covered,
                    join_lines(&stats.missing_lines)
                ));
            }
        }
    }

    output.push_str(CONSOLE_RULE);
    output.push('\n');
    output.push_str(&format!("Total:    {} line(s)\n", context.total_num_lines));
    output.push_str(&format!(
        "Missing:  {} line(s)\n",
        context.total_num_missing
    ));
    output.push_str(&format!(
        "Coverage: {}%\n",
        context.total_percent_covered
    ));
    output.push_str(CONSOLE_RULE);
    output.push('\n');

    output
}

fn join_lines(lines: &[u32]) -> String {
    lines
        .iter()
        .map(|line| line.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

// ============================================================================
// HTML Renderer
// ============================================================================

/// CSS class attached to a rendered source line.
fn css_class(class: LineClass) -> &'static str {
    match class {
        LineClass::Violation => "violation",
        LineClass::NewContext => "new-context",
        LineClass::OldContext => "old-context",
    }
}

/// Escape text for safe embedding in HTML.
fn html_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

const HTML_STYLE: &str = "\
body { font-family: sans-serif; margin: 2em; }
table.summary td, table.summary th { padding: 0.2em 1em; text-align: left; }
table.hunk { border-collapse: collapse; font-family: monospace; width: 100%; }
table.hunk td { padding: 0 0.5em; white-space: pre; }
td.line-num { color: #888; text-align: right; user-select: none; }
tr.violation { background: #fdd; }
tr.new-context { background: #dfd; }
tr.old-context { background: #fff; }
";

/// Renders the report context as a standalone HTML document.
///
/// Each hunk becomes a table of source lines; every row carries a CSS class
/// derived from the line's classification, and all file content is escaped.
pub fn render_html(context: &ReportContext) -> String {
    let mut output = String::new();

    output.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
    output.push_str("<meta charset=\"utf-8\">\n");
    output.push_str("<title>Diff Coverage</title>\n");
    output.push_str(&format!("<style>\n{}</style>\n", HTML_STYLE));
    output.push_str("</head>\n<body>\n");

    output.push_str("<h1>Diff Coverage</h1>\n");
    output.push_str(&format!(
        "<p>Report: {} &mdash; Diff: {}</p>\n",
        html_escape(&context.report_name),
        html_escape(&context.diff_name)
    ));

    // Summary table
    output.push_str("<table class=\"summary\">\n");
    output.push_str("<tr><th>Source File</th><th>Coverage</th><th>Missing Lines</th></tr>\n");
    for (src_path, stats) in &context.src_stats {
        output.push_str(&format!(
            "<tr><td>{}</td><td>{:.1}%</td><td>{}</td></tr>\n",
            html_escape(src_path),
            stats.percent_covered,
            join_lines(&stats.missing_lines)
        ));
    }
    output.push_str(&format!(
        "<tr><th>Total</th><th>{}%</th><th>{} of {} line(s)</th></tr>\n",
        context.total_percent_covered,
        context.total_num_missing,
        context.total_num_lines
    ));
    output.push_str("</table>\n");

    // Per-file hunk snippets
    for (src_path, stats) in &context.src_stats {
        if stats.hunks.is_empty() {
            continue;
        }
        output.push_str(&format!("<h2>{}</h2>\n", html_escape(src_path)));
        for hunk in &stats.hunks {
            render_hunk_html(&mut output, hunk);
        }
    }

    output.push_str("</body>\n</html>\n");
    output
}

fn render_hunk_html(output: &mut String, hunk: &SourceHunk) {
    output.push_str("<table class=\"hunk\">\n");
    for line in &hunk.lines {
        output.push_str(&format!(
            "<tr class=\"{}\"><td class=\"line-num\">{}</td><td class=\"line\">{}</td></tr>\n",
            css_class(line.class),
            line.line_number,
            html_escape(line.content.trim_end_matches('\n'))
        ));
    }
    output.push_str("</table>\n");
}

// ============================================================================
// Tests
// ============================================================================
