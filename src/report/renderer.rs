use std::path::Path;

use crate::error::Result;
use crate::models::{ReportData, ReportRow};
use crate::report::normalizer::normalize;

/// Comments containing this were written by the tracker, not a person.
pub const METADATA_MARKER: &str = "**Metadata Update from";

pub const DEFAULT_OUTPUT: &str = "github_report.html";

const COLUMNS: [(&str, u8); 3] = [("Title (URL)", 20), ("Description", 40), ("Comments", 40)];

/// Flattens issues into table rows.
///
/// Each issue yields a title row whose description appears in both the
/// Description and Comments columns, followed by one row per comment that
/// does not carry the metadata marker.
pub fn build_rows(data: &ReportData) -> Vec<ReportRow> {
    let mut rows = Vec::new();

    for issue in &data.issues {
        let description = to_html_lines(&normalize(&issue.description));
        rows.push(ReportRow {
            title: Some(format!(
                r#"<a href="{}">{}</a>"#,
                escape_html(&issue.url),
                escape_html(&issue.title)
            )),
            description: description.clone(),
            comments: description,
        });

        for comment in &issue.comments {
            if comment.body.contains(METADATA_MARKER) {
                tracing::debug!("Skipping metadata comment on issue #{}", issue.number);
                continue;
            }
            rows.push(ReportRow {
                title: None,
                description: String::new(),
                comments: to_html_lines(&normalize(&comment.body)),
            });
        }
    }

    rows
}

pub fn render_html(data: &ReportData) -> String {
    tracing::debug!("Generating HTML table...");
    let rows = build_rows(data);

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>GitHub Issues - {repo}</title>
    <script src="https://cdn.tailwindcss.com"></script>
    <style>{css}</style>
</head>
<body>
    <h1 class="text-3xl font-bold mb-4 text-center">GitHub Issues</h1>
    <p class="text-sm text-gray-500 mb-4 text-center">{repo} &middot; {issue_count} open issues &middot; generated {generated}</p>
{table}
</body>
</html>
"#,
        repo = escape_html(&data.repository.full_name()),
        css = inline_css(),
        issue_count = data.issues.len(),
        generated = data.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
        table = render_table(&rows),
    )
}

pub fn render_json(data: &ReportData) -> Result<String> {
    Ok(serde_json::to_string_pretty(data)?)
}

/// Renders the report and overwrites `path` with it.
pub fn write_report(data: &ReportData, path: &Path, format: OutputFormat) -> Result<()> {
    let output = match format {
        OutputFormat::Html => render_html(data),
        OutputFormat::Json => render_json(data)?,
    };

    tracing::debug!("Writing report to file...");
    std::fs::write(path, output)?;
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Html,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "html" => Ok(OutputFormat::Html),
            "json" => Ok(OutputFormat::Json),
            other => Err(crate::error::Error::Config(format!(
                "unknown output format '{}', expected html or json",
                other
            ))),
        }
    }
}

fn render_table(rows: &[ReportRow]) -> String {
    let mut html = String::new();

    html.push_str("    <table class=\"table-auto w-full report\">\n");
    html.push_str("        <colgroup>\n");
    for (_, width) in COLUMNS {
        html.push_str(&format!("            <col style=\"width: {}%\">\n", width));
    }
    html.push_str("        </colgroup>\n        <thead>\n            <tr>\n");
    for (name, _) in COLUMNS {
        html.push_str(&format!("                <th class=\"px-4 py-2\">{}</th>\n", name));
    }
    html.push_str("            </tr>\n        </thead>\n        <tbody>\n");

    for row in rows {
        html.push_str("            <tr>\n");
        for cell in [row.title.as_deref().unwrap_or(""), row.description.as_str(), row.comments.as_str()] {
            html.push_str(&format!(
                "                <td class=\"border px-4 py-2\">{}</td>\n",
                cell
            ));
        }
        html.push_str("            </tr>\n");
    }

    html.push_str("        </tbody>\n    </table>");
    html
}

fn inline_css() -> &'static str {
    r#"
table.report { table-layout: fixed; border-collapse: collapse; }
table.report td { vertical-align: top; overflow-wrap: anywhere; }
table.report tbody tr:nth-child(even) { background-color: #f3f4f6; }
table.report th { background-color: #e5e7eb; text-align: left; }
"#
}

/// Normalizes line endings to `\n` and then to `<br>` for display.
fn to_html_lines(text: &str) -> String {
    text.replace("\r\n", "\n")
        .replace('\r', "\n")
        .replace('\n', "<br>")
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
