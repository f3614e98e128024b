// Report rendering over crawl outcomes

use kenshin_scanner::report::{
    AltCoverage, CrawlOutcome, FieldOutcome, HeadingCheck, MetaCheck, PageClass, SyntaxCheck,
};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ReportFormat {
    Text,
    Json,
    Csv,
    Markdown,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            "csv" => Some(ReportFormat::Csv),
            "markdown" | "md" => Some(ReportFormat::Markdown),
            _ => None,
        }
    }
}

const TITLE_MAX_CHARS: usize = 50;
const DESCRIPTION_MAX_CHARS: usize = 140;

fn class_label(class: &PageClass) -> &'static str {
    match class {
        PageClass::Normal => "normal",
        PageClass::NotFound => "not found",
        PageClass::PreviewSkipped => "preview skipped",
        PageClass::ConnectionError => "connection error",
    }
}

/// Status column for a title or description field.
fn meta_status(field: &FieldOutcome<MetaCheck>, max_chars: usize) -> String {
    match field {
        FieldOutcome::Checked(check) => {
            if check.is_ok() {
                return "OK".to_string();
            }
            let mut parts = Vec::new();
            if check.too_long {
                parts.push(format!(
                    "too long ({} chars, {} recommended)",
                    check.length, max_chars
                ));
            }
            if !check.repeated.is_empty() {
                let repeats: Vec<String> =
                    check.repeated.iter().map(|k| k.to_string()).collect();
                parts.push(format!("keyword repetition: {}", repeats.join(", ")));
            }
            parts.join("; ")
        }
        FieldOutcome::Skipped => "skipped".to_string(),
        FieldOutcome::Error => "check failed".to_string(),
    }
}

/// Numbered lines, `1: ...` through `N: ...`.
fn numbered(lines: &[String]) -> String {
    lines
        .iter()
        .enumerate()
        .map(|(i, line)| format!("{}: {}", i + 1, line))
        .collect::<Vec<_>>()
        .join("\n")
}

fn heading_status(field: &FieldOutcome<HeadingCheck>) -> String {
    match field {
        FieldOutcome::Checked(check) if check.issues.is_empty() => "OK".to_string(),
        FieldOutcome::Checked(check) => numbered(&check.issues),
        FieldOutcome::Skipped => "skipped".to_string(),
        FieldOutcome::Error => "check failed".to_string(),
    }
}

fn english_headings_status(field: &FieldOutcome<HeadingCheck>) -> String {
    match field {
        FieldOutcome::Checked(check) if check.english_only.is_empty() => "OK".to_string(),
        FieldOutcome::Checked(check) => numbered(&check.english_only),
        FieldOutcome::Skipped => "skipped".to_string(),
        FieldOutcome::Error => "check failed".to_string(),
    }
}

fn alt_status(field: &FieldOutcome<AltCoverage>) -> String {
    match field {
        FieldOutcome::Checked(AltCoverage::Skipped) => "skipped (blog/category page)".to_string(),
        FieldOutcome::Checked(AltCoverage::NoImages) => "no images".to_string(),
        FieldOutcome::Checked(AltCoverage::Complete) => "OK".to_string(),
        FieldOutcome::Checked(AltCoverage::Missing(urls)) => {
            format!("missing alt text:\n{}", numbered(urls))
        }
        FieldOutcome::Skipped => "skipped".to_string(),
        FieldOutcome::Error => "check failed".to_string(),
    }
}

fn syntax_status(field: &FieldOutcome<SyntaxCheck>) -> String {
    match field {
        FieldOutcome::Checked(check) if check.warnings.is_empty() => "OK".to_string(),
        FieldOutcome::Checked(check) => {
            let lines: Vec<String> = check.warnings.iter().map(|w| w.to_string()).collect();
            numbered(&lines)
        }
        FieldOutcome::Skipped => "skipped".to_string(),
        FieldOutcome::Error => "check failed".to_string(),
    }
}

fn meta_text(field: &FieldOutcome<MetaCheck>) -> (String, usize) {
    match field {
        FieldOutcome::Checked(check) => (check.text.clone(), check.length),
        _ => (String::new(), 0),
    }
}

pub fn generate_text_report(outcome: &CrawlOutcome) -> String {
    let mut report = String::new();

    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
    report.push_str("                         KENSHIN SITE CHECK REPORT\n");
    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");

    report.push_str(&format!("Pages checked:    {}\n", outcome.reports.len()));
    report.push_str(&format!("Not found (404):  {}\n\n", outcome.not_found.len()));

    if outcome.is_empty() {
        report.push_str("No checkable pages were found.\n");
        return report;
    }

    section(&mut report, "TITLE & DESCRIPTION");
    for (idx, page) in outcome.reports.iter().enumerate() {
        let (title, title_len) = meta_text(&page.title);
        let (description, description_len) = meta_text(&page.description);
        report.push_str(&format!("[{}] {}\n", idx + 1, page.url));
        report.push_str(&format!("  Title:        {} ({} chars)\n", title, title_len));
        report.push_str(&format!(
            "  Status:       {}\n",
            meta_status(&page.title, TITLE_MAX_CHARS)
        ));
        report.push_str(&format!(
            "  Description:  {} ({} chars)\n",
            description, description_len
        ));
        report.push_str(&format!(
            "  Status:       {}\n\n",
            meta_status(&page.description, DESCRIPTION_MAX_CHARS)
        ));
    }

    section(&mut report, "HEADING STRUCTURE");
    for page in &outcome.reports {
        report.push_str(&format!("{}\n{}\n\n", page.url, indent(&heading_status(&page.headings))));
    }

    section(&mut report, "ENGLISH-ONLY HEADINGS");
    for page in &outcome.reports {
        report.push_str(&format!(
            "{}\n{}\n\n",
            page.url,
            indent(&english_headings_status(&page.headings))
        ));
    }

    section(&mut report, "IMAGE ALT TEXT");
    for page in &outcome.reports {
        report.push_str(&format!("{}\n{}\n\n", page.url, indent(&alt_status(&page.images))));
    }

    section(&mut report, "HTML SYNTAX");
    for page in &outcome.reports {
        report.push_str(&format!("{}\n{}\n\n", page.url, indent(&syntax_status(&page.syntax))));
    }

    section(&mut report, "404 PAGES");
    if outcome.not_found.is_empty() {
        report.push_str("No 404 pages found.\n");
    } else {
        for page in &outcome.not_found {
            report.push_str(&format!("  {}\n", page.url));
        }
    }

    report
}

fn section(report: &mut String, title: &str) {
    report.push_str("──────────────────────────────────────────────────────────────────────────────\n");
    report.push_str(title);
    report.push('\n');
    report.push_str("──────────────────────────────────────────────────────────────────────────────\n\n");
}

fn indent(text: &str) -> String {
    text.lines()
        .map(|line| format!("  {}", line))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn generate_json_report(outcome: &CrawlOutcome) -> Result<String, serde_json::Error> {
    let json_report = serde_json::json!({
        "report": {
            "metadata": {
                "generator": "Kenshin",
                "version": env!("CARGO_PKG_VERSION"),
                "generated_at": chrono::Utc::now().to_rfc3339(),
                "format": "json"
            },
            "summary": {
                "pages_checked": outcome.reports.len(),
                "not_found": outcome.not_found.len()
            },
            "pages": outcome.reports,
            "not_found_pages": outcome.not_found
        }
    });

    serde_json::to_string_pretty(&json_report)
}

pub fn generate_csv_report(outcome: &CrawlOutcome) -> String {
    let mut report = String::new();
    report.push_str(
        "url,status_code,classification,title,title_length,title_status,\
         description,description_length,description_status,heading_issues,\
         english_only_headings,images_without_alt,html_syntax\n",
    );

    for page in outcome.reports.iter().chain(outcome.not_found.iter()) {
        let (title, title_len) = meta_text(&page.title);
        let (description, description_len) = meta_text(&page.description);
        let row = [
            page.url.clone(),
            page.status_code.to_string(),
            class_label(&page.class).to_string(),
            title,
            title_len.to_string(),
            meta_status(&page.title, TITLE_MAX_CHARS),
            description,
            description_len.to_string(),
            meta_status(&page.description, DESCRIPTION_MAX_CHARS),
            heading_status(&page.headings),
            english_headings_status(&page.headings),
            alt_status(&page.images),
            syntax_status(&page.syntax),
        ];
        let escaped: Vec<String> = row.iter().map(|cell| csv_escape(cell)).collect();
        report.push_str(&escaped.join(","));
        report.push('\n');
    }

    report
}

fn csv_escape(cell: &str) -> String {
    let flattened = cell.replace('\n', "; ");
    if flattened.contains(',') || flattened.contains('"') || flattened.contains(';') {
        format!("\"{}\"", flattened.replace('"', "\"\""))
    } else {
        flattened
    }
}

pub fn generate_markdown_report(outcome: &CrawlOutcome) -> String {
    let mut report = String::new();
    report.push_str("# Kenshin Site Check Report\n\n");
    report.push_str(&format!("- Pages checked: {}\n", outcome.reports.len()));
    report.push_str(&format!("- Not found (404): {}\n\n", outcome.not_found.len()));

    report.push_str("## Title & Description\n\n");
    report.push_str("| URL | Title | Title status | Description status |\n");
    report.push_str("| --- | --- | --- | --- |\n");
    for page in &outcome.reports {
        let (title, title_len) = meta_text(&page.title);
        report.push_str(&format!(
            "| {} | {} ({} chars) | {} | {} |\n",
            page.url,
            md_escape(&title),
            title_len,
            md_escape(&meta_status(&page.title, TITLE_MAX_CHARS)),
            md_escape(&meta_status(&page.description, DESCRIPTION_MAX_CHARS)),
        ));
    }

    report.push_str("\n## Heading Structure\n\n");
    for page in &outcome.reports {
        report.push_str(&format!(
            "- {}: {}\n",
            page.url,
            md_escape(&heading_status(&page.headings))
        ));
    }

    report.push_str("\n## English-only Headings\n\n");
    for page in &outcome.reports {
        report.push_str(&format!(
            "- {}: {}\n",
            page.url,
            md_escape(&english_headings_status(&page.headings))
        ));
    }

    report.push_str("\n## Image Alt Text\n\n");
    for page in &outcome.reports {
        report.push_str(&format!(
            "- {}: {}\n",
            page.url,
            md_escape(&alt_status(&page.images))
        ));
    }

    report.push_str("\n## HTML Syntax\n\n");
    for page in &outcome.reports {
        report.push_str(&format!(
            "- {}: {}\n",
            page.url,
            md_escape(&syntax_status(&page.syntax))
        ));
    }

    report.push_str("\n## 404 Pages\n\n");
    if outcome.not_found.is_empty() {
        report.push_str("No 404 pages found.\n");
    } else {
        for page in &outcome.not_found {
            report.push_str(&format!("- {}\n", page.url));
        }
    }

    report
}

fn md_escape(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', "<br>")
}

pub fn render_report(outcome: &CrawlOutcome, format: &ReportFormat) -> Result<String, String> {
    match format {
        ReportFormat::Text => Ok(generate_text_report(outcome)),
        ReportFormat::Json => {
            generate_json_report(outcome).map_err(|e| format!("JSON serialization failed: {}", e))
        }
        ReportFormat::Csv => Ok(generate_csv_report(outcome)),
        ReportFormat::Markdown => Ok(generate_markdown_report(outcome)),
    }
}

pub fn save_report(content: &str, path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}
