use clap::ArgMatches;
use colored::Colorize;
use kenshin_core::crawl::{CrawlOptions, execute_crawl};
use kenshin_core::report::{ReportFormat, render_report, save_report};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use url::Url;

// Helper functions for the check handler

/// Load URLs from either a file or a single URL argument
pub fn load_urls_from_source(
    url: Option<&Url>,
    sites_file: Option<&PathBuf>,
) -> Result<Vec<String>, String> {
    if let Some(sites_file_path) = sites_file {
        load_urls_from_file(sites_file_path)
    } else if let Some(url) = url {
        Ok(vec![url.as_str().to_string()])
    } else {
        Err("Either --url or --sites-file must be provided".to_string())
    }
}

/// Load and parse URLs from a file
pub fn load_urls_from_file(path: &PathBuf) -> Result<Vec<String>, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read sites file {}: {}", path.display(), e))?;

    let urls: Vec<String> = content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| parse_url_line(line.trim()))
        .collect();

    if urls.is_empty() {
        return Err(format!("No valid URLs found in {}", path.display()));
    }

    Ok(urls)
}

/// Parse a single line as a URL, trying to add https:// if needed
pub fn parse_url_line(line: &str) -> Option<String> {
    // Try to parse as-is
    if Url::parse(line).is_ok() {
        return Some(line.to_string());
    }

    // Try adding https://
    let with_scheme = format!("https://{}", line);
    if Url::parse(&with_scheme).is_ok() {
        return Some(with_scheme);
    }

    eprintln!("[!]  Skipping invalid URL '{}'", line);
    None
}

pub async fn handle_check(sub_matches: &ArgMatches) {
    // Initialize tracing for logging
    tracing_subscriber::fmt::init();

    let url = sub_matches.get_one::<Url>("url");
    let sites_file = sub_matches.get_one::<PathBuf>("sites-file");
    let timeout_secs = *sub_matches.get_one::<u64>("timeout").unwrap_or(&10);
    let output = sub_matches.get_one::<PathBuf>("output");
    let format_name = sub_matches
        .get_one::<String>("format")
        .map(String::as_str)
        .unwrap_or("text");

    let urls = match load_urls_from_source(url, sites_file) {
        Ok(urls) => urls,
        Err(e) => {
            eprintln!("{} {}", "✗".red().bold(), e);
            std::process::exit(1);
        }
    };

    let format = ReportFormat::from_str(format_name).unwrap_or(ReportFormat::Text);

    println!("\n{} Checking {} site(s)", "→".blue(), urls.len());
    println!("Timeout: {}s per request", timeout_secs);
    println!("Checks: title/description, headings, image alt, HTML syntax, 404\n");

    let options = CrawlOptions {
        urls,
        timeout_secs,
        show_progress_bar: true,
    };

    let progress_callback = Arc::new(|msg: String| {
        println!("{}", msg);
    });

    let outcome = match execute_crawl(options, Some(progress_callback)).await {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("{} Check failed: {}", "✗".red().bold(), e);
            std::process::exit(1);
        }
    };
    info!(
        pages = outcome.reports.len(),
        not_found = outcome.not_found.len(),
        "crawl finished"
    );

    println!();
    if outcome.is_empty() {
        println!("No checkable pages were found.");
        return;
    }
    println!(
        "{} Check complete! {} pages checked.",
        "✓".green().bold(),
        outcome.reports.len()
    );
    if !outcome.not_found.is_empty() {
        println!(
            "{} {} 404 page(s) found.",
            "⚠".yellow().bold(),
            outcome.not_found.len()
        );
    }
    println!();

    let report = match render_report(&outcome, &format) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("{} {}", "✗".red().bold(), e);
            std::process::exit(1);
        }
    };

    if let Some(output_path) = output {
        let expanded = shellexpand::tilde(&output_path.display().to_string()).into_owned();
        let expanded_path = Path::new(&expanded);
        match save_report(&report, expanded_path) {
            Ok(()) => println!(
                "{} Report saved to {}",
                "✓".green().bold(),
                expanded_path.display()
            ),
            Err(e) => {
                eprintln!(
                    "{} Failed to write {}: {}",
                    "✗".red().bold(),
                    expanded_path.display(),
                    e
                );
                std::process::exit(1);
            }
        }
    } else {
        print!("{}", report);
    }
}
