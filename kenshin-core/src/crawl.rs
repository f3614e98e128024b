use indicatif::{ProgressBar, ProgressStyle};
use kenshin_scanner::report::CrawlOutcome;
use kenshin_scanner::{Crawler, KeywordPolicy};
use std::sync::Arc;
use url::Url;

/// Options for configuring a site check
pub struct CrawlOptions {
    pub urls: Vec<String>,
    pub timeout_secs: u64,
    pub show_progress_bar: bool,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            urls: Vec::new(),
            timeout_secs: 10,
            show_progress_bar: false,
        }
    }
}

/// Callback for reporting crawl progress messages
pub type CrawlProgressCallback = Arc<dyn Fn(String) + Send + Sync>;

/// Extract the path component from a URL
pub fn extract_url_path(url: &str) -> String {
    Url::parse(url)
        .ok()
        .map(|u| {
            let path = u.path().to_string();
            if path.is_empty() || path == "/" {
                "/".to_string()
            } else {
                path
            }
        })
        .unwrap_or_else(|| url.to_string())
}

/// Execute a site check with the given options.
/// Crawls each seed sequentially and merges the per-site outcomes.
pub async fn execute_crawl(
    options: CrawlOptions,
    progress_callback: Option<CrawlProgressCallback>,
) -> Result<CrawlOutcome, String> {
    let CrawlOptions {
        urls,
        timeout_secs,
        show_progress_bar,
    } = options;

    // One percentage bar for the whole run (only if enabled). The fraction
    // comes straight from the crawler's visited/frontier counts.
    let progress_bar = if show_progress_bar {
        let pb = ProgressBar::new(100);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{bar:40.cyan/blue} {percent:>3}% {msg}")
                .unwrap(),
        );
        Some(Arc::new(pb))
    } else {
        None
    };

    let internal_progress_callback: kenshin_scanner::ProgressCallback = if let Some(ref pb) =
        progress_bar
    {
        let pb_clone = pb.clone();
        Arc::new(move |fraction: f64, url: String| {
            pb_clone.set_position((fraction * 100.0).round() as u64);
            pb_clone.set_message(extract_url_path(&url));
        })
    } else {
        // No-op callback when the bar is disabled
        Arc::new(|_fraction: f64, _url: String| {})
    };

    let crawler = Crawler::with_timeout(timeout_secs)
        .with_keyword_policy(KeywordPolicy::default())
        .with_progress_callback(internal_progress_callback);

    let mut merged = CrawlOutcome::default();
    for (idx, url_str) in urls.iter().enumerate() {
        if let Some(ref callback) = progress_callback
            && urls.len() > 1
        {
            callback(format!(
                "Checking site {}/{}: {}",
                idx + 1,
                urls.len(),
                url_str
            ));
        }

        match crawler.crawl(url_str).await {
            Ok(outcome) => {
                merged.reports.extend(outcome.reports);
                merged.not_found.extend(outcome.not_found);
            }
            Err(e) => {
                if let Some(ref callback) = progress_callback {
                    callback(format!("[!]  Failed to check {}: {}", url_str, e));
                }
            }
        }
    }

    if let Some(ref pb) = progress_bar {
        pb.finish_with_message(format!(
            "Check complete! {} pages checked",
            merged.reports.len()
        ));
    }

    Ok(merged)
}
