use crate::urls::{is_preview_url, is_same_domain};
use scraper::{Html, Selector};
use std::collections::HashSet;
use tracing::debug;
use url::Url;

/// Collects the same-domain, crawlable outbound links of one page.
///
/// Anchors are read from `href`, frames from `href` or `src`. Fragment links,
/// off-domain hosts, PDFs, preview URLs and `index.html` duplicates are all
/// dropped; survivors get their trailing slash unified so the frontier never
/// holds two spellings of one page.
pub fn extract_links(document: &Html, base: &Url, base_domain: &str) -> HashSet<String> {
    let selector =
        Selector::parse("a, frame, iframe").expect("link selector is valid");
    let mut links = HashSet::new();

    for element in document.select(&selector) {
        let Some(href) = element
            .value()
            .attr("href")
            .or_else(|| element.value().attr("src"))
        else {
            continue;
        };

        let Ok(absolute) = base.join(href) else {
            debug!("Unresolvable href {href} on {base}");
            continue;
        };

        if absolute.path().to_lowercase().ends_with("index.html") {
            continue;
        }
        if absolute.fragment().is_some() {
            continue;
        }
        if !is_same_domain(&absolute, base_domain) {
            continue;
        }
        let absolute = absolute.to_string();
        if absolute.to_lowercase().ends_with(".pdf") {
            continue;
        }
        if is_preview_url(&absolute) {
            continue;
        }

        let trimmed = absolute.trim_end_matches('/');
        if trimmed.to_lowercase().ends_with(".html") {
            links.insert(trimmed.to_string());
        } else {
            links.insert(format!("{trimmed}/"));
        }
    }

    links
}
