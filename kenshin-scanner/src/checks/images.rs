use crate::report::AltCoverage;
use scraper::{Html, Selector};
use std::sync::LazyLock;
use url::Url;

static IMAGES: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("img").expect("img selector"));

/// Checks every qualifying `<img>` for alt text. Blog and category listings
/// are skipped wholesale, data URLs and PDFs are not counted at all, and
/// sources missing alt text are reported as absolute URLs resolved against
/// the page's own origin.
pub fn check_image_alt(document: &Html, page_url: &Url) -> AltCoverage {
    let path = page_url.path();
    if path.contains("/blog/") || path.contains("/category/") {
        return AltCoverage::Skipped;
    }

    let origin = page_url.origin().ascii_serialization();
    let mut total = 0usize;
    let mut missing: Vec<String> = Vec::new();

    for img in document.select(&IMAGES) {
        let src = img.value().attr("src").filter(|s| !s.is_empty()).or_else(|| {
            // First URL token of the srcset, descriptors stripped.
            img.value()
                .attr("srcset")
                .and_then(|srcset| srcset.split(',').next())
                .map(|candidate| candidate.trim())
                .and_then(|candidate| candidate.split(' ').next())
        });
        let Some(src) = src.filter(|s| !s.is_empty()) else {
            continue;
        };

        if src.starts_with("data:") || src.to_lowercase().ends_with(".pdf") {
            continue;
        }
        total += 1;

        let alt_missing = img
            .value()
            .attr("alt")
            .map(|alt| alt.trim().is_empty())
            .unwrap_or(true);
        if !alt_missing {
            continue;
        }

        let absolute = resolve_source(&origin, src);
        if !missing.contains(&absolute) {
            missing.push(absolute);
        }
    }

    if total == 0 {
        AltCoverage::NoImages
    } else if missing.is_empty() {
        AltCoverage::Complete
    } else {
        AltCoverage::Missing(missing)
    }
}

/// Rebuilds an absolute image URL from the page origin. Root-relative paths
/// attach directly, a leading `../` segment is dropped, and anything without
/// a scheme hangs off the origin root.
fn resolve_source(origin: &str, src: &str) -> String {
    if src.starts_with('/') {
        format!("{origin}{src}")
    } else if src.starts_with("../") {
        let rest: Vec<&str> = src.split('/').skip(1).collect();
        format!("{origin}/{}", rest.join("/"))
    } else if !src.starts_with("http://") && !src.starts_with("https://") {
        format!("{origin}/{src}")
    } else {
        src.to_string()
    }
}
