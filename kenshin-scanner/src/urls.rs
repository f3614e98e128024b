use percent_encoding::percent_decode_str;
use url::Url;

/// Query parameters that mark a CMS draft-preview URL.
const PREVIEW_PARAMS: [&str; 4] = ["preview", "preview_id", "preview_nonce", "_thumbnail_id"];

/// Canonicalizes a URL string so equivalent spellings dedup to one key.
///
/// Rules, in order: percent-decode; fold a trailing `index.html` into the
/// directory URL; leave other `.html` URLs untouched; ensure everything else
/// carries exactly one trailing slash. Idempotent.
pub fn normalize_url(url: &str) -> String {
    let mut normalized = match percent_decode_str(url).decode_utf8() {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => url.to_string(),
    };

    // "index.html" is ASCII, so truncating by its byte length is safe.
    if normalized.to_lowercase().ends_with("index.html") {
        normalized.truncate(normalized.len() - "index.html".len());
    }

    if normalized.to_lowercase().ends_with(".html") {
        return normalized;
    }
    if !normalized.ends_with('/') {
        normalized.push('/');
    }
    normalized
}

/// True when the URL carries any draft-preview query parameter.
pub fn is_preview_url(url: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    parsed
        .query_pairs()
        .any(|(key, _)| PREVIEW_PARAMS.contains(&key.as_ref()))
}

/// True when the URL's host matches the crawl's target domain exactly.
pub fn is_same_domain(url: &Url, base_domain: &str) -> bool {
    url.host_str() == Some(base_domain)
}
