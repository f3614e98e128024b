use crate::checks::{
    KeywordPolicy, check_description, check_heading_order, check_image_alt, check_title,
    check_unclosed_tags,
};
use crate::links::extract_links;
use crate::report::{FieldOutcome, PageReport};
use crate::urls::{is_preview_url, normalize_url};
use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use regex::bytes::Regex as BytesRegex;
use reqwest::Client;
use scraper::Html;
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::{debug, warn};
use url::Url;

/// How much of the body prefix is searched for a `<meta charset>`.
const SNIFF_WINDOW: usize = 1024;

static META_CHARSET: LazyLock<BytesRegex> = LazyLock::new(|| {
    BytesRegex::new(r#"(?i)<meta[^>]+charset\s*=\s*["']?([a-zA-Z0-9_\-]+)"#)
        .expect("meta charset pattern")
});

/// One audited page plus the outbound links found on it.
#[derive(Debug)]
pub struct PageAudit {
    pub report: PageReport,
    pub links: HashSet<String>,
}

impl PageAudit {
    fn terminal(report: PageReport) -> Self {
        Self {
            report,
            links: HashSet::new(),
        }
    }
}

/// Fetches and classifies one URL, then runs every heuristic over the body.
///
/// All failures stay local: transport errors, 404s and preview URLs each
/// terminate in their own report class, and no outcome here ever aborts the
/// crawl.
pub struct PageAuditor {
    client: Client,
    policy: KeywordPolicy,
}

impl PageAuditor {
    pub fn new(client: Client, policy: KeywordPolicy) -> Self {
        Self { client, policy }
    }

    pub async fn audit(&self, url: &str, base_domain: &str) -> PageAudit {
        let normalized = normalize_url(url);

        // Draft previews are never fetched, only recorded.
        if is_preview_url(url) {
            debug!("Skipping preview URL {url}");
            return PageAudit::terminal(PageReport::preview_skipped(normalized));
        }

        let Ok(page_url) = Url::parse(url) else {
            warn!("Unparseable URL {url}");
            return PageAudit::terminal(PageReport::connection_error(normalized));
        };

        let response = match self.client.get(page_url.clone()).send().await {
            Ok(response) => response,
            Err(error) => {
                warn!("Request for {url} failed: {error}");
                return PageAudit::terminal(PageReport::connection_error(normalized));
            }
        };

        let status = response.status().as_u16();
        if status == 404 {
            debug!("404 at {url}");
            return PageAudit::terminal(PageReport::not_found(normalized));
        }

        let declared = declared_charset(&response);
        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(error) => {
                warn!("Body read for {url} failed: {error}");
                return PageAudit::terminal(PageReport::connection_error(normalized));
            }
        };
        let body = decode_body(&bytes, declared.as_deref());
        let document = Html::parse_document(&body);

        let mut report = PageReport::new(normalized, status);
        report.title = FieldOutcome::Checked(check_title(&document, &self.policy));
        report.description = FieldOutcome::Checked(check_description(&document, &self.policy));
        report.headings = FieldOutcome::Checked(check_heading_order(&document));
        report.images = FieldOutcome::Checked(check_image_alt(&document, &page_url));
        report.syntax = FieldOutcome::Checked(check_unclosed_tags(&body));

        let links = extract_links(&document, &page_url, base_domain);
        PageAudit { report, links }
    }
}

fn declared_charset(response: &reqwest::Response) -> Option<String> {
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)?
        .to_str()
        .ok()?;
    content_type
        .split(';')
        .skip(1)
        .map(str::trim)
        .find_map(|param| param.strip_prefix("charset="))
        .map(|charset| charset.trim_matches('"').to_string())
}

/// Decodes the body honoring a declared charset, except when the declaration
/// is absent or the Latin-1 family default: those are usually server
/// boilerplate, so the body's own `<meta charset>` wins, then UTF-8.
fn decode_body(bytes: &[u8], declared: Option<&str>) -> String {
    let declared_encoding = declared.and_then(|label| Encoding::for_label(label.as_bytes()));
    let encoding = match declared_encoding {
        Some(encoding) if encoding != WINDOWS_1252 => encoding,
        _ => sniff_meta_charset(bytes).unwrap_or(UTF_8),
    };
    encoding.decode(bytes).0.into_owned()
}

fn sniff_meta_charset(bytes: &[u8]) -> Option<&'static Encoding> {
    let window = &bytes[..bytes.len().min(SNIFF_WINDOW)];
    META_CHARSET
        .captures(window)
        .and_then(|captures| captures.get(1))
        .and_then(|label| Encoding::for_label(label.as_bytes()))
}
