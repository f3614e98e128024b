use crate::checks::KeywordPolicy;
use crate::error::{AuditError, Result};
use crate::page::PageAuditor;
use crate::report::{CrawlOutcome, PageClass};
use crate::urls::normalize_url;
use reqwest::Client;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Receives `(fraction, url)` after every processed page. The fraction is
/// `visited / (visited + frontier)`, clamped to 1.0.
pub type ProgressCallback = Arc<dyn Fn(f64, String) + Send + Sync>;

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Single-domain, strictly sequential site crawler. One fetch is in flight
/// at any moment; the frontier is a set, so visit order between independent
/// URLs is unspecified.
pub struct Crawler {
    client: Client,
    policy: KeywordPolicy,
    progress_callback: Option<ProgressCallback>,
}

impl Crawler {
    pub fn new() -> Self {
        Self::with_timeout(10)
    }

    pub fn with_timeout(timeout_secs: u64) -> Self {
        let client = Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs.div_ceil(2)))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            policy: KeywordPolicy::default(),
            progress_callback: None,
        }
    }

    pub fn with_keyword_policy(mut self, policy: KeywordPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Crawls every reachable same-domain page starting from `seed`.
    ///
    /// Each URL is fetched and audited at most once, keyed by its normalized
    /// form. 404 pages are filed separately and never expanded. The crawl
    /// ends when the frontier empties; no page failure aborts it.
    pub async fn crawl(&self, seed: &str) -> Result<CrawlOutcome> {
        let seed_url = url::Url::parse(seed)
            .map_err(|error| AuditError::InvalidUrl(format!("{seed}: {error}")))?;
        let base_domain = seed_url
            .host_str()
            .ok_or_else(|| AuditError::InvalidUrl(format!("{seed} has no host")))?
            .to_string();

        info!("Starting crawl of {base_domain}");
        let auditor = PageAuditor::new(self.client.clone(), self.policy.clone());

        let mut visited: HashSet<String> = HashSet::new();
        let mut frontier: HashSet<String> = HashSet::from([seed.to_string()]);
        let mut outcome = CrawlOutcome::default();

        while let Some(current) = frontier.iter().next().cloned() {
            frontier.remove(&current);

            let normalized = normalize_url(&current);
            if visited.insert(normalized.clone()) {
                debug!("Visiting {normalized}");
                let audit = auditor.audit(&current, &base_domain).await;

                let not_found = audit.report.class == PageClass::NotFound;
                if not_found {
                    outcome.not_found.push(audit.report);
                } else {
                    outcome.reports.push(audit.report);
                }

                if !not_found {
                    for link in audit.links {
                        if !visited.contains(&normalize_url(&link)) {
                            frontier.insert(link);
                        }
                    }
                }
            }

            if let Some(ref callback) = self.progress_callback {
                let fraction =
                    visited.len() as f64 / (visited.len() + frontier.len()) as f64;
                callback(fraction.min(1.0), normalized);
            }
        }

        info!(
            "Crawl complete. Checked {} pages, {} not found",
            outcome.reports.len(),
            outcome.not_found.len()
        );
        Ok(outcome)
    }
}

impl Default for Crawler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{AltCoverage, FieldOutcome};
    use std::sync::Mutex as StdMutex;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn html_page(body: &str) -> ResponseTemplate {
        ResponseTemplate::new(200)
            .insert_header("content-type", "text/html; charset=utf-8")
            .set_body_string(body.to_string())
    }

    async fn mount_page(server: &MockServer, at: &str, body: &str) {
        Mock::given(method("GET"))
            .and(path(at))
            .respond_with(html_page(body))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn frontier_expands_by_internal_links_only() {
        let server = MockServer::start().await;
        let root = r##"<html><body>
                <a href="/about">About</a>
                <a href="/services.html">Services</a>
                <a href="#hours">Hours</a>
                <a href="https://elsewhere.example/">Partner</a>
                <a href="/pamphlet.pdf">Pamphlet</a>
            </body></html>"##;
        mount_page(&server, "/", root).await;
        mount_page(&server, "/about/", "<html><body>About</body></html>").await;
        mount_page(&server, "/services.html", "<html><body>Services</body></html>").await;

        let outcome = Crawler::new().crawl(&server.uri()).await.unwrap();

        let mut urls: Vec<&str> = outcome.reports.iter().map(|r| r.url.as_str()).collect();
        urls.sort();
        assert_eq!(
            urls,
            vec![
                format!("{}/", server.uri()),
                format!("{}/about/", server.uri()),
                format!("{}/services.html", server.uri()),
            ]
        );
        assert!(outcome.not_found.is_empty());
    }

    #[tokio::test]
    async fn rerun_is_set_equal() {
        let server = MockServer::start().await;
        mount_page(
            &server,
            "/",
            r#"<a href="/a">A</a><a href="/b">B</a>"#,
        )
        .await;
        mount_page(&server, "/a/", r#"<a href="/b">B</a>"#).await;
        mount_page(&server, "/b/", "fin").await;

        let crawler = Crawler::new();
        let first = crawler.crawl(&server.uri()).await.unwrap();
        let second = crawler.crawl(&server.uri()).await.unwrap();

        let urls = |outcome: &CrawlOutcome| {
            let mut urls: Vec<String> =
                outcome.reports.iter().map(|r| r.url.clone()).collect();
            urls.sort();
            urls
        };
        assert_eq!(urls(&first), urls(&second));
    }

    #[tokio::test]
    async fn not_found_pages_filed_apart_and_never_expanded() {
        let server = MockServer::start().await;
        mount_page(&server, "/", r#"<a href="/missing">Gone</a>"#).await;
        Mock::given(method("GET"))
            .and(path("/missing/"))
            .respond_with(
                ResponseTemplate::new(404)
                    .insert_header("content-type", "text/html")
                    .set_body_string(r#"<a href="/treasure">Link on 404 page</a>"#),
            )
            .mount(&server)
            .await;

        let outcome = Crawler::new().crawl(&server.uri()).await.unwrap();

        assert_eq!(outcome.not_found.len(), 1);
        assert_eq!(outcome.not_found[0].url, format!("{}/missing/", server.uri()));
        assert_eq!(outcome.not_found[0].class, PageClass::NotFound);
        // The 404 page's own links must not enter the frontier.
        assert!(
            outcome
                .reports
                .iter()
                .all(|r| !r.url.contains("/treasure")),
        );
        assert_eq!(outcome.reports.len(), 1);
    }

    #[tokio::test]
    async fn equivalent_spellings_audited_once() {
        let server = MockServer::start().await;
        // "/about" and "/about/" collapse to one normalized URL.
        mount_page(
            &server,
            "/",
            r#"<a href="/about">About</a>"#,
        )
        .await;
        mount_page(&server, "/about/", r#"<a href="/about/">Self</a>"#).await;

        let outcome = Crawler::new().crawl(&server.uri()).await.unwrap();

        let about = format!("{}/about/", server.uri());
        let count = outcome.reports.iter().filter(|r| r.url == about).count();
        assert_eq!(count, 1);
        assert_eq!(outcome.reports.len(), 2);
    }

    #[tokio::test]
    async fn preview_seed_never_fetched() {
        let server = MockServer::start().await;
        // No mock mounted: a real request would come back 404 and change the
        // classification, so PreviewSkipped proves nothing was fetched.
        let seed = format!("{}/page/?preview=true", server.uri());

        let outcome = Crawler::new().crawl(&seed).await.unwrap();

        assert_eq!(outcome.reports.len(), 1);
        assert_eq!(outcome.reports[0].class, PageClass::PreviewSkipped);
        assert_eq!(outcome.reports[0].title, FieldOutcome::Skipped);
        assert!(outcome.not_found.is_empty());
    }

    #[tokio::test]
    async fn connection_error_is_recorded_not_fatal() {
        // Nothing listens on port 9; the crawl still completes.
        let outcome = Crawler::with_timeout(1)
            .crawl("http://127.0.0.1:9/")
            .await
            .unwrap();

        assert_eq!(outcome.reports.len(), 1);
        assert_eq!(outcome.reports[0].class, PageClass::ConnectionError);
        assert_eq!(outcome.reports[0].status_code, 0);
    }

    #[tokio::test]
    async fn progress_reaches_one() {
        let server = MockServer::start().await;
        mount_page(&server, "/", r#"<a href="/a">A</a>"#).await;
        mount_page(&server, "/a/", "done").await;

        let fractions: Arc<StdMutex<Vec<f64>>> = Arc::new(StdMutex::new(Vec::new()));
        let sink = fractions.clone();
        let crawler = Crawler::new().with_progress_callback(Arc::new(move |fraction, _url| {
            sink.lock().unwrap().push(fraction);
        }));

        crawler.crawl(&server.uri()).await.unwrap();

        let fractions = fractions.lock().unwrap();
        assert!(!fractions.is_empty());
        assert!(fractions.iter().all(|f| (0.0..=1.0).contains(f)));
        assert_eq!(*fractions.last().unwrap(), 1.0);
    }

    #[tokio::test]
    async fn page_checks_land_in_the_report() {
        let server = MockServer::start().await;
        let body = r#"<html><head>
            <title>渋谷ひまわり内科クリニック</title>
            <meta name="description" content="渋谷の内科クリニックです。">
        </head><body>
            <h1>診療案内</h1><h3>アクセス</h3>
            <img src="/photo.png">
        </body></html>"#;
        mount_page(&server, "/", body).await;

        let outcome = Crawler::new().crawl(&server.uri()).await.unwrap();
        let report = &outcome.reports[0];

        let title = report.title.checked().unwrap();
        assert_eq!(title.text, "渋谷ひまわり内科クリニック");
        assert!(title.is_ok());

        let headings = report.headings.checked().unwrap();
        assert_eq!(headings.issues.len(), 1);
        assert!(headings.issues[0].contains("h1 to h3"));

        let images = report.images.checked().unwrap();
        assert_eq!(
            *images,
            AltCoverage::Missing(vec![format!("{}/photo.png", server.uri())])
        );
    }

    #[tokio::test]
    async fn invalid_seed_is_rejected() {
        let result = Crawler::new().crawl("not a url").await;
        assert!(matches!(result, Err(AuditError::InvalidUrl(_))));
    }
}
