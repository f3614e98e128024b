// Include handlers module directly from handlers.rs
#[path = "handlers.rs"]
pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{load_urls_from_file, load_urls_from_source, parse_url_line};

// Re-export crawl and report functionality from kenshin-core
pub use kenshin_core::crawl::{CrawlOptions, execute_crawl, extract_url_path};
pub use kenshin_core::report::{ReportFormat, render_report};
