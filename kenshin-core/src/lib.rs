pub mod crawl;
pub mod report;

pub use crawl::{CrawlOptions, CrawlProgressCallback, execute_crawl, extract_url_path};
pub use report::{
    ReportFormat, generate_csv_report, generate_json_report, generate_markdown_report,
    generate_text_report, render_report, save_report,
};

const BANNER: &str = r"
 ┏━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━┓
 ┃  K E N S H I N               ┃
 ┃  on-page SEO site checker    ┃
 ┗━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━┛
";

pub fn print_banner() {
    println!("{}", BANNER);
    println!("  v{}\n", env!("CARGO_PKG_VERSION"));
}
