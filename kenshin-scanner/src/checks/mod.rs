//! The per-page heuristics. Each check is a pure function over the fetched
//! body or parsed document; none touches shared state, and a failure in one
//! never spills into another (the page auditor maps failures to per-field
//! error markers).

pub mod headings;
pub mod images;
pub mod keywords;
pub mod meta;
pub mod syntax;

pub use headings::check_heading_order;
pub use images::check_image_alt;
pub use keywords::{KeywordPolicy, check_keyword_repetition};
pub use meta::{check_description, check_title};
pub use syntax::check_unclosed_tags;
