use crate::checks::keywords::{KeywordPolicy, check_keyword_repetition};
use crate::report::MetaCheck;
use scraper::{Html, Selector};
use std::sync::LazyLock;

/// Recommended ceiling for `<title>` text, in characters.
const TITLE_MAX_CHARS: usize = 50;
/// Recommended ceiling for the meta description, in characters.
const DESCRIPTION_MAX_CHARS: usize = 140;

/// Placeholder reported for pages with no `<title>` element.
pub const NO_TITLE: &str = "(no title)";

static TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("title selector"));
static META_NAMED: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("meta[name]").expect("meta name selector"));
static META_OG_DESCRIPTION: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"meta[property="og:description"]"#).expect("og:description selector")
});

/// Analyzes the page title: length against the 50-character recommendation
/// plus keyword repetition.
pub fn check_title(document: &Html, policy: &KeywordPolicy) -> MetaCheck {
    let text = document
        .select(&TITLE)
        .next()
        .map(|title| title.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| NO_TITLE.to_string());
    analyze(text, TITLE_MAX_CHARS, policy)
}

/// Analyzes the meta description (falling back to `og:description`): length
/// against the 140-character recommendation plus keyword repetition.
pub fn check_description(document: &Html, policy: &KeywordPolicy) -> MetaCheck {
    let named = document
        .select(&META_NAMED)
        .find(|meta| {
            meta.value()
                .attr("name")
                .is_some_and(|name| name.eq_ignore_ascii_case("description"))
        })
        .and_then(|meta| meta.value().attr("content"))
        .map(|content| content.trim().to_string())
        .filter(|content| !content.is_empty());

    let text = named
        .or_else(|| {
            document
                .select(&META_OG_DESCRIPTION)
                .next()
                .and_then(|meta| meta.value().attr("content"))
                .map(|content| content.trim().to_string())
        })
        .unwrap_or_default();
    analyze(text, DESCRIPTION_MAX_CHARS, policy)
}

fn analyze(text: String, max_chars: usize, policy: &KeywordPolicy) -> MetaCheck {
    let length = text.chars().count();
    let repeated = check_keyword_repetition(&text, policy);
    MetaCheck {
        too_long: length > max_chars,
        length,
        repeated,
        text,
    }
}
