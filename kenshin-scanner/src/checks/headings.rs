use crate::report::HeadingCheck;
use regex::Regex;
use scraper::{Html, Selector};
use std::sync::LazyLock;

static HEADINGS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1, h2, h3, h4, h5, h6").expect("heading selector"));

/// ASCII text, digits and light punctuation only.
static ENGLISH_ONLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9\s\-_.,!?]*$").expect("english-only pattern"));

fn contains_japanese(text: &str) -> bool {
    text.chars().any(|c| {
        matches!(c,
            '\u{3040}'..='\u{309F}'   // Hiragana
            | '\u{30A0}'..='\u{30FF}' // Katakana
            | '\u{4E00}'..='\u{9FFF}' // CJK Unified Ideographs
        )
    })
}

/// Walks h1-h6 in document order and reports hierarchy violations: a first
/// heading that is not h1, and forward jumps of more than one level.
/// Decreasing levels never flag. Headings whose text carries no Japanese
/// script are collected separately as likely untranslated leftovers.
pub fn check_heading_order(document: &Html) -> HeadingCheck {
    let mut issues = Vec::new();
    let mut english_only = Vec::new();
    let mut prev_level = 0u32;

    for heading in document.select(&HEADINGS) {
        let name = heading.value().name();
        let level: u32 = name[1..].parse().unwrap_or(1);
        let text = heading.text().collect::<String>().trim().to_string();

        if prev_level == 0 {
            if level != 1 {
                issues.push(format!("first heading is h{level}, not h1 ({text})"));
            }
        } else if level > prev_level && level - prev_level > 1 {
            issues.push(format!("jumps from h{prev_level} to h{level} ({text})"));
        }

        if !text.is_empty() && !contains_japanese(&text) && ENGLISH_ONLY.is_match(&text) {
            english_only.push(format!("{name}: {text}"));
        }

        prev_level = level;
    }

    HeadingCheck {
        issues,
        english_only,
    }
}
