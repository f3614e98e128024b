use crate::report::{SyntaxCheck, TagWarning};
use regex::Regex;
use std::sync::LazyLock;

/// Structural tags worth balancing. Inline tags churn too much to count
/// reliably with a line scanner.
const WATCHED_TAGS: &[&str] = &[
    "div", "p", "section", "article", "main", "header", "footer", "nav", "aside",
];

/// Markers that make an unmatched opening too suspicious to report: template
/// code, comments, shortcodes and entities all confuse the line scan.
const IGNORE_MARKERS: &[&str] = &["<?php", "?>", "<!--", "-->", "[", "]", "&copy;"];

/// Context window radius around a candidate opening tag, in characters.
const CONTEXT_RADIUS: usize = 25;

static PHP_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<\?php.*?\?>").expect("php block pattern"));
static ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&[a-zA-Z]+;").expect("entity pattern"));

struct TagMatchers {
    tag: &'static str,
    open: Regex,
    close: Regex,
    close_literal: String,
}

static MATCHERS: LazyLock<Vec<TagMatchers>> = LazyLock::new(|| {
    WATCHED_TAGS
        .iter()
        .map(|&tag| TagMatchers {
            tag,
            open: Regex::new(&format!("<{tag}[^>]*>")).expect("open tag pattern"),
            close: Regex::new(&format!("</{tag}>")).expect("close tag pattern"),
            close_literal: format!("</{tag}>"),
        })
        .collect()
});

/// Line-oriented unclosed-tag scan over the raw body.
///
/// PHP blocks and named entities are blanked out first (newlines kept, so
/// line numbers stay aligned with the source). For every watched tag, when
/// openings outnumber closings the surplus openings are examined in their
/// original-source context and reported unless the context smells like a
/// false positive. Deliberately regex-approximate, not a tree balance check.
pub fn check_unclosed_tags(html: &str) -> SyntaxCheck {
    let processed = blank_out_opaque_regions(html);
    let processed_lines: Vec<&str> = processed.split('\n').collect();
    let original_lines: Vec<&str> = html.split('\n').collect();

    let mut warnings = Vec::new();

    for matchers in MATCHERS.iter() {
        // (1-based line, byte column, matched text) per opening.
        let mut openings: Vec<(usize, usize, &str)> = Vec::new();
        let mut closings = 0usize;
        for (index, line) in processed_lines.iter().enumerate() {
            for found in matchers.open.find_iter(line) {
                openings.push((index + 1, found.start(), found.as_str()));
            }
            closings += matchers.close.find_iter(line).count();
        }

        if openings.len() <= closings {
            continue;
        }

        for &(line_num, column, matched) in &openings[closings..] {
            let Some(original_line) = original_lines.get(line_num - 1) else {
                continue;
            };
            let context = context_window(
                original_line,
                &processed_lines[line_num - 1][..column],
            );

            if IGNORE_MARKERS.iter().any(|marker| context.contains(marker)) {
                continue;
            }
            if original_line.contains(&matchers.close_literal) {
                continue;
            }

            let snippet = matchers
                .open
                .find(&context)
                .map(|found| found.as_str().to_string())
                .unwrap_or_else(|| matched.to_string());
            warnings.push(TagWarning {
                tag: matchers.tag.to_string(),
                line: line_num,
                snippet,
            });
        }
    }

    SyntaxCheck { warnings }
}

/// Replaces PHP blocks and named character entities with placeholders so
/// their contents never count as markup. Newlines inside PHP blocks survive
/// to keep line numbers stable.
fn blank_out_opaque_regions(html: &str) -> String {
    let no_php = PHP_BLOCK.replace_all(html, |caps: &regex::Captures<'_>| {
        caps[0]
            .split('\n')
            .map(|_| "__php__")
            .collect::<Vec<_>>()
            .join("\n")
    });
    ENTITY.replace_all(&no_php, "__ent__").into_owned()
}

/// +-`CONTEXT_RADIUS` characters of the original line around the opening's
/// position in the processed line. Positions are clamped since placeholder
/// substitution can shift columns.
fn context_window(original_line: &str, processed_prefix: &str) -> String {
    let chars: Vec<char> = original_line.chars().collect();
    let position = processed_prefix.chars().count().min(chars.len());
    let start = position.saturating_sub(CONTEXT_RADIUS);
    let end = (position + CONTEXT_RADIUS).min(chars.len());
    chars[start..end].iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn balanced_document_passes() {
        let html = "<div>\n<p>本文</p>\n</div>\n";
        let result = check_unclosed_tags(html);
        assert!(result.is_ok());
    }

    #[test]
    fn surplus_opening_reported_with_line_and_snippet() {
        let html = "<div>\n<div class=\"inner\">\n内容\n</div>\n";
        let result = check_unclosed_tags(html);
        assert_eq!(result.warnings.len(), 1);
        let warning = &result.warnings[0];
        assert_eq!(warning.tag, "div");
        // The surplus opening is the one past the paired count.
        assert_eq!(warning.line, 2);
        assert_eq!(warning.snippet, "<div class=\"inner\">");
    }

    #[test]
    fn close_on_same_line_suppresses() {
        let html = "<div>見出し</div>\n<div>\n<div>残り</div>\n";
        let result = check_unclosed_tags(html);
        // Lines 1 and 3 self-close; only line 2 could be a candidate but the
        // surplus walk starts past the paired count.
        for warning in &result.warnings {
            assert_ne!(warning.line, 1);
            assert_ne!(warning.line, 3);
        }
    }

    #[test]
    fn php_blocks_do_not_count_as_markup() {
        let html = "<?php if ($x): ?>\n<?php echo '<div>'; ?>\n<p>ok</p>\n";
        let result = check_unclosed_tags(html);
        assert!(result.is_ok());
    }

    #[test]
    fn multiline_php_keeps_line_numbers_aligned() {
        let html = "<?php\n// setup\n?>\n<section>\n";
        let result = check_unclosed_tags(html);
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].tag, "section");
        assert_eq!(result.warnings[0].line, 4);
    }

    #[test]
    fn shortcode_brackets_suppress_candidates() {
        let html = "[gallery]<div>\n";
        let result = check_unclosed_tags(html);
        assert!(result.is_ok());
    }

    #[test]
    fn html_comment_context_suppresses() {
        let html = "<!-- banner --><div>\n";
        let result = check_unclosed_tags(html);
        assert!(result.is_ok());
    }

    #[test]
    fn copy_entity_context_suppresses() {
        let html = "&copy; 2024 <footer>\n";
        let result = check_unclosed_tags(html);
        assert!(result.is_ok());
    }

    #[test]
    fn each_watched_tag_scanned_independently() {
        let html = "<section>\n<article>\n</article>\n";
        let result = check_unclosed_tags(html);
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].tag, "section");
        assert_eq!(result.warnings[0].line, 1);
    }
}
