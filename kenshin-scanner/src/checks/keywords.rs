use crate::report::RepeatedKeyword;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

/// A token must occur this often before it is flagged.
const REPEAT_THRESHOLD: usize = 3;

/// Medical-specialty and clinic vocabulary. Sites in this niche repeat these
/// legitimately, so they never count toward keyword stuffing.
const MEDICAL_SPECIALTIES: &[&str] = &[
    // Primary departments
    "内科", "外科", "眼科", "歯科", "耳鼻科", "皮膚科", "小児科",
    "整形外科", "産婦人科", "泌尿器科", "精神科", "脳神経外科",
    "放射線科", "麻酔科", "形成外科", "救急科",
    // Dental specialties
    "小児歯科", "矯正歯科", "審美歯科", "口腔外科", "歯科口腔外科",
    "予防歯科", "保存歯科", "補綴歯科", "インプラント", "一般歯科",
    // Internal-medicine specialties
    "消化器内科", "循環器内科", "呼吸器内科", "脳神経内科",
    "血液内科", "腎臓内科", "糖尿病内科", "アレルギー科",
    // Surgical specialties
    "消化器外科", "心臓血管外科", "呼吸器外科",
    "小児外科", "乳腺外科", "気管食道科",
    // Generic facility terms
    "病院", "クリニック", "医院", "診療所", "専門医",
];

/// Particles, copulas and other functional words that repeat in any text.
const STOP_WORDS: &[&str] = &[
    "の", "や", "が", "を", "に", "へ", "で", "から", "まで", "り", "も", "は",
    "・", "|", "-", "です", "ます", "した", "する", "いる", "ある", "れる",
    "られる", "など", "どの", "その", "これ", "それ", "あれ", "この", "さん",
    "様", "氏", "方", "ない", "あり", "なし", "とき", "もの", "こと",
    "ところ", "できる", "おり", "なる", "いく", "しまう", "たい", "ください",
];

/// Proper nouns the segmenter should treat as one token even when they sit
/// inside a longer script run. Counted like any other token.
const PINNED_SEGMENTS: &[&str] = &["八王子"];

/// Vocabulary driving the repetition check. The defaults carry the clinic
/// allowlist; callers auditing another niche can swap their own lists in.
#[derive(Debug, Clone)]
pub struct KeywordPolicy {
    pub allowlist: HashSet<String>,
    pub stop_words: HashSet<String>,
    pub pinned: Vec<String>,
}

impl Default for KeywordPolicy {
    fn default() -> Self {
        Self {
            allowlist: MEDICAL_SPECIALTIES.iter().map(|s| s.to_string()).collect(),
            stop_words: STOP_WORDS.iter().map(|s| s.to_string()).collect(),
            pinned: PINNED_SEGMENTS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

static PUNCTUATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[。、．，（）()「」『』｛｝\[\]【】]").expect("punctuation pattern")
});

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern"));

/// Runs of two or more Japanese-script characters, or of two or more
/// alphanumerics. The fallback segmentation when no allowlisted term matches.
static TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[一-龯ぁ-んァ-ン]{2,}|[A-Za-z0-9]{2,}").expect("token pattern")
});

/// Flags tokens that repeat `REPEAT_THRESHOLD`-or-more times in `text`.
///
/// Segmentation prefers the longest match starting at each position: known
/// multi-character terms (allowlist and pinned segments) compete with the
/// regex-segmented runs, and overlapping shorter candidates are discarded.
/// Allowlisted and stop-word tokens never count. Of the flagged tokens, one
/// that is a prefix of an already-kept longer or more frequent token is
/// suppressed so a compound and its head are not both reported.
pub fn check_keyword_repetition(text: &str, policy: &KeywordPolicy) -> Vec<RepeatedKeyword> {
    if text.is_empty() {
        return Vec::new();
    }

    let folded = PUNCTUATION.replace_all(text, " ");
    let folded = WHITESPACE.replace_all(&folded, " ");

    // Candidate spans: every occurrence of a known term, plus every
    // script/alphanumeric run.
    let mut spans: Vec<(usize, usize, &str)> = Vec::new();
    for term in policy.allowlist.iter().chain(policy.pinned.iter()) {
        for (start, matched) in folded.match_indices(term.as_str()) {
            spans.push((start, start + matched.len(), matched));
        }
    }
    for found in TOKEN.find_iter(&folded) {
        spans.push((found.start(), found.end(), found.as_str()));
    }

    // Longest match wins at each position; later overlaps are dropped.
    spans.sort_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)));
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut cursor = 0;
    for (start, end, token) in spans {
        if start < cursor {
            continue;
        }
        cursor = end;
        if policy.stop_words.contains(token) || policy.allowlist.contains(token) {
            continue;
        }
        *counts.entry(token).or_insert(0) += 1;
    }

    let mut flagged: Vec<(&str, usize)> = counts
        .into_iter()
        .filter(|&(_, count)| count >= REPEAT_THRESHOLD)
        .collect();
    flagged.sort_by(|a, b| {
        b.1.cmp(&a.1)
            .then(b.0.chars().count().cmp(&a.0.chars().count()))
            .then(a.0.cmp(b.0))
    });

    // Prefix suppression: "矯正歯" never rides along with "矯正歯科".
    let mut kept: Vec<RepeatedKeyword> = Vec::new();
    for (token, count) in flagged {
        if kept.iter().any(|k| k.token.starts_with(token)) {
            continue;
        }
        kept.push(RepeatedKeyword {
            token: token.to_string(),
            count,
        });
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flags(text: &str) -> Vec<RepeatedKeyword> {
        check_keyword_repetition(text, &KeywordPolicy::default())
    }

    #[test]
    fn three_occurrences_flagged_two_are_not() {
        let twice = "さくら 整体 さくら 通信";
        assert!(flags(twice).is_empty(), "two occurrences must pass");

        let thrice = "さくら 整体 さくら 施術 さくら 料金";
        let found = flags(thrice);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].token, "さくら");
        assert_eq!(found[0].count, 3);
    }

    #[test]
    fn allowlisted_terms_never_flagged() {
        let text = "歯科 歯科 歯科 歯科 歯科";
        assert!(flags(text).is_empty());
    }

    #[test]
    fn stop_words_never_flagged() {
        let text = "です です です 東京タワー";
        assert!(flags(text).is_empty());
    }

    #[test]
    fn longest_allowlisted_term_wins_over_inner_tokens() {
        // 小児歯科 must segment as one allowlisted unit, not leak 歯科 or
        // 小児 counts out of its occurrences.
        let text = "小児歯科、小児歯科、小児歯科";
        assert!(flags(text).is_empty());
    }

    #[test]
    fn ascii_tokens_are_counted() {
        let found = flags("access access access");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].token, "access");
        assert_eq!(found[0].count, 3);
    }

    #[test]
    fn punctuation_splits_tokens() {
        let found = flags("渋谷（渋谷）渋谷、別語");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].token, "渋谷");
    }

    #[test]
    fn empty_text_yields_nothing() {
        assert!(flags("").is_empty());
    }

    #[test]
    fn display_format_matches_report_lines() {
        let keyword = RepeatedKeyword {
            token: "さくら".to_string(),
            count: 4,
        };
        assert_eq!(keyword.to_string(), "'さくら' (4x)");
    }
}
