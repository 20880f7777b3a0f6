//! Importance-biased truncation of documentation that exceeds the prompt budget.
//!
//! Lines that look structurally significant (headings, emphasis, Django domain
//! terms) are kept first, up to 80% of the budget; the remainder is filled
//! with ordinary lines in their original order. This is a greedy two-pass
//! allocation, not a summarizer.

use std::borrow::Cow;

/// Appended once to every truncated document.
pub const TRUNCATION_MARKER: &str = "\n\n[Content truncated to fit token limits...]";

/// Share of the budget reserved for important lines, in percent.
const IMPORTANT_SHARE_PERCENT: usize = 80;

const IMPORTANT_KEYWORDS: &[&str] = &["Model", "Field", "Serializer", "View"];

/// Heading, emphasis, or a domain keyword.
pub fn is_important_line(line: &str) -> bool {
    line.starts_with('#')
        || line.contains("**")
        || IMPORTANT_KEYWORDS.iter().any(|kw| line.contains(kw))
}

/// Bounds `text` to `max_len` characters (plus the marker).
///
/// Returns the input untouched when it already fits.
pub fn truncate_docs(text: &str, max_len: usize) -> Cow<'_, str> {
    if text.chars().count() <= max_len {
        return Cow::Borrowed(text);
    }

    let (important, other): (Vec<&str>, Vec<&str>) =
        text.split('\n').partition(|line| is_important_line(line));

    let important_budget = max_len * IMPORTANT_SHARE_PERCENT / 100;
    let mut out = String::with_capacity(max_len + TRUNCATION_MARKER.len());
    let used = append_lines(&mut out, 0, &important, important_budget);
    append_lines(&mut out, used, &other, max_len);

    out.push_str(TRUNCATION_MARKER);
    Cow::Owned(out)
}

/// Appends `line\n` for each line until the next one would push `used` past `limit`.
/// Returns the new character count.
fn append_lines(out: &mut String, mut used: usize, lines: &[&str], limit: usize) -> usize {
    for line in lines {
        let cost = line.chars().count() + 1;
        if used + cost > limit {
            break;
        }
        out.push_str(line);
        out.push('\n');
        used += cost;
    }
    used
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn filler(n: usize) -> String {
        (0..n)
            .map(|i| format!("plain line number {i} with some ordinary text"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_short_docs_are_returned_unchanged() {
        let docs = "# Models\nUser, Post";
        let out = truncate_docs(docs, 15_000);
        assert!(matches!(out, Cow::Borrowed(_)));
        assert_eq!(out, docs);
    }

    #[test]
    fn test_exact_budget_is_identity() {
        let docs = "abcde\nfghij";
        assert_eq!(truncate_docs(docs, docs.len()), docs);
    }

    #[test]
    fn test_important_line_detection() {
        assert!(is_important_line("## Serializers"));
        assert!(is_important_line("- **Fields**: title"));
        assert!(is_important_line("class PostViewSet(ModelViewSet)"));
        assert!(is_important_line("uses a CharField"));
        assert!(!is_important_line("just some prose about the project"));
        assert!(!is_important_line("  # indented hash is not a heading"));
    }

    #[test]
    fn test_twenty_thousand_chars_fit_fifteen_thousand_budget() {
        let mut docs = String::new();
        let mut i = 0;
        while docs.len() < 20_000 {
            if i % 10 == 0 {
                docs.push_str(&format!("## Section {i}\n"));
            } else {
                docs.push_str(&format!("ordinary paragraph {i} describing behaviour in detail\n"));
            }
            i += 1;
        }
        let docs = &docs[..20_000];

        let out = truncate_docs(docs, 15_000);

        assert!(out.chars().count() <= 15_000 + TRUNCATION_MARKER.chars().count());
        assert!(out.ends_with(TRUNCATION_MARKER));
        assert_eq!(out.matches(TRUNCATION_MARKER).count(), 1);
    }

    #[test]
    fn test_important_lines_come_first() {
        let docs = format!("intro text\n{}\n# Heading\nmore text\n**bold**", filler(50));
        let out = truncate_docs(&docs, 600);
        let body = out.strip_suffix(TRUNCATION_MARKER).unwrap();
        let lines: Vec<&str> = body.lines().collect();
        assert_eq!(lines[0], "# Heading");
        assert_eq!(lines[1], "**bold**");
        assert_eq!(lines[2], "intro text");
    }

    #[test]
    fn test_important_pass_stops_at_eighty_percent() {
        let docs = (0..100)
            .map(|i| format!("# heading {i:03}"))
            .collect::<Vec<_>>()
            .join("\n");
        // 14 chars per line with its newline; 80% of 200 = 160 fits 11 lines.
        let out = truncate_docs(&docs, 200);
        let body = out.strip_suffix(TRUNCATION_MARKER).unwrap();
        assert_eq!(body.lines().count(), 11);
        assert!(body.starts_with("# heading 000\n"));
    }

    #[test]
    fn test_zero_budget_keeps_only_marker() {
        assert_eq!(truncate_docs("anything", 0), TRUNCATION_MARKER);
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        let docs = "é".repeat(10);
        assert_eq!(truncate_docs(&docs, 10), docs);
    }

    fn arb_docs() -> impl Strategy<Value = String> {
        let line = prop_oneof![
            "[a-z ]{0,40}",
            "# [a-z ]{0,30}",
            "[a-z ]{0,10}\\*\\*[a-z]{1,10}\\*\\*",
            "[a-z ]{0,10}(Model|Field|Serializer|View)[a-z ]{0,10}",
        ];
        prop::collection::vec(line, 0..80).prop_map(|lines| lines.join("\n"))
    }

    proptest! {
        #[test]
        fn prop_identity_within_budget(docs in arb_docs()) {
            let budget = docs.chars().count();
            let out = truncate_docs(&docs, budget);
            prop_assert_eq!(out.as_ref(), docs.as_str());
        }

        #[test]
        fn prop_output_is_bounded(docs in arb_docs(), budget in 0usize..2_000) {
            let out = truncate_docs(&docs, budget);
            if docs.chars().count() > budget {
                prop_assert!(out.chars().count() <= budget + TRUNCATION_MARKER.chars().count());
                prop_assert!(out.ends_with(TRUNCATION_MARKER));
            }
        }

        #[test]
        fn prop_important_lines_precede_others(docs in arb_docs(), budget in 0usize..2_000) {
            prop_assume!(docs.chars().count() > budget);
            let out = truncate_docs(&docs, budget);
            let body = out.strip_suffix(TRUNCATION_MARKER).unwrap();
            let mut seen_other = false;
            for line in body.lines() {
                if is_important_line(line) {
                    prop_assert!(!seen_other, "important line {:?} after an ordinary one", line);
                } else {
                    seen_other = true;
                }
            }
        }
    }
}
