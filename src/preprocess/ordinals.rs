//! Mark `N.` as an ordinal so "5. místo" is read "páté místo".
//!
//! Only one- and two-digit numbers qualify, and never at the very end of the
//! sentence where the period is far more likely to be a full stop. Longer
//! numbers (years, "2024.") and decimals preceded by more digits are skipped.

use crate::preprocess::{Stage, StageKind};
use once_cell::sync::Lazy;
use regex::Regex;

static RE_CANDIDATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]{1,2}\.").unwrap());

/// Ordinal tagging stage.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrdinalStage;

impl Stage for OrdinalStage {
    fn kind(&self) -> StageKind {
        StageKind::Ordinals
    }

    fn apply(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len() + 32);
        let mut last = 0;
        for m in RE_CANDIDATE.find_iter(text) {
            let preceded_by_digit = text[..m.start()]
                .chars()
                .next_back()
                .is_some_and(|c| c.is_ascii_digit());
            if preceded_by_digit || m.end() == text.len() {
                continue;
            }
            out.push_str(&text[last..m.start()]);
            out.push_str(r#"<say-as interpret-as="ordinal">"#);
            out.push_str(m.as_str());
            out.push_str("</say-as>");
            last = m.end();
        }
        out.push_str(&text[last..]);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(text: &str) -> String {
        OrdinalStage.apply(text)
    }

    #[test]
    fn test_ordinal_tagged() {
        assert_eq!(
            run("5. místo"),
            r#"<say-as interpret-as="ordinal">5.</say-as> místo"#
        );
        assert_eq!(
            run("Dne 24. června"),
            r#"Dne <say-as interpret-as="ordinal">24.</say-as> června"#
        );
    }

    #[test]
    fn test_end_of_sentence_skipped() {
        assert_eq!(run("Bylo jich 5."), "Bylo jich 5.");
    }

    #[test]
    fn test_three_digits_skipped() {
        assert_eq!(run("V roce 2024. se"), "V roce 2024. se");
        assert_eq!(run("Číslo 123. je"), "Číslo 123. je");
    }

    #[test]
    fn test_several() {
        let out = run("1. a 2. místo");
        assert_eq!(out.matches("interpret-as=\"ordinal\"").count(), 2);
        assert!(out.ends_with("</say-as> místo"));
    }
}
