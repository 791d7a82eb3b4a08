//! Dictionary-based autocorrection.
//!
//! The sentence is split into word tokens (letters, digits and the
//! hyphen/dash family) and everything else. Only word tokens containing at
//! least one letter are looked up; punctuation, whitespace, numbers, markup
//! tags (`<emphasis>`) and character references (`&amp;`) are copied through
//! verbatim, so joining the tokens back reproduces the input exactly when
//! nothing is corrected.
//!
//! An unknown word is replaced only when exactly one suggestion reaches the
//! lowest weighted distance and that distance is within the acceptance
//! threshold. Anything else (no suggestions, too far, a tie, a failed lookup)
//! keeps the original word: leaving a typo is cheaper than inventing a word.

use crate::dictionary::SpellingDictionary;
use crate::preprocess::distance::CostModel;
use crate::preprocess::{Stage, StageKind};
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use tracing::{debug, warn};

/// Maximum accepted correction cost.
pub const DEFAULT_ACCEPTANCE_THRESHOLD: f64 = 2.0;

/// Tolerance when comparing float distances for ties.
const TIE_EPSILON: f64 = 1e-9;

static RE_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<[^<>]*>|&#?[a-zA-Z0-9]+;|[\p{Alphabetic}0-9\-—―–‒−‐\x{AD}]+|.").unwrap()
});

/// Outcome of checking one word. Exposed for tests and diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// The word is in the dictionary.
    Known,
    /// Replace with this suggestion.
    Corrected { suggestion: String, cost: f64 },
    /// The dictionary had no suggestions, or the lookup failed.
    NoSuggestion,
    /// The best suggestion costs more than the threshold.
    TooDistant { best: String, cost: f64 },
    /// Several suggestions share the lowest cost.
    Ambiguous { candidates: Vec<String>, cost: f64 },
}

/// Autocorrection stage.
pub struct Autocorrector {
    dictionary: Arc<dyn SpellingDictionary>,
    costs: Arc<CostModel>,
    threshold: f64,
}

impl Autocorrector {
    pub fn new(dictionary: Arc<dyn SpellingDictionary>, costs: Arc<CostModel>) -> Self {
        Self {
            dictionary,
            costs,
            threshold: DEFAULT_ACCEPTANCE_THRESHOLD,
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Decide what to do with a single word token.
    pub fn decide(&self, word: &str) -> Decision {
        if self.dictionary.contains(word) {
            return Decision::Known;
        }

        let suggestions = match self.dictionary.suggest(word) {
            Ok(s) => s,
            Err(e) => {
                warn!("suggestion lookup failed for {word:?}: {e}");
                return Decision::NoSuggestion;
            }
        };
        if suggestions.is_empty() {
            return Decision::NoSuggestion;
        }

        let scored: Vec<(String, f64)> = suggestions
            .into_iter()
            .map(|s| {
                let cost = self.costs.distance(&s, word);
                (s, cost)
            })
            .collect();
        let min = scored
            .iter()
            .map(|(_, cost)| *cost)
            .fold(f64::INFINITY, f64::min);

        let best: Vec<String> = scored
            .into_iter()
            .filter(|(_, cost)| (cost - min).abs() < TIE_EPSILON)
            .map(|(s, _)| s)
            .collect();
        let Some(first) = best.first().cloned() else {
            return Decision::NoSuggestion;
        };

        if min > self.threshold {
            return Decision::TooDistant {
                best: first,
                cost: min,
            };
        }
        if best.len() > 1 {
            return Decision::Ambiguous {
                candidates: best,
                cost: min,
            };
        }
        Decision::Corrected {
            suggestion: first,
            cost: min,
        }
    }

    fn correct_word(&self, word: &str) -> String {
        match self.decide(word) {
            Decision::Known => word.to_string(),
            Decision::Corrected { suggestion, cost } => {
                debug!("corrected {word:?} -> {suggestion:?} (cost {cost})");
                suggestion
            }
            Decision::NoSuggestion => {
                warn!("no correction for {word:?}");
                word.to_string()
            }
            Decision::TooDistant { best, cost } => {
                warn!("no correction for {word:?} (closest {best:?} costs {cost})");
                word.to_string()
            }
            Decision::Ambiguous { candidates, cost } => {
                warn!("ambiguous correction for {word:?}");
                debug!("candidates at cost {cost}: {candidates:?}");
                word.to_string()
            }
        }
    }
}

fn is_checkable(token: &str) -> bool {
    !token.starts_with(['<', '&']) && token.chars().any(char::is_alphabetic)
}

impl Stage for Autocorrector {
    fn kind(&self) -> StageKind {
        StageKind::Autocorrect
    }

    fn apply(&self, text: &str) -> String {
        RE_TOKEN
            .find_iter(text)
            .map(|m| {
                let token = m.as_str();
                if is_checkable(token) {
                    self.correct_word(token)
                } else {
                    token.to_string()
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::WordListDictionary;
    use crate::error::LookupError;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Dictionary with hand-picked suggestion lists.
    struct FixedDictionary {
        known: Vec<&'static str>,
        suggestions: HashMap<&'static str, Vec<&'static str>>,
    }

    impl SpellingDictionary for FixedDictionary {
        fn contains(&self, word: &str) -> bool {
            self.known.iter().any(|k| k.eq_ignore_ascii_case(word))
        }

        fn suggest(&self, word: &str) -> Result<Vec<String>, LookupError> {
            if word == "porucha" {
                return Err(LookupError::Unavailable {
                    detail: "backend down".into(),
                });
            }
            Ok(self
                .suggestions
                .get(word)
                .map(|s| s.iter().map(|w| w.to_string()).collect())
                .unwrap_or_default())
        }
    }

    fn corrector() -> Autocorrector {
        let dict = FixedDictionary {
            known: vec!["je", "to", "pes", "dům", "a"],
            suggestions: HashMap::from([
                ("doma", vec!["dům", "dáma"]),
                ("kocka", vec!["kočka", "kočky"]),
                ("pas", vec!["pes", "pak"]),
                ("napa", vec!["kapa", "mapa"]),
                ("xyz", vec!["abcdef"]),
            ]),
        };
        Autocorrector::new(Arc::new(dict), Arc::new(CostModel::ocr()))
    }

    #[test]
    fn test_known_word_untouched() {
        let c = corrector();
        assert_eq!(c.decide("pes"), Decision::Known);
        assert_eq!(c.apply("to je pes"), "to je pes");
    }

    #[test]
    fn test_unique_best_is_accepted() {
        let c = corrector();
        // kočka normalises to kocka (cost 0); kočky costs 1.
        assert_eq!(c.apply("to je kocka."), "to je kočka.");
    }

    #[test]
    fn test_tie_is_ambiguous() {
        let c = corrector();
        // pes and pak are both one substitution away.
        assert!(matches!(c.decide("pas"), Decision::Ambiguous { .. }));
        assert_eq!(c.apply("pas"), "pas");
    }

    #[test]
    fn test_cheap_confusion_breaks_plain_tie() {
        let c = corrector();
        // Both are one substitution away, but n/m is a cheap OCR confusion.
        assert_eq!(
            c.decide("napa"),
            Decision::Corrected {
                suggestion: "mapa".into(),
                cost: 0.5
            }
        );
    }

    #[test]
    fn test_too_distant_rejected() {
        let c = corrector();
        assert!(matches!(c.decide("xyz"), Decision::TooDistant { .. }));
        assert_eq!(c.apply("to xyz"), "to xyz");
    }

    #[test]
    fn test_no_suggestions_and_failed_lookup_pass_through() {
        let c = corrector();
        assert_eq!(c.decide("qwrt"), Decision::NoSuggestion);
        assert_eq!(c.decide("porucha"), Decision::NoSuggestion);
        assert_eq!(c.apply("porucha qwrt"), "porucha qwrt");
    }

    #[test]
    fn test_punctuation_and_spacing_preserved() {
        let c = corrector();
        assert_eq!(c.apply("To je  pes,  a dům!"), "To je  pes,  a dům!");
    }

    #[test]
    fn test_numbers_and_markup_skipped() {
        let c = corrector();
        let text = r#"<emphasis>pes</emphasis> 42 -- 7 &amp; &lt;"#;
        assert_eq!(c.apply(text), text);
    }

    #[test]
    fn test_decision_is_deterministic() {
        let c = corrector();
        let first = c.decide("doma");
        for _ in 0..10 {
            assert_eq!(c.decide("doma"), first);
        }
    }

    #[test]
    fn test_idempotent_on_own_output() {
        let dict = WordListDictionary::from_words(["to", "je", "kočka", "a", "pes"]);
        let c = Autocorrector::new(Arc::new(dict), Arc::new(CostModel::ocr()));
        let once = c.apply("To je kocka a pes.");
        assert_eq!(once, "To je kočka a pes.");
        assert_eq!(c.apply(&once), once);
    }

    // ── Logged decisions ─────────────────────────────────────────────────

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    /// Run `f` with a subscriber that writes into a buffer; return the log.
    fn capture_logs(f: impl FnOnce()) -> String {
        let buffer = LogBuffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::WARN)
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        let bytes = buffer.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_ambiguous_word_is_logged() {
        let c = corrector();
        let logs = capture_logs(|| {
            c.apply("pas");
        });
        assert!(logs.contains("WARN"), "{logs}");
        assert!(logs.contains(r#"ambiguous correction for "pas""#), "{logs}");
    }

    #[test]
    fn test_missing_suggestion_is_logged() {
        let c = corrector();
        let logs = capture_logs(|| {
            c.apply("qwrt");
        });
        assert!(logs.contains("WARN"), "{logs}");
        assert!(logs.contains(r#"no correction for "qwrt""#), "{logs}");
    }

    #[test]
    fn test_too_distant_is_logged_with_closest() {
        let c = corrector();
        let logs = capture_logs(|| {
            c.apply("xyz");
        });
        assert!(logs.contains("WARN"), "{logs}");
        assert!(logs.contains(r#"no correction for "xyz""#), "{logs}");
        assert!(logs.contains(r#"closest "abcdef""#), "{logs}");
    }

    #[test]
    fn test_accepted_correction_is_not_warned() {
        let c = corrector();
        let logs = capture_logs(|| {
            c.apply("to je kocka");
        });
        assert!(!logs.contains("WARN"), "{logs}");
    }

    // ── Token boundaries ─────────────────────────────────────────────────

    /// Knows nothing, suggests nothing, remembers every lookup.
    #[derive(Default)]
    struct RecordingDictionary {
        seen: Mutex<Vec<String>>,
    }

    impl SpellingDictionary for RecordingDictionary {
        fn contains(&self, word: &str) -> bool {
            self.seen.lock().unwrap().push(word.to_string());
            false
        }

        fn suggest(&self, _word: &str) -> Result<Vec<String>, LookupError> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_foreign_letters_stay_in_one_token() {
        let dict = Arc::new(RecordingDictionary::default());
        let c = Autocorrector::new(dict.clone(), Arc::new(CostModel::ocr()));
        assert_eq!(c.apply("Schröder a Łódź, 3-4"), "Schröder a Łódź, 3-4");
        let seen = dict.seen.lock().unwrap().clone();
        assert_eq!(seen, vec!["Schröder", "a", "Łódź"]);
    }
}
