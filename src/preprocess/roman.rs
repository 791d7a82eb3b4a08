//! Replace roman numerals with arabic digits.
//!
//! A candidate is a maximal run of `MDCLXVI` that
//! - starts the text or follows whitespace, and
//! - ends the text (optionally after `.`/`,`/whitespace), or is followed by a
//!   run of `.`/`,`/whitespace and then a character that is not an uppercase
//!   letter.
//!
//! The trailing rule keeps capitalised words and acronyms out: in "V Praze"
//! the `V` is a preposition followed by a capital, not the number five.
//! Candidates that fail the strict grammar (e.g. `IIII`) are left untouched.

use crate::preprocess::{Stage, StageKind};
use crate::roman;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

static RE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[MDCLXVI]+").unwrap());

fn is_separator(c: char) -> bool {
    c.is_whitespace() || c == '.' || c == ','
}

fn preceded_by_boundary(text: &str, start: usize) -> bool {
    text[..start]
        .chars()
        .next_back()
        .map_or(true, char::is_whitespace)
}

fn followed_by_boundary(text: &str, end: usize) -> bool {
    let rest = &text[end..];
    let after = rest.trim_start_matches(is_separator);
    match after.chars().next() {
        None => true,
        Some(c) => after.len() < rest.len() && !c.is_uppercase(),
    }
}

/// Roman-numeral decoding stage.
#[derive(Debug, Clone, Copy, Default)]
pub struct RomanStage;

impl Stage for RomanStage {
    fn kind(&self) -> StageKind {
        StageKind::Roman
    }

    fn apply(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for m in RE_RUN.find_iter(text) {
            if !preceded_by_boundary(text, m.start()) || !followed_by_boundary(text, m.end()) {
                continue;
            }
            match roman::parse(m.as_str()) {
                Some(n) => {
                    out.push_str(&text[last..m.start()]);
                    out.push_str(&n.to_string());
                    last = m.end();
                }
                None => debug!("{:?} looks like a roman numeral but is malformed", m.as_str()),
            }
        }
        out.push_str(&text[last..]);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(text: &str) -> String {
        RomanStage.apply(text)
    }

    #[test]
    fn test_sentence_start() {
        assert_eq!(run("IV is four."), "4 is four.");
    }

    #[test]
    fn test_regnal_number() {
        assert_eq!(run("Karel IV. byl král."), "Karel 4. byl král.");
        assert_eq!(run("Za Karla IV"), "Za Karla 4");
    }

    #[test]
    fn test_followed_by_capital_is_skipped() {
        assert_eq!(run("V Praze je hezky."), "V Praze je hezky.");
        assert_eq!(run("Kapitola XI. Začátek"), "Kapitola XI. Začátek");
    }

    #[test]
    fn test_inside_word_is_skipped() {
        assert_eq!(run("MIXER je tu"), "MIXER je tu");
        assert_eq!(run("aXI b"), "aXI b");
    }

    #[test]
    fn test_malformed_left_alone() {
        assert_eq!(run("strana IIII a dál"), "strana IIII a dál");
        assert_eq!(run("VX, ne"), "VX, ne");
    }

    #[test]
    fn test_multiple() {
        assert_eq!(run("kapitoly II a III"), "kapitoly 2 a 3");
        // A numeral right before another capitalised run is not a candidate.
        assert_eq!(run("díly II, III"), "díly II, 3");
    }
}
