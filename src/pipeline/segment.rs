//! Sentence segmentation.
//!
//! The pipeline only consumes [`SentenceSegmenter`]; any segmenter that
//! returns substrings of its input in order will do. [`RuleSegmenter`] is the
//! built-in default, tuned for Czech prose:
//!
//! - a boundary is `.`, `!`, `?` or `…` (optionally followed by closing
//!   quotes, brackets or closing tags), then whitespace, then an uppercase
//!   letter, a digit, an opening quote or a tag
//! - no boundary inside `<emphasis>` spans
//! - no boundary after a single-letter initial ("T. G. Masaryk") or a
//!   common abbreviation ("např. Praha")

/// Sentence splitting collaborator.
pub trait SentenceSegmenter: Send + Sync {
    /// Split `text` into sentences, in order. Each sentence must be a
    /// substring of `text` (trimming is allowed).
    fn segment(&self, text: &str) -> Vec<String>;
}

/// Lowercase abbreviations that never end a sentence.
const ABBREVIATIONS: &[&str] = &[
    "tzv", "např", "atd", "apod", "resp", "tj", "mj", "str", "č", "sv", "prof", "dr", "ing",
    "mgr", "tzn", "viz", "cca", "kap", "obr",
];

/// Rule-based segmenter.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleSegmenter;

fn is_terminal(c: char) -> bool {
    matches!(c, '.' | '!' | '?' | '…')
}

fn is_closing(c: char) -> bool {
    matches!(c, '"' | '“' | '”' | '\'' | ')' | ']' | '»')
}

fn opens_sentence(c: char) -> bool {
    c.is_uppercase() || c.is_ascii_digit() || matches!(c, '„' | '"' | '“' | '(' | '<' | '«')
}

/// Whether the word ending right before the period at `dot` is an initial or
/// an abbreviation.
fn ends_with_abbreviation(text: &str, dot: usize) -> bool {
    let word: &str = text[..dot]
        .rsplit(|c: char| c.is_whitespace() || c == '>' || c == '(')
        .next()
        .unwrap_or("");
    let mut chars = word.chars();
    match (chars.next(), chars.next(), chars.next()) {
        (Some(c), None, _) if c.is_uppercase() => return true,
        (Some('C'), Some('h'), None) => return true,
        _ => {}
    }
    let lower = word.to_lowercase();
    ABBREVIATIONS.contains(&lower.as_str())
}

impl SentenceSegmenter for RuleSegmenter {
    fn segment(&self, text: &str) -> Vec<String> {
        let mut sentences = Vec::new();
        let mut start = 0;
        let mut depth: i32 = 0;
        let mut iter = text.char_indices().peekable();

        while let Some((i, c)) = iter.next() {
            if c == '<' {
                let rest = &text[i..];
                if rest.starts_with("<emphasis") {
                    depth += 1;
                } else if rest.starts_with("</emphasis") {
                    depth = (depth - 1).max(0);
                }
                continue;
            }
            if !is_terminal(c) {
                continue;
            }
            if c == '.' && ends_with_abbreviation(text, i) {
                continue;
            }

            // Consume further terminals, closing punctuation and closing tags.
            let mut end = i + c.len_utf8();
            let mut closed = 0;
            loop {
                let rest = &text[end..];
                if let Some(next) = rest.chars().next().filter(|&n| is_terminal(n) || is_closing(n)) {
                    end += next.len_utf8();
                } else if rest.starts_with("</") {
                    let Some(close) = rest.find('>') else { break };
                    if rest.starts_with("</emphasis") {
                        closed += 1;
                    }
                    end += close + 1;
                } else {
                    break;
                }
            }
            if depth - closed > 0 {
                continue;
            }

            let after = &text[end..];
            let trimmed = after.trim_start();
            if trimmed.len() == after.len() {
                continue;
            }
            let Some(first) = trimmed.chars().next() else {
                continue;
            };
            if !opens_sentence(first) {
                continue;
            }

            let sentence = text[start..end].trim();
            if !sentence.is_empty() {
                sentences.push(sentence.to_string());
            }
            start = end;
            depth = (depth - closed).max(0);
            while iter.peek().is_some_and(|&(j, _)| j < end) {
                iter.next();
            }
        }

        let tail = text[start..].trim();
        if !tail.is_empty() {
            sentences.push(tail.to_string());
        }
        sentences
    }
}
