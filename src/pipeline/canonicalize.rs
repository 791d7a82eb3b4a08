//! Canonicalisation: normalise loosely structured markdown before parsing.
//!
//! Extracted text (PDF, OCR, converters) is hard-wrapped, hyphenated at line
//! ends, sprinkled with stray blank lines and comment tags, and full of
//! numbered lines that a markdown parser would turn into lists. None of that
//! structure matters for speech; what matters is that sentences survive
//! intact and headings stay headings.
//!
//! ## Rule Order
//!
//! Soft breaks are joined before blank lines are collapsed, so the collapse
//! only sees real paragraph breaks. Line-wrap hyphens are rejoined after the
//! join, when "slo-\nvo" has become "slo- vo". Lines are trimmed before the
//! section reflow so heading detection sees `#` in column one.

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply all canonicalisation rules in order.
///
/// 0. Normalise line endings (CRLF → LF)
/// 1. Join soft line breaks into a single space
/// 2. Collapse runs of newlines into exactly one blank line
/// 3. Escape ordered-list numbering (`1.` → `1\.`)
/// 4. Rejoin words split by a line-wrap hyphen
/// 5. Strip comment-like tags
/// 6. Trim every line, keeping single blank separators
/// 7. Reflow each heading's section into one paragraph
pub fn canonicalize(input: &str) -> String {
    let s = normalise_line_endings(input);
    let s = join_soft_breaks(&s);
    let s = collapse_newlines(&s);
    let s = escape_ordered_lists(&s);
    let s = rejoin_hyphenated(&s);
    let s = strip_comment_tags(&s);
    let s = trim_lines(&s);
    reflow_sections(&s)
}

static RE_HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#{1,6}(?:[ \t]|$)").unwrap());

fn is_heading(line: &str) -> bool {
    RE_HEADING.is_match(line.trim_start())
}

// ── Rule 0: Normalise line endings ───────────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Rule 1: Join soft line breaks ────────────────────────────────────────────

/// A newline between two non-blank lines is a soft break, unless either line
/// is a heading; headings must stay on their own line to stay headings.
fn join_soft_breaks(input: &str) -> String {
    let lines: Vec<&str> = input.split('\n').collect();
    let mut out = String::with_capacity(input.len());
    for (i, line) in lines.iter().enumerate() {
        out.push_str(line);
        let Some(next) = lines.get(i + 1) else {
            break;
        };
        let hard = line.trim().is_empty()
            || next.trim().is_empty()
            || is_heading(line)
            || is_heading(next);
        out.push(if hard { '\n' } else { ' ' });
    }
    out
}

// ── Rule 2: Collapse newlines ────────────────────────────────────────────────

static RE_NEWLINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n+").unwrap());

fn collapse_newlines(input: &str) -> String {
    RE_NEWLINES.replace_all(input, "\n\n").into_owned()
}

// ── Rule 3: Escape ordered-list numbering ────────────────────────────────────

static RE_ORDERED_ITEM: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^(\s*\d+)\.").unwrap());

fn escape_ordered_lists(input: &str) -> String {
    RE_ORDERED_ITEM.replace_all(input, r"${1}\.").into_owned()
}

// ── Rule 4: Rejoin hyphenated words ──────────────────────────────────────────

static RE_WRAP_HYPHEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\p{L})[-—―–‒−‐\x{AD}]\s+").unwrap());

fn rejoin_hyphenated(input: &str) -> String {
    RE_WRAP_HYPHEN.replace_all(input, "${1}").into_owned()
}

// ── Rule 5: Strip comment-like tags ──────────────────────────────────────────

static RE_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<!--.*?-->|<[-!]+>").unwrap());

fn strip_comment_tags(input: &str) -> String {
    RE_COMMENT.replace_all(input, " ").into_owned()
}

// ── Rule 6: Trim lines ───────────────────────────────────────────────────────

fn trim_lines(input: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    for line in input.lines().map(str::trim) {
        if line.is_empty() && out.last().map_or(true, |l| l.is_empty()) {
            continue;
        }
        out.push(line);
    }
    while out.last().is_some_and(|l| l.is_empty()) {
        out.pop();
    }
    out.join("\n")
}

// ── Rule 7: Reflow heading sections ──────────────────────────────────────────

static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Everything between one heading and the next becomes a single paragraph.
/// Text before the first heading keeps its paragraph breaks.
fn reflow_sections(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + 16);
    let mut body: Vec<&str> = Vec::new();
    let mut in_section = false;

    let flush = |out: &mut String, body: &mut Vec<&str>, in_section: bool| {
        if in_section {
            let joined = body.join(" ");
            let text = RE_WHITESPACE.replace_all(&joined, " ");
            let text = text.trim();
            if !text.is_empty() {
                out.push_str(text);
                out.push_str("\n\n");
            }
        } else if !body.is_empty() {
            out.push_str(body.join("\n").trim());
            out.push_str("\n\n");
        }
        body.clear();
    };

    for line in input.lines() {
        if is_heading(line) {
            flush(&mut out, &mut body, in_section);
            out.push_str(line);
            out.push_str("\n\n");
            in_section = true;
        } else {
            body.push(line);
        }
    }
    flush(&mut out, &mut body, in_section);

    let trimmed = out.trim_end();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{trimmed}\n")
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_soft_breaks() {
        assert_eq!(join_soft_breaks("jedna\ndvě\n\ntři"), "jedna dvě\n\ntři");
    }

    #[test]
    fn test_join_keeps_headings_apart() {
        assert_eq!(
            join_soft_breaks("# Nadpis\ntext\ndalší"),
            "# Nadpis\ntext další"
        );
        assert_eq!(join_soft_breaks("text\n## Nadpis"), "text\n## Nadpis");
    }

    #[test]
    fn test_whitespace_only_line_is_a_paragraph_break() {
        assert_eq!(join_soft_breaks("a\n   \nb"), "a\n   \nb");
    }

    #[test]
    fn test_collapse_newlines() {
        assert_eq!(collapse_newlines("a\n\n\n\nb\nc"), "a\n\nb\n\nc");
    }

    #[test]
    fn test_escape_ordered_lists() {
        assert_eq!(escape_ordered_lists("1. jedna\n12. dvanáct"), "1\\. jedna\n12\\. dvanáct");
        assert_eq!(escape_ordered_lists("rok 1990. byl"), "rok 1990. byl");
    }

    #[test]
    fn test_rejoin_hyphenated() {
        assert_eq!(rejoin_hyphenated("slo- vo"), "slovo");
        assert_eq!(rejoin_hyphenated("česko–  slovenský"), "československý");
        assert_eq!(rejoin_hyphenated("Praha - Brno"), "Praha - Brno");
        assert_eq!(rejoin_hyphenated("A-> B"), "A-> B");
    }

    #[test]
    fn test_strip_comment_tags() {
        assert_eq!(strip_comment_tags("a<!-- poznámka -->b"), "a b");
        assert_eq!(strip_comment_tags("a<!-->b"), "a b");
    }

    #[test]
    fn test_trim_lines() {
        assert_eq!(trim_lines("  a  \n\n\n   \n b\n\n"), "a\n\nb");
    }

    #[test]
    fn test_reflow_sections() {
        let input = "úvod\n\n# Nadpis\n\nprvní   odstavec\n\ndruhý\n## Další\n\nkonec";
        assert_eq!(
            reflow_sections(input),
            "úvod\n\n# Nadpis\n\nprvní odstavec druhý\n\n## Další\n\nkonec\n"
        );
    }

    #[test]
    fn test_canonicalize_full_pipeline() {
        let input = "# Title\r\nThis is sen-\r\ntence one.\r\n\r\n\r\n2. bod\r\nIV is four.";
        assert_eq!(
            canonicalize(input),
            "# Title\n\nThis is sentence one. 2\\. bod IV is four.\n"
        );
    }

    #[test]
    fn test_canonicalize_example_document() {
        assert_eq!(
            canonicalize("# Title\nThis is sentence one. IV is four."),
            "# Title\n\nThis is sentence one. IV is four.\n"
        );
    }

    #[test]
    fn test_canonicalize_empty() {
        assert_eq!(canonicalize(""), "");
        assert_eq!(canonicalize("\n\n  \n"), "");
    }
}
