//! Spell out ASCII-art arrows (`->`, `-->`, `—>`, `-=>`).

use crate::preprocess::{Stage, StageKind};
use once_cell::sync::Lazy;
use regex::Regex;

/// Dash-family run, optional `=`, optional space, `>`; plus the whitespace
/// around it so spacing can be normalised.
static RE_ARROW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s*[-—―–‒−‐\x{AD}]+=? ?>\s*").unwrap()
});

pub const DEFAULT_ARROW_WORD: &str = "šipka";

/// Arrow rewriting stage.
#[derive(Debug, Clone)]
pub struct ArrowStage {
    word: String,
}

impl ArrowStage {
    pub fn new(word: impl Into<String>) -> Self {
        Self { word: word.into() }
    }
}

impl Default for ArrowStage {
    fn default() -> Self {
        Self::new(DEFAULT_ARROW_WORD)
    }
}

impl Stage for ArrowStage {
    fn kind(&self) -> StageKind {
        StageKind::Arrows
    }

    fn apply(&self, text: &str) -> String {
        let replacement = format!(" {} ", self.word);
        let out = RE_ARROW.replace_all(text, replacement.as_str());
        // Only re-trim the ends when the arrow itself touched them.
        let mut result = out.into_owned();
        if !text.starts_with(char::is_whitespace) {
            result = result.trim_start().to_string();
        }
        if !text.ends_with(char::is_whitespace) {
            result = result.trim_end().to_string();
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(text: &str) -> String {
        ArrowStage::default().apply(text)
    }

    #[test]
    fn test_simple_arrow() {
        assert_eq!(run("A -> B"), "A šipka B");
        assert_eq!(run("A->B"), "A šipka B");
    }

    #[test]
    fn test_long_and_unicode_arrows() {
        assert_eq!(run("vstup --> výstup"), "vstup šipka výstup");
        assert_eq!(run("vstup —> výstup"), "vstup šipka výstup");
        assert_eq!(run("vstup -=> výstup"), "vstup šipka výstup");
        assert_eq!(run("vstup - > výstup"), "vstup šipka výstup");
    }

    #[test]
    fn test_plain_dash_untouched() {
        assert_eq!(run("Praha - Brno"), "Praha - Brno");
        assert_eq!(run("a > b"), "a > b");
    }

    #[test]
    fn test_arrow_at_edges() {
        assert_eq!(run("-> konec"), "šipka konec");
        assert_eq!(run("začátek ->"), "začátek šipka");
    }

    #[test]
    fn test_custom_word() {
        assert_eq!(ArrowStage::new("arrow").apply("a -> b"), "a arrow b");
    }
}
