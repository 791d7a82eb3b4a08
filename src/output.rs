//! Output types returned by the conversion entry points.

use crate::pipeline::filter::BlockKind;
use serde::{Deserialize, Serialize};

/// Result of converting a whole document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionOutput {
    /// The SSML document: one fragment per line, each line one synthesis
    /// request.
    pub ssml: String,

    /// Per-paragraph results, in document order.
    pub paragraphs: Vec<ParagraphResult>,

    /// Aggregate statistics.
    pub stats: ConversionStats,
}

impl ConversionOutput {
    /// Output lines, in order.
    pub fn fragments(&self) -> impl Iterator<Item = &str> {
        self.paragraphs
            .iter()
            .flat_map(|p| p.fragments.iter().map(String::as_str))
    }
}

/// Result of converting one heading or paragraph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParagraphResult {
    /// 1-indexed position in the document.
    pub index: usize,

    pub kind: BlockKind,

    /// Preprocessed sentences, in order. A heading is one sentence.
    pub sentences: Vec<String>,

    /// Serialised output lines: one `<p>` chunk each, or the heading line.
    pub fragments: Vec<String>,
}

/// Aggregate statistics for a conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionStats {
    /// Headings plus paragraphs.
    pub paragraphs: usize,
    pub headings: usize,
    pub sentences: usize,
    /// `<p>` chunks emitted.
    pub chunks: usize,
    /// Character length of the longest output line.
    pub longest_fragment_chars: usize,
    pub duration_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_serialise_to_json() {
        let stats = ConversionStats {
            paragraphs: 2,
            headings: 1,
            sentences: 3,
            chunks: 1,
            longest_fragment_chars: 57,
            duration_ms: 4,
        };
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["chunks"], 1);
        assert_eq!(json["longest_fragment_chars"], 57);
    }

    #[test]
    fn fragments_flatten_in_order() {
        let out = ConversionOutput {
            ssml: String::new(),
            paragraphs: vec![
                ParagraphResult {
                    index: 1,
                    kind: BlockKind::Heading,
                    sentences: vec!["T".into()],
                    fragments: vec!["h".into()],
                },
                ParagraphResult {
                    index: 2,
                    kind: BlockKind::Paragraph,
                    sentences: vec!["a".into(), "b".into()],
                    fragments: vec!["p1".into(), "p2".into()],
                },
            ],
            stats: ConversionStats::default(),
        };
        assert_eq!(out.fragments().collect::<Vec<_>>(), vec!["h", "p1", "p2"]);
        let json = serde_json::to_string(&out).unwrap();
        assert!(json.contains(r#""kind":"heading""#));
    }
}
