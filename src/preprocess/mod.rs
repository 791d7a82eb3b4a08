//! Sentence preprocessing: rewrite one sentence so a speech engine reads it
//! correctly.
//!
//! ## Stage Order
//!
//! ```text
//! names ──▶ roman ──▶ arrows ──▶ autocorrect ──▶ ordinals
//! ```
//!
//! Name expansion and roman decoding run before autocorrection so expanded
//! names and decoded numbers are never mistaken for misspellings. Ordinal
//! tagging runs last so the markup it injects is never re-tokenised.
//!
//! Every stage is a pure `&str → String` transform behind the [`Stage`]
//! trait. [`Preprocessor`] holds the enabled stages in the fixed order above,
//! whatever order they were added in.

pub mod arrows;
pub mod autocorrect;
pub mod distance;
pub mod names;
pub mod ordinals;
pub mod roman;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies a preprocessing stage and fixes its position in the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StageKind {
    Names,
    Roman,
    Arrows,
    Autocorrect,
    Ordinals,
}

impl StageKind {
    /// All stages in execution order.
    pub const ORDER: [StageKind; 5] = [
        StageKind::Names,
        StageKind::Roman,
        StageKind::Arrows,
        StageKind::Autocorrect,
        StageKind::Ordinals,
    ];

    pub fn name(self) -> &'static str {
        match self {
            StageKind::Names => "names",
            StageKind::Roman => "roman",
            StageKind::Arrows => "arrows",
            StageKind::Autocorrect => "autocorrect",
            StageKind::Ordinals => "ordinals",
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One text-to-text rewrite.
///
/// Stages are shared between threads when sentences are preprocessed in
/// parallel, so they must be `Send + Sync` and must not mutate themselves.
pub trait Stage: Send + Sync {
    fn kind(&self) -> StageKind;

    fn apply(&self, text: &str) -> String;
}

/// Ordered composition of enabled stages.
#[derive(Default)]
pub struct Preprocessor {
    stages: Vec<Box<dyn Stage>>,
}

impl Preprocessor {
    /// A preprocessor with no stages; `process` returns its input.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a stage at its fixed position. A second stage of the same kind
    /// replaces the first.
    pub fn with_stage(mut self, stage: Box<dyn Stage>) -> Self {
        self.stages.retain(|s| s.kind() != stage.kind());
        self.stages.push(stage);
        self.stages.sort_by_key(|s| s.kind());
        self
    }

    /// Kinds of the enabled stages, in execution order.
    pub fn kinds(&self) -> Vec<StageKind> {
        self.stages.iter().map(|s| s.kind()).collect()
    }

    /// Run every enabled stage over one sentence.
    pub fn process(&self, sentence: &str) -> String {
        self.stages
            .iter()
            .fold(sentence.to_string(), |text, stage| stage.apply(&text))
    }
}

impl fmt::Debug for Preprocessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Preprocessor")
            .field("stages", &self.kinds())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Append(StageKind, &'static str);

    impl Stage for Append {
        fn kind(&self) -> StageKind {
            self.0
        }

        fn apply(&self, text: &str) -> String {
            format!("{text}{}", self.1)
        }
    }

    #[test]
    fn test_empty_is_identity() {
        assert_eq!(Preprocessor::new().process("Ahoj."), "Ahoj.");
    }

    #[test]
    fn test_stages_run_in_fixed_order() {
        let p = Preprocessor::new()
            .with_stage(Box::new(Append(StageKind::Ordinals, "5")))
            .with_stage(Box::new(Append(StageKind::Names, "1")))
            .with_stage(Box::new(Append(StageKind::Autocorrect, "4")))
            .with_stage(Box::new(Append(StageKind::Roman, "2")));
        assert_eq!(p.process(""), "1245");
        assert_eq!(
            p.kinds(),
            vec![
                StageKind::Names,
                StageKind::Roman,
                StageKind::Autocorrect,
                StageKind::Ordinals
            ]
        );
    }

    #[test]
    fn test_same_kind_replaces() {
        let p = Preprocessor::new()
            .with_stage(Box::new(Append(StageKind::Arrows, "a")))
            .with_stage(Box::new(Append(StageKind::Arrows, "b")));
        assert_eq!(p.process(""), "b");
    }
}
