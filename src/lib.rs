//! # md2ssml
//!
//! Convert loosely structured markdown into speech-synthesis markup (SSML)
//! that a speech engine pronounces correctly.
//!
//! Documents extracted from PDFs, OCR or office converters are hard-wrapped,
//! hyphenated, and full of things a synthesiser reads badly: roman numerals,
//! ordinals, ASCII arrows, abbreviated names, OCR typos. This crate
//! normalises the markdown, keeps only the structure that matters for
//! prosody, and rewrites every sentence before packing the result into
//! request-sized `<p>` chunks.
//!
//! ## Pipeline Overview
//!
//! ```text
//! markdown
//!  │
//!  ├─ 1. Canonicalise  regex rules (soft breaks, hyphens, lists, sections)
//!  ├─ 2. Parse         pulldown-cmark events
//!  ├─ 3. Filter        keep em/strong/b/i/p + headings → <emphasis>, <break>
//!  ├─ 4. Segment       paragraph → sentences
//!  ├─ 5. Preprocess    names → roman → arrows → autocorrect → ordinals
//!  └─ 6. Chunk         ≤ 4000 chars of sentences per <p><s>…</s></p> line
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use md2ssml::{convert, ConversionConfig, StageToggles};
//!
//! // Offline: no name lookup, no spelling dictionary.
//! let config = ConversionConfig::builder()
//!     .stages(StageToggles::offline())
//!     .build()
//!     .unwrap();
//! let output = convert("# Title\nThis is sentence one. IV is four.", &config).unwrap();
//! assert_eq!(
//!     output.ssml,
//!     "<break time=\"1s\"/><emphasis level=\"strong\">Title</emphasis>\n\
//!      <p><s>This is sentence one.</s><s>4 is four.</s></p>\n"
//! );
//! ```
//!
//! ## Collaborators
//!
//! | Trait | Default | Used by |
//! |-------|---------|---------|
//! | [`SpellingDictionary`] | [`HunspellDictionary`] (`.dic` + `.aff`) or [`WordListDictionary`] from `--dictionary` / `MD2SSML_DICTIONARY` | autocorrect |
//! | [`NameLookup`] | [`WikipediaLookup`] for `language` | name expansion |
//! | [`SentenceSegmenter`] | [`RuleSegmenter`] | every paragraph |
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `md2ssml` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! md2ssml = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod dictionary;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod preprocess;
pub mod progress;
pub mod roman;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder, StageToggles};
pub use convert::{convert, convert_file, convert_to_file, Converter, InputKind};
pub use dictionary::{HunspellDictionary, SpellingDictionary, WordListDictionary};
pub use error::{LookupError, Md2SsmlError};
pub use output::{ConversionOutput, ConversionStats, ParagraphResult};
pub use pipeline::filter::BlockKind;
pub use pipeline::segment::{RuleSegmenter, SentenceSegmenter};
pub use preprocess::distance::CostModel;
pub use preprocess::names::{NameLookup, NoLookup, WikipediaLookup};
pub use preprocess::{Preprocessor, Stage, StageKind};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
