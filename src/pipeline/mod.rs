//! Pipeline stages for markdown-to-SSML conversion.
//!
//! Each submodule implements exactly one transformation step and is tested
//! on its own. The sentence-level rewriting lives in [`crate::preprocess`].
//!
//! ## Data Flow
//!
//! ```text
//! markdown ──▶ canonicalize ──▶ parse ──▶ filter ──▶ segment ──▶ preprocess ──▶ chunk
//!              (regex rules)   (cmark)   (tags)     (sentences)  (stages)       (<p><s>)
//! ```
//!
//! 1. [`canonicalize`] normalises wrapping, hyphenation, numbering and
//!    heading sections so the markdown parser sees clean paragraphs
//! 2. [`parse`] turns markdown into pulldown-cmark events
//! 3. [`filter`] reduces the events to headings and paragraphs carrying only
//!    `<emphasis>` markup
//! 4. [`segment`] splits each paragraph into sentences
//! 5. [`chunk`] groups preprocessed sentences under the character budget

pub mod canonicalize;
pub mod chunk;
pub mod filter;
pub mod parse;
pub mod segment;
