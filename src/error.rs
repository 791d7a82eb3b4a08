//! Error types for the md2ssml library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`Md2SsmlError`] is **fatal**: the conversion cannot proceed at all
//!   (spelling dictionary missing, a fragment over the synthesis ceiling,
//!   unreadable input). Returned as `Err(Md2SsmlError)` from the top-level
//!   `convert*` functions. No partial output is produced.
//!
//! * [`LookupError`] is **non-fatal**: a single collaborator call failed
//!   (name search timed out, dictionary could not produce suggestions for one
//!   token). The stage that made the call logs it and passes its text through
//!   unchanged, so one bad lookup never costs the whole document.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the md2ssml library.
#[derive(Debug, Error)]
pub enum Md2SsmlError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Input file not found: '{path}'\nCheck the path exists and is readable.")]
    InputNotFound { path: PathBuf },

    /// The input file exists but could not be read as UTF-8 text.
    #[error("Failed to read input file '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Resource errors ───────────────────────────────────────────────────
    /// Autocorrection is enabled but no dictionary was supplied.
    #[error(
        "Autocorrection is enabled but no spelling dictionary is configured.\n\
Pass --dictionary <PATH>, set MD2SSML_DICTIONARY, or disable it with --no-autocorrect."
    )]
    DictionaryNotConfigured,

    /// The spelling dictionary could not be loaded.
    #[error("Spelling dictionary '{source_desc}' is unavailable: {reason}")]
    DictionaryUnavailable { source_desc: String, reason: String },

    // ── Hard limits ───────────────────────────────────────────────────────
    /// A serialised `<p>` fragment is longer than the synthesis ceiling.
    ///
    /// Raised instead of truncating: a single sentence longer than the
    /// ceiling cannot be synthesised and must be fixed in the source.
    #[error(
        "Paragraph {paragraph}, chunk {chunk}: fragment is {chars} characters, \
over the {limit}-character synthesis limit"
    )]
    ChunkTooLong {
        paragraph: usize,
        chunk: usize,
        chars: usize,
        limit: usize,
    },

    /// Any other output line (heading, pre-built SSML input line) is longer
    /// than the synthesis ceiling.
    #[error("Line {line}: {chars} characters, over the {limit}-character synthesis limit")]
    LineTooLong {
        line: usize,
        chars: usize,
        limit: usize,
    },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output SSML file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// A non-fatal error from an external collaborator (name search, dictionary
/// suggestions).
#[derive(Debug, Clone, Error)]
pub enum LookupError {
    /// The HTTP request failed or returned a non-success status.
    #[error("lookup request failed: {detail}")]
    Http { detail: String },

    /// The response could not be decoded.
    #[error("lookup response could not be decoded: {detail}")]
    Decode { detail: String },

    /// The collaborator is not usable right now.
    #[error("lookup unavailable: {detail}")]
    Unavailable { detail: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_too_long_display() {
        let e = Md2SsmlError::ChunkTooLong {
            paragraph: 2,
            chunk: 1,
            chars: 5210,
            limit: 5000,
        };
        let msg = e.to_string();
        assert!(msg.contains("5210"), "got: {msg}");
        assert!(msg.contains("5000"), "got: {msg}");
        assert!(msg.contains("Paragraph 2"), "got: {msg}");
    }

    #[test]
    fn dictionary_not_configured_has_hint() {
        let msg = Md2SsmlError::DictionaryNotConfigured.to_string();
        assert!(msg.contains("--dictionary"));
        assert!(msg.contains("MD2SSML_DICTIONARY"));
    }

    #[test]
    fn dictionary_unavailable_display() {
        let e = Md2SsmlError::DictionaryUnavailable {
            source_desc: "/usr/share/hunspell/cs_CZ.dic".into(),
            reason: "No such file or directory".into(),
        };
        assert!(e.to_string().contains("cs_CZ.dic"));
    }

    #[test]
    fn lookup_error_display() {
        let e = LookupError::Http {
            detail: "timed out".into(),
        };
        assert!(e.to_string().contains("timed out"));
    }
}
