//! Structural parse: canonical markdown → pulldown-cmark events.
//!
//! Only CommonMark core is enabled. Tables, footnotes and task lists carry no
//! prosody and would only add elements for the filter to throw away.

use pulldown_cmark::{Options, Parser};
use tracing::debug;

/// Parse canonical markdown into an event stream for [`super::filter`].
pub fn parse_markdown(markdown: &str) -> Parser<'_> {
    debug!("parsing {} markdown bytes", markdown.len());
    Parser::new_ext(markdown, Options::empty())
}
