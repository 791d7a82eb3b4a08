//! Markup filter: reduce the markdown event stream to speech markup blocks.
//!
//! ## Tag Handling
//!
//! The filter is a small state machine over pulldown-cmark [`Event`]s.
//! Paragraphs and headings open and close blocks; emphasis and strong
//! become `<emphasis>`. Every other structural element (links, code, lists,
//! images, line breaks) contributes its text and a single space, so that
//! neighbouring words never fuse.
//!
//! Raw HTML passed through by the parser is filtered against the same
//! allow-list: `em`, `strong`, `b` and `i` become `<emphasis>`, any other tag
//! or comment becomes a space, and character references in the text between
//! tags are resolved against the HTML5 entity table.
//!
//! Text arrives with references already decoded. `&` and `<` are escaped on
//! output; `>` is legal in markup text and stays literal so the arrow stage
//! still sees `->`.
//!
//! ## Blocks
//!
//! Text found outside any paragraph or heading (tight list items, raw HTML
//! blocks) becomes a paragraph of its own. Blocks with no text are dropped.
//!
//! ## Inline Mapping
//!
//! Quoted spans and bracketed spans are wrapped in `<emphasis>` as well.

use once_cell::sync::Lazy;
use pulldown_cmark::{Event, Tag, TagEnd};
use quick_xml::escape::{resolve_html5_entity, unescape_with};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Raw HTML tags mapped to `<emphasis>`.
const EMPHASIS_TAGS: &[&str] = &["em", "strong", "b", "i"];

/// Default duration of the pause inserted before a heading.
pub const DEFAULT_HEADING_PAUSE: &str = "1s";

const EMPHASIS_OPEN: &str = "<emphasis>";
const EMPHASIS_CLOSE: &str = "</emphasis>";

/// Kind of a top-level block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Heading,
    Paragraph,
}

/// A heading or paragraph with inline speech markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub kind: BlockKind,
    pub text: String,
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;")
}

// ── Block builder ────────────────────────────────────────────────────────────

#[derive(Default)]
struct BlockBuilder {
    blocks: Vec<Block>,
    /// Kind of the open block; `None` while collecting loose text.
    open: Option<BlockKind>,
    buf: String,
    dropped: usize,
}

impl BlockBuilder {
    fn flush(&mut self) {
        let kind = self.open.take().unwrap_or(BlockKind::Paragraph);
        let text = map_inline(&self.buf);
        self.buf.clear();
        let text = text.trim();
        if !text.is_empty() {
            self.blocks.push(Block {
                kind,
                text: text.to_string(),
            });
        }
    }

    fn open(&mut self, kind: BlockKind) {
        self.flush();
        self.open = Some(kind);
    }

    fn space(&mut self) {
        self.dropped += 1;
        self.buf.push(' ');
    }

    fn push_event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(Tag::Paragraph) => self.open(BlockKind::Paragraph),
            Event::Start(Tag::Heading { .. }) => self.open(BlockKind::Heading),
            Event::End(TagEnd::Paragraph) | Event::End(TagEnd::Heading(_)) => self.flush(),

            Event::Start(Tag::Emphasis) | Event::Start(Tag::Strong) => {
                self.buf.push_str(EMPHASIS_OPEN)
            }
            Event::End(TagEnd::Emphasis) | Event::End(TagEnd::Strong) => {
                self.buf.push_str(EMPHASIS_CLOSE)
            }

            Event::Text(text) => self.buf.push_str(&escape_text(&text)),
            Event::Code(code) => {
                self.space();
                self.buf.push_str(&escape_text(&code));
                self.buf.push(' ');
            }
            Event::Html(raw) | Event::InlineHtml(raw) => self.push_raw_html(&raw),
            Event::SoftBreak | Event::HardBreak => self.buf.push(' '),
            // lists, links, code blocks, rules, footnotes...
            _ => self.space(),
        }
    }

    fn push_raw_html(&mut self, raw: &str) {
        let mut last = 0;
        for caps in RE_RAW_TAG.captures_iter(raw) {
            let Some(whole) = caps.get(0) else { continue };
            self.push_raw_text(&raw[last..whole.start()]);
            last = whole.end();

            let name = caps.get(2).map(|n| n.as_str().to_ascii_lowercase());
            let self_closing = whole.as_str().ends_with("/>");
            match name {
                Some(name) if EMPHASIS_TAGS.contains(&name.as_str()) && !self_closing => {
                    let closing = caps.get(1).is_some_and(|c| !c.as_str().is_empty());
                    self.buf
                        .push_str(if closing { EMPHASIS_CLOSE } else { EMPHASIS_OPEN });
                }
                _ => self.space(),
            }
        }
        self.push_raw_text(&raw[last..]);
    }

    /// Text between raw tags still carries its character references.
    fn push_raw_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        match unescape_with(text, resolve_html5_entity) {
            Ok(decoded) => self.buf.push_str(&escape_text(&decoded)),
            Err(e) => {
                debug!("leaving undecodable raw HTML text as-is: {e}");
                self.buf.push_str(&escape_text(text));
            }
        }
    }

    fn finish(mut self) -> Vec<Block> {
        self.flush();
        if self.dropped > 0 {
            debug!("replaced {} elements outside the allow-list by spaces", self.dropped);
        }
        self.blocks
    }
}

static RE_RAW_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<!--.*?-->|<(/?)([a-zA-Z][a-zA-Z0-9]*)(?:\s[^<>]*)?/?>|<[!?/][^<>]*>")
        .unwrap()
});

/// Full filter: markdown events → blocks of inline speech markup.
pub fn to_blocks<'a>(events: impl IntoIterator<Item = Event<'a>>) -> Vec<Block> {
    let mut builder = BlockBuilder::default();
    for event in events {
        builder.push_event(event);
    }
    builder.finish()
}

// ── Inline mapping ───────────────────────────────────────────────────────────

static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

static RE_QUOTES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[„"“]([^„"“”<>\n]+)[“"”]"#).unwrap());

static RE_BRACKETS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\[({]([^\[\](){}<>\n]+)[\])}]").unwrap());

/// Wrap quoted and bracketed spans in `<emphasis>` and collapse whitespace.
pub fn map_inline(text: &str) -> String {
    let s = RE_WHITESPACE.replace_all(text, " ");
    let s = RE_QUOTES.replace_all(&s, |c: &Captures<'_>| {
        format!("{EMPHASIS_OPEN}{}{EMPHASIS_CLOSE}", &c[1])
    });
    let s = RE_BRACKETS.replace_all(&s, |c: &Captures<'_>| {
        format!("{EMPHASIS_OPEN}{}{EMPHASIS_CLOSE}", &c[1])
    });
    s.into_owned()
}

/// Wrap heading text in a pause and strong emphasis.
pub fn heading_markup(text: &str, pause: &str) -> String {
    format!(r#"<break time="{pause}"/><emphasis level="strong">{text}</emphasis>"#)
}
