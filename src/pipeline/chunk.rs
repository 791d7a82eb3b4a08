//! Paragraph chunking under the synthesis character budget.
//!
//! Sentences are accumulated greedily. A chunk is closed when the next
//! sentence would push its summed sentence length past the budget; markup
//! overhead (`<p>`, `<s>`) is not counted, which is what the gap between the
//! budget and the hard limit is for. A sentence longer than the budget is
//! never split and becomes a chunk of its own.
//!
//! Lengths are counted in characters, not bytes.

/// Default soft budget for the summed sentence length of one chunk.
pub const DEFAULT_CHUNK_BUDGET: usize = 4000;

/// Default hard ceiling for one output fragment.
pub const DEFAULT_HARD_LIMIT: usize = 5000;

/// Length of `text` in characters.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Group `sentences` into chunks whose summed length stays within `budget`.
///
/// Order is preserved and no chunk is empty.
pub fn chunk_sentences(sentences: Vec<String>, budget: usize) -> Vec<Vec<String>> {
    let mut chunks = Vec::new();
    let mut current: Vec<String> = Vec::new();
    let mut current_len = 0usize;

    for sentence in sentences {
        let len = char_len(&sentence);
        if !current.is_empty() && current_len + len > budget {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        current_len += len;
        current.push(sentence);
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Serialise one chunk: `<p><s>…</s><s>…</s></p>`.
pub fn render_chunk(sentences: &[String]) -> String {
    let mut out = String::from("<p>");
    for sentence in sentences {
        out.push_str("<s>");
        out.push_str(sentence);
        out.push_str("</s>");
    }
    out.push_str("</p>");
    out
}
