//! Progress-callback trait for per-paragraph conversion events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! events as the pipeline works through the document. Headings count as
//! paragraphs: each is one unit of work and produces one fragment.
//!
//! # Example
//!
//! ```rust
//! use md2ssml::{ConversionConfig, ConversionProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     fragments: AtomicUsize,
//! }
//!
//! impl ConversionProgressCallback for CountingCallback {
//!     fn on_paragraph_complete(&self, index: usize, total: usize, fragments: usize) {
//!         self.fragments.fetch_add(fragments, Ordering::SeqCst);
//!         eprintln!("paragraph {}/{} done", index, total);
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { fragments: AtomicUsize::new(0) });
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(counter as Arc<dyn ConversionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the conversion pipeline as it processes each paragraph.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Paragraphs are reported in document order; with
/// `parallel = true` only the sentences inside a paragraph run concurrently,
/// so events never interleave.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once after filtering, before the first paragraph.
    ///
    /// # Arguments
    /// * `total_paragraphs` : headings and paragraphs that will be processed
    fn on_conversion_start(&self, total_paragraphs: usize) {
        let _ = total_paragraphs;
    }

    /// Called before a paragraph is segmented.
    ///
    /// # Arguments
    /// * `index` : 1-indexed paragraph number
    /// * `total` : total paragraphs in the document
    fn on_paragraph_start(&self, index: usize, total: usize) {
        let _ = (index, total);
    }

    /// Called when a paragraph has been preprocessed and chunked.
    ///
    /// # Arguments
    /// * `index`     : 1-indexed paragraph number
    /// * `total`     : total paragraphs
    /// * `fragments` : output lines the paragraph produced
    fn on_paragraph_complete(&self, index: usize, total: usize, fragments: usize) {
        let _ = (index, total, fragments);
    }

    /// Called when a paragraph violates the hard limit. The conversion
    /// aborts right after.
    fn on_paragraph_error(&self, index: usize, total: usize, error: &str) {
        let _ = (index, total, error);
    }

    /// Called once after every paragraph succeeded.
    ///
    /// # Arguments
    /// * `total_paragraphs` : paragraphs processed
    /// * `total_fragments`  : output lines produced
    fn on_conversion_complete(&self, total_paragraphs: usize, total_fragments: usize) {
        let _ = (total_paragraphs, total_fragments);
    }
}

/// A no-op implementation for callers that don't need progress events.
///
/// This is the default when no callback is configured.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;
