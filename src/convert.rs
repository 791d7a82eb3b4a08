//! Conversion entry points.
//!
//! [`Converter`] resolves the collaborators once (dictionary, name lookup,
//! segmenter) and can then convert any number of documents. The free
//! functions [`convert`], [`convert_file`] and [`convert_to_file`] build a
//! throwaway converter per call.
//!
//! The whole pipeline is synchronous. [`crate::preprocess::names::WikipediaLookup`]
//! uses a blocking HTTP client, so async callers should build and use the
//! converter inside `spawn_blocking`.

use crate::config::ConversionConfig;
use crate::dictionary::{load_dictionary, SpellingDictionary};
use crate::error::Md2SsmlError;
use crate::output::{ConversionOutput, ConversionStats, ParagraphResult};
use crate::pipeline::chunk::{char_len, chunk_sentences, render_chunk};
use crate::pipeline::filter::{heading_markup, to_blocks, Block, BlockKind};
use crate::pipeline::segment::{RuleSegmenter, SentenceSegmenter};
use crate::pipeline::{canonicalize, parse};
use crate::preprocess::arrows::ArrowStage;
use crate::preprocess::autocorrect::Autocorrector;
use crate::preprocess::names::{NameExpander, NameLookup, NoLookup, WikipediaLookup};
use crate::preprocess::ordinals::OrdinalStage;
use crate::preprocess::roman::RomanStage;
use crate::preprocess::{Preprocessor, Stage, StageKind};
use rayon::prelude::*;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Environment variable consulted for a dictionary path when none is configured.
pub const DICTIONARY_ENV: &str = "MD2SSML_DICTIONARY";

/// How a file passed to [`Converter::convert_file`] is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Markdown,
    /// Already SSML, one fragment per line; only the hard limit is checked.
    Ssml,
}

impl InputKind {
    /// Pick the input kind from the file extension.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("ssml") => InputKind::Ssml,
            Some("md" | "markdown" | "txt") => InputKind::Markdown,
            other => {
                warn!(
                    "Unrecognised extension {:?} for '{}', treating it as markdown",
                    other.unwrap_or(""),
                    path.display()
                );
                InputKind::Markdown
            }
        }
    }
}

/// A configured conversion pipeline.
pub struct Converter {
    config: ConversionConfig,
    preprocessor: Preprocessor,
    segmenter: Arc<dyn SentenceSegmenter>,
}

impl std::fmt::Debug for Converter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Converter")
            .field("config", &self.config)
            .field("preprocessor", &self.preprocessor)
            .finish()
    }
}

impl Converter {
    /// Resolve collaborators and assemble the preprocessing chain.
    ///
    /// # Errors
    /// - [`Md2SsmlError::DictionaryNotConfigured`] when autocorrection is
    ///   enabled and no dictionary source is set
    /// - [`Md2SsmlError::DictionaryUnavailable`] when the dictionary file
    ///   cannot be loaded
    pub fn new(config: ConversionConfig) -> Result<Self, Md2SsmlError> {
        let mut preprocessor = Preprocessor::new();
        for kind in config.stages.enabled() {
            let stage: Box<dyn Stage> = match kind {
                StageKind::Names => Box::new(NameExpander::new(resolve_name_lookup(&config))),
                StageKind::Roman => Box::new(RomanStage),
                StageKind::Arrows => Box::new(ArrowStage::new(config.arrow_word.clone())),
                StageKind::Autocorrect => {
                    let dictionary = resolve_dictionary(&config)?;
                    Box::new(
                        Autocorrector::new(dictionary, Arc::clone(&config.cost_model))
                            .with_threshold(config.acceptance_threshold),
                    )
                }
                StageKind::Ordinals => Box::new(OrdinalStage),
            };
            preprocessor = preprocessor.with_stage(stage);
        }

        let segmenter = config
            .segmenter
            .clone()
            .unwrap_or_else(|| Arc::new(RuleSegmenter));

        debug!("Preprocessing stages: {:?}", preprocessor.kinds());
        Ok(Self {
            config,
            preprocessor,
            segmenter,
        })
    }

    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }

    pub fn preprocessor(&self) -> &Preprocessor {
        &self.preprocessor
    }

    /// Run the enabled preprocessing stages over one sentence.
    pub fn preprocess_sentence(&self, sentence: &str) -> String {
        self.preprocessor.process(sentence)
    }

    /// Convert a markdown document to SSML.
    ///
    /// # Errors
    /// Returns [`Md2SsmlError::ChunkTooLong`] or [`Md2SsmlError::LineTooLong`]
    /// when any output line exceeds `hard_limit`. Nothing is returned in that
    /// case; there is no partial output.
    pub fn convert(&self, markdown: &str) -> Result<ConversionOutput, Md2SsmlError> {
        let start = Instant::now();
        info!("Starting conversion: {} bytes of markdown", markdown.len());

        // ── Step 1: Canonicalise ─────────────────────────────────────────
        let canonical = canonicalize::canonicalize(markdown);

        // ── Step 2: Structural parse ─────────────────────────────────────
        let events = parse::parse_markdown(&canonical);

        // ── Step 3: Filter markup ────────────────────────────────────────
        let blocks = to_blocks(events);
        let total = blocks.len();
        debug!("Filtered document into {} blocks", total);
        if let Some(ref cb) = self.config.progress_callback {
            cb.on_conversion_start(total);
        }

        // ── Step 4: Per paragraph: segment, preprocess, chunk ────────────
        let mut paragraphs = Vec::with_capacity(total);
        let mut line = 0usize;
        for (i, block) in blocks.iter().enumerate() {
            let index = i + 1;
            if let Some(ref cb) = self.config.progress_callback {
                cb.on_paragraph_start(index, total);
            }
            let result = self.convert_block(index, block, &mut line);
            match result {
                Ok(paragraph) => {
                    if let Some(ref cb) = self.config.progress_callback {
                        cb.on_paragraph_complete(index, total, paragraph.fragments.len());
                    }
                    paragraphs.push(paragraph);
                }
                Err(e) => {
                    if let Some(ref cb) = self.config.progress_callback {
                        cb.on_paragraph_error(index, total, &e.to_string());
                    }
                    return Err(e);
                }
            }
        }

        // ── Step 5: Assemble ─────────────────────────────────────────────
        let output = assemble(paragraphs, start);
        info!(
            "Conversion complete: {} paragraphs, {} sentences, {} chunks, {}ms",
            output.stats.paragraphs,
            output.stats.sentences,
            output.stats.chunks,
            output.stats.duration_ms
        );
        if let Some(ref cb) = self.config.progress_callback {
            cb.on_conversion_complete(total, line);
        }
        Ok(output)
    }

    fn preprocess_all(&self, sentences: &[String]) -> Vec<String> {
        if self.config.parallel {
            sentences
                .par_iter()
                .map(|s| self.preprocessor.process(s))
                .collect()
        } else {
            sentences
                .iter()
                .map(|s| self.preprocessor.process(s))
                .collect()
        }
    }

    fn convert_block(
        &self,
        index: usize,
        block: &Block,
        line: &mut usize,
    ) -> Result<ParagraphResult, Md2SsmlError> {
        let limit = self.config.hard_limit;
        match block.kind {
            BlockKind::Heading => {
                let text = self.preprocessor.process(&block.text);
                let fragment = heading_markup(&text, &self.config.heading_pause);
                *line += 1;
                let chars = char_len(&fragment);
                if chars > limit {
                    return Err(Md2SsmlError::LineTooLong {
                        line: *line,
                        chars,
                        limit,
                    });
                }
                Ok(ParagraphResult {
                    index,
                    kind: BlockKind::Heading,
                    sentences: vec![text],
                    fragments: vec![fragment],
                })
            }
            BlockKind::Paragraph => {
                let raw: Vec<String> = self
                    .segmenter
                    .segment(&block.text)
                    .into_iter()
                    .filter(|s| !s.trim().is_empty())
                    .collect();
                let sentences = self.preprocess_all(&raw);
                let chunks = chunk_sentences(sentences.clone(), self.config.chunk_budget);
                debug!(
                    "Paragraph {}: {} sentences in {} chunks",
                    index,
                    sentences.len(),
                    chunks.len()
                );

                let mut fragments = Vec::with_capacity(chunks.len());
                for (c, chunk) in chunks.iter().enumerate() {
                    let fragment = render_chunk(chunk);
                    *line += 1;
                    let chars = char_len(&fragment);
                    if chars > limit {
                        return Err(Md2SsmlError::ChunkTooLong {
                            paragraph: index,
                            chunk: c + 1,
                            chars,
                            limit,
                        });
                    }
                    fragments.push(fragment);
                }
                Ok(ParagraphResult {
                    index,
                    kind: BlockKind::Paragraph,
                    sentences,
                    fragments,
                })
            }
        }
    }

    /// Pass pre-built SSML through, one fragment per non-empty line.
    ///
    /// # Errors
    /// Returns [`Md2SsmlError::LineTooLong`] for the first line over
    /// `hard_limit`.
    pub fn passthrough_ssml(&self, ssml: &str) -> Result<ConversionOutput, Md2SsmlError> {
        let start = Instant::now();
        let limit = self.config.hard_limit;
        let mut paragraphs = Vec::new();
        for (i, text) in ssml.lines().enumerate() {
            let text = text.trim();
            if text.is_empty() {
                continue;
            }
            let chars = char_len(text);
            if chars > limit {
                return Err(Md2SsmlError::LineTooLong {
                    line: i + 1,
                    chars,
                    limit,
                });
            }
            paragraphs.push(ParagraphResult {
                index: paragraphs.len() + 1,
                kind: BlockKind::Paragraph,
                sentences: Vec::new(),
                fragments: vec![text.to_string()],
            });
        }
        info!("Passed through {} SSML lines", paragraphs.len());
        Ok(assemble(paragraphs, start))
    }

    /// Convert a file. `.ssml` files are passed through, anything else is
    /// treated as markdown.
    pub fn convert_file(&self, path: impl AsRef<Path>) -> Result<ConversionOutput, Md2SsmlError> {
        let path = path.as_ref();
        let text = read_input(path)?;
        match InputKind::from_path(path) {
            InputKind::Markdown => self.convert(&text),
            InputKind::Ssml => self.passthrough_ssml(&text),
        }
    }

    /// Convert a file and write the SSML to `output_path`.
    ///
    /// Uses an atomic write (temp file in the target directory + persist),
    /// so a failed run never leaves a partial output file behind.
    pub fn convert_to_file(
        &self,
        input: impl AsRef<Path>,
        output_path: impl AsRef<Path>,
    ) -> Result<ConversionOutput, Md2SsmlError> {
        let output = self.convert_file(input)?;
        write_atomic(output_path.as_ref(), &output.ssml)?;
        Ok(output)
    }
}

// ── Free functions ───────────────────────────────────────────────────────

/// Convert a markdown string to SSML.
///
/// # Example
/// ```rust
/// use md2ssml::{convert, ConversionConfig};
///
/// let config = ConversionConfig::builder()
///     .names(false)
///     .autocorrect(false)
///     .build()
///     .unwrap();
/// let output = convert("# Title\nThis is sentence one. IV is four.", &config).unwrap();
/// assert!(output.ssml.contains("<s>4 is four.</s>"));
/// ```
pub fn convert(markdown: &str, config: &ConversionConfig) -> Result<ConversionOutput, Md2SsmlError> {
    Converter::new(config.clone())?.convert(markdown)
}

/// Convert a markdown (or `.ssml`) file.
pub fn convert_file(
    path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Md2SsmlError> {
    Converter::new(config.clone())?.convert_file(path)
}

/// Convert a file and write the SSML atomically to `output_path`.
pub fn convert_to_file(
    input: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionStats, Md2SsmlError> {
    Converter::new(config.clone())?
        .convert_to_file(input, output_path)
        .map(|output| output.stats)
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Resolve the spelling dictionary, from most-specific to least-specific.
///
/// 1. **Pre-built dictionary** (`config.dictionary`), used as-is.
/// 2. **Configured path** (`config.dictionary_path`): hunspell for `.dic`,
///    a word list otherwise.
/// 3. **Environment** (`MD2SSML_DICTIONARY`), loaded the same way.
/// 4. Nothing configured: fatal, since autocorrection cannot run without one.
fn resolve_dictionary(
    config: &ConversionConfig,
) -> Result<Arc<dyn SpellingDictionary>, Md2SsmlError> {
    if let Some(ref dictionary) = config.dictionary {
        return Ok(Arc::clone(dictionary));
    }

    if let Some(ref path) = config.dictionary_path {
        return load_dictionary(path);
    }

    if let Ok(path) = std::env::var(DICTIONARY_ENV) {
        if !path.is_empty() {
            return load_dictionary(Path::new(&path));
        }
    }

    Err(Md2SsmlError::DictionaryNotConfigured)
}

/// Resolve the name lookup: the configured one, else Wikipedia in
/// `config.language`. A client that cannot be built degrades to no lookup.
fn resolve_name_lookup(config: &ConversionConfig) -> Arc<dyn NameLookup> {
    if let Some(ref lookup) = config.name_lookup {
        return Arc::clone(lookup);
    }
    match WikipediaLookup::new(&config.language) {
        Ok(lookup) => {
            debug!("Name lookup via {}", lookup.endpoint());
            Arc::new(lookup)
        }
        Err(e) => {
            warn!("Name lookup disabled: {e}");
            Arc::new(NoLookup)
        }
    }
}

fn read_input(path: &Path) -> Result<String, Md2SsmlError> {
    if !path.exists() {
        return Err(Md2SsmlError::InputNotFound {
            path: path.to_path_buf(),
        });
    }
    std::fs::read_to_string(path).map_err(|e| Md2SsmlError::ReadFailed {
        path: path.to_path_buf(),
        source: e,
    })
}

fn write_atomic(path: &Path, contents: &str) -> Result<(), Md2SsmlError> {
    let write_err = |source: std::io::Error| Md2SsmlError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent).map_err(write_err)?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent).map_err(write_err)?;
    tmp.write_all(contents.as_bytes()).map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    debug!("Wrote {} bytes to '{}'", contents.len(), path.display());
    Ok(())
}

fn assemble(paragraphs: Vec<ParagraphResult>, start: Instant) -> ConversionOutput {
    let mut stats = ConversionStats {
        paragraphs: paragraphs.len(),
        ..ConversionStats::default()
    };
    let mut lines: Vec<&str> = Vec::new();
    for p in &paragraphs {
        match p.kind {
            BlockKind::Heading => stats.headings += 1,
            BlockKind::Paragraph => stats.chunks += p.fragments.len(),
        }
        stats.sentences += p.sentences.len();
        for f in &p.fragments {
            stats.longest_fragment_chars = stats.longest_fragment_chars.max(char_len(f));
            lines.push(f);
        }
    }
    let mut ssml = lines.join("\n");
    if !ssml.is_empty() {
        ssml.push('\n');
    }
    stats.duration_ms = start.elapsed().as_millis() as u64;
    ConversionOutput {
        ssml,
        paragraphs,
        stats,
    }
}
