//! Configuration types for markdown-to-SSML conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. Collaborators (dictionary, name
//! lookup, sentence segmenter) can be injected pre-built; anything left unset
//! is resolved by [`crate::convert::Converter::new`].

use crate::dictionary::SpellingDictionary;
use crate::error::Md2SsmlError;
use crate::pipeline::chunk::{DEFAULT_CHUNK_BUDGET, DEFAULT_HARD_LIMIT};
use crate::pipeline::filter::DEFAULT_HEADING_PAUSE;
use crate::pipeline::segment::SentenceSegmenter;
use crate::preprocess::arrows::DEFAULT_ARROW_WORD;
use crate::preprocess::autocorrect::DEFAULT_ACCEPTANCE_THRESHOLD;
use crate::preprocess::distance::CostModel;
use crate::preprocess::names::NameLookup;
use crate::preprocess::StageKind;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Configuration for a markdown-to-SSML conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use md2ssml::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .chunk_budget(3000)
///     .autocorrect(false)
///     .names(false)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Which sentence preprocessing stages run. Default: all.
    pub stages: StageToggles,

    /// Soft budget for the summed sentence length of one `<p>` chunk, in
    /// characters. Default: 4000.
    ///
    /// Markup overhead is not counted against it; that is what the distance
    /// to `hard_limit` covers.
    pub chunk_budget: usize,

    /// Hard ceiling for any single output line, in characters. Default: 5000.
    ///
    /// A line over this limit aborts the conversion instead of being
    /// truncated.
    pub hard_limit: usize,

    /// Language code used for the name lookup service. Default: "cs".
    pub language: String,

    /// Spoken replacement for `->` style arrows. Default: "šipka".
    pub arrow_word: String,

    /// Maximum weighted edit distance of an accepted correction. Default: 2.0.
    pub acceptance_threshold: f64,

    /// Duration attribute of the pause inserted before headings. Default: "1s".
    pub heading_pause: String,

    /// Preprocess the sentences of a paragraph on the rayon pool. Default: false.
    ///
    /// Output order is identical either way.
    pub parallel: bool,

    /// Pre-built spelling dictionary. Takes precedence over `dictionary_path`.
    pub dictionary: Option<Arc<dyn SpellingDictionary>>,

    /// Word list, or a hunspell `.dic` with its `.aff` beside it.
    /// If None along with `dictionary`, `MD2SSML_DICTIONARY` is consulted.
    pub dictionary_path: Option<PathBuf>,

    /// Pre-built name lookup. If None, Wikipedia in `language` is searched.
    pub name_lookup: Option<Arc<dyn NameLookup>>,

    /// Pre-built sentence segmenter. If None, [`crate::RuleSegmenter`] is used.
    pub segmenter: Option<Arc<dyn SentenceSegmenter>>,

    /// Edit-distance costs for scoring corrections. Default: [`CostModel::ocr`].
    pub cost_model: Arc<CostModel>,

    /// Optional per-paragraph progress callback.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            stages: StageToggles::default(),
            chunk_budget: DEFAULT_CHUNK_BUDGET,
            hard_limit: DEFAULT_HARD_LIMIT,
            language: "cs".to_string(),
            arrow_word: DEFAULT_ARROW_WORD.to_string(),
            acceptance_threshold: DEFAULT_ACCEPTANCE_THRESHOLD,
            heading_pause: DEFAULT_HEADING_PAUSE.to_string(),
            parallel: false,
            dictionary: None,
            dictionary_path: None,
            name_lookup: None,
            segmenter: None,
            cost_model: Arc::new(CostModel::ocr()),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("stages", &self.stages)
            .field("chunk_budget", &self.chunk_budget)
            .field("hard_limit", &self.hard_limit)
            .field("language", &self.language)
            .field("arrow_word", &self.arrow_word)
            .field("acceptance_threshold", &self.acceptance_threshold)
            .field("heading_pause", &self.heading_pause)
            .field("parallel", &self.parallel)
            .field(
                "dictionary",
                &self.dictionary.as_ref().map(|_| "<dyn SpellingDictionary>"),
            )
            .field("dictionary_path", &self.dictionary_path)
            .field("name_lookup", &self.name_lookup.as_ref().map(|_| "<dyn NameLookup>"))
            .field(
                "segmenter",
                &self.segmenter.as_ref().map(|_| "<dyn SentenceSegmenter>"),
            )
            .field("progress_callback", &self.progress_callback.is_some())
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn stages(mut self, stages: StageToggles) -> Self {
        self.config.stages = stages;
        self
    }

    pub fn names(mut self, enabled: bool) -> Self {
        self.config.stages.set(StageKind::Names, enabled);
        self
    }

    pub fn roman(mut self, enabled: bool) -> Self {
        self.config.stages.set(StageKind::Roman, enabled);
        self
    }

    pub fn arrows(mut self, enabled: bool) -> Self {
        self.config.stages.set(StageKind::Arrows, enabled);
        self
    }

    pub fn autocorrect(mut self, enabled: bool) -> Self {
        self.config.stages.set(StageKind::Autocorrect, enabled);
        self
    }

    pub fn ordinals(mut self, enabled: bool) -> Self {
        self.config.stages.set(StageKind::Ordinals, enabled);
        self
    }

    pub fn chunk_budget(mut self, chars: usize) -> Self {
        self.config.chunk_budget = chars;
        self
    }

    pub fn hard_limit(mut self, chars: usize) -> Self {
        self.config.hard_limit = chars;
        self
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.config.language = language.into();
        self
    }

    pub fn arrow_word(mut self, word: impl Into<String>) -> Self {
        self.config.arrow_word = word.into();
        self
    }

    pub fn acceptance_threshold(mut self, threshold: f64) -> Self {
        self.config.acceptance_threshold = threshold;
        self
    }

    pub fn heading_pause(mut self, pause: impl Into<String>) -> Self {
        self.config.heading_pause = pause.into();
        self
    }

    pub fn parallel(mut self, v: bool) -> Self {
        self.config.parallel = v;
        self
    }

    pub fn dictionary(mut self, dictionary: Arc<dyn SpellingDictionary>) -> Self {
        self.config.dictionary = Some(dictionary);
        self
    }

    pub fn dictionary_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.dictionary_path = Some(path.into());
        self
    }

    pub fn name_lookup(mut self, lookup: Arc<dyn NameLookup>) -> Self {
        self.config.name_lookup = Some(lookup);
        self
    }

    pub fn segmenter(mut self, segmenter: Arc<dyn SentenceSegmenter>) -> Self {
        self.config.segmenter = Some(segmenter);
        self
    }

    pub fn cost_model(mut self, costs: CostModel) -> Self {
        self.config.cost_model = Arc::new(costs);
        self
    }

    pub fn progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.config.progress_callback = Some(callback);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Md2SsmlError> {
        let c = &self.config;
        if c.chunk_budget == 0 {
            return Err(Md2SsmlError::InvalidConfig(
                "Chunk budget must be ≥ 1".into(),
            ));
        }
        if c.hard_limit <= c.chunk_budget {
            return Err(Md2SsmlError::InvalidConfig(format!(
                "Hard limit ({}) must exceed the chunk budget ({})",
                c.hard_limit, c.chunk_budget
            )));
        }
        if c.acceptance_threshold.is_nan() || c.acceptance_threshold < 0.0 {
            return Err(Md2SsmlError::InvalidConfig(format!(
                "Acceptance threshold must be ≥ 0, got {}",
                c.acceptance_threshold
            )));
        }
        if c.heading_pause.contains(['"', '<', '>', '&']) {
            return Err(Md2SsmlError::InvalidConfig(format!(
                "Heading pause must be a plain duration like \"1s\", got {:?}",
                c.heading_pause
            )));
        }
        Ok(self.config)
    }
}

// ── Stage toggles ────────────────────────────────────────────────────────

/// Enable flags for the sentence preprocessing stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageToggles {
    pub names: bool,
    pub roman: bool,
    pub arrows: bool,
    pub autocorrect: bool,
    pub ordinals: bool,
}

impl Default for StageToggles {
    fn default() -> Self {
        Self::all()
    }
}

impl StageToggles {
    /// Every stage enabled.
    pub fn all() -> Self {
        Self {
            names: true,
            roman: true,
            arrows: true,
            autocorrect: true,
            ordinals: true,
        }
    }

    /// Only the stages that need no external resource.
    pub fn offline() -> Self {
        Self {
            names: false,
            autocorrect: false,
            ..Self::all()
        }
    }

    pub fn is_enabled(&self, kind: StageKind) -> bool {
        match kind {
            StageKind::Names => self.names,
            StageKind::Roman => self.roman,
            StageKind::Arrows => self.arrows,
            StageKind::Autocorrect => self.autocorrect,
            StageKind::Ordinals => self.ordinals,
        }
    }

    pub fn set(&mut self, kind: StageKind, enabled: bool) {
        match kind {
            StageKind::Names => self.names = enabled,
            StageKind::Roman => self.roman = enabled,
            StageKind::Arrows => self.arrows = enabled,
            StageKind::Autocorrect => self.autocorrect = enabled,
            StageKind::Ordinals => self.ordinals = enabled,
        }
    }

    /// Enabled stages in execution order.
    pub fn enabled(&self) -> Vec<StageKind> {
        StageKind::ORDER
            .into_iter()
            .filter(|&k| self.is_enabled(k))
            .collect()
    }
}
