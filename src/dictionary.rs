//! Spelling dictionary collaborator.
//!
//! The autocorrector only needs two questions answered: is this word known,
//! and what are the candidate spellings for an unknown one. Both are behind
//! [`SpellingDictionary`] so a remote service or a test fake can stand in for
//! the two bundled implementations:
//!
//! - [`HunspellDictionary`] loads a hunspell `.dic` together with the `.aff`
//!   next to it, so inflected forms (`kočky` from `kočka/Y`) are known and
//!   suggestions come from the affix rules
//! - [`WordListDictionary`] is a plain word list with edit-distance
//!   suggestions
//!
//! [`load_dictionary`] picks one by file extension.
//!
//! Implementations are shared across threads for the lifetime of a
//! [`crate::convert::Converter`] and must not mutate after construction.

use crate::error::{LookupError, Md2SsmlError};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Read-only spelling dictionary.
pub trait SpellingDictionary: Send + Sync {
    /// Membership test. Capitalised and upper-case forms of a known
    /// lowercase word count as known.
    fn contains(&self, word: &str) -> bool;

    /// Ordered suggestions for `word`, best first. An empty list means the
    /// dictionary has nothing to offer; `Err` means this one lookup failed.
    fn suggest(&self, word: &str) -> Result<Vec<String>, LookupError>;
}

/// Maximum edit distance for a dictionary entry to be offered as a suggestion.
const MAX_SUGGEST_DISTANCE: usize = 2;

/// Maximum number of suggestions returned per word.
const MAX_SUGGESTIONS: usize = 10;

/// In-memory dictionary built from a plain word list.
///
/// Entries are stored lowercased. Suggestions are every entry within
/// Damerau-Levenshtein distance 2 of the query, closest first, with the
/// query's capitalisation pattern re-applied.
#[derive(Debug, Clone, Default)]
pub struct WordListDictionary {
    words: HashSet<String>,
    /// Sorted copy of `words` so suggestion order is deterministic.
    sorted: Vec<String>,
}

impl WordListDictionary {
    /// Build from an iterator of words.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words: HashSet<String> = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        let mut sorted: Vec<String> = words.iter().cloned().collect();
        sorted.sort_unstable();
        Self { words, sorted }
    }

    /// Parse a word list: one word per line, `#` comments skipped.
    pub fn parse(text: &str) -> Self {
        Self::from_words(text.lines().filter(|l| !l.trim_start().starts_with('#')))
    }

    /// Load a word list file. Failure is fatal for the pipeline.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Md2SsmlError> {
        let path = path.as_ref();
        let text = read_dictionary_file(path)?;
        let dict = Self::parse(&text);
        if dict.is_empty() {
            return Err(Md2SsmlError::DictionaryUnavailable {
                source_desc: path.display().to_string(),
                reason: "file contains no words".into(),
            });
        }
        info!("Loaded {} dictionary words from {}", dict.len(), path.display());
        Ok(dict)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl SpellingDictionary for WordListDictionary {
    fn contains(&self, word: &str) -> bool {
        self.words.contains(&word.to_lowercase())
    }

    fn suggest(&self, word: &str) -> Result<Vec<String>, LookupError> {
        let query = word.to_lowercase();
        let query_len = query.chars().count();

        let mut scored: Vec<(usize, &String)> = self
            .sorted
            .iter()
            .filter(|w| w.chars().count().abs_diff(query_len) <= MAX_SUGGEST_DISTANCE)
            .map(|w| (strsim::damerau_levenshtein(&query, w), w))
            .filter(|(d, _)| *d <= MAX_SUGGEST_DISTANCE)
            .collect();
        // Stable sort keeps alphabetical order within one distance.
        scored.sort_by_key(|(d, _)| *d);

        let suggestions: Vec<String> = scored
            .into_iter()
            .take(MAX_SUGGESTIONS)
            .map(|(_, w)| match_case(word, w))
            .collect();
        debug!("suggestions for {word:?}: {suggestions:?}");
        Ok(suggestions)
    }
}

/// Hunspell dictionary: a `.dic` word list plus the `.aff` affix rules.
///
/// Membership and suggestions follow hunspell semantics, so every form the
/// affix rules derive from a stem is known.
pub struct HunspellDictionary {
    inner: spellbook::Dictionary,
}

impl HunspellDictionary {
    /// Build from the text of an `.aff` and a `.dic` file.
    pub fn new(aff: &str, dic: &str) -> Result<Self, Md2SsmlError> {
        let inner = spellbook::Dictionary::new(aff, dic).map_err(|e| {
            Md2SsmlError::DictionaryUnavailable {
                source_desc: "hunspell dictionary".into(),
                reason: e.to_string(),
            }
        })?;
        Ok(Self { inner })
    }

    /// Load `path` (a `.dic`) and the `.aff` with the same stem beside it.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Md2SsmlError> {
        let dic_path = path.as_ref();
        let aff_path = dic_path.with_extension("aff");
        let dic = read_dictionary_file(dic_path)?;
        let aff = read_dictionary_file(&aff_path)?;
        let dict = Self::new(&aff, &dic).map_err(|e| match e {
            Md2SsmlError::DictionaryUnavailable { reason, .. } => {
                Md2SsmlError::DictionaryUnavailable {
                    source_desc: dic_path.display().to_string(),
                    reason,
                }
            }
            other => other,
        })?;
        info!(
            "Loaded hunspell dictionary from {} (affixes from {})",
            dic_path.display(),
            aff_path.display()
        );
        Ok(dict)
    }
}

impl fmt::Debug for HunspellDictionary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HunspellDictionary").finish_non_exhaustive()
    }
}

impl SpellingDictionary for HunspellDictionary {
    fn contains(&self, word: &str) -> bool {
        self.inner.check(word)
    }

    fn suggest(&self, word: &str) -> Result<Vec<String>, LookupError> {
        let mut suggestions = Vec::new();
        self.inner.suggest(word, &mut suggestions);
        suggestions.truncate(MAX_SUGGESTIONS);
        debug!("suggestions for {word:?}: {suggestions:?}");
        Ok(suggestions)
    }
}

/// Load a dictionary file, choosing the format by extension.
///
/// A `.dic` path is a hunspell dictionary and needs its `.aff` beside it.
/// Anything else is read as a plain word list.
pub fn load_dictionary(path: &Path) -> Result<Arc<dyn SpellingDictionary>, Md2SsmlError> {
    let is_hunspell = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("dic"));
    if is_hunspell {
        Ok(Arc::new(HunspellDictionary::from_path(path)?))
    } else {
        Ok(Arc::new(WordListDictionary::from_path(path)?))
    }
}

fn read_dictionary_file(path: &Path) -> Result<String, Md2SsmlError> {
    std::fs::read_to_string(path).map_err(|e| Md2SsmlError::DictionaryUnavailable {
        source_desc: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Re-apply the capitalisation pattern of `model` to the lowercase `word`.
fn match_case(model: &str, word: &str) -> String {
    let letters: Vec<char> = model.chars().filter(|c| c.is_alphabetic()).collect();
    if letters.len() > 1 && letters.iter().all(|c| c.is_uppercase()) {
        return word.to_uppercase();
    }
    match model.chars().next() {
        Some(first) if first.is_uppercase() => {
            let mut chars = word.chars();
            match chars.next() {
                Some(c) => c.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        }
        _ => word.to_string(),
    }
}
