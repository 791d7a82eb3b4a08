//! Expand abbreviated given names: "T. G. Masaryka" → "Tomáše Garrigue Masaryka".
//!
//! A match is one or more `<Initial>. ` groups (an uppercase letter, or the
//! Czech digraph `Ch`) followed by a capitalised word. The whole match is
//! sent to a [`NameLookup`]; each returned title is abbreviated the same way
//! and accepted when that abbreviation, minus its last three characters, is a
//! prefix of the matched text. Dropping those three characters tolerates the
//! surname being inflected in the sentence ("Masaryka" vs. "Masaryk").
//!
//! On acceptance the title's given names replace the initials and the
//! surname is kept exactly as written in the sentence. Lookup failures and
//! empty results leave the text unchanged.

use crate::error::LookupError;
use crate::preprocess::{Stage, StageKind};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

static RE_ABBREVIATED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?:(?:[A-ZÁČĎÉĚÍŇÓŘŠŤÚŮÝŽ]|Ch)\. )+[A-ZÁČĎÉĚÍŇÓŘŠŤÚŮÝŽ][aábcčdďeéěfghiíjklmnňoópqrřsštťuúůvwxyýzž]+",
    )
    .unwrap()
});

/// Characters dropped from the end of an abbreviated candidate before the
/// prefix test.
const INFLECTION_SLACK: usize = 3;

/// Name search collaborator.
pub trait NameLookup: Send + Sync {
    /// Candidate full names for `query`, best first. May be empty.
    fn search(&self, query: &str) -> Result<Vec<String>, LookupError>;
}

/// Offline lookup that never finds anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLookup;

impl NameLookup for NoLookup {
    fn search(&self, _query: &str) -> Result<Vec<String>, LookupError> {
        Ok(Vec::new())
    }
}

/// Default timeout for one search request.
pub const DEFAULT_LOOKUP_TIMEOUT_SECS: u64 = 30;

/// Full-text title search against a MediaWiki `api.php` endpoint.
#[derive(Debug, Clone)]
pub struct WikipediaLookup {
    client: reqwest::blocking::Client,
    endpoint: String,
    limit: usize,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    query: Option<SearchQuery>,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    search: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    title: String,
}

impl WikipediaLookup {
    /// Search the Wikipedia edition for `language` (e.g. `"cs"`).
    ///
    /// Must not be called from inside an async runtime; the blocking client
    /// starts its own.
    pub fn new(language: &str) -> Result<Self, LookupError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_LOOKUP_TIMEOUT_SECS))
            .user_agent(concat!("md2ssml/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| LookupError::Unavailable {
                detail: e.to_string(),
            })?;
        Ok(Self {
            client,
            endpoint: format!("https://{language}.wikipedia.org/w/api.php"),
            limit: 10,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn titles(body: SearchResponse) -> Vec<String> {
    body.query
        .map(|q| q.search.into_iter().map(|hit| hit.title).collect())
        .unwrap_or_default()
}

impl NameLookup for WikipediaLookup {
    fn search(&self, query: &str) -> Result<Vec<String>, LookupError> {
        let limit = self.limit.to_string();
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("action", "query"),
                ("list", "search"),
                ("srprop", ""),
                ("srlimit", limit.as_str()),
                ("srsearch", query),
                ("format", "json"),
            ])
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| LookupError::Http {
                detail: e.to_string(),
            })?;
        let body: SearchResponse = response.json().map_err(|e| LookupError::Decode {
            detail: e.to_string(),
        })?;
        Ok(titles(body))
    }
}

fn initial(part: &str) -> String {
    let mut chars = part.chars();
    match (chars.next(), chars.next()) {
        (Some('C'), Some('h')) => "Ch".to_string(),
        (Some(c), _) => c.to_string(),
        (None, _) => String::new(),
    }
}

/// "Tomáš Garrigue Masaryk" → "T. G. Masaryk". `None` for one-word names,
/// which have no given names to restore.
fn abbreviate(full_name: &str) -> Option<String> {
    let parts: Vec<&str> = full_name.split(' ').filter(|p| !p.is_empty()).collect();
    let (surname, given) = parts.split_last()?;
    if given.is_empty() {
        return None;
    }
    let mut out: Vec<String> = given.iter().map(|p| initial(p)).collect();
    out.push((*surname).to_string());
    Some(out.join(". "))
}

fn drop_last_chars(s: &str, n: usize) -> &str {
    match s.char_indices().rev().nth(n.saturating_sub(1)) {
        Some((idx, _)) if n > 0 => &s[..idx],
        _ if n == 0 => s,
        _ => "",
    }
}

/// Whether `candidate` plausibly is the full form of `matched`.
fn accepts(matched: &str, candidate: &str) -> bool {
    match abbreviate(candidate) {
        Some(short) => matched.starts_with(drop_last_chars(&short, INFLECTION_SLACK)),
        None => false,
    }
}

/// Name-abbreviation expansion stage.
pub struct NameExpander {
    lookup: Arc<dyn NameLookup>,
}

impl NameExpander {
    pub fn new(lookup: Arc<dyn NameLookup>) -> Self {
        Self { lookup }
    }

    fn expand_match(&self, matched: &str) -> String {
        let candidates = match self.lookup.search(matched) {
            Ok(c) => c,
            Err(e) => {
                warn!("name lookup failed for {matched:?}: {e}");
                return matched.to_string();
            }
        };
        debug!("name candidates for {matched:?}: {candidates:?}");

        let surname = matched.rsplit(' ').next().unwrap_or(matched);
        for candidate in &candidates {
            if accepts(matched, candidate) {
                let mut words: Vec<&str> = candidate.split(' ').filter(|p| !p.is_empty()).collect();
                words.pop();
                words.push(surname);
                return words.join(" ");
            }
        }
        debug!("no full name accepted for {matched:?}");
        matched.to_string()
    }
}

impl Stage for NameExpander {
    fn kind(&self) -> StageKind {
        StageKind::Names
    }

    fn apply(&self, text: &str) -> String {
        RE_ABBREVIATED
            .replace_all(text, |caps: &Captures<'_>| self.expand_match(&caps[0]))
            .into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Canned(Vec<&'static str>);

    impl NameLookup for Canned {
        fn search(&self, _query: &str) -> Result<Vec<String>, LookupError> {
            Ok(self.0.iter().map(|s| s.to_string()).collect())
        }
    }

    struct Failing;

    impl NameLookup for Failing {
        fn search(&self, _query: &str) -> Result<Vec<String>, LookupError> {
            Err(LookupError::Http {
                detail: "connection refused".into(),
            })
        }
    }

    #[test]
    fn test_abbreviate() {
        assert_eq!(
            abbreviate("Tomáš Garrigue Masaryk").as_deref(),
            Some("T. G. Masaryk")
        );
        assert_eq!(abbreviate("Christian Doppler").as_deref(), Some("Ch. Doppler"));
        assert_eq!(abbreviate("Karel Čapek").as_deref(), Some("K. Čapek"));
        assert_eq!(abbreviate("Praha"), None);
    }

    #[test]
    fn test_drop_last_chars() {
        assert_eq!(drop_last_chars("K. Čapek", 3), "K. Ča");
        assert_eq!(drop_last_chars("ab", 3), "");
        assert_eq!(drop_last_chars("abc", 0), "abc");
    }

    #[test]
    fn test_expands_with_inflected_surname() {
        let stage = NameExpander::new(Arc::new(Canned(vec![
            "Masarykova univerzita",
            "Tomáš Garrigue Masaryk",
        ])));
        assert_eq!(
            stage.apply("Dopis T. G. Masarykovi přišel."),
            "Dopis Tomáš Garrigue Masarykovi přišel."
        );
    }

    #[test]
    fn test_digraph_initial() {
        let stage = NameExpander::new(Arc::new(Canned(vec!["Christian Doppler"])));
        assert_eq!(stage.apply("Ch. Doppler objevil"), "Christian Doppler objevil");
    }

    #[test]
    fn test_no_candidate_accepted() {
        let stage = NameExpander::new(Arc::new(Canned(vec!["Jan Novák"])));
        assert_eq!(stage.apply("Psal K. Čapek."), "Psal K. Čapek.");
    }

    #[test]
    fn test_single_word_candidate_rejected() {
        let stage = NameExpander::new(Arc::new(Canned(vec!["Ka"])));
        assert_eq!(stage.apply("Psal K. Čapek."), "Psal K. Čapek.");
    }

    #[test]
    fn test_lookup_failure_passes_through() {
        let stage = NameExpander::new(Arc::new(Failing));
        assert_eq!(stage.apply("Psal K. Čapek."), "Psal K. Čapek.");
    }

    #[test]
    fn test_no_lookup_is_noop() {
        let stage = NameExpander::new(Arc::new(NoLookup));
        assert_eq!(stage.apply("T. G. Masaryk"), "T. G. Masaryk");
    }

    #[test]
    fn test_search_response_decoding() {
        let body: SearchResponse = serde_json::from_str(
            r#"{"batchcomplete":"","query":{"searchinfo":{"totalhits":2},
                "search":[{"ns":0,"title":"Karel Čapek"},{"ns":0,"title":"Josef Čapek"}]}}"#,
        )
        .unwrap();
        assert_eq!(titles(body), vec!["Karel Čapek", "Josef Čapek"]);

        let empty: SearchResponse = serde_json::from_str(r#"{"batchcomplete":""}"#).unwrap();
        assert!(titles(empty).is_empty());
    }
}
