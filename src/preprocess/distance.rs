//! Weighted edit distance used to rank correction candidates.
//!
//! The cost tables cover 7-bit ASCII only. Both strings are normalised first
//! ([`normalize`]): lowercased, Czech diacritics folded to their base letter,
//! then anything that is not printable ASCII is dropped. Folding before
//! scoring means a missing háček or čárka costs nothing, which matches the
//! most common OCR and keyboard-layout damage.

use std::fmt;

const ALPHABET: usize = 128;

/// Insert, delete and substitute costs over ASCII.
///
/// Construct once, wrap in an `Arc`, share read-only.
#[derive(Clone, PartialEq)]
pub struct CostModel {
    insert: [f64; ALPHABET],
    delete: [f64; ALPHABET],
    /// Row-major `ALPHABET × ALPHABET` matrix.
    substitute: Vec<f64>,
}

impl CostModel {
    /// Plain Levenshtein: every operation costs 1.
    pub fn uniform() -> Self {
        Self {
            insert: [1.0; ALPHABET],
            delete: [1.0; ALPHABET],
            substitute: vec![1.0; ALPHABET * ALPHABET],
        }
    }

    /// Model tuned for OCR output: m/n and r/n swaps cost 0.5, insertion and
    /// deletion cost 1.25 so substitution-style typos win ties.
    pub fn ocr() -> Self {
        Self::uniform()
            .with_substitution('m', 'n', 0.5)
            .with_substitution('r', 'n', 0.5)
            .with_indel(1.25)
    }

    /// Set a symmetric substitution cost. Non-ASCII letters are ignored.
    pub fn with_substitution(mut self, a: char, b: char, cost: f64) -> Self {
        if let (Some(a), Some(b)) = (ascii_index(a), ascii_index(b)) {
            self.substitute[a * ALPHABET + b] = cost;
            self.substitute[b * ALPHABET + a] = cost;
        }
        self
    }

    /// Set the insertion and deletion cost for every character.
    pub fn with_indel(mut self, cost: f64) -> Self {
        self.insert = [cost; ALPHABET];
        self.delete = [cost; ALPHABET];
        self
    }

    pub fn insert_cost(&self, c: u8) -> f64 {
        self.insert[c as usize % ALPHABET]
    }

    pub fn delete_cost(&self, c: u8) -> f64 {
        self.delete[c as usize % ALPHABET]
    }

    pub fn substitute_cost(&self, a: u8, b: u8) -> f64 {
        if a == b {
            return 0.0;
        }
        self.substitute[(a as usize % ALPHABET) * ALPHABET + (b as usize % ALPHABET)]
    }

    /// Weighted Levenshtein distance between two already-normalised strings.
    pub fn raw_distance(&self, a: &str, b: &str) -> f64 {
        let a = a.as_bytes();
        let b = b.as_bytes();

        let mut prev: Vec<f64> = Vec::with_capacity(b.len() + 1);
        prev.push(0.0);
        for &cb in b {
            let last = *prev.last().unwrap_or(&0.0);
            prev.push(last + self.insert_cost(cb));
        }
        let mut cur = vec![0.0; b.len() + 1];

        for &ca in a {
            cur[0] = prev[0] + self.delete_cost(ca);
            for (j, &cb) in b.iter().enumerate() {
                let deletion = prev[j + 1] + self.delete_cost(ca);
                let insertion = cur[j] + self.insert_cost(cb);
                let substitution = prev[j] + self.substitute_cost(ca, cb);
                cur[j + 1] = deletion.min(insertion).min(substitution);
            }
            std::mem::swap(&mut prev, &mut cur);
        }
        prev[b.len()]
    }

    /// Normalise both strings, then score them.
    pub fn distance(&self, a: &str, b: &str) -> f64 {
        self.raw_distance(&normalize(a), &normalize(b))
    }
}

impl Default for CostModel {
    fn default() -> Self {
        Self::ocr()
    }
}

impl fmt::Debug for CostModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cheap = self.substitute.iter().filter(|&&c| c < 1.0).count() / 2;
        f.debug_struct("CostModel")
            .field("insert", &self.insert[b'a' as usize])
            .field("delete", &self.delete[b'a' as usize])
            .field("cheap_substitutions", &cheap)
            .finish()
    }
}

fn ascii_index(c: char) -> Option<usize> {
    if c.is_ascii() {
        Some(c as usize)
    } else {
        None
    }
}

fn fold_diacritic(c: char) -> char {
    match c {
        'ě' | 'é' => 'e',
        'ú' | 'ů' => 'u',
        'š' => 's',
        'č' => 'c',
        'ř' => 'r',
        'ž' => 'z',
        'ý' => 'y',
        'á' => 'a',
        'í' => 'i',
        'ó' => 'o',
        'ď' => 'd',
        'ň' => 'n',
        'ť' => 't',
        other => other,
    }
}

/// Lowercase, fold diacritics, keep printable ASCII only.
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(fold_diacritic)
        .filter(|c| c.is_ascii_graphic())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("Příliš Žluťoučký"), "priliszlutoucky");
        assert_eq!(normalize("a–b"), "ab");
        assert_eq!(normalize("ÄÖ"), "");
    }

    #[test]
    fn test_identical_is_zero() {
        let m = CostModel::ocr();
        assert_eq!(m.distance("kočka", "kočka"), 0.0);
        assert_eq!(m.distance("kočka", "kocka"), 0.0);
    }

    #[test]
    fn test_uniform_matches_levenshtein() {
        let m = CostModel::uniform();
        assert_eq!(m.raw_distance("kitten", "sitting"), 3.0);
        assert_eq!(m.raw_distance("", "abc"), 3.0);
        assert_eq!(m.raw_distance("abc", ""), 3.0);
    }

    #[test]
    fn test_ocr_confusions_are_cheap() {
        let m = CostModel::ocr();
        assert_eq!(m.raw_distance("rn", "rm"), 0.5);
        assert_eq!(m.raw_distance("mapa", "napa"), 0.5);
        assert_eq!(m.raw_distance("nos", "ros"), 0.5);
        assert_eq!(m.raw_distance("pes", "les"), 1.0);
    }

    #[test]
    fn test_ocr_indel_costs_more_than_substitution() {
        let m = CostModel::ocr();
        assert_eq!(m.raw_distance("pes", "pesy"), 1.25);
        assert_eq!(m.raw_distance("pesy", "pes"), 1.25);
    }

    #[test]
    fn test_substitution_is_symmetric() {
        let m = CostModel::ocr();
        for (a, b) in [(b'm', b'n'), (b'r', b'n'), (b'a', b'z')] {
            assert_eq!(m.substitute_cost(a, b), m.substitute_cost(b, a));
        }
    }
}
