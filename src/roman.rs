//! Roman-numeral codec.
//!
//! [`decode`] does not check the numeral grammar: `"IIII"` decodes to 4 and
//! `"VX"` to 5 even though neither is a well-formed numeral. Callers that deal
//! with untrusted text must go through [`parse`] (or check [`is_valid`] first),
//! which rejects anything outside the strict subtractive-notation grammar.

use once_cell::sync::Lazy;
use regex::Regex;

/// Strict numeral grammar, thousands capped at `MMMM`.
static RE_VALID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^M{0,4}(CM|CD|D?C{0,3})(XC|XL|L?X{0,3})(IX|IV|V?I{0,3})$").unwrap()
});

const DENOMINATIONS: [(u32, &str); 13] = [
    (1000, "M"),
    (900, "CM"),
    (500, "D"),
    (400, "CD"),
    (100, "C"),
    (90, "XC"),
    (50, "L"),
    (40, "XL"),
    (10, "X"),
    (9, "IX"),
    (5, "V"),
    (4, "IV"),
    (1, "I"),
];

fn letter_value(c: char) -> Option<u32> {
    match c {
        'M' => Some(1000),
        'D' => Some(500),
        'C' => Some(100),
        'L' => Some(50),
        'X' => Some(10),
        'V' => Some(5),
        'I' => Some(1),
        _ => None,
    }
}

/// Whether `roman` is a non-empty, well-formed numeral.
pub fn is_valid(roman: &str) -> bool {
    !roman.is_empty() && RE_VALID.is_match(roman)
}

/// Decode a numeral by pairwise scan: a letter smaller than its right
/// neighbour is subtracted, anything else is added, and the final letter is
/// always added.
///
/// Returns `None` for an empty string or a character outside `MDCLXVI`.
pub fn decode(roman: &str) -> Option<u32> {
    let values = roman
        .chars()
        .map(letter_value)
        .collect::<Option<Vec<u32>>>()?;
    let last = *values.last()?;

    let total = values.windows(2).fold(0i64, |acc, pair| {
        if pair[0] < pair[1] {
            acc - pair[0] as i64
        } else {
            acc + pair[0] as i64
        }
    }) + last as i64;

    u32::try_from(total).ok()
}

/// Encode `num` greedily, largest denomination first. Zero encodes to `""`.
pub fn encode(mut num: u32) -> String {
    let mut roman = String::new();
    for (value, symbol) in DENOMINATIONS {
        while num >= value {
            roman.push_str(symbol);
            num -= value;
        }
    }
    roman
}

/// Validate against the strict grammar, then decode.
pub fn parse(roman: &str) -> Option<u32> {
    if is_valid(roman) {
        decode(roman)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_decode_simple() {
        assert_eq!(decode("I"), Some(1));
        assert_eq!(decode("IV"), Some(4));
        assert_eq!(decode("IX"), Some(9));
        assert_eq!(decode("XIV"), Some(14));
        assert_eq!(decode("MCMXCIV"), Some(1994));
        assert_eq!(decode("MMMCMXCIX"), Some(3999));
    }

    #[test]
    fn test_decode_rejects_foreign_letters() {
        assert_eq!(decode(""), None);
        assert_eq!(decode("XA"), None);
        assert_eq!(decode("iv"), None);
    }

    #[test]
    fn test_encode() {
        assert_eq!(encode(0), "");
        assert_eq!(encode(4), "IV");
        assert_eq!(encode(40), "XL");
        assert_eq!(encode(1994), "MCMXCIV");
        assert_eq!(encode(2024), "MMXXIV");
    }

    #[test]
    fn test_grammar_rejects_malformed() {
        for bad in ["IIII", "VX", "IC", "XM", "VV", "LL", "DD", "IIV", "MMMMM", ""] {
            assert!(!is_valid(bad), "{bad} should be rejected");
            assert_eq!(parse(bad), None);
        }
    }

    #[test]
    fn test_grammar_accepts_well_formed() {
        for good in ["I", "IV", "XLII", "XC", "CD", "MMMM"] {
            assert!(is_valid(good), "{good} should be accepted");
        }
        assert_eq!(parse("XLII"), Some(42));
    }

    proptest! {
        #[test]
        fn prop_roundtrip(n in 1u32..=3999) {
            let roman = encode(n);
            prop_assert!(is_valid(&roman));
            prop_assert_eq!(decode(&roman), Some(n));
        }
    }
}
