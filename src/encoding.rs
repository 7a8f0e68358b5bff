//! Word normalization and feature encoding
//!
//! Maps a raw word to the fixed-length numeric vector the network consumes.
//! Slots 0-31 count the Cyrillic letters а-я, slot 32 is dedicated to ё,
//! slots 33-58 count the Latin letters a-z, and slot 59 carries a capped
//! length feature. Letter counts are scaled by the largest count so every
//! slot lands in [0, 1].
//!
//! Words without a single Cyrillic or Latin letter are *non-informative*:
//! callers exclude them from training and classify them "not trending"
//! without running the network.

/// Width of the feature vector produced by [`word_to_vector`].
pub const VECTOR_SIZE: usize = 60;

/// Slot reserved for the letter ё, which sits outside the а-я range.
const YO_SLOT: usize = 32;

/// First slot of the Latin a-z block.
const LATIN_OFFSET: usize = 33;

/// Slot holding the word-length feature.
const LENGTH_SLOT: usize = 59;

/// Byte length at which the length feature saturates.
const LENGTH_CAP: f64 = 20.0;

/// Punctuation stripped from both ends of a word during normalization.
const PUNCTUATION: &[char] = &['.', ',', '!', '?', '-', '"', '\'', '(', ')'];

/// Lower-case a word and strip surrounding whitespace and punctuation.
///
/// # Examples
///
/// ```
/// use trendnet::encoding::normalize;
///
/// assert_eq!(normalize("  Привет!  "), "привет");
/// assert_eq!(normalize("(Data)"), "data");
/// ```
pub fn normalize(word: &str) -> String {
    word.to_lowercase()
        .trim()
        .trim_matches(PUNCTUATION)
        .trim()
        .to_string()
}

/// True when the word contains no Cyrillic or Latin letter.
///
/// # Examples
///
/// ```
/// use trendnet::encoding::is_non_informative;
///
/// assert!(is_non_informative("123"));
/// assert!(!is_non_informative("ai"));
/// ```
pub fn is_non_informative(word: &str) -> bool {
    !word
        .chars()
        .any(|c| matches!(c, 'а'..='я' | 'ё' | 'a'..='z'))
}

/// Encode a normalized word as a length-60 feature vector.
///
/// Letter slots hold occurrence counts divided by the largest count among
/// slots 0-58 (at least 1, so the division is always safe); the final slot
/// holds `min(byte_len / 20, 1)`. An empty string encodes to all zeros.
pub fn word_to_vector(word: &str) -> Vec<f64> {
    let mut vector = vec![0.0; VECTOR_SIZE];

    if word.is_empty() {
        return vector;
    }

    for c in word.chars() {
        match c {
            'а'..='я' => vector[c as usize - 'а' as usize] += 1.0,
            'ё' => vector[YO_SLOT] += 1.0,
            'a'..='z' => vector[LATIN_OFFSET + c as usize - 'a' as usize] += 1.0,
            _ => {}
        }
    }

    let mut max = 1.0;
    for &count in &vector[..LENGTH_SLOT] {
        if count > max {
            max = count;
        }
    }
    for slot in &mut vector[..LENGTH_SLOT] {
        *slot /= max;
    }

    vector[LENGTH_SLOT] = (word.len() as f64 / LENGTH_CAP).min(1.0);

    vector
}
