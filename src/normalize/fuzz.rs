//! Token-based approximate string matching.
//!
//! The scorers follow the classic "fuzzy ratio" family: a plain indel
//! similarity, token-sort and token-set variants that ignore word order and
//! repetition, and partial variants that look for the best aligned window of
//! the longer string. [`weighted_ratio`] combines them into a single
//! 0..=100 score.

use std::collections::BTreeSet;

use unicode_segmentation::UnicodeSegmentation;

use crate::normalize::levenshtein::indel_ratio;

/// Weight applied to the token-based scores.
const UNBASE_SCALE: f64 = 0.95;
/// Weight applied to partial scores for moderately different lengths.
const PARTIAL_SCALE: f64 = 0.90;
/// Weight applied to partial scores when one string is much longer.
const LONG_PARTIAL_SCALE: f64 = 0.60;

/// Split on Unicode word boundaries, lowercase, and join with single spaces.
///
/// Punctuation and repeated whitespace disappear; non-ASCII letters are kept.
pub fn preprocess(text: &str) -> String {
    text.unicode_words()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Indel similarity scaled to 0..=100. Empty input scores 0.
pub fn ratio(s1: &str, s2: &str) -> f64 {
    if s1.is_empty() || s2.is_empty() {
        return 0.0;
    }
    100.0 * indel_ratio(s1, s2)
}

/// Best [`ratio`] between the shorter string and any equally long window of the longer one.
pub fn partial_ratio(s1: &str, s2: &str) -> f64 {
    if s1.is_empty() || s2.is_empty() {
        return 0.0;
    }

    let (shorter, longer) = if s1.chars().count() <= s2.chars().count() {
        (s1, s2)
    } else {
        (s2, s1)
    };
    let longer_chars: Vec<char> = longer.chars().collect();
    let window = shorter.chars().count();

    let mut best = 0.0f64;
    for start in 0..=(longer_chars.len() - window) {
        let candidate: String = longer_chars[start..start + window].iter().collect();
        best = best.max(ratio(shorter, &candidate));
        if best > 99.5 {
            return 100.0;
        }
    }
    best
}

fn sorted_tokens(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// Score after sorting the tokens of both strings.
pub fn token_sort_ratio(s1: &str, s2: &str, partial: bool) -> f64 {
    let sorted1 = sorted_tokens(s1);
    let sorted2 = sorted_tokens(s2);
    if partial {
        partial_ratio(&sorted1, &sorted2)
    } else {
        ratio(&sorted1, &sorted2)
    }
}

/// Score comparing the shared tokens against each side's full token set.
pub fn token_set_ratio(s1: &str, s2: &str, partial: bool) -> f64 {
    let tokens1: BTreeSet<&str> = s1.split_whitespace().collect();
    let tokens2: BTreeSet<&str> = s2.split_whitespace().collect();

    let join = |tokens: Vec<&str>| tokens.join(" ");
    let intersection = join(tokens1.intersection(&tokens2).copied().collect());
    let diff1to2 = join(tokens1.difference(&tokens2).copied().collect());
    let diff2to1 = join(tokens2.difference(&tokens1).copied().collect());

    let combined1to2 = format!("{intersection} {diff1to2}").trim().to_string();
    let combined2to1 = format!("{intersection} {diff2to1}").trim().to_string();

    let score = |a: &str, b: &str| {
        if partial {
            partial_ratio(a, b)
        } else {
            ratio(a, b)
        }
    };

    score(&intersection, &combined1to2)
        .max(score(&intersection, &combined2to1))
        .max(score(&combined1to2, &combined2to1))
}

/// Combined similarity of two preprocessed strings, rounded to 0..=100.
///
/// Strings of similar length are compared whole and by tokens; when one is at
/// least 1.5 times longer, the partial variants are used instead, with a
/// harsher weight beyond a factor of 8.
pub fn weighted_ratio(s1: &str, s2: &str) -> u8 {
    let len1 = s1.chars().count();
    let len2 = s2.chars().count();
    if len1 == 0 || len2 == 0 {
        return 0;
    }

    let base = ratio(s1, s2);
    let len_ratio = len1.max(len2) as f64 / len1.min(len2) as f64;

    let best = if len_ratio < 1.5 {
        let sort = token_sort_ratio(s1, s2, false) * UNBASE_SCALE;
        let set = token_set_ratio(s1, s2, false) * UNBASE_SCALE;
        base.max(sort).max(set)
    } else {
        let partial_scale = if len_ratio > 8.0 {
            LONG_PARTIAL_SCALE
        } else {
            PARTIAL_SCALE
        };
        let partial = partial_ratio(s1, s2) * partial_scale;
        let sort = token_sort_ratio(s1, s2, true) * UNBASE_SCALE * partial_scale;
        let set = token_set_ratio(s1, s2, true) * UNBASE_SCALE * partial_scale;
        base.max(partial).max(sort).max(set)
    };

    best.round().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preprocess() {
        assert_eq!(preprocess("  High   FEVER!! "), "high fever");
        assert_eq!(preprocess("runny-nose, sneezing"), "runny nose sneezing");
        assert_eq!(preprocess("तेज़ बुखार"), "तेज़ बुखार");
        assert_eq!(preprocess("?!"), "");
    }

    #[test]
    fn test_exact_match_scores_100() {
        assert_eq!(weighted_ratio("fever", "fever"), 100);
        assert_eq!(weighted_ratio("बुखार", "बुखार"), 100);
    }

    #[test]
    fn test_empty_scores_zero() {
        assert_eq!(weighted_ratio("", "fever"), 0);
        assert_eq!(ratio("", ""), 0.0);
        assert_eq!(partial_ratio("fever", ""), 0.0);
    }

    #[test]
    fn test_word_order_is_ignored() {
        assert_eq!(weighted_ratio("pain chest", "chest pain"), 95);
    }

    #[test]
    fn test_contained_phrase_uses_partial_score() {
        assert_eq!(partial_ratio("fever", "high fever"), 100.0);
        assert_eq!(weighted_ratio("high fever", "fever"), 90);
    }

    #[test]
    fn test_token_set_ignores_repeats() {
        assert_eq!(token_set_ratio("fever fever", "fever", false), 100.0);
    }

    #[test]
    fn test_typo_scores_high_but_not_perfect() {
        let score = weighted_ratio("headahce", "headache");
        assert!(score > 70 && score < 100, "score was {score}");
    }

    #[test]
    fn test_unrelated_scores_low() {
        let score = weighted_ratio("skin rash", "vomiting");
        assert!(score < 50, "score was {score}");
    }
}
