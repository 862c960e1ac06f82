//! Edit distance used by the fuzzy matcher.

use std::cmp::min;

/// Calculate the indel distance between two strings.
///
/// Only insertions and deletions are allowed, so a substitution costs 2.
/// This is the distance behind the classic `ratio` similarity.
pub fn indel_distance(s1: &str, s2: &str) -> usize {
    weighted_distance(s1, s2, 2)
}

/// Similarity in `0.0..=1.0` derived from the indel distance.
///
/// Two empty strings are considered identical.
pub fn indel_ratio(s1: &str, s2: &str) -> f64 {
    let total = s1.chars().count() + s2.chars().count();
    if total == 0 {
        return 1.0;
    }
    1.0 - indel_distance(s1, s2) as f64 / total as f64
}

#[allow(clippy::needless_range_loop)]
fn weighted_distance(s1: &str, s2: &str, substitution_cost: usize) -> usize {
    let s1_chars: Vec<char> = s1.chars().collect();
    let s2_chars: Vec<char> = s2.chars().collect();
    let len1 = s1_chars.len();
    let len2 = s2_chars.len();

    if len1 == 0 {
        return len2;
    }
    if len2 == 0 {
        return len1;
    }

    // Use only two rows for space optimization
    let mut prev_row: Vec<usize> = (0..=len2).collect();
    let mut curr_row = vec![0; len2 + 1];

    for i in 1..=len1 {
        curr_row[0] = i;
        for j in 1..=len2 {
            let cost = if s1_chars[i - 1] == s2_chars[j - 1] {
                0
            } else {
                substitution_cost
            };

            curr_row[j] = min(
                min(
                    prev_row[j] + 1,     // deletion
                    curr_row[j - 1] + 1, // insertion
                ),
                prev_row[j - 1] + cost, // substitution
            );
        }
        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    prev_row[len2]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indel_distance() {
        assert_eq!(indel_distance("fever", "fever"), 0);
        assert_eq!(indel_distance("ab", "ac"), 2);
        assert_eq!(indel_distance("cough", "coughing"), 3);
        assert_eq!(indel_distance("", "abc"), 3);
    }

    #[test]
    fn test_indel_ratio() {
        assert!((indel_ratio("fever", "fever") - 1.0).abs() < 1e-9);
        assert!((indel_ratio("", "") - 1.0).abs() < 1e-9);
        assert!((indel_ratio("abc", "xyz") - 0.0).abs() < 1e-9);
        // 2 * 5 matched chars out of 13
        assert!((indel_ratio("cough", "coughing") - 10.0 / 13.0).abs() < 1e-9);
    }

    #[test]
    fn test_unicode_is_counted_by_char() {
        assert_eq!(indel_distance("बुखार", "बुखार"), 0);
        assert_eq!(indel_distance("fièvre", "fievre"), 2);
    }
}
