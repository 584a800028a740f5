//! Name similarity heuristic used to rank candidate products.
//!
//! This is deliberately not an edit distance. The score is the best of three
//! cheap signals (exact match, word overlap, position-wise character match)
//! and ranking downstream is tuned against exactly this behavior, so swapping
//! in Levenshtein or similar would change which product gets suggested first.

/// Score for a case- and whitespace-insensitive exact match.
const EXACT_SCORE: f64 = 100.0;
/// Upper bound of the word-overlap signal.
const WORD_OVERLAP_WEIGHT: f64 = 80.0;
/// Upper bound of the position-wise character signal.
const CHAR_MATCH_WEIGHT: f64 = 60.0;

/// Scores how well `candidate` matches the user's `query`, from 0 to 100.
///
/// Returns the maximum of:
/// 1. `100` when both names are equal after trimming and lowercasing.
/// 2. Word overlap: the share of query words that contain, or are contained
///    in, some candidate word, relative to the longer word list, times 80.
/// 3. Character match: the share of positions holding the same character,
///    relative to the longer name (extra length counts as mismatches), times 60.
///
/// Two blank names score 0.
#[must_use]
pub fn similarity_score(query: &str, candidate: &str) -> u8 {
    let query = query.trim().to_lowercase();
    let candidate = candidate.trim().to_lowercase();

    if query.is_empty() || candidate.is_empty() {
        return 0;
    }
    if query == candidate {
        return to_score(EXACT_SCORE);
    }

    let best = word_overlap(&query, &candidate).max(char_match(&query, &candidate));
    to_score(best)
}

fn word_overlap(query: &str, candidate: &str) -> f64 {
    let query_words: Vec<&str> = query.split_whitespace().collect();
    let candidate_words: Vec<&str> = candidate.split_whitespace().collect();
    let longest = query_words.len().max(candidate_words.len());
    if longest == 0 {
        return 0.0;
    }

    let matching = query_words
        .iter()
        .filter(|q| {
            candidate_words
                .iter()
                .any(|c| c.contains(*q) || q.contains(*c))
        })
        .count();

    ratio(matching, longest) * WORD_OVERLAP_WEIGHT
}

fn char_match(query: &str, candidate: &str) -> f64 {
    let a: Vec<char> = query.chars().collect();
    let b: Vec<char> = candidate.chars().collect();
    let longest = a.len().max(b.len());
    if longest == 0 {
        return 0.0;
    }

    let same = a.iter().zip(&b).filter(|(x, y)| x == y).count();
    ratio(same, longest) * CHAR_MATCH_WEIGHT
}

#[allow(clippy::cast_precision_loss)]
fn ratio(part: usize, whole: usize) -> f64 {
    part as f64 / whole as f64
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_score(raw: f64) -> u8 {
    raw.round().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match_ignores_case_and_whitespace() {
        assert_eq!(similarity_score("apple", "Apple"), 100);
        assert_eq!(similarity_score("  Whole Milk ", "whole milk"), 100);
    }

    #[test]
    fn prefix_query_beats_unrelated_name() {
        let juice = similarity_score("appl", "apple juice");
        let banana = similarity_score("appl", "banana");
        assert!(juice > banana, "apple juice={juice}, banana={banana}");
    }

    #[test]
    fn word_overlap_is_relative_to_longer_word_list() {
        // "appl" is contained in "apple": 1 of max(1, 2) words => 40.
        assert_eq!(similarity_score("appl", "apple juice"), 40);
        // Both words found in a two-word candidate => 80.
        assert_eq!(similarity_score("rice milk", "milk rice"), 80);
    }

    #[test]
    fn character_signal_counts_length_difference_as_mismatch() {
        // No shared words; "milk" vs "mile": 3 of 4 positions match => 45.
        assert_eq!(similarity_score("milk", "mile"), 45);
        // "abc" vs "abcdef" shares words via containment, so overlap wins (80).
        assert_eq!(similarity_score("abc", "abcdef"), 80);
    }

    #[test]
    fn character_signal_is_sensitive_to_leading_misalignment() {
        // Shifted by one character: no positional matches, no shared words.
        assert_eq!(similarity_score("xmilk", "milky"), 0);
    }

    #[test]
    fn blank_names_score_zero() {
        assert_eq!(similarity_score("", ""), 0);
        assert_eq!(similarity_score("milk", "   "), 0);
        assert_eq!(similarity_score("", "milk"), 0);
    }

    #[test]
    fn non_ascii_names_compare_by_character() {
        assert_eq!(similarity_score("café", "CAFÉ"), 100);
        assert_eq!(similarity_score("jamón", "jamon"), 48);
    }

    #[test]
    fn score_is_deterministic_and_bounded() {
        let pairs = [
            ("rice", "basmati rice 1kg"),
            ("organic whole milk", "milk"),
            ("a", "b"),
            ("tomato", "tomatoes"),
        ];
        for (q, c) in pairs {
            let first = similarity_score(q, c);
            assert_eq!(first, similarity_score(q, c));
            assert!(first <= 100);
        }
    }
}
