//! String similarity scoring for the fuzzy lookup fallback.
//!
//! Implements Jaro similarity: a score in `[0, 1]` based on the number of
//! matched characters within a sliding window and the number of
//! transpositions among them. Favors agreement near the start of the
//! strings, which suits dictionary headwords where typos cluster at the
//! tail.

/// Jaro similarity between two strings.
///
/// Returns `1.0` iff the strings are equal (two empty strings included) and
/// `0.0` when exactly one of them is empty. Operates on Unicode scalar
/// values, not bytes.
pub fn jaro(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }

    let s1: Vec<char> = a.chars().collect();
    let s2: Vec<char> = b.chars().collect();
    let (len1, len2) = (s1.len(), s2.len());
    if len1 == 0 || len2 == 0 {
        return 0.0;
    }

    // Characters only match within a window around the same position.
    let window = (len1.max(len2) / 2).saturating_sub(1);

    let mut matched1 = vec![false; len1];
    let mut matched2 = vec![false; len2];
    let mut matches = 0usize;

    for i in 0..len1 {
        let start = i.saturating_sub(window);
        let end = (i + window + 1).min(len2);
        for j in start..end {
            if matched2[j] || s1[i] != s2[j] {
                continue;
            }
            matched1[i] = true;
            matched2[j] = true;
            matches += 1;
            break;
        }
    }

    if matches == 0 {
        return 0.0;
    }

    // Walk the matched characters of both strings in order; every mismatch
    // at the same rank is half a transposition.
    let mut half_transpositions = 0usize;
    let mut k = 0usize;
    for i in 0..len1 {
        if !matched1[i] {
            continue;
        }
        while !matched2[k] {
            k += 1;
        }
        if s1[i] != s2[k] {
            half_transpositions += 1;
        }
        k += 1;
    }
    let transpositions = half_transpositions / 2;

    let m = matches as f64;
    (m / len1 as f64 + m / len2 as f64 + (m - transpositions as f64) / m) / 3.0
}

/// Best-scoring candidate for `word`.
///
/// Linear scan; strict greater-than comparison keeps the first-seen
/// candidate on ties, so the result is deterministic only when the
/// iteration order is. Returns `None` for an empty candidate set or when no
/// candidate scores above `0.0`.
pub fn find_best_match<'a, I>(word: &str, candidates: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut best = None;
    let mut best_score = 0.0f64;
    for candidate in candidates {
        let score = jaro(word, candidate);
        if score > best_score {
            best_score = score;
            best = Some(candidate);
        }
    }
    best
}
