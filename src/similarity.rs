//! Fuzzy author name comparison.

use std::collections::HashMap;

use unicode_normalization::UnicodeNormalization;

/// Default threshold when the folder name is the only evidence.
pub const DEFAULT_NAME_THRESHOLD: f64 = 0.85;

/// Default threshold when identical folder content is also required.
pub const DEFAULT_CONTENT_THRESHOLD: f64 = 0.7;

/// Normalize a name for comparison: decompose accented characters,
/// drop everything that is not ASCII, and lowercase.
///
/// ```rust
/// use ebook_tools::similarity::normalize_name;
///
/// assert_eq!(normalize_name("García, José"), "garcia, jose");
/// ```
#[must_use]
pub fn normalize_name(name: &str) -> String {
    name.nfkd().filter(char::is_ascii).collect::<String>().to_lowercase()
}

/// Check if two names are similar enough to belong to the same author.
///
/// True only when the similarity ratio of the normalized names is strictly above `threshold`.
#[must_use]
pub fn is_similar(a: &str, b: &str, threshold: f64) -> bool {
    name_similarity(a, b) > threshold
}

/// Similarity ratio of two names after normalization, in range `[0, 1]`.
#[must_use]
pub fn name_similarity(a: &str, b: &str) -> f64 {
    let a = normalize_name(a);
    let b = normalize_name(b);
    // Block matching is order dependent on ties, so always compare in the same order.
    if a <= b { sequence_ratio(&a, &b) } else { sequence_ratio(&b, &a) }
}

/// Ratcliff/Obershelp similarity: `2 * M / T`,
/// where `M` is the number of characters in matching blocks and `T` the combined length.
///
/// Two empty strings are identical.
#[must_use]
pub fn sequence_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_characters(&a, &b) as f64 / total as f64
}

/// Total length of the matching blocks.
///
/// Finds the longest common block, then repeats on the unmatched parts to its left and right.
fn matching_characters(a: &[char], b: &[char]) -> usize {
    let mut positions: HashMap<char, Vec<usize>> = HashMap::new();
    for (index, &c) in b.iter().enumerate() {
        positions.entry(c).or_default().push(index);
    }

    let mut matched = 0;
    let mut ranges = vec![(0, a.len(), 0, b.len())];
    while let Some((a_low, a_high, b_low, b_high)) = ranges.pop() {
        let (i, j, size) = longest_match(a, &positions, (a_low, a_high), (b_low, b_high));
        if size == 0 {
            continue;
        }
        matched += size;
        if a_low < i && b_low < j {
            ranges.push((a_low, i, b_low, j));
        }
        if i + size < a_high && j + size < b_high {
            ranges.push((i + size, a_high, j + size, b_high));
        }
    }
    matched
}

/// Longest block common to `a[a_low..a_high]` and `b[b_low..b_high]`.
///
/// Returns `(start_in_a, start_in_b, length)`.
/// Ties go to the block starting earliest in `a`, then earliest in `b`.
fn longest_match(
    a: &[char],
    positions: &HashMap<char, Vec<usize>>,
    (a_low, a_high): (usize, usize),
    (b_low, b_high): (usize, usize),
) -> (usize, usize, usize) {
    let mut best = (a_low, b_low, 0);
    // Length of the match ending at a given index of `b` for the previous index of `a`.
    let mut lengths: HashMap<usize, usize> = HashMap::new();

    for (i, c) in a.iter().enumerate().take(a_high).skip(a_low) {
        let mut next_lengths = HashMap::new();
        if let Some(indices) = positions.get(c) {
            for &j in indices.iter().skip_while(|&&j| j < b_low).take_while(|&&j| j < b_high) {
                let length = j.checked_sub(1).and_then(|prev| lengths.get(&prev)).copied().unwrap_or(0) + 1;
                next_lengths.insert(j, length);
                if length > best.2 {
                    best = (i + 1 - length, j + 1 - length, length);
                }
            }
        }
        lengths = next_lengths;
    }

    best
}
