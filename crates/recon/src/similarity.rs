use crate::normalize::sorted_tokens;

/// Length of the longest common subsequence of `a` and `b`, by `char`.
fn lcs_len(a: &[char], b: &[char]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut cur = vec![0usize; b.len() + 1];
    for &ca in a {
        for (j, &cb) in b.iter().enumerate() {
            cur[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                prev[j + 1].max(cur[j])
            };
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    prev[b.len()]
}

/// Indel similarity `2·LCS / (len_a + len_b)` on a 0..=100 scale, rounded
/// half up. Either side empty scores 0.
fn indel_ratio(a: &str, b: &str) -> u8 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let lcs = lcs_len(&a, &b);
    ((400 * lcs + total) / (2 * total)) as u8
}

/// Token-order-insensitive name similarity on a 0..=100 scale.
///
/// Both inputs are expected to be clean names. Tokens are sorted before the
/// indel comparison, so "kofi asante yaw" and "yaw kofi asante" score 100.
/// An empty side scores 0.
pub fn token_sort_ratio(a: &str, b: &str) -> u8 {
    indel_ratio(&sorted_tokens(a), &sorted_tokens(b))
}

/// Best-scoring candidate for `query`, first one wins on ties.
///
/// Returns the candidate index and its score. Empty candidates are skipped.
pub fn best_match<'a, I>(query: &str, candidates: I) -> Option<(usize, u8)>
where
    I: IntoIterator<Item = &'a str>,
{
    if query.is_empty() {
        return None;
    }
    let query = sorted_tokens(query);
    let mut best: Option<(usize, u8)> = None;
    for (idx, candidate) in candidates.into_iter().enumerate() {
        if candidate.is_empty() {
            continue;
        }
        let score = indel_ratio(&query, &sorted_tokens(candidate));
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((idx, score));
            if score == 100 {
                break;
            }
        }
    }
    best
}
