//! Edit distance and candidate ranking shared by both catalogs.

/// Case-insensitive Levenshtein distance.
pub fn levenshtein(a: &str, b: &str) -> usize {
    strsim::levenshtein(&a.to_lowercase(), &b.to_lowercase())
}

fn is_prefix_either_way(a: &str, b: &str) -> bool {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    a.starts_with(&b) || b.starts_with(&a)
}

/// Distance with a one-step bonus when one string is a prefix of the other.
pub fn effective_distance(text: &str, candidate: &str) -> (usize, usize) {
    let raw = levenshtein(text, candidate);
    let effective = if raw > 0 && is_prefix_either_way(text, candidate) {
        raw - 1
    } else {
        raw
    };
    (effective, raw)
}

/// The candidate closest to `text` within `threshold`. Ties go to the smaller
/// raw distance, then the shorter candidate, then the lexicographically
/// smaller one.
pub fn nearest<'c>(
    text: &str,
    candidates: impl IntoIterator<Item = &'c str>,
    threshold: usize,
) -> Option<&'c str> {
    candidates
        .into_iter()
        .filter_map(|candidate| {
            let (effective, raw) = effective_distance(text, candidate);
            (effective <= threshold).then_some((effective, raw, candidate.len(), candidate))
        })
        .min()
        .map(|(_, _, _, candidate)| candidate)
}
