//! Dynamic-time-warping similarity between normalised price sequences.
//!
//! Cost is the absolute difference between aligned samples. The warping table
//! is filled row by row, keeping only two rows live, so memory is
//! `O(min(|a|, |b|))` while time stays `O(|a|·|b|)`. Callers are expected to
//! pass pattern-sized windows, not whole series.

/// DTW distance between two sequences.
///
/// Returns `f64::INFINITY` if either sequence is empty (no alignment exists).
///
/// # Example
/// ```rust
/// use fractal_market::similarity::dtw_distance;
///
/// assert_eq!(dtw_distance(&[0.0, 0.5, 1.0], &[0.0, 0.5, 1.0]), 0.0);
/// assert_eq!(dtw_distance(&[0.0, 1.0], &[0.0, 0.0, 1.0]), 0.0);
/// ```
pub fn dtw_distance(a: &[f64], b: &[f64]) -> f64 {
    if a.is_empty() || b.is_empty() {
        return f64::INFINITY;
    }

    let mut previous = vec![f64::INFINITY; b.len() + 1];
    let mut current = vec![f64::INFINITY; b.len() + 1];
    previous[0] = 0.0;

    for &x in a {
        current[0] = f64::INFINITY;
        for (j, &y) in b.iter().enumerate() {
            let best = previous[j + 1].min(current[j]).min(previous[j]);
            current[j + 1] = (x - y).abs() + best;
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()]
}

/// DTW similarity in `[0, 1]`: `max(0, 1 − distance / max(|a|, |b|))`.
///
/// Symmetric in its arguments, 1 for identical non-empty inputs and 0 when
/// either input is empty.
pub fn dtw_similarity(a: &[f64], b: &[f64]) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let distance = dtw_distance(a, b);
    let longest = a.len().max(b.len()) as f64;
    (1.0 - distance / longest).max(0.0)
}

/// Highest DTW similarity between `candidate` and any reference; 0 when there
/// are no references.
pub fn max_similarity<'a, I>(candidate: &[f64], references: I) -> f64
where
    I: IntoIterator<Item = &'a [f64]>,
{
    references
        .into_iter()
        .map(|reference| dtw_similarity(candidate, reference))
        .fold(0.0, f64::max)
}
