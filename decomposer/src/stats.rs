//! Robust statistics on the mismatch scores.

/// The element at len/2 in the sorted order. For an even length, it is the upper median.
pub fn median(xs: &[u32]) -> Option<u32> {
    if xs.is_empty() {
        return None;
    }
    let mut xs = xs.to_vec();
    let idx = xs.len() / 2;
    Some(*xs.select_nth_unstable(idx).1)
}

/// Median of the absolute deviations from `median`.
pub fn median_absolute_deviation(xs: &[u32], median: u32) -> Option<u32> {
    let deviations: Vec<_> = xs.iter().map(|&x| x.max(median) - x.min(median)).collect();
    self::median(&deviations)
}

/// median - madc * MAD, truncated toward zero and never below `floor`.
pub fn robust_threshold(scores: &[u32], madc: f64, floor: i64) -> i64 {
    let med = median(scores).unwrap_or(0);
    let mad = median_absolute_deviation(scores, med).unwrap_or(0);
    let spread = madc * mad as f64;
    let thres = if spread < med as f64 {
        (med as f64 - spread) as i64
    } else {
        0
    };
    trace!("THRES\t{}\t{}\t{}", med, mad, thres);
    thres.max(floor)
}

/// Shift lengths scoring below `thres` and less than half of a neighbor.
pub fn local_minima(scores: &[u32], thres: i64) -> Vec<usize> {
    scores
        .iter()
        .enumerate()
        .filter(|&(_, &score)| (score as i64) < thres)
        .filter(|&(i, &score)| {
            let next = scores.get(i + 1).map_or(false, |&next| 2 * score < next);
            let prev = i > 0 && 2 * score < scores[i - 1];
            next || prev
        })
        .map(|(i, _)| i)
        .collect()
}
