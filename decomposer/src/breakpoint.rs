//! Breakpoint detection. The breakpoint is the position where the statistics
//! (the confidence of the signal, or the identity of the alignment) changes most sharply.
use crate::profile::Profile;
use crate::{DecomposeConfig, DecomposeError};
use definitions::*;

// best - second best. Both start from 0.001.
fn confidence_gap<I: Iterator<Item = f64>>(column: I) -> f64 {
    let (mut best, mut snd_best) = (0.001, 0.001);
    for w in column {
        if best < w {
            snd_best = best;
            best = w;
        } else if snd_best < w {
            snd_best = w;
        }
    }
    best - snd_best
}

fn mean(xs: &[f64]) -> f64 {
    xs.iter().sum::<f64>() / xs.len() as f64
}

/// Breakpoint of the trace, i.e., the called position where the secondary signal appears or disappears.
/// `traceleft` is true if the signal is more confident on the left.
pub fn find_breakpoint(profile: &Profile, config: &DecomposeConfig) -> TraceBreakpoint {
    let sigratio: Vec<_> = (0..profile.len())
        .map(|j| confidence_gap(profile.column(j)))
        .collect();
    let window = config.window;
    let mut bp = TraceBreakpoint::new(0, true, 0f64);
    for i in window..sigratio.len().saturating_sub(window) {
        let left = mean(&sigratio[i - window..i]);
        let right = mean(&sigratio[i..i + window]);
        let diff = (right - left).abs();
        if bp.best_diff < diff {
            bp = TraceBreakpoint::new(i, right <= left, diff);
        }
    }
    if bp.best_diff < config.min_diff {
        debug!("NOSHIFT\t{:.3}", bp.best_diff);
        TraceBreakpoint::no_shift(profile.len())
    } else {
        debug!("SHIFT\t{}\t{:.3}", bp.breakpoint, bp.best_diff);
        bp
    }
}

/// Breakpoint of a homozygous mutation, estimated by the identity of the alignment.
/// The returned breakpoint is the number of non-gap bases in the consensus up to the breakpoint.
/// Note that `traceleft` is true if the mismatches are more frequent on the right.
pub fn find_homozygous_breakpoint(
    aln: &Alignment,
    config: &DecomposeConfig,
) -> Result<TraceBreakpoint, DecomposeError> {
    let is_aligned = |j: usize| aln.query(j) != GAP && aln.reference(j) != GAP;
    let start = (0..aln.len()).find(|&j| is_aligned(j));
    let end = (0..aln.len()).rev().find(|&j| is_aligned(j));
    let (start, end) = match (start, end) {
        (Some(start), Some(end)) if start < end => (start, end),
        _ => {
            error!("No valid alignment found between consensus and reference!");
            return Err(DecomposeError::NoValidAlignmentSpan);
        }
    };
    let window = config.window;
    let mismatch_rate = |range: std::ops::Range<usize>| {
        let mism = range.filter(|&k| aln.query(k) != aln.reference(k)).count();
        mism as f64 / window as f64
    };
    let mut var_index = (0..(start + window).min(aln.len()))
        .filter(|&j| aln.query(j) != GAP)
        .count();
    let mut bp = TraceBreakpoint::new(0, true, 0f64);
    for i in start + window..end.saturating_sub(window) {
        if aln.query(i) != GAP {
            var_index += 1;
        }
        let left = mismatch_rate(i - window..i);
        let right = mismatch_rate(i..i + window);
        let diff = (right - left).abs();
        if bp.best_diff < diff {
            bp = TraceBreakpoint::new(var_index, left < right, diff);
        }
    }
    if bp.best_diff < config.min_diff {
        debug!("NOSHIFT\t{:.3}", bp.best_diff);
        Ok(TraceBreakpoint::no_shift(var_index))
    } else {
        debug!("SHIFT\t{}\t{:.3}", bp.breakpoint, bp.best_diff);
        Ok(bp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    const CONFIDENT: [u16; 4] = [100, 0, 0, 0];
    const MIXED: [u16; 4] = [50, 50, 0, 0];
    // Profile of `len` columns, switching from `first` to `second` at `at`.
    fn step_profile(len: usize, at: usize, first: [u16; 4], second: [u16; 4]) -> Profile {
        let channel = |k: usize| -> Vec<u16> {
            (0..len)
                .map(|j| if j < at { first[k] } else { second[k] })
                .collect()
        };
        let trace = Trace::new(channel(0), channel(1), channel(2), channel(3)).unwrap();
        let bc = BaseCalls {
            bc_pos: (0..len).collect(),
            ..Default::default()
        };
        Profile::from_trace(&trace, &bc)
    }
    #[test]
    fn confidence_gap_test() {
        let gap = confidence_gap(vec![0.5, 0.5, 0., 0., 0., 0.].into_iter());
        assert!(gap.abs() < 0.00001);
        let gap = confidence_gap(vec![0.1, 0.7, 0.2, 0., 0., 0.].into_iter());
        assert!((gap - 0.5).abs() < 0.00001);
        let gap = confidence_gap(vec![0.; 6].into_iter());
        assert!(gap.abs() < 0.00001);
    }
    #[test]
    fn sharp_step() {
        let config = DecomposeConfig::default();
        let profile = step_profile(100, 40, CONFIDENT, MIXED);
        let bp = find_breakpoint(&profile, &config);
        assert!(bp.indelshift);
        assert_eq!(bp.breakpoint, 40);
        assert!(bp.traceleft);
        assert!((bp.best_diff - 0.999).abs() < 0.0001);
        let profile = step_profile(100, 57, MIXED, CONFIDENT);
        let bp = find_breakpoint(&profile, &config);
        assert!(bp.indelshift);
        assert_eq!(bp.breakpoint, 57);
        assert!(!bp.traceleft);
    }
    #[test]
    fn flat_signal() {
        let config = DecomposeConfig::default();
        let profile = step_profile(100, 100, MIXED, MIXED);
        let bp = find_breakpoint(&profile, &config);
        assert_eq!(bp, TraceBreakpoint::no_shift(100));
        let profile = step_profile(80, 80, CONFIDENT, CONFIDENT);
        assert_eq!(find_breakpoint(&profile, &config), TraceBreakpoint::no_shift(80));
        // Too short to have two windows.
        let profile = step_profile(40, 20, CONFIDENT, MIXED);
        assert_eq!(find_breakpoint(&profile, &config), TraceBreakpoint::no_shift(40));
    }
    #[test]
    fn overridden_window() {
        let config = DecomposeConfig {
            window: 5,
            ..Default::default()
        };
        let profile = step_profile(20, 7, CONFIDENT, MIXED);
        let bp = find_breakpoint(&profile, &config);
        assert_eq!(bp.breakpoint, 7);
        let config = DecomposeConfig {
            min_diff: 1.5,
            ..Default::default()
        };
        let profile = step_profile(100, 40, CONFIDENT, MIXED);
        assert!(!find_breakpoint(&profile, &config).indelshift);
    }
    // Three query-only columns, then 120 aligned columns mismatching from `at`,
    // or matching only from `at` if `flip` is true.
    fn step_alignment(at: usize, flip: bool) -> Alignment {
        let mut query = b"GGG".to_vec();
        let mut reference = b"---".to_vec();
        for j in 0..120 {
            query.push(b'A');
            reference.push(if (j < at) != flip { b'A' } else { b'C' });
        }
        Alignment::new(query.into(), reference.into()).unwrap()
    }
    #[test]
    fn homozygous_step() {
        let config = DecomposeConfig::default();
        let bp = find_homozygous_breakpoint(&step_alignment(60, false), &config).unwrap();
        assert!(bp.indelshift);
        // Non-gap query bases in [0, 63].
        assert_eq!(bp.breakpoint, 64);
        assert!(bp.traceleft);
        assert!((bp.best_diff - 1f64).abs() < 0.0001);
        let bp = find_homozygous_breakpoint(&step_alignment(60, true), &config).unwrap();
        assert_eq!(bp.breakpoint, 64);
        assert!(!bp.traceleft);
    }
    #[test]
    fn homozygous_no_shift() {
        let config = DecomposeConfig::default();
        let bp = find_homozygous_breakpoint(&step_alignment(120, false), &config).unwrap();
        // The scan stops before the last window: [0, 97) has 97 query bases.
        assert_eq!(bp, TraceBreakpoint::no_shift(97));
    }
    #[test]
    fn homozygous_no_span() {
        let config = DecomposeConfig::default();
        let aln = Alignment::new(b"AC--".to_vec().into(), b"--GT".to_vec().into()).unwrap();
        let result = find_homozygous_breakpoint(&aln, &config);
        assert!(matches!(result, Err(DecomposeError::NoValidAlignmentSpan)));
        let aln = Alignment::new(b"---".to_vec().into(), b"---".to_vec().into()).unwrap();
        assert!(find_homozygous_breakpoint(&aln, &config).is_err());
        let aln = Alignment::new(b"-A-".to_vec().into(), b"AAA".to_vec().into()).unwrap();
        assert!(find_homozygous_breakpoint(&aln, &config).is_err());
        let aln = Alignment::default();
        assert!(find_homozygous_breakpoint(&aln, &config).is_err());
    }
}
