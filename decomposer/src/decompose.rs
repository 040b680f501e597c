//! Decomposition of the alleles around the breakpoint.
//!
//! Starting from the breakpoint, every deletion length and insertion length is tried by
//! shifting the reference row of the alignment against the base calls. The number of
//! reference bases which can not be explained by the primary call nor by the phased secondary
//! call is the score of the shift. The smallest shift whose score is below the robust threshold
//! and less than half of one of its neighbors is committed into the base calls.
use crate::breakpoint::{find_breakpoint, find_homozygous_breakpoint};
use crate::phasing::phase_reference_allele;
use crate::profile::Profile;
use crate::stats::{local_minima, robust_threshold};
use crate::{DecomposeConfig, DecomposeError};
use definitions::*;
use std::path::{Path, PathBuf};

/// A pair should score less than this value to be a complex decomposition.
pub const COMPLEX_SCORE_LIMIT: u32 = 1000;

pub trait Decompose {
    /// Detect the breakpoint of each sample. Return the number of the failed samples.
    fn detect_breakpoints(&mut self, config: &DecomposeConfig) -> usize;
    /// Decompose the alleles of each sample. Return the number of the failed samples.
    fn decompose_indels(&mut self, config: &DecomposeConfig) -> usize;
}

impl Decompose for DataSet {
    fn detect_breakpoints(&mut self, config: &DecomposeConfig) -> usize {
        use rayon::prelude::*;
        self.samples
            .par_iter_mut()
            .map(|sample| match detect_breakpoint(config, sample) {
                Ok(bp) => {
                    debug!("BP\t{}\t{}\t{}", sample.name, bp.breakpoint, bp.indelshift);
                    sample.breakpoint = Some(bp);
                    false
                }
                Err(why) => {
                    warn!("{}\t{}", sample.name, why);
                    true
                }
            })
            .filter(|&failed| failed)
            .count()
    }
    fn decompose_indels(&mut self, config: &DecomposeConfig) -> usize {
        use rayon::prelude::*;
        self.samples
            .par_iter_mut()
            .map(|sample| match resolve_sample(config, sample) {
                Ok(decomposition) => {
                    debug!("DECOMP\t{}\t{}", sample.name, decomposition);
                    false
                }
                Err(why) => {
                    warn!("{}\t{}", sample.name, why);
                    true
                }
            })
            .filter(|&failed| failed)
            .count()
    }
}

/// The breakpoint from the signal of the trace. If the trace has no indel shift,
/// the breakpoint of a homozygous mutation is estimated from the alignment.
pub fn detect_breakpoint(
    config: &DecomposeConfig,
    sample: &Sample,
) -> Result<TraceBreakpoint, DecomposeError> {
    if !sample.is_consistent() {
        return Err(DecomposeError::InconsistentInput(sample.name.clone()));
    }
    let (trace, bc) = (&sample.trace, &sample.basecalls);
    let profile = Profile::from_trace_trimmed(trace, bc, config.trim_left, config.trim_right);
    let bp = find_breakpoint(&profile, config);
    if bp.indelshift {
        Ok(bp)
    } else {
        find_homozygous_breakpoint(&sample.alignment, config)
    }
}

/// Decompose the alleles of `sample`. A breakpoint already stored in the sample is used as it is,
/// otherwise it is detected first.
/// The breakpoint, the outcome, and the decomposition table are stored in the sample.
pub fn resolve_sample(
    config: &DecomposeConfig,
    sample: &mut Sample,
) -> Result<Decomposition, DecomposeError> {
    let bp = match sample.breakpoint {
        Some(bp) if sample.is_consistent() => bp,
        Some(_) => return Err(DecomposeError::InconsistentInput(sample.name.clone())),
        None => detect_breakpoint(config, sample)?,
    };
    sample.breakpoint = Some(bp);
    let Sample {
        alignment,
        basecalls,
        reference,
        table,
        ..
    } = sample;
    table.clear();
    let decomposition = decompose_alleles(config, alignment, basecalls, &bp, reference, table);
    sample.decomposition = Some(decomposition);
    Ok(decomposition)
}

// The position of the breakpoint in the alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Anchor {
    align_index: usize,
    var_index: usize,
    // # of reference bases passed.
    ref_pointer: usize,
}

// If the reference base differs from the primary call, try to put it on the primary allele.
fn phase_into(bc: &mut BaseCalls, r: u8, vi: usize) {
    if r != bc.primary[vi] {
        let sec = phase_reference_allele(bc, r, vi);
        if sec != NO_CALL {
            bc.primary[vi] = r;
            bc.secondary[vi] = sec;
        }
    }
}

// Walk the alignment up to the breakpoint, phasing the calls on the way.
// If the breakpoint is never reached, the anchor stays at the start of the alignment.
fn locate_breakpoint(aln: &Alignment, bc: &mut BaseCalls, breakpoint: usize, vi: usize) -> Anchor {
    let (mut vi, mut ref_pointer) = (vi, 0);
    for j in 0..aln.len() {
        if aln.query(j) != GAP && vi < bc.len() {
            phase_into(bc, aln.reference(j), vi);
            vi += 1;
            if vi == breakpoint {
                return Anchor {
                    align_index: j,
                    var_index: vi,
                    ref_pointer,
                };
            }
        }
        if aln.reference(j) != GAP {
            ref_pointer += 1;
        }
    }
    Anchor {
        align_index: 0,
        var_index: 0,
        ref_pointer,
    }
}

// Alignment columns after the anchor paired with the called positions, shifted by (ins, del).
struct ShiftWalk<'a> {
    aln: &'a Alignment,
    anchor: Anchor,
    // Called positions at or after this index are not examined.
    end: usize,
}

impl<'a> ShiftWalk<'a> {
    fn pairs(&self, ins: usize, del: usize) -> impl Iterator<Item = (usize, usize)> {
        let columns = self.anchor.align_index + del + 1..self.aln.len();
        columns.zip(self.anchor.var_index + ins..self.end)
    }
    // # of reference bases not explained by the calls.
    fn score(&self, bc: &BaseCalls, ins: usize, del: usize) -> u32 {
        self.pairs(ins, del)
            .filter(|&(j, vi)| {
                let r = self.aln.reference(j);
                r != bc.primary[vi] && phase_reference_allele(bc, r, vi) == NO_CALL
            })
            .count() as u32
    }
    fn commit(&self, bc: &mut BaseCalls, ins: usize, del: usize) {
        for (j, vi) in self.pairs(ins, del) {
            phase_into(bc, self.aln.reference(j), vi);
        }
    }
}

/// Decompose the alleles around `bp` and rewrite the primary and the secondary calls accordingly.
/// The scores of the shifts are appended to `table`.
/// Only `bc.primary` and `bc.secondary` are modified. If nothing explains the reference, they are left unchanged.
pub fn decompose_alleles(
    config: &DecomposeConfig,
    aln: &Alignment,
    bc: &mut BaseCalls,
    bp: &TraceBreakpoint,
    rs: &ReferenceSlice,
    table: &mut DecompositionTable,
) -> Decomposition {
    let (ltrim, rtrim) = (config.trim_left, config.trim_right);
    let breakpoint = bp.breakpoint + ltrim;
    let anchor = locate_breakpoint(aln, bc, breakpoint, ltrim);
    trace!("ANCHOR\t{:?}", anchor);
    let end = bc.consensus.len().saturating_sub(rtrim).min(bc.len());
    let walk = ShiftWalk { aln, anchor, end };
    // Deletions.
    let max_del = match anchor.ref_pointer + rtrim + 2 < rs.refslice.len() {
        true => rs.refslice.len() - (anchor.ref_pointer + rtrim),
        false => 2,
    };
    let del_bound = config.max_indel.min(max_del / 2);
    let fref: Vec<_> = (0..del_bound).map(|del| walk.score(bc, 0, del)).collect();
    if fref.is_empty() {
        warn!("No deletion length to examine, primary & secondary base calls unchanged.");
        return Decomposition::Unresolved;
    }
    let thres = robust_threshold(&fref, config.madc, config.threshold_floor);
    let deldecomp = local_minima(&fref, thres);
    // Insertions. No shift is shared with the deletions.
    let max_ins = bc.consensus.len().saturating_sub(rtrim + breakpoint);
    let ins_bound = config.max_indel.min(max_ins / 2);
    let fins: Vec<_> = std::iter::once(fref[0])
        .chain((1..ins_bound).map(|ins| walk.score(bc, ins, 0)))
        .collect();
    let insdecomp = local_minima(&fins, thres);
    debug!("DECOMP\tDEL\t{:?}\tINS\t{:?}\tTHR\t{}", deldecomp, insdecomp, thres);
    push_table(config, &fref, &fins, &deldecomp, &insdecomp, table);
    match (deldecomp.first(), insdecomp.first()) {
        (Some(&del), _) => {
            walk.commit(bc, 0, del);
            Decomposition::Deletion(del)
        }
        (None, Some(&ins)) => {
            walk.commit(bc, ins, 0);
            Decomposition::Insertion(ins)
        }
        (None, None) => match complex_search(&walk, bc, ins_bound, del_bound) {
            Some((ins, del, score)) => {
                info!(
                    "Complex mutation, decomposition: ins: {}, del: {}, error: {}",
                    ins, del, score
                );
                walk.commit(bc, ins, del);
                Decomposition::Complex { ins, del, score }
            }
            None => {
                warn!("Allele decomposition failed, primary & secondary base calls unchanged.");
                Decomposition::Unresolved
            }
        },
    }
}

// Joint search of (ins, del). A pair is a candidate if its score is less than half of
// the score of the previous deletion length. The lowest candidate is returned.
fn complex_search(
    walk: &ShiftWalk,
    bc: &BaseCalls,
    ins_bound: usize,
    del_bound: usize,
) -> Option<(usize, usize, u32)> {
    let mut best: Option<(usize, usize, u32)> = None;
    for ins in 0..ins_bound {
        let mut prev = 0;
        for del in 0..del_bound {
            let score = walk.score(bc, ins, del);
            let best_score = best.map_or(COMPLEX_SCORE_LIMIT, |x| x.2);
            if 2 * score < prev && score < best_score {
                best = Some((ins, del, score));
            }
            prev = score;
        }
    }
    best
}

// Scores around the candidates, deletions first.
fn push_table(
    config: &DecomposeConfig,
    fref: &[u32],
    fins: &[u32],
    deldecomp: &[usize],
    insdecomp: &[usize],
    table: &mut DecompositionTable,
) {
    let default = match deldecomp.is_empty() && insdecomp.is_empty() {
        true => config.table_width_unresolved,
        false => config.table_width,
    };
    let width = |found: &[usize], len: usize| {
        found
            .iter()
            .map(|&i| i + config.table_width)
            .fold(default, usize::max)
            .min(len)
    };
    let defdel = width(deldecomp, fref.len());
    let defins = width(insdecomp, fins.len());
    table.extend((0..defdel).rev().map(|i| (-(i as i64), fref[i])));
    table.extend((1..defins).map(|i| (i as i64, fins[i])));
}

/// The path of the decomposition table for the output `out`.
pub fn decomposition_path<P: AsRef<Path>>(out: P) -> PathBuf {
    let mut path = out.as_ref().as_os_str().to_owned();
    path.push(".decomp");
    PathBuf::from(path)
}

pub fn write_decomposition<W: std::io::Write>(
    table: &[(i64, u32)],
    mut wtr: W,
) -> std::io::Result<()> {
    writeln!(wtr, "indel\tdecomp")?;
    for (indel, score) in table.iter() {
        writeln!(wtr, "{}\t{}", indel, score)?;
    }
    Ok(())
}
