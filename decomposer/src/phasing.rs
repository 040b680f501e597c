//! Phasing of the minor allele by IUPAC ambiguity codes.
use definitions::{BaseCalls, NO_CALL};

// Ambiguity code -> the two bases it stands for.
const AMBIGUITY_PAIRS: [(u8, (u8, u8)); 6] = [
    (b'R', (b'A', b'G')),
    (b'Y', (b'C', b'T')),
    (b'S', (b'C', b'G')),
    (b'W', (b'A', b'T')),
    (b'K', (b'G', b'T')),
    (b'M', (b'A', b'C')),
];

pub fn ambiguity_pair(code: u8) -> Option<(u8, u8)> {
    AMBIGUITY_PAIRS
        .iter()
        .find(|&&(c, _)| c == code)
        .map(|&(_, pair)| pair)
}

/// The code for {a, b}. Identical bases give the base itself, and anything else gives N.
pub fn iupac(a: u8, b: u8) -> u8 {
    if a == b {
        return a;
    }
    AMBIGUITY_PAIRS
        .iter()
        .find(|&&(_, (x, y))| (x, y) == (a, b) || (y, x) == (a, b))
        .map_or(NO_CALL, |&(code, _)| code)
}

/// The secondary call at `idx` if the reference base `r` is placed on the primary allele.
/// Returns N if `r` is not compatible with the heterozygosity of the position.
pub fn phase_reference_allele(bc: &BaseCalls, r: u8, idx: usize) -> u8 {
    let (primary, secondary) = (bc.primary[idx], bc.secondary[idx]);
    if secondary == r {
        return primary;
    }
    match ambiguity_pair(secondary) {
        Some((x, y)) if r == x => iupac(primary, y),
        Some((x, y)) if r == y => iupac(primary, x),
        _ => NO_CALL,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use definitions::DNASeq;
    fn calls(primary: &[u8], secondary: &[u8]) -> BaseCalls {
        let primary: DNASeq = primary.into();
        BaseCalls::new(
            primary.clone(),
            primary,
            secondary.into(),
            (0..secondary.len()).collect(),
        )
    }
    #[test]
    fn iupac_test() {
        assert_eq!(iupac(b'A', b'A'), b'A');
        assert_eq!(iupac(b'C', b'G'), b'S');
        assert_eq!(iupac(b'G', b'C'), b'S');
        assert_eq!(iupac(b'T', b'A'), b'W');
        assert_eq!(iupac(b'A', b'N'), b'N');
        for &(code, (x, y)) in AMBIGUITY_PAIRS.iter() {
            assert_eq!(iupac(x, y), code);
            assert_eq!(ambiguity_pair(code), Some((x, y)));
        }
        assert_eq!(ambiguity_pair(b'A'), None);
    }
    #[test]
    fn phase_ambiguity_code() {
        let bc = calls(b"C", b"R");
        assert_eq!(phase_reference_allele(&bc, b'A', 0), b'S');
        assert_eq!(phase_reference_allele(&bc, b'G', 0), b'M');
        assert_eq!(phase_reference_allele(&bc, b'T', 0), NO_CALL);
        let bc = calls(b"G", b"R");
        assert_eq!(phase_reference_allele(&bc, b'A', 0), b'G');
    }
    #[test]
    fn phase_plain_base() {
        let bc = calls(b"AGT", b"CNA");
        assert_eq!(phase_reference_allele(&bc, b'C', 0), b'A');
        assert_eq!(phase_reference_allele(&bc, b'G', 0), NO_CALL);
        assert_eq!(phase_reference_allele(&bc, b'A', 1), NO_CALL);
        assert_eq!(phase_reference_allele(&bc, b'A', 2), b'T');
        assert_eq!(phase_reference_allele(&bc, b'-', 2), NO_CALL);
    }
}
