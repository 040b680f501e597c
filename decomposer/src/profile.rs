//! Per-position weights over A, C, G, T, N, and gap.
use crate::DecomposeError;
use definitions::*;

pub const ROWS: usize = 6;
/// The base corresponding to each row.
pub const ALPHABET: &[u8; ROWS] = b"ACGTN-";
// Row -> row of the complementary base.
const COMPLEMENT_ROW: [usize; ROWS] = [3, 2, 1, 0, 4, 5];

fn b2i(b: u8) -> usize {
    match b {
        b'A' | b'a' => 0,
        b'C' | b'c' => 1,
        b'G' | b'g' => 2,
        b'T' | b't' => 3,
        GAP => 5,
        _ => 4,
    }
}

/// 6xN dense matrix, stored row by row.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    columns: usize,
    weights: Vec<f64>,
}

impl Profile {
    pub fn zeros(columns: usize) -> Self {
        Self {
            columns,
            weights: vec![0f64; ROWS * columns],
        }
    }
    /// # of columns, i.e., the number of called positions.
    pub fn len(&self) -> usize {
        self.columns
    }
    pub fn is_empty(&self) -> bool {
        self.columns == 0
    }
    pub fn get(&self, row: usize, column: usize) -> f64 {
        self.weights[row * self.columns + column]
    }
    fn set(&mut self, row: usize, column: usize, weight: f64) {
        self.weights[row * self.columns + column] = weight;
    }
    pub fn row(&self, row: usize) -> &[f64] {
        &self.weights[row * self.columns..(row + 1) * self.columns]
    }
    pub fn column(&self, column: usize) -> impl Iterator<Item = f64> + '_ {
        (0..ROWS).map(move |row| self.get(row, column))
    }
    pub fn from_trace(trace: &Trace, bc: &BaseCalls) -> Self {
        Self::from_called_positions(trace, &bc.bc_pos)
    }
    /// Profile of the called positions in [trim_left, len - trim_right).
    /// If nothing would remain, the whole calls are used.
    pub fn from_trace_trimmed(
        trace: &Trace,
        bc: &BaseCalls,
        trim_left: usize,
        trim_right: usize,
    ) -> Self {
        if trim_left + trim_right >= bc.bc_pos.len() {
            return Self::from_trace(trace, bc);
        }
        let end = bc.bc_pos.len() - trim_right;
        Self::from_called_positions(trace, &bc.bc_pos[trim_left..end])
    }
    fn from_called_positions(trace: &Trace, positions: &[usize]) -> Self {
        let mut profile = Self::zeros(positions.len());
        for (j, &pos) in positions.iter().enumerate() {
            let total = trace.total_signal(pos);
            for k in 0..4 {
                let weight = match total {
                    0 => 0.25,
                    _ => trace.intensity(k, pos) as f64 / total as f64,
                };
                profile.set(k, j, weight);
            }
        }
        profile
    }
    /// One-hot encoding of a sequence.
    pub fn from_sequence(seq: &[u8]) -> Self {
        let mut profile = Self::zeros(seq.len());
        for (j, &base) in seq.iter().enumerate() {
            profile.set(b2i(base), j, 1f64);
        }
        profile
    }
    pub fn reverse_complement(&self) -> Self {
        let mut rc = Self::zeros(self.columns);
        for (row, &from) in COMPLEMENT_ROW.iter().enumerate() {
            for (j, &w) in self.row(from).iter().rev().enumerate() {
                rc.set(row, j, w);
            }
        }
        rc
    }
    pub fn write_tsv<W: std::io::Write>(&self, mut wtr: W) -> std::io::Result<()> {
        let header: Vec<_> = ALPHABET.iter().map(|&b| (b as char).to_string()).collect();
        writeln!(wtr, "pos\t{}", header.join("\t"))?;
        for j in 0..self.columns {
            let column: Vec<_> = self.column(j).map(|w| format!("{:.4}", w)).collect();
            writeln!(wtr, "{}\t{}", j, column.join("\t"))?;
        }
        Ok(())
    }
}

/// Profile of the reference. If the reference is a trace, `load_trace` should return
/// the trace and its base calls.
pub fn reference_profile<F>(rs: &ReferenceSlice, load_trace: F) -> Result<Profile, DecomposeError>
where
    F: FnOnce() -> std::io::Result<CalledTrace>,
{
    match rs.filetype {
        ReferenceType::Slice => Ok(Profile::from_sequence(&rs.refslice)),
        ReferenceType::Trace => {
            let CalledTrace { trace, basecalls } = load_trace()?;
            if !trace.is_consistent() || !basecalls.is_consistent() {
                let msg = format!("reference trace of {}", rs.name);
                return Err(DecomposeError::InconsistentInput(msg));
            }
            debug!("REFTRACE\t{}\t{}", rs.name, basecalls.len());
            Ok(Profile::from_trace(&trace, &basecalls))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256StarStar;
    fn toy_trace() -> (Trace, BaseCalls) {
        let trace = Trace::new(
            vec![10, 0, 0, 1, 0],
            vec![0, 0, 5, 1, 0],
            vec![0, 0, 5, 1, 3],
            vec![30, 0, 0, 1, 0],
        )
        .unwrap();
        (trace, BaseCalls::homozygous(b"TNSNG"))
    }
    #[test]
    fn zero_signal_is_uniform() {
        let (trace, bc) = toy_trace();
        let profile = Profile::from_trace(&trace, &bc);
        assert_eq!(profile.len(), 5);
        let column: Vec<_> = profile.column(1).collect();
        assert_eq!(column, vec![0.25, 0.25, 0.25, 0.25, 0., 0.]);
        let column: Vec<_> = profile.column(0).collect();
        assert_eq!(column, vec![0.25, 0., 0., 0.75, 0., 0.]);
        assert_eq!(profile.get(2, 4), 1f64);
    }
    #[test]
    fn columns_sum_to_one() {
        let mut rng: Xoshiro256StarStar = SeedableRng::seed_from_u64(4329);
        for _ in 0..20 {
            let len = rng.gen_range(1..200);
            let mut channel = || (0..len).map(|_| rng.gen_range(0..3000)).collect::<Vec<u16>>();
            let trace = Trace::new(channel(), channel(), channel(), channel()).unwrap();
            let bc = BaseCalls {
                bc_pos: (0..len).collect(),
                ..Default::default()
            };
            let profile = Profile::from_trace(&trace, &bc);
            for j in 0..len {
                let sum: f64 = profile.column(j).sum();
                assert!((sum - 1f64).abs() < 0.00001, "{}", sum);
                assert_eq!(profile.get(4, j), 0f64);
                assert_eq!(profile.get(5, j), 0f64);
            }
            let rc = profile.reverse_complement();
            assert_eq!(rc.reverse_complement(), profile);
        }
    }
    #[test]
    fn reverse_complement() {
        let profile = Profile::from_sequence(b"AACN-G");
        let rc = profile.reverse_complement();
        assert_eq!(rc, Profile::from_sequence(b"C-NGTT"));
        assert_eq!(rc.reverse_complement(), profile);
        assert_eq!(profile.clone(), profile);
    }
    #[test]
    fn trimmed() {
        let (trace, bc) = toy_trace();
        let full = Profile::from_trace(&trace, &bc);
        let trimmed = Profile::from_trace_trimmed(&trace, &bc, 1, 2);
        assert_eq!(trimmed.len(), 2);
        for row in 0..ROWS {
            assert_eq!(trimmed.row(row), &full.row(row)[1..3]);
        }
        assert_eq!(Profile::from_trace_trimmed(&trace, &bc, 3, 2), full);
        assert_eq!(Profile::from_trace_trimmed(&trace, &bc, 0, 0), full);
    }
    #[test]
    fn reference() {
        let rs = ReferenceSlice::new("ref", b"ACGT".to_vec().into(), ReferenceType::Slice);
        let profile = reference_profile(&rs, || unreachable!()).unwrap();
        assert_eq!(profile, Profile::from_sequence(b"ACGT"));
        let rs = ReferenceSlice::new("ref", DNASeq::default(), ReferenceType::Trace);
        let (trace, basecalls) = toy_trace();
        let expected = Profile::from_trace(&trace, &basecalls);
        let profile = reference_profile(&rs, || Ok(CalledTrace { trace, basecalls })).unwrap();
        assert_eq!(profile, expected);
        let failed = reference_profile(&rs, || {
            Err(std::io::Error::from(std::io::ErrorKind::NotFound))
        });
        assert!(matches!(failed, Err(DecomposeError::Io(_))));
    }
    #[test]
    fn tsv() {
        let mut wtr = vec![];
        Profile::from_sequence(b"A-").write_tsv(&mut wtr).unwrap();
        let tsv = String::from_utf8(wtr).unwrap();
        let lines: Vec<_> = tsv.lines().collect();
        assert_eq!(lines[0], "pos\tA\tC\tG\tT\tN\t-");
        assert_eq!(lines[1], "0\t1.0000\t0.0000\t0.0000\t0.0000\t0.0000\t0.0000");
        assert_eq!(lines[2], "1\t0.0000\t0.0000\t0.0000\t0.0000\t0.0000\t1.0000");
    }
}
