//! Definitions -- A tiny interface for the indel-shift decomposition of Sanger traces.
//! Roughly speaking, we incorporate with other programs, pass messages, or interact with other CLI via JSON object format. Specifically, the message is encoded only one, possibly large, structure named [DataSet](DataSet)

use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};

/// The gap symbol in the two-row alignment.
pub const GAP: u8 = b'-';
/// The no-call symbol.
pub const NO_CALL: u8 = b'N';

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DataSet {
    pub input_file: String,
    pub samples: Vec<Sample>,
}

impl DataSet {
    pub fn new(input_file: &str, samples: Vec<Sample>) -> Self {
        Self {
            input_file: input_file.to_string(),
            samples,
        }
    }
    /// Return the names of the samples violating the invariants of their inputs.
    pub fn sanity_check(&self) -> Vec<&str> {
        self.samples
            .iter()
            .filter(|s| !s.is_consistent())
            .map(|s| s.name.as_str())
            .collect()
    }
}

/// One trace to be decomposed, together with everything the external base-caller,
/// aligner, and reference loader produced for it.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Sample {
    pub name: String,
    pub trace: Trace,
    pub basecalls: BaseCalls,
    /// Consensus (row 0) against the reference slice (row 1).
    pub alignment: Alignment,
    pub reference: ReferenceSlice,
    /// Used only when the reference itself is a trace.
    #[serde(default)]
    pub reference_trace: Option<CalledTrace>,
    #[serde(default)]
    pub breakpoint: Option<TraceBreakpoint>,
    #[serde(default)]
    pub decomposition: Option<Decomposition>,
    #[serde(default)]
    pub table: DecompositionTable,
}

impl Sample {
    pub fn new(
        name: &str,
        trace: Trace,
        basecalls: BaseCalls,
        alignment: Alignment,
        reference: ReferenceSlice,
    ) -> Self {
        Self {
            name: name.to_string(),
            trace,
            basecalls,
            alignment,
            reference,
            ..Default::default()
        }
    }
    pub fn is_consistent(&self) -> bool {
        self.trace.is_consistent()
            && self.basecalls.is_consistent()
            && self.alignment.is_consistent()
            && self.basecalls.bc_pos.iter().all(|&p| p < self.trace.len())
    }
}

/// A sequence on the alphabet of A,C,G,T,N,-, and the IUPAC ambiguity codes.
/// It is written as a plain string in JSON.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, Hash, SerializeDisplay, DeserializeFromStr,
)]
pub struct DNASeq(Vec<u8>);

impl DNASeq {
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }
}

impl std::ops::Deref for DNASeq {
    type Target = [u8];
    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl std::ops::DerefMut for DNASeq {
    fn deref_mut(&mut self) -> &mut [u8] {
        &mut self.0
    }
}

impl From<Vec<u8>> for DNASeq {
    fn from(seq: Vec<u8>) -> Self {
        Self(seq)
    }
}

impl From<&[u8]> for DNASeq {
    fn from(seq: &[u8]) -> Self {
        Self(seq.to_vec())
    }
}

impl std::fmt::Display for DNASeq {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}

impl std::str::FromStr for DNASeq {
    type Err = std::convert::Infallible;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.bytes().map(|b| b.to_ascii_uppercase()).collect()))
    }
}

/// Raw signal of a trace. Each channel is indexed by the sample position.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Trace {
    /// Channels in the order of A, C, G, and T.
    pub trace_acgt: [Vec<u16>; 4],
}

impl Trace {
    pub fn new(a: Vec<u16>, c: Vec<u16>, g: Vec<u16>, t: Vec<u16>) -> Option<Self> {
        let trace = Self {
            trace_acgt: [a, c, g, t],
        };
        trace.is_consistent().then(|| trace)
    }
    pub fn is_consistent(&self) -> bool {
        let len = self.trace_acgt[0].len();
        self.trace_acgt.iter().all(|ch| ch.len() == len)
    }
    pub fn len(&self) -> usize {
        self.trace_acgt[0].len()
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
    pub fn intensity(&self, channel: usize, sample: usize) -> u16 {
        self.trace_acgt[channel][sample]
    }
    pub fn total_signal(&self, sample: usize) -> u32 {
        self.trace_acgt.iter().map(|ch| ch[sample] as u32).sum()
    }
}

/// Base calls of a trace.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct BaseCalls {
    pub consensus: DNASeq,
    /// The major allele at each called position.
    pub primary: DNASeq,
    /// The minor allele or the ambiguity code at each called position.
    pub secondary: DNASeq,
    /// 0-index. Called position -> sample position in the trace.
    pub bc_pos: Vec<usize>,
}

impl BaseCalls {
    pub fn new(consensus: DNASeq, primary: DNASeq, secondary: DNASeq, bc_pos: Vec<usize>) -> Self {
        Self {
            consensus,
            primary,
            secondary,
            bc_pos,
        }
    }
    /// Calls without any secondary peak. The i-th call sits on the i-th sample.
    pub fn homozygous(seq: &[u8]) -> Self {
        let bc_pos = (0..seq.len()).collect();
        let seq: DNASeq = seq.into();
        Self {
            consensus: seq.clone(),
            primary: seq.clone(),
            secondary: seq,
            bc_pos,
        }
    }
    pub fn len(&self) -> usize {
        self.primary.len()
    }
    pub fn is_empty(&self) -> bool {
        self.primary.is_empty()
    }
    pub fn is_consistent(&self) -> bool {
        self.primary.len() == self.secondary.len() && self.primary.len() == self.bc_pos.len()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ReferenceType {
    /// A sequence already sliced out of the genome.
    Slice,
    /// The reference is a wildtype trace and should be base-called.
    Trace,
}

impl std::default::Default for ReferenceType {
    fn default() -> Self {
        ReferenceType::Slice
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ReferenceSlice {
    #[serde(default)]
    pub name: String,
    pub refslice: DNASeq,
    #[serde(default)]
    pub filetype: ReferenceType,
}

impl ReferenceSlice {
    pub fn new(name: &str, refslice: DNASeq, filetype: ReferenceType) -> Self {
        Self {
            name: name.to_string(),
            refslice,
            filetype,
        }
    }
}

/// A trace together with its base calls.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct CalledTrace {
    pub trace: Trace,
    pub basecalls: BaseCalls,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TraceBreakpoint {
    /// Called position (or the index of the query in the alignment, in the homozygous case).
    pub breakpoint: usize,
    /// Whether the dominant signal lies to the left of the breakpoint.
    pub traceleft: bool,
    pub indelshift: bool,
    pub best_diff: f64,
}

impl TraceBreakpoint {
    pub fn new(breakpoint: usize, traceleft: bool, best_diff: f64) -> Self {
        Self {
            breakpoint,
            traceleft,
            indelshift: true,
            best_diff,
        }
    }
    pub fn no_shift(len: usize) -> Self {
        Self {
            breakpoint: len,
            traceleft: true,
            indelshift: false,
            best_diff: 0f64,
        }
    }
}

/// Two-row alignment. The first row is the consensus, the second is the reference.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Alignment {
    pub query: DNASeq,
    pub reference: DNASeq,
}

impl Alignment {
    pub fn new(query: DNASeq, reference: DNASeq) -> Option<Self> {
        let aln = Self { query, reference };
        aln.is_consistent().then(|| aln)
    }
    pub fn is_consistent(&self) -> bool {
        self.query.len() == self.reference.len()
    }
    pub fn len(&self) -> usize {
        self.query.len()
    }
    pub fn is_empty(&self) -> bool {
        self.query.is_empty()
    }
    pub fn query(&self, column: usize) -> u8 {
        self.query[column]
    }
    pub fn reference(&self, column: usize) -> u8 {
        self.reference[column]
    }
}

impl std::fmt::Display for Alignment {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}\n{}", self.query, self.reference)
    }
}

/// The outcome of a decomposition.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Decomposition {
    Deletion(usize),
    Insertion(usize),
    /// Both an insertion and a deletion were needed.
    Complex { ins: usize, del: usize, score: u32 },
    /// Nothing was changed.
    Unresolved,
}

impl std::fmt::Display for Decomposition {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Decomposition::Deletion(len) => write!(f, "Deletion\t{}", len),
            Decomposition::Insertion(len) => write!(f, "Insertion\t{}", len),
            Decomposition::Complex { ins, del, score } => {
                write!(f, "Complex\tins:{}\tdel:{}\terror:{}", ins, del, score)
            }
            Decomposition::Unresolved => write!(f, "Unresolved"),
        }
    }
}

/// (shift, # of mismatches) pairs. Deletions have negative shifts.
pub type DecompositionTable = Vec<(i64, u32)>;
