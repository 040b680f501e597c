use crate::DecomposeError;
use serde::{Deserialize, Serialize};
pub const WINDOW: usize = 25;
pub const MIN_DIFF: f64 = 0.25;
pub const THRESHOLD_FLOOR: i64 = 10;
pub const TABLE_WIDTH: usize = 15;
pub const TABLE_WIDTH_UNRESOLVED: usize = 50;
pub const MAX_INDEL: usize = 1000;
pub const MADC: f64 = 5f64;

/// Parameters of the breakpoint detection and the decomposition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DecomposeConfig {
    /// Called positions excluded at the 5' end.
    pub trim_left: usize,
    /// Called positions excluded at the 3' end.
    pub trim_right: usize,
    /// Maximum length of the indel to search.
    pub max_indel: usize,
    /// Multiplier of the median absolute deviation.
    pub madc: f64,
    /// Width of the sliding window of the breakpoint detectors.
    pub window: usize,
    /// Breakpoints with the smaller contrast are ignored.
    pub min_diff: f64,
    /// The mismatch threshold never goes below this value.
    pub threshold_floor: i64,
    /// # of shifts reported in the decomposition table on each side.
    pub table_width: usize,
    /// Same as above, used when no candidate shift was found.
    pub table_width_unresolved: usize,
}

impl DecomposeConfig {
    pub fn new(trim_left: usize, trim_right: usize, max_indel: usize, madc: f64) -> Self {
        Self {
            trim_left,
            trim_right,
            max_indel,
            madc,
            ..Default::default()
        }
    }
    /// Reject the parameters the detectors can not work with.
    pub fn validate(&self) -> Result<(), DecomposeError> {
        let invalid = |msg: String| Err(DecomposeError::InvalidConfig(msg));
        if self.window == 0 {
            invalid("window should be positive".to_string())
        } else if !(self.madc.is_finite() && 0f64 <= self.madc) {
            invalid(format!("madc should be a non-negative number: {}", self.madc))
        } else if !self.min_diff.is_finite() {
            invalid(format!("min_diff should be a number: {}", self.min_diff))
        } else {
            Ok(())
        }
    }
}

impl std::default::Default for DecomposeConfig {
    fn default() -> Self {
        Self {
            trim_left: 0,
            trim_right: 0,
            max_indel: MAX_INDEL,
            madc: MADC,
            window: WINDOW,
            min_diff: MIN_DIFF,
            threshold_floor: THRESHOLD_FLOOR,
            table_width: TABLE_WIDTH,
            table_width_unresolved: TABLE_WIDTH_UNRESOLVED,
        }
    }
}
