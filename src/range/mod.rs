//! 区间与子区间：求和区间 `[lower, upper]` 及其按工作者划分得到的切片.

use std::fmt;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};
use thiserror::Error;

mod partition;

pub use partition::{PartitionPolicy, cost_weighted, equal_width};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("invalid range: lower bound {lower} is greater than upper bound {upper}")]
    InvalidRange { lower: i64, upper: i64 },
    #[error("worker count must be at least 1")]
    NoWorkers,
}

/// The closed interval of totient arguments to sum. Always `lower <= upper`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    lower: i64,
    upper: i64,
}

impl Range {
    pub fn new(lower: i64, upper: i64) -> Result<Self, RangeError> {
        if lower > upper {
            return Err(RangeError::InvalidRange { lower, upper });
        }
        Ok(Range { lower, upper })
    }

    pub fn lower(&self) -> i64 {
        self.lower
    }

    pub fn upper(&self) -> i64 {
        self.upper
    }

    /// Number of integers in the range; `2^64` for the whole `i64` domain.
    pub fn len(&self) -> u128 {
        (self.upper as i128 - self.lower as i128 + 1) as u128
    }

    /// Cuts the range into exactly `workers` sub-ranges under `policy`.
    pub fn split(
        &self,
        workers: usize,
        policy: PartitionPolicy,
    ) -> Result<Vec<SubRange>, RangeError> {
        if workers == 0 {
            return Err(RangeError::NoWorkers);
        }
        Ok(policy.partition(*self, workers))
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}..{}]", self.lower, self.upper)
    }
}

/// A slice of a [`Range`] owned by one worker. Empty when `lower > upper`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubRange {
    pub index: usize,
    pub lower: i64,
    pub upper: i64,
}

impl SubRange {
    pub fn new(index: usize, lower: i64, upper: i64) -> Self {
        SubRange {
            index,
            lower,
            upper,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lower > self.upper
    }

    pub fn len(&self) -> u128 {
        if self.is_empty() {
            0
        } else {
            (self.upper as i128 - self.lower as i128 + 1) as u128
        }
    }

    pub fn iter(&self) -> RangeInclusive<i64> {
        self.lower..=self.upper
    }
}

impl fmt::Display for SubRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            write!(f, "#{} (empty)", self.index)
        } else {
            write!(f, "#{} [{}..{}]", self.index, self.lower, self.upper)
        }
    }
}
