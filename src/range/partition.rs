//! 划分策略：等宽切分与按代价加权切分.
//!
//! Both policies return exactly `workers` sub-ranges, in ascending order, whose
//! union is the input range. Sub-ranges may be empty when the range holds
//! fewer integers than there are workers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{Range, SubRange};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PartitionPolicy {
    /// Equal-width blocks; the remainder goes to the last block.
    #[default]
    EqualWidth,
    /// Blocks of roughly equal cumulative cost, taking the cost of `n` to grow
    /// linearly with `n`.
    CostWeighted,
}

impl PartitionPolicy {
    pub const ALL: [PartitionPolicy; 2] =
        [PartitionPolicy::EqualWidth, PartitionPolicy::CostWeighted];

    pub fn name(&self) -> &'static str {
        match self {
            PartitionPolicy::EqualWidth => "equal-width",
            PartitionPolicy::CostWeighted => "cost-weighted",
        }
    }

    /// `workers` must be non-zero; [`Range::split`] checks it.
    pub fn partition(&self, range: Range, workers: usize) -> Vec<SubRange> {
        match self {
            PartitionPolicy::EqualWidth => equal_width(range, workers),
            PartitionPolicy::CostWeighted => cost_weighted(range, workers),
        }
    }
}

impl fmt::Display for PartitionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PartitionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PartitionPolicy::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| format!("unknown partition policy: {s}"))
    }
}

/// Block `i` is `[lower + i*w + 1, lower + (i+1)*w]` with
/// `w = (upper - lower) / workers`; block 0 starts at `lower` and the last
/// block ends at `upper`.
pub fn equal_width(range: Range, workers: usize) -> Vec<SubRange> {
    let lower = range.lower() as i128;
    let upper = range.upper() as i128;
    let width = (upper - lower) / workers as i128;

    (0..workers)
        .map(|i| {
            let step = i as i128;
            let lo = if i == 0 {
                lower
            } else {
                lower + step * width + 1
            };
            let hi = if i + 1 == workers {
                upper
            } else {
                lower + (step + 1) * width
            };
            bounded(i, lo, hi)
        })
        .collect()
}

/// Cut points `c_1 < ... < c_{k-1}` are placed where the cumulative cost
/// `Σ n ≈ n²/2` reaches `i/k` of the total; non-positive `n` costs nothing.
pub fn cost_weighted(range: Range, workers: usize) -> Vec<SubRange> {
    let upper = range.upper() as i128;
    let start = range.lower() as i128 - 1;

    let weight = |x: i128| -> f64 {
        if x > 0 {
            let x = x as f64;
            x * x
        } else {
            0.0
        }
    };
    let base = weight(start);
    let top = weight(upper);

    let mut cuts = Vec::with_capacity(workers + 1);
    cuts.push(start);
    for i in 1..workers {
        let target = base + (top - base) * (i as f64) / (workers as f64);
        let prev = cuts[cuts.len() - 1];
        let cut = (target.sqrt().round() as i128).clamp(prev, upper);
        cuts.push(cut);
    }
    cuts.push(upper);

    cuts.windows(2)
        .enumerate()
        .map(|(i, w)| bounded(i, w[0] + 1, w[1]))
        .collect()
}

/// Narrows block bounds back to `i64`. Only an empty block can fall outside
/// (starting past `i64::MAX` or ending before `i64::MIN`); it becomes the
/// canonical empty block `[i64::MAX, i64::MAX - 1]`.
fn bounded(index: usize, lo: i128, hi: i128) -> SubRange {
    match (i64::try_from(lo), i64::try_from(hi)) {
        (Ok(lo), Ok(hi)) => SubRange::new(index, lo, hi),
        _ => SubRange::new(index, i64::MAX, i64::MAX - 1),
    }
}
