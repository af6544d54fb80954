/// Cost accounting for the arithmetic kernels.
///
/// Implementations are plain values: a worker creates its own with
/// `Default::default()`, ticks it while computing and hands the total over
/// with its partial sum.
pub trait OpCounter: Default + Send {
    /// Records `n` elementary steps (comparisons, divisions, additions).
    fn tick(&mut self, n: u64);

    /// The recorded total, or `None` when counting is disabled.
    fn total(&self) -> Option<u64>;
}

/// Counter used when instrumentation is off. Compiles down to nothing.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NoCount;

impl OpCounter for NoCount {
    #[inline(always)]
    fn tick(&mut self, _n: u64) {}

    fn total(&self) -> Option<u64> {
        None
    }
}

/// Counter that tallies every step.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct OpTally(u64);

impl OpTally {
    pub fn new() -> Self {
        Self(0)
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl OpCounter for OpTally {
    #[inline(always)]
    fn tick(&mut self, n: u64) {
        self.0 = self.0.wrapping_add(n);
    }

    fn total(&self) -> Option<u64> {
        Some(self.0)
    }
}
