use rayon::ThreadPoolBuilder;
use rayon::prelude::*;

use crate::range::SubRange;

use super::{EngineError, PartialSum, Reduction, run_worker, split_idle};

/// Maps the non-empty sub-ranges over a dedicated rayon pool with one thread
/// each, then folds the collected partials after the pool has joined.
pub fn run(subs: Vec<SubRange>, count_ops: bool) -> Result<Reduction, EngineError> {
    let (busy, idle) = split_idle(subs, count_ops);
    let pool = ThreadPoolBuilder::new()
        .num_threads(busy.len().max(1))
        .thread_name(|i| format!("totient-pool-{i}"))
        .build()?;

    let partials: Vec<PartialSum> = pool.install(|| {
        busy.into_par_iter()
            .map(|sub| run_worker(sub, count_ops))
            .collect()
    });
    Ok(partials.into_iter().chain(idle).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::range::{PartitionPolicy, Range};

    #[test]
    fn test_pool_keeps_worker_order() {
        let subs = Range::new(1, 64)
            .unwrap()
            .split(4, PartitionPolicy::CostWeighted)
            .unwrap();
        let reduction = run(subs, false).unwrap();
        let indices: Vec<usize> = reduction.partials.iter().map(|p| p.index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_pool_sized_to_busy_sub_ranges() {
        let subs = Range::new(1, 10)
            .unwrap()
            .split(10_000, PartitionPolicy::CostWeighted)
            .unwrap();
        let reduction = run(subs, true).unwrap();
        assert_eq!(reduction.total, 32);
        assert_eq!(reduction.partials.len(), 10_000);
        assert_eq!(reduction.partials[9_999].index, 9_999);
    }
}
