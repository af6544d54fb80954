//! 共享内存模型：每个非空子区间一个线程，局部累加，结束时对共享总和做一次原子加.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::thread;

use crate::range::SubRange;

use super::{EngineError, PartialSum, Reduction, run_worker, split_idle};

pub fn run(subs: Vec<SubRange>, count_ops: bool) -> Result<Reduction, EngineError> {
    let (busy, idle) = split_idle(subs, count_ops);
    let total = AtomicI64::new(0);
    let operations = AtomicU64::new(0);

    let mut partials = thread::scope(|s| -> Result<Vec<PartialSum>, EngineError> {
        let mut handles = Vec::with_capacity(busy.len());
        for sub in busy {
            let total = &total;
            let operations = &operations;
            let handle = thread::Builder::new()
                .name(format!("totient-worker-{}", sub.index))
                .spawn_scoped(s, move || {
                    let partial = run_worker(sub, count_ops);
                    // The only writes to shared state, once per worker.
                    total.fetch_add(partial.sum, Ordering::Relaxed);
                    if let Some(ops) = partial.operations {
                        operations.fetch_add(ops, Ordering::Relaxed);
                    }
                    partial
                })
                .map_err(|source| EngineError::ThreadSpawn {
                    index: sub.index,
                    source,
                })?;
            handles.push((sub.index, handle));
        }

        handles
            .into_iter()
            .map(|(index, handle)| {
                handle
                    .join()
                    .map_err(|_| EngineError::WorkerPanicked { index })
            })
            .collect()
    })?;
    partials.extend(idle);

    let reduction = Reduction {
        total: total.into_inner(),
        operations: count_ops.then(|| operations.into_inner()),
        partials,
    };
    Ok(reduction.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::range::{PartitionPolicy, Range};

    #[test]
    fn test_atomic_total_matches_partials() {
        let subs = Range::new(1, 200)
            .unwrap()
            .split(6, PartitionPolicy::EqualWidth)
            .unwrap();
        let reduction = run(subs, true).unwrap();
        let folded: i64 = reduction.partials.iter().map(|p| p.sum).sum();
        assert_eq!(reduction.total, folded);
        let ops: u64 = reduction.partials.iter().filter_map(|p| p.operations).sum();
        assert_eq!(reduction.operations, Some(ops));
        assert_eq!(reduction.partials.len(), 6);
    }

    #[test]
    fn test_empty_sub_ranges_spawn_nothing() {
        let subs = Range::new(5, 5)
            .unwrap()
            .split(20_000, PartitionPolicy::EqualWidth)
            .unwrap();
        let reduction = run(subs, true).unwrap();
        assert_eq!(reduction.total, 4);
        assert_eq!(reduction.partials.len(), 20_000);
        let indices: Vec<usize> = reduction.partials.iter().map(|p| p.index).collect();
        assert_eq!(indices, (0..20_000).collect::<Vec<_>>());
    }
}
