use crate::arith::{NoCount, OpCounter, OpTally, totient_counted};
use crate::range::SubRange;

use super::PartialSum;

/// Sums `totient(n)` over `sub` into a private accumulator.
///
/// Nothing outside this call is touched until it returns; the caller decides
/// how the result is merged.
pub fn run_worker(sub: SubRange, count_ops: bool) -> PartialSum {
    let (sum, operations) = if count_ops {
        let (sum, ops) = accumulate::<OpTally>(&sub);
        (sum, ops.total())
    } else {
        let (sum, ops) = accumulate::<NoCount>(&sub);
        (sum, ops.total())
    };
    log::debug!("worker {} done: sum {}", sub, sum);
    PartialSum {
        index: sub.index,
        lower: sub.lower,
        upper: sub.upper,
        sum,
        operations,
    }
}

/// Separates the sub-ranges that need a worker from the empty ones, whose
/// zero partial sums are produced on the spot.
pub fn split_idle(subs: Vec<SubRange>, count_ops: bool) -> (Vec<SubRange>, Vec<PartialSum>) {
    let (busy, idle): (Vec<_>, Vec<_>) = subs.into_iter().partition(|sub| !sub.is_empty());
    let idle = idle
        .into_iter()
        .map(|sub| PartialSum {
            index: sub.index,
            lower: sub.lower,
            upper: sub.upper,
            sum: 0,
            operations: count_ops.then_some(0),
        })
        .collect();
    (busy, idle)
}

/// One operation is charged per `n` for the addition into the partial sum.
pub fn accumulate<C: OpCounter>(sub: &SubRange) -> (i64, C) {
    let mut ops = C::default();
    let mut sum: i64 = 0;
    for n in sub.iter() {
        ops.tick(1);
        sum = sum.wrapping_add(totient_counted(n, &mut ops));
    }
    (sum, ops)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_worker() {
        let p = run_worker(SubRange::new(3, 1, 10), false);
        assert_eq!(p.index, 3);
        assert_eq!((p.lower, p.upper), (1, 10));
        assert_eq!(p.sum, 32);
        assert_eq!(p.operations, None);
    }

    #[test]
    fn test_empty_sub_range_yields_zero() {
        let p = run_worker(SubRange::new(1, 6, 5), true);
        assert_eq!(p.sum, 0);
        assert_eq!(p.operations, Some(0));
    }

    #[test]
    fn test_split_idle_settles_empty_sub_ranges() {
        let subs = vec![
            SubRange::new(0, 5, 5),
            SubRange::new(1, 6, 5),
            SubRange::new(2, 6, 6),
        ];
        let (busy, idle) = split_idle(subs, true);
        let busy: Vec<usize> = busy.iter().map(|s| s.index).collect();
        assert_eq!(busy, vec![0, 2]);
        assert_eq!(idle.len(), 1);
        assert_eq!(idle[0].index, 1);
        assert_eq!((idle[0].sum, idle[0].operations), (0, Some(0)));
        assert_eq!(idle[0], run_worker(SubRange::new(1, 6, 5), true));
    }

    #[test]
    fn test_counting_matches_reference() {
        // n = 1 costs the addition only, n = 2 costs 5 more.
        let (sum, ops) = accumulate::<OpTally>(&SubRange::new(0, 1, 2));
        assert_eq!(sum, 1);
        assert_eq!(ops.get(), 7);
    }
}
