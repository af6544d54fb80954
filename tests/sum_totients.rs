//! Properties of the whole dispatch-compute-reduce cycle through the public
//! API.

use proptest::prelude::*;
use totient_range::engine::{Engine, EngineError, Strategy};
use totient_range::range::{PartitionPolicy, RangeError};
use totient_range::{sum_totients, totient};

const IN_PROCESS: [Strategy; 4] = [
    Strategy::Sequential,
    Strategy::Threads,
    Strategy::Pool,
    Strategy::MessagePassing,
];

fn straightforward(lower: i64, upper: i64) -> i64 {
    (lower..=upper).map(totient).sum()
}

#[test]
fn first_ten_totients_sum_to_32() {
    assert_eq!(sum_totients(1, 10, 1).unwrap(), 32);
    assert_eq!(sum_totients(1, 10, 4).unwrap(), 32);
    for strategy in IN_PROCESS {
        let summary = Engine::new(strategy).run(1, 10, 4).unwrap();
        assert_eq!(summary.total, 32, "{strategy}");
    }
}

#[test]
fn range_narrower_than_worker_count() {
    for strategy in IN_PROCESS {
        for policy in PartitionPolicy::ALL {
            let summary = Engine::new(strategy)
                .with_partition(policy)
                .run(5, 5, 3)
                .unwrap();
            assert_eq!(summary.total, 4, "{strategy} {policy}");
            assert_eq!(summary.partials.iter().filter(|p| p.sum != 0).count(), 1);
        }
    }
}

#[test]
fn far_more_workers_than_integers() {
    let reference = Engine::new(Strategy::Sequential)
        .with_op_count(true)
        .run(1, 10, 1)
        .unwrap();
    for strategy in IN_PROCESS {
        for policy in PartitionPolicy::ALL {
            let summary = Engine::new(strategy)
                .with_partition(policy)
                .with_op_count(true)
                .run(1, 10, 10_000)
                .unwrap();
            assert_eq!(summary.total, 32, "{strategy} {policy}");
            assert_eq!(summary.partials.len(), 10_000);
            assert_eq!(summary.partials.iter().filter(|p| p.lower <= p.upper).count(), 10);
            assert_eq!(summary.operations, reference.operations, "{strategy} {policy}");
        }
    }
}

#[test]
fn repeated_calls_are_identical() {
    let engine = Engine::new(Strategy::MessagePassing).with_op_count(true);
    let first = engine.run(1, 150, 6).unwrap();
    let second = engine.run(1, 150, 6).unwrap();
    assert_eq!(first.total, second.total);
    assert_eq!(first.operations, second.operations);
    assert_eq!(first.partials, second.partials);
}

#[test]
fn invalid_input_is_rejected_before_dispatch() {
    for strategy in Strategy::ALL {
        let err = Engine::new(strategy).run(3, 2, 1).unwrap_err();
        assert!(matches!(
            err,
            EngineError::Range(RangeError::InvalidRange { lower: 3, upper: 2 })
        ));
        let err = Engine::new(strategy).run(1, 2, 0).unwrap_err();
        assert!(matches!(err, EngineError::Range(RangeError::NoWorkers)));
    }
}

#[test]
fn ranges_below_two_contribute_nothing() {
    assert_eq!(sum_totients(-10, 1, 3).unwrap(), 0);
    assert_eq!(sum_totients(-10, 10, 3).unwrap(), 32);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn single_worker_matches_straightforward_sum(lower in -20i64..200, len in 1i64..200) {
        let upper = lower + len - 1;
        prop_assert_eq!(sum_totients(lower, upper, 1).unwrap(), straightforward(lower, upper));
    }

    #[test]
    fn partitioning_never_changes_the_total(
        lower in 1i64..150,
        len in 1i64..150,
        workers in 1usize..12,
        strategy in prop::sample::select(IN_PROCESS.to_vec()),
        policy in prop::sample::select(PartitionPolicy::ALL.to_vec()),
    ) {
        let upper = lower + len - 1;
        let reference = Engine::new(Strategy::Sequential).with_op_count(true).run(lower, upper, 1).unwrap();
        let summary = Engine::new(strategy)
            .with_partition(policy)
            .with_op_count(true)
            .run(lower, upper, workers)
            .unwrap();
        prop_assert_eq!(summary.total, reference.total);
        prop_assert_eq!(summary.operations, reference.operations);
        prop_assert_eq!(summary.partials.len(), workers);
    }
}
