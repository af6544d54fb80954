//! Timing loops of the command-line shell: per-`n` totient timings over fixed
//! steps, and a worker-count sweep that shows how a partition policy scales.

use std::time::{Duration, Instant};

use thiserror::Error;

use crate::arith::totient;
use crate::engine::{Engine, EngineError};

#[derive(Debug, Error)]
pub enum BenchError {
    #[error("benchmark step must be positive, got {0}")]
    NonPositiveStep(i64),
    #[error("maximum worker count must be at least 1")]
    NoWorkers,
    #[error(transparent)]
    Engine(#[from] EngineError),
}

#[derive(Debug, Clone)]
pub struct TotientSample {
    pub n: i64,
    pub phi: i64,
    pub elapsed: Duration,
}

/// Times `totient(n)` for `n = start, start + step, ...` while `n < stop`.
pub fn time_totients(start: i64, stop: i64, step: i64) -> Result<Vec<TotientSample>, BenchError> {
    if step <= 0 {
        return Err(BenchError::NonPositiveStep(step));
    }
    let mut samples = Vec::new();
    let mut n = start;
    while n < stop {
        let begin = Instant::now();
        let phi = totient(n);
        let elapsed = begin.elapsed();
        log::debug!("euler({}) = {} in {:?}", n, phi, elapsed);
        samples.push(TotientSample { n, phi, elapsed });
        n = match n.checked_add(step) {
            Some(next) => next,
            None => break,
        };
    }
    Ok(samples)
}

#[derive(Debug, Clone)]
pub struct ScalingSample {
    pub workers: usize,
    pub total: i64,
    pub elapsed: Duration,
    /// Elapsed time of the single-worker run divided by this run's.
    pub speedup: f64,
    /// Largest partial sum over the total; `1 / workers` is a perfect split.
    pub max_share: f64,
}

/// Runs `engine` over `[lower, upper]` with `1..=max_workers` workers.
pub fn scaling(
    engine: &Engine,
    lower: i64,
    upper: i64,
    max_workers: usize,
) -> Result<Vec<ScalingSample>, BenchError> {
    if max_workers == 0 {
        return Err(BenchError::NoWorkers);
    }
    let mut samples: Vec<ScalingSample> = Vec::with_capacity(max_workers);
    for workers in 1..=max_workers {
        let summary = engine.run(lower, upper, workers)?;
        let baseline = samples
            .first()
            .map(|s| s.elapsed)
            .unwrap_or(summary.elapsed);
        let speedup = baseline.as_secs_f64() / summary.elapsed.as_secs_f64().max(f64::EPSILON);
        let largest = summary.partials.iter().map(|p| p.sum).max().unwrap_or(0);
        let max_share = if summary.total == 0 {
            0.0
        } else {
            largest as f64 / summary.total as f64
        };
        samples.push(ScalingSample {
            workers,
            total: summary.total,
            elapsed: summary.elapsed,
            speedup,
            max_share,
        });
    }
    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Strategy;
    use crate::range::PartitionPolicy;

    #[test]
    fn test_sample_points() {
        let samples = time_totients(1, 50, 10).unwrap();
        let points: Vec<i64> = samples.iter().map(|s| s.n).collect();
        assert_eq!(points, vec![1, 11, 21, 31, 41]);
        assert_eq!(samples[1].phi, 10);
    }

    #[test]
    fn test_rejects_bad_step() {
        assert!(matches!(
            time_totients(1, 10, 0),
            Err(BenchError::NonPositiveStep(0))
        ));
    }

    #[test]
    fn test_scaling_totals_agree() {
        let engine = Engine::new(Strategy::Threads).with_partition(PartitionPolicy::CostWeighted);
        let samples = scaling(&engine, 1, 200, 4).unwrap();
        assert_eq!(samples.len(), 4);
        assert!(samples.iter().all(|s| s.total == samples[0].total));
        assert!((samples[0].max_share - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_equal_width_skews_towards_last_worker() {
        let engine = Engine::new(Strategy::Sequential);
        let samples = scaling(&engine, 1, 400, 4).unwrap();
        assert!(samples[3].max_share > 0.25);
    }
}
