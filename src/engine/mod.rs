//! 调度与归约：把区间划分给工作者，收集部分和并归约为总和.
//!
//! Every strategy follows the same contract. Workers accumulate privately,
//! and each partial sum is merged exactly once at the end of its sub-range.
//! Only the merge discipline differs: a loop on the calling thread, one atomic
//! add per thread, a post-join fold over the pool's results, a collective
//! reduce at rank 0, or the coordinator reading child processes. Empty
//! sub-ranges never get a thread, rank or process of their own; their zero
//! partial sums are settled by the coordinator.

use std::fmt;
use std::path::PathBuf;
use std::process::ExitStatus;
use std::str::FromStr;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::range::{PartitionPolicy, Range, RangeError, SubRange};

pub mod comm;
pub mod pool;
pub mod process;
pub mod threads;
pub mod worker;

pub use comm::{CommError, Communicator, Message};
pub use worker::{run_worker, split_idle};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Range(#[from] RangeError),
    #[error(transparent)]
    Comm(#[from] CommError),
    #[error("worker {index} panicked")]
    WorkerPanicked { index: usize },
    #[error("failed to start a thread for worker {index}: {source}")]
    ThreadSpawn {
        index: usize,
        source: std::io::Error,
    },
    #[error("failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error("no worker program configured for the process strategy")]
    MissingWorkerProgram,
    #[error("failed to run worker {index} ({program:?}): {source}")]
    Spawn {
        index: usize,
        program: PathBuf,
        source: std::io::Error,
    },
    #[error("worker {index} exited with {status}: {stderr}")]
    WorkerFailed {
        index: usize,
        status: ExitStatus,
        stderr: String,
    },
    #[error("worker {index} produced malformed output: {source}")]
    MalformedOutput {
        index: usize,
        source: serde_json::Error,
    },
    #[error("worker {expected} answered for sub-range {got}")]
    MismatchedWorker { expected: usize, got: usize },
}

/// How workers are executed and how their partial sums are merged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// All sub-ranges in order on the calling thread.
    Sequential,
    /// One scoped thread per non-empty sub-range, one atomic add per thread.
    #[default]
    Threads,
    /// A rayon pool with one thread per non-empty sub-range.
    Pool,
    /// Isolated ranks exchanging bounds and partial sums over channels.
    MessagePassing,
    /// One child process per non-empty sub-range.
    Process,
}

impl Strategy {
    pub const ALL: [Strategy; 5] = [
        Strategy::Sequential,
        Strategy::Threads,
        Strategy::Pool,
        Strategy::MessagePassing,
        Strategy::Process,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Sequential => "sequential",
            Strategy::Threads => "threads",
            Strategy::Pool => "pool",
            Strategy::MessagePassing => "message-passing",
            Strategy::Process => "process",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Strategy::ALL
            .into_iter()
            .find(|st| st.name() == s)
            .ok_or_else(|| format!("unknown strategy: {s}"))
    }
}

/// One worker's result. Also the wire format of the process strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialSum {
    pub index: usize,
    pub lower: i64,
    pub upper: i64,
    pub sum: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operations: Option<u64>,
}

/// Running fold of partial sums. Addition wraps on overflow.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reduction {
    pub total: i64,
    pub operations: Option<u64>,
    pub partials: Vec<PartialSum>,
}

impl Reduction {
    pub fn absorb(&mut self, partial: PartialSum) {
        self.total = self.total.wrapping_add(partial.sum);
        if let Some(ops) = partial.operations {
            self.operations = Some(self.operations.unwrap_or(0).wrapping_add(ops));
        }
        self.partials.push(partial);
    }

    /// Orders the partials by worker index.
    pub fn finish(mut self) -> Self {
        self.partials.sort_by_key(|p| p.index);
        self
    }
}

impl FromIterator<PartialSum> for Reduction {
    fn from_iter<I: IntoIterator<Item = PartialSum>>(iter: I) -> Self {
        let mut reduction = Reduction::default();
        for partial in iter {
            reduction.absorb(partial);
        }
        reduction.finish()
    }
}

/// Outcome of one dispatch-compute-reduce cycle.
#[derive(Debug, Clone)]
pub struct Summary {
    pub range: Range,
    pub workers: usize,
    pub strategy: Strategy,
    pub policy: PartitionPolicy,
    pub total: i64,
    pub operations: Option<u64>,
    /// Wall-clock time measured by the coordinator.
    pub elapsed: Duration,
    pub partials: Vec<PartialSum>,
}

#[derive(Debug, Clone, Default)]
pub struct Engine {
    strategy: Strategy,
    policy: PartitionPolicy,
    count_ops: bool,
    worker_program: Option<PathBuf>,
}

impl Engine {
    pub fn new(strategy: Strategy) -> Self {
        Engine {
            strategy,
            ..Default::default()
        }
    }

    pub fn with_partition(mut self, policy: PartitionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Enables per-worker operation counting.
    pub fn with_op_count(mut self, count_ops: bool) -> Self {
        self.count_ops = count_ops;
        self
    }

    /// Executable launched by [`Strategy::Process`]; it must understand the
    /// hidden `worker` subcommand of the `totient-range` binary.
    pub fn with_worker_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.worker_program = Some(program.into());
        self
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn policy(&self) -> PartitionPolicy {
        self.policy
    }

    pub fn run(&self, lower: i64, upper: i64, workers: usize) -> Result<Summary, EngineError> {
        let range = Range::new(lower, upper)?;
        if workers == 0 {
            return Err(RangeError::NoWorkers.into());
        }
        log::info!(
            "summing totients over {} with {} workers ({}, {})",
            range,
            workers,
            self.strategy,
            self.policy
        );

        let count_ops = self.count_ops;
        let (reduction, elapsed) = match self.strategy {
            Strategy::Sequential => self.timed(range, workers, |subs| {
                Ok(subs
                    .into_iter()
                    .map(|sub| run_worker(sub, count_ops))
                    .collect())
            })?,
            Strategy::Threads => self.timed(range, workers, |subs| threads::run(subs, count_ops))?,
            Strategy::Pool => self.timed(range, workers, |subs| pool::run(subs, count_ops))?,
            Strategy::MessagePassing => comm::run(range, workers, self.policy, count_ops)?,
            Strategy::Process => {
                let program = self
                    .worker_program
                    .as_deref()
                    .ok_or(EngineError::MissingWorkerProgram)?;
                self.timed(range, workers, |subs| process::run(program, subs, count_ops))?
            }
        };

        log::info!(
            "total {} over {} in {:.6}s",
            reduction.total,
            range,
            elapsed.as_secs_f64()
        );
        Ok(Summary {
            range,
            workers,
            strategy: self.strategy,
            policy: self.policy,
            total: reduction.total,
            operations: reduction.operations,
            elapsed,
            partials: reduction.partials,
        })
    }

    /// Partitions, then times `dispatch` alone.
    fn timed<F>(
        &self,
        range: Range,
        workers: usize,
        dispatch: F,
    ) -> Result<(Reduction, Duration), EngineError>
    where
        F: FnOnce(Vec<SubRange>) -> Result<Reduction, EngineError>,
    {
        let subs = range.split(workers, self.policy)?;
        let start = Instant::now();
        let reduction = dispatch(subs)?;
        Ok((reduction, start.elapsed()))
    }
}

/// `Σ totient(n)` for `n` in `[lower, upper]` with the default engine.
pub fn sum_totients(lower: i64, upper: i64, workers: usize) -> Result<i64, EngineError> {
    Engine::default()
        .run(lower, upper, workers)
        .map(|summary| summary.total)
}
