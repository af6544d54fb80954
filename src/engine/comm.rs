//! 消息传递模型：各 rank 互不共享可变状态，只通过通道交换消息.
//!
//! The choreography mirrors a classic MPI program: the bounds are computed up
//! front, every rank meets at a barrier (the clock starts there), the root
//! scatters one non-empty sub-range per rank, each rank computes its partial sum and the
//! root performs the collective reduce. Arrival order of partial sums is
//! irrelevant.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::range::{PartitionPolicy, Range, SubRange};

use super::{EngineError, PartialSum, Reduction, run_worker, split_idle};

const ROOT: usize = 0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Bounds(SubRange),
    Partial(PartialSum),
}

#[derive(Debug, Error)]
pub enum CommError {
    #[error("rank {rank} is no longer reachable")]
    Disconnected { rank: usize },
    #[error("rank {rank} cannot message itself")]
    SelfSend { rank: usize },
    #[error("rank {rank} expected {expected}, received {received:?}")]
    Unexpected {
        rank: usize,
        expected: &'static str,
        received: Message,
    },
    #[error("scatter needs {expected} chunks, got {got}")]
    ChunkCount { expected: usize, got: usize },
}

/// One rank's endpoint: its own inbox, a sender to every other rank and a
/// barrier shared by the whole world.
pub struct Communicator {
    rank: usize,
    size: usize,
    barrier: Arc<Barrier>,
    inbox: Receiver<Message>,
    peers: Vec<Option<Sender<Message>>>,
}

impl Communicator {
    /// Builds the endpoints of a world of `size` ranks, in rank order.
    pub fn world(size: usize) -> Vec<Communicator> {
        let barrier = Arc::new(Barrier::new(size));
        let (senders, inboxes): (Vec<_>, Vec<_>) = (0..size).map(|_| mpsc::channel()).unzip();

        inboxes
            .into_iter()
            .enumerate()
            .map(|(rank, inbox)| {
                let peers = senders
                    .iter()
                    .enumerate()
                    .map(|(dest, tx)| (dest != rank).then(|| tx.clone()))
                    .collect();
                Communicator {
                    rank,
                    size,
                    barrier: Arc::clone(&barrier),
                    inbox,
                    peers,
                }
            })
            .collect()
    }

    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn barrier(&self) {
        self.barrier.wait();
    }

    pub fn send(&self, dest: usize, msg: Message) -> Result<(), CommError> {
        if dest == self.rank {
            return Err(CommError::SelfSend { rank: self.rank });
        }
        let tx = self
            .peers
            .get(dest)
            .and_then(Option::as_ref)
            .ok_or(CommError::Disconnected { rank: dest })?;
        tx.send(msg)
            .map_err(|_| CommError::Disconnected { rank: dest })
    }

    /// Drops the senders to every rank except `dest`. Once every rank that
    /// could still write to an inbox is gone, `recv` there fails instead of
    /// blocking.
    pub fn talk_only_to(&mut self, dest: usize) {
        for (rank, tx) in self.peers.iter_mut().enumerate() {
            if rank != dest {
                *tx = None;
            }
        }
    }

    pub fn recv(&self) -> Result<Message, CommError> {
        self.inbox
            .recv()
            .map_err(|_| CommError::Disconnected { rank: self.rank })
    }

    /// The root passes exactly `size` chunks and keeps its own; every other
    /// rank passes `None` and receives one.
    pub fn scatter(
        &self,
        root: usize,
        chunks: Option<Vec<SubRange>>,
    ) -> Result<SubRange, CommError> {
        if self.rank != root {
            return match self.recv()? {
                Message::Bounds(sub) => Ok(sub),
                received => Err(CommError::Unexpected {
                    rank: self.rank,
                    expected: "bounds",
                    received,
                }),
            };
        }

        let chunks = chunks.unwrap_or_default();
        if chunks.len() != self.size {
            return Err(CommError::ChunkCount {
                expected: self.size,
                got: chunks.len(),
            });
        }
        let mut own = None;
        for (dest, chunk) in chunks.into_iter().enumerate() {
            if dest == root {
                own = Some(chunk);
            } else {
                self.send(dest, Message::Bounds(chunk))?;
            }
        }
        own.ok_or(CommError::ChunkCount {
            expected: self.size,
            got: 0,
        })
    }

    /// Collective sum at `root`. Returns the reduction on the root and `None`
    /// everywhere else.
    pub fn reduce_sum(
        &self,
        root: usize,
        partial: PartialSum,
    ) -> Result<Option<Reduction>, CommError> {
        if self.rank != root {
            self.send(root, Message::Partial(partial))?;
            return Ok(None);
        }

        let mut reduction = Reduction::default();
        reduction.absorb(partial);
        for _ in 1..self.size {
            match self.recv()? {
                Message::Partial(p) => reduction.absorb(p),
                received => {
                    return Err(CommError::Unexpected {
                        rank: self.rank,
                        expected: "partial sum",
                        received,
                    });
                }
            }
        }
        Ok(Some(reduction.finish()))
    }
}

/// Runs one rank per non-empty sub-range and returns the root's reduction
/// together with the time the root measured from the barrier to the end of
/// the reduce. Empty sub-ranges are settled here and never become ranks.
pub fn run(
    range: Range,
    workers: usize,
    policy: PartitionPolicy,
    count_ops: bool,
) -> Result<(Reduction, Duration), EngineError> {
    let (busy, idle) = split_idle(range.split(workers, policy)?, count_ops);
    let world = Communicator::world(busy.len());
    let mut chunks = Some(busy);

    let (mut reduction, elapsed) = thread::scope(|s| -> Result<(Reduction, Duration), EngineError> {
        let handles: Vec<_> = world
            .into_iter()
            .map(|comm| {
                let chunks = if comm.rank() == ROOT {
                    chunks.take()
                } else {
                    None
                };
                s.spawn(move || rank_main(comm, chunks, count_ops))
            })
            .collect();

        let mut root_result = None;
        for (rank, handle) in handles.into_iter().enumerate() {
            let outcome = handle
                .join()
                .map_err(|_| EngineError::WorkerPanicked { index: rank })??;
            if outcome.is_some() {
                root_result = outcome;
            }
        }
        root_result.ok_or(EngineError::Comm(CommError::Disconnected { rank: ROOT }))
    })?;

    for partial in idle {
        reduction.absorb(partial);
    }
    Ok((reduction.finish(), elapsed))
}

fn rank_main(
    mut comm: Communicator,
    chunks: Option<Vec<SubRange>>,
    count_ops: bool,
) -> Result<Option<(Reduction, Duration)>, CommError> {
    if comm.rank() != ROOT {
        // Workers only ever report to the root.
        comm.talk_only_to(ROOT);
    }

    comm.barrier();
    let start = Instant::now();

    let sub = comm.scatter(ROOT, chunks)?;
    log::debug!("rank {}/{} received {}", comm.rank(), comm.size(), sub);
    let partial = run_worker(sub, count_ops);
    let reduced = comm.reduce_sum(ROOT, partial)?;

    Ok(reduced.map(|reduction| (reduction, start.elapsed())))
}
