//! 多进程模型：每个非空子区间启动一个子进程，子进程把部分和以一行 JSON 写到标准输出.
//!
//! The child side is the hidden `worker` subcommand of the `totient-range`
//! binary, which calls [`worker_reply`].

use std::path::Path;
use std::process::{Child, Command, Stdio};

use crate::range::SubRange;

use super::{EngineError, PartialSum, Reduction, run_worker, split_idle};

pub fn run(program: &Path, subs: Vec<SubRange>, count_ops: bool) -> Result<Reduction, EngineError> {
    let (busy, idle) = split_idle(subs, count_ops);
    let mut children: Vec<(usize, Child)> = Vec::with_capacity(busy.len());
    for sub in &busy {
        match spawn_worker(program, sub, count_ops) {
            Ok(child) => children.push((sub.index, child)),
            Err(source) => {
                reap(children);
                return Err(EngineError::Spawn {
                    index: sub.index,
                    program: program.to_path_buf(),
                    source,
                });
            }
        }
    }
    log::debug!("launched {} worker processes", children.len());

    let mut reduction: Reduction = idle.into_iter().collect();
    let mut pending = children.into_iter();
    while let Some((index, child)) = pending.next() {
        match collect_reply(program, index, child) {
            Ok(partial) => reduction.absorb(partial),
            Err(err) => {
                reap(pending);
                return Err(err);
            }
        }
    }
    Ok(reduction.finish())
}

fn collect_reply(program: &Path, index: usize, child: Child) -> Result<PartialSum, EngineError> {
    let output = child
        .wait_with_output()
        .map_err(|source| EngineError::Spawn {
            index,
            program: program.to_path_buf(),
            source,
        })?;
    if !output.status.success() {
        return Err(EngineError::WorkerFailed {
            index,
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    parse_reply(index, &output.stdout)
}

/// Kills and waits for workers whose replies are no longer wanted.
fn reap(children: impl IntoIterator<Item = (usize, Child)>) {
    for (index, mut child) in children {
        let _ = child.kill();
        if let Err(err) = child.wait() {
            log::warn!("could not reap worker {}: {}", index, err);
        }
    }
}

fn spawn_worker(program: &Path, sub: &SubRange, count_ops: bool) -> std::io::Result<Child> {
    let mut cmd = Command::new(program);
    cmd.arg("worker");
    if count_ops {
        cmd.arg("--count-ops");
    }
    // Bounds may be negative; keep them out of flag parsing.
    cmd.arg("--")
        .arg(sub.index.to_string())
        .arg(sub.lower.to_string())
        .arg(sub.upper.to_string())
        .env_remove("TOTIENT_FLAGS")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    cmd.spawn()
}

/// Computes one sub-range and renders the reply line a worker process prints.
pub fn worker_reply(sub: SubRange, count_ops: bool) -> Result<String, serde_json::Error> {
    serde_json::to_string(&run_worker(sub, count_ops))
}

/// Reads the last non-empty line of a worker's stdout as a [`PartialSum`].
pub fn parse_reply(index: usize, stdout: &[u8]) -> Result<PartialSum, EngineError> {
    let text = String::from_utf8_lossy(stdout);
    let line = text
        .lines()
        .rev()
        .find(|l| !l.trim().is_empty())
        .unwrap_or_default();
    let partial: PartialSum = serde_json::from_str(line)
        .map_err(|source| EngineError::MalformedOutput { index, source })?;
    if partial.index != index {
        return Err(EngineError::MismatchedWorker {
            expected: index,
            got: partial.index,
        });
    }
    Ok(partial)
}
