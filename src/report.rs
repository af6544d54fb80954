use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;

use crate::bench::{ScalingSample, TotientSample};
use crate::engine::{PartialSum, Strategy, Summary};
use crate::range::PartitionPolicy;

/// What the shell prints (or saves) after a run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Report {
    pub lower: i64,
    pub upper: i64,
    pub workers: usize,
    pub strategy: Strategy,
    pub partition: PartitionPolicy,
    pub total: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operations: Option<u64>,
    pub elapsed_secs: f64,
    pub partials: Vec<PartialSum>,
}

impl From<&Summary> for Report {
    fn from(summary: &Summary) -> Self {
        Report {
            lower: summary.range.lower(),
            upper: summary.range.upper(),
            workers: summary.workers,
            strategy: summary.strategy,
            partition: summary.policy,
            total: summary.total,
            operations: summary.operations,
            elapsed_secs: summary.elapsed.as_secs_f64(),
            partials: summary.partials.clone(),
        }
    }
}

impl Report {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// 将报告以 JSON 格式保存到文件中
    pub fn save_to_file(&self, file_path: &str) -> std::io::Result<()> {
        let mut file = std::fs::File::create(file_path)?;
        let json = self.to_json()?;
        writeln!(file, "{}", json)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Sum of Totients between [{}..{}] is {}",
            self.lower, self.upper, self.total
        )?;
        write!(f, "Total time: {:.6} seconds", self.elapsed_secs)?;
        if let Some(ops) = self.operations {
            write!(f, "\nNumber of operations: {}", ops)?;
        }
        Ok(())
    }
}

pub fn render_totient_samples(samples: &[TotientSample]) -> String {
    samples
        .iter()
        .map(|s| format!("euler({}) = {:.6} seconds", s.n, s.elapsed.as_secs_f64()))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_scaling(samples: &[ScalingSample]) -> String {
    let mut out = format!(
        "{:>8}  {:>12}  {:>8}  {:>9}",
        "workers", "seconds", "speedup", "max share"
    );
    for s in samples {
        out.push_str(&format!(
            "\n{:>8}  {:>12.6}  {:>8.2}  {:>9.3}",
            s.workers,
            s.elapsed.as_secs_f64(),
            s.speedup,
            s.max_share
        ));
    }
    out
}
