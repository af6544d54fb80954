use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::engine::Strategy;
use crate::range::PartitionPolicy;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct TotientConfig {
    /// Worker count when none is given on the command line.
    #[serde(default)]
    pub workers: Option<usize>,
    #[serde(default)]
    pub strategy: Strategy,
    #[serde(default)]
    pub partition: PartitionPolicy,
    #[serde(default)]
    pub count_ops: bool,
    /// Executable launched by the process strategy.
    #[serde(default)]
    pub worker_program: Option<PathBuf>,
    #[serde(default)]
    pub bench: BenchConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct BenchConfig {
    #[serde(default = "default_bench_start")]
    pub start: i64,
    #[serde(default = "default_bench_stop")]
    pub stop: i64,
    #[serde(default = "default_bench_step")]
    pub step: i64,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            start: default_bench_start(),
            stop: default_bench_stop(),
            step: default_bench_step(),
        }
    }
}

impl TotientConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: TotientConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;
        Ok(config)
    }

    /// Configured worker count, falling back to the machine's parallelism.
    pub fn default_workers(&self) -> usize {
        self.workers.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }
}

// Same sample points as the per-n timing loop of the reference program.
fn default_bench_start() -> i64 {
    1
}

fn default_bench_stop() -> i64 {
    1_000_000
}

fn default_bench_step() -> i64 {
    100_000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let config = TotientConfig::load_from_file("/nonexistent/totient.toml").unwrap();
        assert_eq!(config, TotientConfig::default());
        assert_eq!(config.strategy, Strategy::Threads);
        assert_eq!(config.bench.step, 100_000);
    }

    #[test]
    fn test_parse_partial_config() {
        let config: TotientConfig = toml::from_str(
            r#"
            workers = 8
            strategy = "message-passing"
            partition = "cost-weighted"

            [bench]
            stop = 5000
            "#,
        )
        .unwrap();
        assert_eq!(config.workers, Some(8));
        assert_eq!(config.default_workers(), 8);
        assert_eq!(config.strategy, Strategy::MessagePassing);
        assert_eq!(config.partition, PartitionPolicy::CostWeighted);
        assert!(!config.count_ops);
        assert_eq!(config.bench.start, 1);
        assert_eq!(config.bench.stop, 5000);
    }

    #[test]
    fn test_unknown_strategy_is_rejected() {
        let parsed: Result<TotientConfig, _> = toml::from_str(r#"strategy = "gpu""#);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("totient-config-{}.toml", std::process::id()));
        fs::write(&path, "count_ops = true\nworkers = 3\n").unwrap();
        let config = TotientConfig::load_from_file(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert!(config.count_ops);
        assert_eq!(config.workers, Some(3));
    }
}
