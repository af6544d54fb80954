//! # 欧拉函数区间求和（Sum of Totients）
//!
//! 对闭区间 `[lower, upper]` 计算 `Σ φ(n)`，其中 `φ(n)` 按区间约定定义为
//! `|{ i ∈ [1, n-1] : gcd(n, i) = 1 }|`，因此 `φ(1) = 0`。
//!
//! The range is cut into one sub-range per worker, each worker sums its slice
//! privately, and the partial sums are reduced into one total. Five execution
//! strategies share the same partitioner and worker:
//!
//! * `Sequential` runs every sub-range on the calling thread;
//! * `Threads` uses scoped OS threads and one atomic add per worker;
//! * `Pool` maps sub-ranges over a rayon pool;
//! * `MessagePassing` runs isolated ranks that only talk through channels
//!   (barrier, scatter, reduce);
//! * `Process` launches one child process per sub-range.
//!
//! ## 示例
//!
//! ```rust
//! use totient_range::engine::{Engine, Strategy};
//!
//! let summary = Engine::new(Strategy::Threads).run(1, 10, 4).unwrap();
//! assert_eq!(summary.total, 32);
//! assert_eq!(totient_range::sum_totients(5, 5, 3).unwrap(), 4);
//! ```

pub mod arith;
pub mod bench;
pub mod config;
pub mod engine;
pub mod options;
pub mod range;
pub mod report;

pub use arith::{are_coprime, gcd, totient};
pub use engine::{Engine, EngineError, PartialSum, Strategy, Summary, sum_totients};
pub use range::{PartitionPolicy, Range, RangeError, SubRange};
