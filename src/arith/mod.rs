//! 数论基础：最大公约数、互素判定与区间约定下的欧拉函数.
//!
//! Every kernel comes in two flavours: a plain one and a `_counted` one that
//! threads an [`OpCounter`] through the hot loop. The counter is a value owned
//! by the caller, so concurrent workers never share one.

pub mod counter;
pub mod gcd;
pub mod totient;

pub use counter::{NoCount, OpCounter, OpTally};
pub use gcd::{are_coprime, are_coprime_counted, gcd, gcd_counted};
pub use totient::{totient, totient_counted};
