//! Euclid's remainder loop and the coprimality test built on it.
//!
//! `gcd x 0 = x`, `gcd x y = gcd y (x mod y)`.

use super::counter::{NoCount, OpCounter};

/// Greatest common divisor by repeated remainder.
///
/// Meant for non-negative arguments. The result for `x = y = 0` is `0`; with
/// a negative argument the sign of the result is not normalised, and
/// `gcd(i64::MIN, -1)` is `-1` rather than an overflow.
pub fn gcd(x: i64, y: i64) -> i64 {
    gcd_counted(x, y, &mut NoCount)
}

/// [`gcd`] charging two operations (loop test and division) per iteration.
#[inline]
pub fn gcd_counted<C: OpCounter>(mut x: i64, mut y: i64, ops: &mut C) -> i64 {
    while y != 0 {
        ops.tick(2);
        let t = x.wrapping_rem(y);
        x = y;
        y = t;
    }
    x
}

/// `true` iff `gcd(x, y) == 1`.
pub fn are_coprime(x: i64, y: i64) -> bool {
    are_coprime_counted(x, y, &mut NoCount)
}

#[inline]
pub fn are_coprime_counted<C: OpCounter>(x: i64, y: i64, ops: &mut C) -> bool {
    ops.tick(1);
    gcd_counted(x, y, ops) == 1
}
