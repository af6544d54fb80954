use super::counter::{NoCount, OpCounter};
use super::gcd::are_coprime_counted;

/// Number of `i` in `[1, n-1]` coprime to `n`.
///
/// The interval is empty for `n <= 1`, so `totient(1) == 0` rather than the
/// textbook `φ(1) = 1`.
pub fn totient(n: i64) -> i64 {
    totient_counted(n, &mut NoCount)
}

/// [`totient`] charging one operation per loop test and one per hit, on top
/// of what the coprimality test charges.
pub fn totient_counted<C: OpCounter>(n: i64, ops: &mut C) -> i64 {
    let mut length = 0;
    for i in 1..n {
        ops.tick(1);
        if are_coprime_counted(n, i, ops) {
            length += 1;
            ops.tick(1);
        }
    }
    length
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arith::OpTally;

    #[test]
    fn test_known_values() {
        assert_eq!(totient(1), 0);
        assert_eq!(totient(2), 1);
        assert_eq!(totient(6), 2);
        assert_eq!(totient(9), 6);
        assert_eq!(totient(30), 8);
        assert_eq!(totient(97), 96);
    }

    #[test]
    fn test_non_positive_is_zero() {
        assert_eq!(totient(0), 0);
        assert_eq!(totient(-12), 0);
    }

    #[test]
    fn test_first_ten() {
        let values: Vec<i64> = (1..=10).map(totient).collect();
        assert_eq!(values, vec![0, 1, 2, 2, 4, 2, 6, 4, 6, 4]);
    }

    #[test]
    fn test_operation_count() {
        let mut ops = OpTally::new();
        assert_eq!(totient_counted(1, &mut ops), 0);
        assert_eq!(ops.get(), 0);

        // i = 1: loop test, coprime test, one gcd step, hit.
        let mut ops = OpTally::new();
        assert_eq!(totient_counted(2, &mut ops), 1);
        assert_eq!(ops.get(), 5);
    }
}
