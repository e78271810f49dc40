//! Integer base-2 logarithms over `u64`.
//!
//! Both logarithms are total over nonzero inputs and panic on zero: zero has
//! no logarithm, and every caller in this crate has already established a
//! nonzero size before asking for one. Treating that as a recoverable error
//! would let a structural bug masquerade as bad user input.

/// Floor of log2. Panics if `x` is zero.
///
/// `log2_floor(1) == 0`, `log2_floor(8) == 3`, `log2_floor(24601) == 14`.
pub fn log2_floor(x: u64) -> u64 {
    assert!(x != 0, "log2 undefined for zero");
    63 - u64::from(x.leading_zeros())
}

/// Ceiling of log2. Panics if `x` is zero.
///
/// Equals [`log2_floor`] for powers of two, one more otherwise.
pub fn log2_ceil(x: u64) -> u64 {
    let floor = log2_floor(x);
    if x.is_power_of_two() { floor } else { floor + 1 }
}

/// The smallest power of two `>= n`, with `next_power_of_two(0) == 1`.
pub fn next_power_of_two(n: u64) -> u64 {
    n.next_power_of_two()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log2_floor() {
        assert_eq!(log2_floor(1), 0);
        assert_eq!(log2_floor(2), 1);
        assert_eq!(log2_floor(3), 1);
        assert_eq!(log2_floor(8), 3);
        assert_eq!(log2_floor(24601), 14);
        assert_eq!(log2_floor(u64::MAX), 63);
    }

    #[test]
    fn test_log2_ceil() {
        assert_eq!(log2_ceil(1), 0);
        assert_eq!(log2_ceil(2), 1);
        assert_eq!(log2_ceil(3), 2);
        assert_eq!(log2_ceil(6), 3);
        assert_eq!(log2_ceil(8), 3);
        assert_eq!(log2_ceil(9), 4);
    }

    #[test]
    #[should_panic(expected = "log2 undefined for zero")]
    fn test_log2_floor_zero_panics() {
        log2_floor(0);
    }

    #[test]
    #[should_panic(expected = "log2 undefined for zero")]
    fn test_log2_ceil_zero_panics() {
        log2_ceil(0);
    }

    #[test]
    fn test_next_power_of_two() {
        assert_eq!(next_power_of_two(0), 1);
        assert_eq!(next_power_of_two(1), 1);
        assert_eq!(next_power_of_two(3), 4);
        assert_eq!(next_power_of_two(4), 4);
        assert_eq!(next_power_of_two(1023), 1024);
    }
}
