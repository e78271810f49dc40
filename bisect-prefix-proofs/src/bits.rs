//! Bit position queries over `u64`.
//!
//! Both queries are meaningless on zero, and the verification loop reaches
//! them with attacker-influenced sizes, so they return errors instead of
//! panicking.

use crate::error::PrefixProofError;

/// Position of the least significant set bit.
pub fn least_significant_bit(x: u64) -> Result<u64, PrefixProofError> {
    if x == 0 {
        return Err(PrefixProofError::CannotBeZero);
    }
    Ok(u64::from(x.trailing_zeros()))
}

/// Position of the most significant set bit.
pub fn most_significant_bit(x: u64) -> Result<u64, PrefixProofError> {
    if x == 0 {
        return Err(PrefixProofError::CannotBeZero);
    }
    Ok(63 - u64::from(x.leading_zeros()))
}
