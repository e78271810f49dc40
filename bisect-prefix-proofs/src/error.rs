//! Prefix proof verification errors.

use thiserror::Error;

/// Errors raised while manipulating merkle expansions or verifying prefix
/// proofs. These mirror the failure cases of the on-chain tree library.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PrefixProofError {
    /// A level at or beyond [`MAX_LEVEL`](crate::MAX_LEVEL).
    #[error("level too high")]
    LevelTooHigh,
    /// An expansion with more entries than the deepest supported tree.
    #[error("merkle expansion too large")]
    ExpansionTooLarge,
    /// Folding an expansion with no entries.
    #[error("cannot calculate root for empty expansion")]
    RootForEmptyExpansion,
    /// A bit query or size that must be nonzero was zero.
    #[error("cannot be zero")]
    CannotBeZero,
    /// Appending the empty hash as a subtree root.
    #[error("cannot append empty")]
    CannotAppendEmpty,
    /// Appending above the least significant complete subtree would leave a
    /// hole in the tree.
    #[error("cannot append above least significant")]
    CannotAppendAboveLeastSignificant,
    /// A range whose start size is not strictly below its end size.
    #[error("start size {start} not less than end size {end}")]
    StartNotLessThanEnd {
        /// The range's starting tree size.
        start: u64,
        /// The range's ending tree size.
        end: u64,
    },
    /// The supplied pre expansion does not fold to the claimed pre root.
    #[error("pre expansion root mismatch")]
    PreRootMismatch,
    /// The fully appended expansion does not fold to the claimed post root.
    #[error("post expansion root mismatch")]
    PostRootMismatch,
    /// The pre expansion's tree size disagrees with the claimed pre size.
    #[error("pre expansion tree size incorrect")]
    TreeSizeMismatch,
    /// Appending overshot the post size.
    #[error("size {size} exceeds post size {post_size}")]
    SizeExceedsPostSize {
        /// The tree size reached by appending.
        size: u64,
        /// The claimed post tree size.
        post_size: u64,
    },
    /// The proof ran out of entries before the post size was reached.
    #[error("proof index out of range")]
    IndexOutOfRange,
    /// The proof had entries left over after the post size was reached.
    #[error("incomplete proof usage: consumed {consumed} of {supplied}")]
    IncompleteProof {
        /// Proof entries consumed by verification.
        consumed: u64,
        /// Proof entries supplied.
        supplied: u64,
    },
}
