use thiserror::Error;

/// Errors from history commitment construction and prefix proof generation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    /// A commitment needs at least one real leaf.
    #[error("must commit to at least one leaf")]
    EmptyLeaves,
    /// The virtual size is smaller than the number of real leaves.
    #[error("virtual {virtual_size} should be >= num leaves {leaves}")]
    VirtualTooSmall {
        /// Requested virtual size.
        virtual_size: u64,
        /// Number of real leaves supplied.
        leaves: u64,
    },
    /// Recursion invariant violation: a subtree limit fell below its
    /// virtual size.
    #[error("limit {limit} should be >= virtual {virtual_size}")]
    LimitTooSmall {
        /// Leaf capacity of the subtree.
        limit: u64,
        /// Virtual size requested of the subtree.
        virtual_size: u64,
    },
    /// The filler table was not populated deep enough before recursing.
    #[error("insufficient fillers, want {want}, got {got}")]
    InsufficientFillers {
        /// Minimum filler entries required.
        want: usize,
        /// Filler entries present.
        got: usize,
    },
    /// A virtual size of zero commits to nothing.
    #[error("virtual size cannot be zero")]
    VirtualSizeZero,
    /// The prefix index does not fall inside the committed range.
    #[error("index {index} + 1 should be <= virtual {virtual_size}")]
    IndexTooLarge {
        /// Requested prefix index.
        index: u64,
        /// Virtual size of the commitment.
        virtual_size: u64,
    },
}
