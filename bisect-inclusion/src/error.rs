//! Inclusion proof errors.

use thiserror::Error;

/// Errors raised while building trees or checking inclusion proofs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InclusionError {
    /// A proof longer than the deepest possible tree.
    #[error("merkle proof too long")]
    ProofTooLong,
    /// A tree with no layers or an empty root layer.
    #[error("invalid merkle tree")]
    InvalidTree,
    /// A leaf index outside the tree's leaf layer.
    #[error("invalid number of leaves for merkle tree")]
    InvalidLeaves,
}
