//! Provider errors.
//!
//! Callers decide between challenging, abstaining or retrying based on the
//! failure class, so input validation, arithmetic, local cross-verification
//! and external collector failures stay distinguishable.

use bisect_history::HistoryError;
use bisect_prefix_proofs::PrefixProofError;
use thiserror::Error;

use crate::mapper::MapperError;

/// Errors from producing commitments and proofs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// Commitment construction over the collected hashes failed.
    #[error(transparent)]
    History(#[from] HistoryError),
    /// Challenge coordinate arithmetic failed.
    #[error(transparent)]
    Mapper(#[from] MapperError),
    /// The locally generated prefix proof did not verify; never submit it.
    #[error("could not verify prefix proof locally: {0}")]
    LocalVerification(#[from] PrefixProofError),
    /// An external collector failed. Retrying is the caller's decision.
    #[error("collector failure: {0}")]
    Collector(String),
    /// A one-step proof was requested without any challenge level.
    #[error("upper challenge origin heights must have at least length 1")]
    MissingChallengeLevels,
    /// A height so large that the leaf count past it does not fit u64.
    #[error("height {0} overflows when converted to a leaf count")]
    HeightOverflow(u64),
}
