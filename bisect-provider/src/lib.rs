//! History commitment provider for the dispute protocol.
//!
//! Ties the commitment crates to the machine side of the protocol: a
//! request names a position in the challenge hierarchy, the
//! [`ChallengeCoordinates`] arithmetic maps it to opcode ranges, external
//! collectors produce the state hashes, and the provider wraps everything
//! into the commitments, prefix proofs and one-step proof data the
//! protocol submits on chain.
//!
//! Collectors are expensive (a collection can replay minutes of machine
//! execution), so identical collections running concurrently are collapsed
//! into one through the [`ComputationCache`].

#![warn(missing_docs)]

mod cache;
mod error;
mod mapper;
mod provider;
mod types;

pub use cache::ComputationCache;
pub use error::ProviderError;
pub use mapper::{ChallengeCoordinates, MapperError, deepest_requested_challenge_level};
pub use provider::{
    HistoryCommitmentProvider, L2MessageStateCollector, MachineHashCollector, ProofCollector,
};
pub use types::{
    Batch, ChallengeLevel, HashCollectorConfig, Height, HistoryCommitmentRequest, OneStepData,
    OpcodeIndex, StepSize,
};
