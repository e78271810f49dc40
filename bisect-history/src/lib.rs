//! History commitments for the dispute protocol.
//!
//! A history commitment is a merkle root over a sequence of state hashes,
//! padded to a fixed "virtual" length so that both parties to a dispute
//! commit to trees of the same shape even when they disagree about how many
//! real states exist.
//!
//! Terminology used throughout this crate:
//!
//! - **leaf**: a hash of some state; leaves are re-hashed before entering a
//!   tree.
//! - **virtual**: the target committed length. Callers provide only the real
//!   leaves plus the virtual length; the gap is implicitly the last real
//!   leaf repeated.
//! - **limit**: the leaf capacity of the complete tree deep enough to hold
//!   `virtual` leaves (the next power of two).
//! - **filler**: the precomputed root of a fully-virtual subtree of a given
//!   depth. `filler[0]` is the hashed last leaf and
//!   `filler[i] = keccak256(filler[i-1] || filler[i-1])`, so a complete
//!   virtual subtree costs one table lookup instead of a recursion.
//! - **empty hash**: 32 zero bytes, standing in for the missing sibling at
//!   the fringe of a partial tree. This is not the same as padding the
//!   leaves with zero hashes: the fringe sibling is used as-is, which
//!   produces a different (and cheaper) root than hashing chains of zeros.
//!
//! The root computation, last-leaf proofs and prefix proof generation all
//! run over the same recursion behind [`compute_root`]; the mountain-range
//! verification side lives in the `bisect-prefix-proofs` crate and must
//! accept everything generated here.

#![warn(missing_docs)]

mod commitment;
mod committer;
mod error;
pub mod math;
mod prefix;


pub use commitment::History;
pub use committer::compute_root;
pub use error::HistoryError;
pub use prefix::generate_prefix_proof;
