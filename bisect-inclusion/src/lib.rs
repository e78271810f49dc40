//! Merkle inclusion proofs over small, fully materialized trees.
//!
//! The dispute protocol proves individual machine states against a history
//! commitment with ordinary sibling-path inclusion proofs. This crate
//! builds the trees, extracts proofs, and recomputes roots from proofs the
//! same way the on-chain verifier does:
//!
//! - leaves are re-hashed on entry, so a 32-byte leaf preimage can never
//!   collide with a 64-byte internal node preimage;
//! - leaf layers are padded to a power of two with the empty hash, combined
//!   as-is;
//! - proofs run leaf layer first, and bit `i` of the leaf index picks the
//!   side at layer `i`.

#![warn(missing_docs)]

mod error;
mod tree;
mod verify;

pub use error::InclusionError;
pub use tree::{compute_merkle_tree, generate_inclusion_proof, merkle_root};
pub use verify::calculate_root_from_proof;
