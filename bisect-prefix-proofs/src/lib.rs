//! Merkle expansion prefix proof verification.
//!
//! A possibly incomplete binary tree decomposes uniquely into complete
//! subtrees, one or zero per level, mirroring the binary representation of
//! its size. A *merkle expansion* records the root of each complete
//! subtree by level; folding the expansion yields the tree's root.
//!
//! A prefix proof shows that one commitment covers a prefix of the leaves
//! of another. The verifier starts from the prefix tree's expansion and
//! appends complete subtrees, always the largest legal one, until the tree
//! reaches the claimed post size, then compares roots. Appending follows
//! binary addition: a subtree may only land at or below the tree's lowest
//! complete subtree, and carries propagate upward.
//!
//! This logic must stay bit-for-bit equivalent to the on-chain tree
//! library, which performs the same verification for challenge moves. The
//! generation side lives in `bisect-history`, which additionally
//! understands virtual padding; everything it emits must verify here.

#![warn(missing_docs)]

mod bits;
mod error;
mod expansion;
mod verify;

pub use bits::{least_significant_bit, most_significant_bit};
pub use error::PrefixProofError;
pub use expansion::{MAX_LEVEL, append_complete_subtree, append_leaf, root, tree_size};
pub use verify::{VerifyPrefixProofConfig, maximum_append_between, verify_prefix_proof};
