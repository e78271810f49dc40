//! Keccak256 hashing shared by the bisect commitment crates.
//!
//! Every commitment, expansion and proof in the dispute protocol is built
//! from 32-byte keccak256 digests. The exact hashing scheme is a
//! compatibility contract with the on-chain verifier:
//!
//! - leaves are re-hashed before entering a tree: `keccak256(leaf)`.
//!   A leaf preimage is 32 bytes while an internal node preimage is 64
//!   bytes, so a leaf can never collide with an internal node.
//! - internal nodes are `keccak256(left || right)`.
//! - a missing sibling at the fringe of a partial tree is the empty hash
//!   (all zero bytes), used as-is and never re-hashed.

#![warn(missing_docs)]

use alloy_primitives::keccak256;
pub use alloy_primitives::B256;

/// A 32-byte keccak256 digest.
pub type Hash = B256;

/// The empty hash: 32 zero bytes.
///
/// Stands in for missing siblings in partial trees and for unset entries in
/// merkle expansions. Note this is the zero value, not `keccak256("")`.
pub const EMPTY_HASH: Hash = B256::ZERO;

/// Re-hash a leaf before it enters a tree: `keccak256(leaf)`.
pub fn hash_leaf(leaf: &Hash) -> Hash {
    keccak256(leaf)
}

/// Combine two sibling nodes into their parent: `keccak256(left || right)`.
pub fn hash_node(left: &Hash, right: &Hash) -> Hash {
    let mut buf = [0u8; 64];
    buf[..32].copy_from_slice(left.as_slice());
    buf[32..].copy_from_slice(right.as_slice());
    keccak256(buf)
}

/// Hash arbitrary bytes: `keccak256(data)`.
pub fn hash_bytes(data: &[u8]) -> Hash {
    keccak256(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_node_matches_concatenation() {
        let left = Hash::repeat_byte(0xAA);
        let right = Hash::repeat_byte(0xBB);
        let mut buf = Vec::with_capacity(64);
        buf.extend_from_slice(left.as_slice());
        buf.extend_from_slice(right.as_slice());
        assert_eq!(hash_node(&left, &right), hash_bytes(&buf));
    }

    #[test]
    fn test_hash_node_is_order_sensitive() {
        let left = Hash::repeat_byte(0x01);
        let right = Hash::repeat_byte(0x02);
        assert_ne!(hash_node(&left, &right), hash_node(&right, &left));
    }

    #[test]
    fn test_empty_hash_is_zero_not_keccak_of_empty() {
        assert_eq!(EMPTY_HASH.as_slice(), &[0u8; 32]);
        // keccak256("") is the well-known c5d2...a470 digest, not zero.
        assert_eq!(
            hex::encode(hash_bytes(&[])),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
        assert_ne!(hash_bytes(&[]), EMPTY_HASH);
    }

    #[test]
    fn test_hash_leaf_known_vector() {
        // keccak256 of 32 zero bytes.
        assert_eq!(
            hex::encode(hash_leaf(&EMPTY_HASH)),
            "290decd9548b62a8d60345a988386fc84ba6bc95484008f6362f93160ef3e563"
        );
    }
}
