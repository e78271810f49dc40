//! Proof-side root recomputation.

use bisect_hash::{Hash, hash_leaf, hash_node};

use crate::error::InclusionError;

/// Recompute a merkle root from an inclusion proof, the leaf's index and
/// the raw (unhashed) leaf.
///
/// The leaf is re-hashed first; bit `i` of `index` decides whether the
/// running hash sits left or right of `proof[i]`. Matches the on-chain
/// verifier, which caps proofs at 256 nodes.
pub fn calculate_root_from_proof(
    proof: &[Hash],
    index: u64,
    leaf: &Hash,
) -> Result<Hash, InclusionError> {
    if proof.len() > 256 {
        return Err(InclusionError::ProofTooLong);
    }
    let mut h = hash_leaf(leaf);
    for (i, node) in proof.iter().enumerate() {
        if index & (1 << i) == 0 {
            h = hash_node(&h, node);
        } else {
            h = hash_node(node, &h);
        }
    }
    Ok(h)
}
