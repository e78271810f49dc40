//! Fully materialized merkle trees.
//!
//! Unlike the virtual trees in `bisect-history`, these hold every layer in
//! memory. They are used for small trees only, such as the per-leaf
//! inclusion proofs a one-step proof carries.

use bisect_hash::{EMPTY_HASH, Hash, hash_leaf, hash_node};

use crate::error::InclusionError;

/// Build a merkle tree from `items`, layer 0 (the leaves) first and the
/// root layer last.
///
/// Items are re-hashed before entering the tree; if their count is not a
/// power of two the leaf layer is padded with empty hashes, which are
/// combined as-is.
pub fn compute_merkle_tree(items: &[Hash]) -> Vec<Vec<Hash>> {
    let mut leaves: Vec<Hash> = items.iter().map(hash_leaf).collect();
    let padded = leaves.len().max(1).next_power_of_two();
    leaves.resize(padded, EMPTY_HASH);

    let height = padded.trailing_zeros() as usize;
    let mut layers = Vec::with_capacity(height + 1);
    layers.push(leaves);
    for i in 0..height {
        let next: Vec<Hash> = layers[i]
            .chunks_exact(2)
            .map(|pair| hash_node(&pair[0], &pair[1]))
            .collect();
        layers.push(next);
    }
    layers
}

/// The root of a tree produced by [`compute_merkle_tree`].
pub fn merkle_root(tree: &[Vec<Hash>]) -> Result<Hash, InclusionError> {
    match tree.last().and_then(|layer| layer.first()) {
        Some(root) => Ok(*root),
        None => Err(InclusionError::InvalidTree),
    }
}

/// The inclusion proof for leaf `index`: its sibling at every layer below
/// the root, leaf layer first.
pub fn generate_inclusion_proof(
    index: u64,
    tree: &[Vec<Hash>],
) -> Result<Vec<Hash>, InclusionError> {
    if tree.is_empty() {
        return Err(InclusionError::InvalidTree);
    }
    if index >= tree[0].len() as u64 {
        return Err(InclusionError::InvalidLeaves);
    }
    let mut proof = Vec::with_capacity(tree.len() - 1);
    for (layer, nodes) in tree[..tree.len() - 1].iter().enumerate() {
        let sibling = (index >> layer) ^ 1;
        proof.push(nodes[sibling as usize]);
    }
    Ok(proof)
}
