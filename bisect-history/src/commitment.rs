//! The [`History`] commitment value: a virtual merkle root bundled with the
//! endpoints and the last-leaf inclusion proof the protocol needs when
//! opening or bisecting a challenge edge.

use std::collections::HashMap;

use bisect_hash::Hash;

use crate::{
    committer::{HistoryCommitter, NodeRecorder, last_leaf_proof_positions},
    error::HistoryError,
};

/// A history commitment over a virtually padded leaf sequence.
///
/// Immutable once constructed; identical inputs always produce an identical
/// `History`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
    /// The index of the last committed leaf: `virtual - 1`.
    pub height: u64,
    /// The virtual merkle root.
    pub merkle: Hash,
    /// The first real leaf, unhashed.
    pub first_leaf: Hash,
    /// The last real leaf, unhashed. Also the leaf every virtual slot
    /// repeats.
    pub last_leaf: Hash,
    /// Merkle inclusion proof for leaf `virtual - 1`, leaf layer first.
    pub last_leaf_proof: Vec<Hash>,
}

impl History {
    /// Produce a history commitment from real leaves virtually padded with
    /// the last leaf up to `virtual_size`.
    ///
    /// `virtual_size` must be `>= leaves.len()` and `leaves` non-empty.
    pub fn new(leaves: &[Hash], virtual_size: u64) -> Result<Self, HistoryError> {
        if leaves.is_empty() {
            return Err(HistoryError::EmptyLeaves);
        }
        let lv_len = leaves.len() as u64;
        if virtual_size < lv_len {
            return Err(HistoryError::VirtualTooSmall {
                virtual_size,
                leaves: lv_len,
            });
        }
        let first_leaf = leaves[0];
        let last_leaf = leaves[leaves.len() - 1];

        let positions = last_leaf_proof_positions(virtual_size)?;
        let mut recorder = NodeRecorder::seeking(&positions);
        let mut committer = HistoryCommitter::new();
        let root = committer.compute_root(leaves, virtual_size, &mut recorder)?;

        // Siblings the recursion visited come from the event list; the rest
        // sit inside complete virtual subtrees whose roots are fillers.
        let found: HashMap<_, _> = recorder.into_events().into_iter().collect();
        let last_leaf_proof = positions
            .iter()
            .map(|pos| {
                found
                    .get(pos)
                    .copied()
                    .unwrap_or_else(|| committer.filler_at(pos.layer))
            })
            .collect();

        Ok(History {
            height: virtual_size - 1,
            merkle: root,
            first_leaf,
            last_leaf,
            last_leaf_proof,
        })
    }
}
