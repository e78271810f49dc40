//! The virtual merkle tree root recursion.
//!
//! The conceptual full tree has `limit = next_power_of_two(virtual)` leaf
//! slots. Real leaves occupy a prefix; slots `[len(leaves), virtual)` are
//! implicitly the last real leaf repeated, and slots `[virtual, limit)` are
//! undefined, represented by the empty hash whenever a subtree boundary
//! needs them.
//!
//! Three shapes show up while halving the tree:
//!
//! 1. `virtual <= mid`: only the left half carries data; the right half is
//!    a single empty hash.
//! 2. leaves fit in the left half and `virtual > mid`: the left half is a
//!    complete virtual subtree. When additionally `virtual == limit` the
//!    right half is *entirely* virtual and complete, so its root is a
//!    filler table lookup and the recursion never descends into it.
//! 3. leaves spill past `mid`: both halves recurse on real data.
//!
//! The recursion is purely functional: it passes an explicit
//! [`TreePosition`] down, returns freshly computed hashes up, and never
//! mutates the input slice. Node hashes wanted by a proof are emitted as
//! events into a [`NodeRecorder`] and consumed after the recursion
//! completes.

use std::collections::HashSet;

use bisect_hash::{EMPTY_HASH, Hash, hash_leaf, hash_node};

use crate::{
    error::HistoryError,
    math::{log2_ceil, log2_floor, next_power_of_two},
};

/// Position of a node in the conceptual complete tree.
///
/// `layer` 0 is the leaf layer; `index` counts nodes left to right within a
/// layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct TreePosition {
    pub layer: u64,
    pub index: u64,
}

impl TreePosition {
    fn left_child(self) -> Self {
        TreePosition {
            layer: self.layer - 1,
            index: self.index * 2,
        }
    }

    fn right_child(self) -> Self {
        TreePosition {
            layer: self.layer - 1,
            index: self.index * 2 + 1,
        }
    }
}

/// Root position for a subtree of `limit` slots viewed in isolation.
pub(crate) fn root_position(limit: u64) -> TreePosition {
    TreePosition {
        layer: log2_floor(limit),
        index: 0,
    }
}

/// The sibling of the node at `index` within `layer`.
fn sibling(index: u64, layer: u64) -> TreePosition {
    TreePosition {
        layer,
        index: index ^ 1,
    }
}

/// Positions of the sibling nodes that must be hashed with the last leaf at
/// each layer to recompute the root: the inclusion proof shape for leaf
/// `virtual - 1`.
pub(crate) fn last_leaf_proof_positions(
    virtual_size: u64,
) -> Result<Vec<TreePosition>, HistoryError> {
    if virtual_size == 0 {
        return Err(HistoryError::VirtualSizeZero);
    }
    if virtual_size == 1 {
        return Ok(Vec::new());
    }
    let limit = next_power_of_two(virtual_size);
    let depth = log2_floor(limit);
    let mut positions = Vec::with_capacity(depth as usize);
    let mut idx = virtual_size - 1;
    for layer in 0..depth {
        positions.push(sibling(idx, layer));
        idx >>= 1;
    }
    Ok(positions)
}

/// Collects `(position, hash)` events for a fixed set of sought positions
/// while the root recursion runs.
///
/// The recursion emits into the recorder and knows nothing about proofs;
/// whoever registered the positions drains the events afterwards. Positions
/// that were never visited belong to complete virtual subtrees and are
/// backfilled from the filler table by the consumer.
#[derive(Debug, Default)]
pub(crate) struct NodeRecorder {
    sought: HashSet<TreePosition>,
    events: Vec<(TreePosition, Hash)>,
}

impl NodeRecorder {
    /// A recorder that drops everything. Used when only the root is wanted.
    pub(crate) fn disabled() -> Self {
        Self::default()
    }

    /// A recorder interested in exactly `positions`.
    pub(crate) fn seeking(positions: &[TreePosition]) -> Self {
        NodeRecorder {
            sought: positions.iter().copied().collect(),
            events: Vec::with_capacity(positions.len()),
        }
    }

    fn record(&mut self, pos: TreePosition, hash: Hash) {
        if self.sought.contains(&pos) {
            self.events.push((pos, hash));
        }
    }

    /// Consume the recorder, yielding every event emitted during recursion.
    pub(crate) fn into_events(self) -> Vec<(TreePosition, Hash)> {
        self.events
    }
}

/// Computes roots of virtual merkle trees.
///
/// Holds the per-invocation filler table. A committer's scratch state must
/// never be shared across concurrent computations; build a fresh one per
/// call.
#[derive(Debug)]
pub(crate) struct HistoryCommitter {
    fillers: Vec<Hash>,
}

impl HistoryCommitter {
    pub(crate) fn new() -> Self {
        HistoryCommitter {
            fillers: Vec::new(),
        }
    }

    /// Populate the filler table to depth `n` from the hashed last leaf:
    /// `fillers[0] = last_leaf`, `fillers[i] = keccak256(f[i-1] || f[i-1])`.
    pub(crate) fn populate_fillers(&mut self, last_leaf: &Hash, n: usize) {
        let mut fillers = Vec::with_capacity(n);
        if n > 0 {
            fillers.push(*last_leaf);
            for i in 1..n {
                let prev = fillers[i - 1];
                fillers.push(hash_node(&prev, &prev));
            }
        }
        self.fillers = fillers;
    }

    /// The root of a fully-virtual subtree with a single virtual leaf.
    pub(crate) fn first_filler(&self) -> Result<Hash, HistoryError> {
        self.fillers
            .first()
            .copied()
            .ok_or(HistoryError::InsufficientFillers { want: 1, got: 0 })
    }

    /// Filler table lookup by layer.
    ///
    /// Only called for layers below the tree depth, which the table always
    /// covers once populated.
    pub(crate) fn filler_at(&self, layer: u64) -> Hash {
        self.fillers[layer as usize]
    }

    /// Compute the merkle root of `leaves` virtually padded to
    /// `virtual_size`, emitting node events into `recorder`.
    ///
    /// The input leaves are re-hashed before entering the tree.
    pub(crate) fn compute_root(
        &mut self,
        leaves: &[Hash],
        virtual_size: u64,
        recorder: &mut NodeRecorder,
    ) -> Result<Hash, HistoryError> {
        if leaves.is_empty() {
            return Err(HistoryError::EmptyLeaves);
        }
        let hashed = hash_leaves(leaves);
        let limit = next_power_of_two(virtual_size);
        let depth = log2_floor(limit);
        let n = log2_ceil(virtual_size).max(1);
        self.populate_fillers(&hashed[hashed.len() - 1], n as usize);
        self.partial_root(
            &hashed,
            virtual_size,
            limit,
            TreePosition {
                layer: depth,
                index: 0,
            },
            recorder,
        )
    }

    /// The root of a possibly partial subtree rooted at `pos`.
    ///
    /// `leaves` is the already-hashed real-leaf prefix, padded by repeating
    /// the last filler until `virtual_size` and terminated with the empty
    /// hash up to `limit`. The filler table must already hold at least
    /// `log2_ceil(virtual_size)` entries.
    pub(crate) fn partial_root(
        &self,
        leaves: &[Hash],
        virtual_size: u64,
        limit: u64,
        pos: TreePosition,
        recorder: &mut NodeRecorder,
    ) -> Result<Hash, HistoryError> {
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
        if limit < virtual_size {
            return Err(HistoryError::LimitTooSmall {
                limit,
                virtual_size,
            });
        }
        let min_fillers = log2_ceil(virtual_size) as usize;
        if self.fillers.len() < min_fillers {
            return Err(HistoryError::InsufficientFillers {
                want: min_fillers,
                got: self.fillers.len(),
            });
        }
        if limit == 1 {
            recorder.record(pos, leaves[0]);
            return Ok(leaves[0]);
        }

        let mid = limit / 2;

        // Left child: a complete subtree of size `mid` whenever the virtual
        // size spills past the midpoint, otherwise the whole partial tree
        // shifts down a layer.
        let (l_leaves, l_virtual) = if virtual_size > mid {
            if lv_len > mid {
                (&leaves[..mid as usize], mid)
            } else {
                (leaves, mid)
            }
        } else {
            (leaves, virtual_size)
        };
        let left = self.partial_root(l_leaves, l_virtual, mid, pos.left_child(), recorder)?;

        // Right child.
        let right_pos = pos.right_child();
        let right = if virtual_size > mid {
            if lv_len <= mid && virtual_size == limit {
                // The right half is a complete, purely virtual subtree: its
                // root is the precomputed filler for this depth.
                let filler = self.filler_at(log2_floor(mid));
                recorder.record(right_pos, filler);
                filler
            } else if lv_len > mid {
                self.partial_root(
                    &leaves[mid as usize..],
                    virtual_size - mid,
                    mid,
                    right_pos,
                    recorder,
                )?
            } else {
                let filler_leaf = [self.first_filler()?];
                self.partial_root(&filler_leaf, virtual_size - mid, mid, right_pos, recorder)?
            }
        } else {
            recorder.record(right_pos, EMPTY_HASH);
            EMPTY_HASH
        };

        let parent = hash_node(&left, &right);
        recorder.record(pos, parent);
        Ok(parent)
    }
}

/// Re-hash each input leaf before it enters a tree.
pub(crate) fn hash_leaves(leaves: &[Hash]) -> Vec<Hash> {
    leaves.iter().map(hash_leaf).collect()
}

/// Compute the merkle root of a virtual merkle tree.
///
/// `leaves` must be non-empty and `virtual_size >= leaves.len()`. The gap
/// between the real leaves and the virtual size is implicitly the last real
/// leaf repeated.
pub fn compute_root(leaves: &[Hash], virtual_size: u64) -> Result<Hash, HistoryError> {
    let lv_len = leaves.len() as u64;
    if virtual_size < lv_len {
        return Err(HistoryError::VirtualTooSmall {
            virtual_size,
            leaves: lv_len,
        });
    }
    let mut committer = HistoryCommitter::new();
    committer.compute_root(leaves, virtual_size, &mut NodeRecorder::disabled())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_root_rejects_empty_leaves() {
        assert_eq!(compute_root(&[], 4), Err(HistoryError::EmptyLeaves));
    }

    #[test]
    fn test_compute_root_rejects_virtual_below_leaves() {
        let leaves = vec![Hash::repeat_byte(1); 5];
        assert_eq!(
            compute_root(&leaves, 3),
            Err(HistoryError::VirtualTooSmall {
                virtual_size: 3,
                leaves: 5,
            })
        );
    }

    #[test]
    fn test_single_leaf_root_is_hashed_leaf() {
        let leaf = Hash::repeat_byte(0x42);
        let root = compute_root(&[leaf], 1).expect("compute root");
        assert_eq!(root, hash_leaf(&leaf));
    }

    #[test]
    fn test_fillers_double_up() {
        let mut committer = HistoryCommitter::new();
        let seed = hash_leaf(&Hash::repeat_byte(7));
        committer.populate_fillers(&seed, 3);
        assert_eq!(committer.filler_at(0), seed);
        assert_eq!(committer.filler_at(1), hash_node(&seed, &seed));
        let f1 = hash_node(&seed, &seed);
        assert_eq!(committer.filler_at(2), hash_node(&f1, &f1));
    }

    #[test]
    fn test_last_leaf_proof_positions_shape() {
        // virtual 1: the leaf is the root, no proof needed.
        assert!(
            last_leaf_proof_positions(1)
                .expect("positions for 1")
                .is_empty()
        );
        // virtual 5: last leaf is index 4 in an 8-slot tree.
        let positions = last_leaf_proof_positions(5).expect("positions for 5");
        assert_eq!(
            positions,
            vec![
                TreePosition { layer: 0, index: 5 },
                TreePosition { layer: 1, index: 3 },
                TreePosition { layer: 2, index: 0 },
            ]
        );
        assert_eq!(
            last_leaf_proof_positions(0),
            Err(HistoryError::VirtualSizeZero)
        );
    }

    #[test]
    fn test_virtual_padding_equals_explicit_repetition() {
        // Committing [A] with virtual 4 must equal committing [A, A, A, A].
        let a = Hash::repeat_byte(0xA1);
        let padded = compute_root(&[a, a, a, a], 4).expect("explicit root");
        let virtualized = compute_root(&[a], 4).expect("virtual root");
        assert_eq!(padded, virtualized);
    }
}
