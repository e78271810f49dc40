//! Prefix proof generation.
//!
//! A prefix proof shows that the commitment over the first `index + 1`
//! leaves is a merkle prefix of the commitment over the full virtual
//! sequence. Generation walks the same halving structure as the root
//! recursion but, instead of folding everything to one root, emits the
//! mountain-range decomposition of the prefix (one complete-subtree root
//! per set bit of the prefix size) plus the supplementary subtree roots the
//! verifier appends to grow the prefix tree into the full tree.
//!
//! The expansions produced here feed the verification side in
//! `bisect-prefix-proofs`, which mirrors the on-chain verifier.

use bisect_hash::{EMPTY_HASH, Hash};

use crate::{
    committer::{HistoryCommitter, NodeRecorder, hash_leaves},
    error::HistoryError,
    math::{log2_floor, next_power_of_two},
};

/// Generate a prefix proof for `prefix_index` over `leaves` virtually
/// padded to `virtual_size`.
///
/// Returns `(prefix_expansion, proof)`: the mountain-range expansion of the
/// prefix (trailing empty hashes trimmed) and the supplementary subtree
/// roots (empty hashes filtered out), in the order the verifier consumes
/// them.
pub fn generate_prefix_proof(
    prefix_index: u64,
    leaves: &[Hash],
    virtual_size: u64,
) -> Result<(Vec<Hash>, Vec<Hash>), HistoryError> {
    let mut committer = HistoryCommitter::new();
    let hashed = hash_leaves(leaves);
    let (expansion, proof) = prefix_and_proof(&mut committer, prefix_index, &hashed, virtual_size)?;
    Ok((
        trim_trailing_empty_hashes(expansion),
        filter_empty_hashes(proof),
    ))
}

fn prefix_and_proof(
    committer: &mut HistoryCommitter,
    index: u64,
    leaves: &[Hash],
    virtual_size: u64,
) -> Result<(Vec<Hash>, Vec<Hash>), HistoryError> {
    if leaves.is_empty() {
        return Err(HistoryError::EmptyLeaves);
    }
    let lv_len = leaves.len() as u64;
    if virtual_size == 0 {
        return Err(HistoryError::VirtualSizeZero);
    }
    if lv_len > virtual_size {
        return Err(HistoryError::VirtualTooSmall {
            virtual_size,
            leaves: lv_len,
        });
    }
    let prefix_size = index.checked_add(1).filter(|s| *s <= virtual_size).ok_or(
        HistoryError::IndexTooLarge {
            index,
            virtual_size,
        },
    )?;
    let n = log2_floor(virtual_size) as usize + 1;
    committer.populate_fillers(&leaves[leaves.len() - 1], n);

    let prefix = if prefix_size > lv_len {
        subtree_expansion(committer, leaves, prefix_size, 0, false)?
    } else {
        subtree_expansion(committer, &leaves[..prefix_size as usize], prefix_size, 0, false)?
    };
    let tail = proof_tail(committer, index, leaves, virtual_size, 0)?;
    Ok((prefix, tail))
}

/// The mountain-range expansion of `leaves` padded to `virtual_size`
/// within a subtree of capacity `limit` (0 means "fit exactly").
///
/// Entries run smallest subtree last; unset positions are empty hashes
/// unless `stripped`. Emitted post-order: the remainder's expansion first,
/// then the just-computed complete left subtree root appended.
fn subtree_expansion(
    committer: &HistoryCommitter,
    leaves: &[Hash],
    virtual_size: u64,
    limit: u64,
    stripped: bool,
) -> Result<Vec<Hash>, HistoryError> {
    if leaves.is_empty() {
        return Ok(Vec::new());
    }
    let lv_len = leaves.len() as u64;
    if virtual_size == 0 {
        let mut proof = Vec::new();
        let mut i = limit;
        while i > 1 {
            proof.push(EMPTY_HASH);
            i /= 2;
        }
        return Ok(proof);
    }
    let limit = if limit == 0 {
        next_power_of_two(virtual_size)
    } else {
        limit
    };
    if limit == virtual_size {
        let root = subtree_root(committer, leaves, limit)?;
        let mut proof = Vec::new();
        if !stripped {
            let mut i = limit;
            while i > 1 {
                proof.push(EMPTY_HASH);
                i /= 2;
            }
        }
        proof.push(root);
        return Ok(proof);
    }
    let mid = limit / 2;
    if lv_len > mid {
        let left = subtree_root(committer, &leaves[..mid as usize], mid)?;
        let mut proof =
            subtree_expansion(committer, &leaves[mid as usize..], virtual_size - mid, mid, stripped)?;
        proof.push(left);
        return Ok(proof);
    }
    if virtual_size >= mid {
        let left = subtree_root(committer, leaves, mid)?;
        let filler_leaf = [committer.first_filler()?];
        let mut proof =
            subtree_expansion(committer, &filler_leaf, virtual_size - mid, mid, stripped)?;
        proof.push(left);
        return Ok(proof);
    }
    if stripped {
        return subtree_expansion(committer, leaves, virtual_size, mid, stripped);
    }
    let mut expansion = subtree_expansion(committer, leaves, virtual_size, mid, stripped)?;
    expansion.push(EMPTY_HASH);
    Ok(expansion)
}

/// Supplementary hashes proving leaf `index` sits on the boundary between
/// the prefix and the remainder of the virtual tree.
///
/// Walks the halving structure choosing the branch containing `index` and,
/// wherever the target diverges left, splices in the reversed stripped
/// expansion of the skipped right branch.
fn proof_tail(
    committer: &HistoryCommitter,
    index: u64,
    leaves: &[Hash],
    virtual_size: u64,
    limit: u64,
) -> Result<Vec<Hash>, HistoryError> {
    if leaves.is_empty() {
        return Err(HistoryError::EmptyLeaves);
    }
    let lv_len = leaves.len() as u64;
    let limit = if limit == 0 {
        next_power_of_two(virtual_size)
    } else {
        limit
    };
    if limit == 1 {
        // Only reachable with index == 0.
        return Ok(Vec::new());
    }
    let mid = limit / 2;
    if index >= mid {
        if lv_len > mid {
            return proof_tail(
                committer,
                index - mid,
                &leaves[mid as usize..],
                virtual_size - mid,
                mid,
            );
        }
        let filler_leaf = [committer.first_filler()?];
        return proof_tail(committer, index - mid, &filler_leaf, virtual_size - mid, mid);
    }
    if lv_len > mid {
        let mut tail = proof_tail(committer, index, &leaves[..mid as usize], mid, mid)?;
        let right =
            subtree_expansion(committer, &leaves[mid as usize..], virtual_size - mid, mid, true)?;
        tail.extend(right.into_iter().rev());
        return Ok(tail);
    }
    if virtual_size > mid {
        let mut tail = proof_tail(committer, index, leaves, mid, mid)?;
        let filler_leaf = [committer.first_filler()?];
        let right = subtree_expansion(committer, &filler_leaf, virtual_size - mid, mid, true)?;
        tail.extend(right.into_iter().rev());
        return Ok(tail);
    }
    proof_tail(committer, index, leaves, virtual_size, mid)
}

/// Root of a complete subtree of exactly `limit` slots.
fn subtree_root(
    committer: &HistoryCommitter,
    leaves: &[Hash],
    limit: u64,
) -> Result<Hash, HistoryError> {
    committer.partial_root(
        leaves,
        limit,
        limit,
        crate::committer::root_position(limit),
        &mut NodeRecorder::disabled(),
    )
}

fn trim_trailing_empty_hashes(mut hashes: Vec<Hash>) -> Vec<Hash> {
    while hashes.last() == Some(&EMPTY_HASH) {
        hashes.pop();
    }
    hashes
}

fn filter_empty_hashes(hashes: Vec<Hash>) -> Vec<Hash> {
    hashes.into_iter().filter(|h| *h != EMPTY_HASH).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bisect_hash::hash_leaf;

    fn leaves(n: u64) -> Vec<Hash> {
        (0..n).map(|i| Hash::repeat_byte(i as u8 + 1)).collect()
    }

    #[test]
    fn test_rejects_empty_leaves() {
        assert_eq!(
            generate_prefix_proof(0, &[], 4),
            Err(HistoryError::EmptyLeaves)
        );
    }

    #[test]
    fn test_rejects_zero_virtual() {
        let lv = leaves(1);
        assert_eq!(
            generate_prefix_proof(0, &lv, 0),
            Err(HistoryError::VirtualSizeZero)
        );
    }

    #[test]
    fn test_rejects_index_past_virtual() {
        let lv = leaves(2);
        assert_eq!(
            generate_prefix_proof(4, &lv, 4),
            Err(HistoryError::IndexTooLarge {
                index: 4,
                virtual_size: 4,
            })
        );
    }

    #[test]
    fn test_rejects_index_at_u64_max() {
        // The prefix size is index + 1; the extreme index must be rejected,
        // not wrapped.
        let lv = leaves(2);
        assert_eq!(
            generate_prefix_proof(u64::MAX, &lv, 4),
            Err(HistoryError::IndexTooLarge {
                index: u64::MAX,
                virtual_size: 4,
            })
        );
    }

    #[test]
    fn test_rejects_more_leaves_than_virtual() {
        let lv = leaves(5);
        assert_eq!(
            generate_prefix_proof(1, &lv, 3),
            Err(HistoryError::VirtualTooSmall {
                virtual_size: 3,
                leaves: 5,
            })
        );
    }

    #[test]
    fn test_expansion_entries_are_subtree_roots() {
        // Prefix of size 3 inside a virtual tree of 4: the expansion holds
        // the size-2 subtree root and the dangling third leaf.
        let lv = leaves(4);
        let (expansion, _) = generate_prefix_proof(2, &lv, 4).expect("prefix proof");
        let hashed = hash_leaves(&lv);
        let committer = {
            let mut c = HistoryCommitter::new();
            c.populate_fillers(&hashed[3], 3);
            c
        };
        // Stripped mountain-range form of size 3: [leaf_2, root(l0, l1)].
        assert_eq!(expansion.len(), 2);
        assert_eq!(expansion[0], hashed[2]);
        assert_eq!(
            expansion[1],
            subtree_root(&committer, &hashed[..2], 2).expect("size-2 root")
        );
    }

    #[test]
    fn test_proof_contains_no_empty_hashes() {
        let lv = leaves(3);
        let (expansion, proof) = generate_prefix_proof(1, &lv, 7).expect("prefix proof");
        assert!(proof.iter().all(|h| *h != EMPTY_HASH));
        // Trimmed form never ends in an empty hash either.
        assert_ne!(expansion.last(), Some(&EMPTY_HASH));
    }

    #[test]
    fn test_prefix_of_single_leaf() {
        let lv = leaves(1);
        let (expansion, _) = generate_prefix_proof(0, &lv, 4).expect("prefix proof");
        assert_eq!(expansion, vec![hash_leaf(&lv[0])]);
    }
}
