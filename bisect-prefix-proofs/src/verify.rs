//! Prefix proof verification.

use bisect_hash::Hash;

use crate::{
    bits::{least_significant_bit, most_significant_bit},
    error::PrefixProofError,
    expansion::{append_complete_subtree, root, tree_size},
};

/// The highest level appendable to a tree of `start_size` without the
/// result exceeding `end_size`.
///
/// The sizes share their high bits; below the first differing bit the start
/// looks like `0yyy` and the end like `1zzz`. If `yyy` is nonzero the
/// append is capped by the start's lowest complete subtree, its least
/// significant bit. Otherwise anything up to the end's most significant
/// differing bit fits.
pub fn maximum_append_between(start_size: u64, end_size: u64) -> Result<u64, PrefixProofError> {
    if start_size >= end_size {
        return Err(PrefixProofError::StartNotLessThanEnd {
            start: start_size,
            end: end_size,
        });
    }
    let msb = most_significant_bit(start_size ^ end_size)?;
    // Everything at and below the first differing bit. Built by shifting
    // down from the top so that msb == 63 yields an all-ones mask instead
    // of a shift past the word.
    let mask = u64::MAX >> (63 - msb);
    let y = start_size & mask;
    let z = end_size & mask;
    if y != 0 {
        return least_significant_bit(y);
    }
    if z != 0 {
        return most_significant_bit(z);
    }
    // start < end guarantees the sizes differ under the mask.
    Err(PrefixProofError::CannotBeZero)
}

/// Inputs to [`verify_prefix_proof`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyPrefixProofConfig {
    /// Root of the prefix tree.
    pub pre_root: Hash,
    /// Leaf count of the prefix tree.
    pub pre_size: u64,
    /// Root of the full tree.
    pub post_root: Hash,
    /// Leaf count of the full tree.
    pub post_size: u64,
    /// Merkle expansion of the prefix tree.
    pub pre_expansion: Vec<Hash>,
    /// Complete subtree roots to append, in consumption order.
    pub prefix_proof: Vec<Hash>,
}

/// Verify that `pre_root` commits to a prefix of the leaves committed by
/// `post_root`.
///
/// Grows the pre expansion by appending the proof's subtree roots, always
/// at the maximal legal level, until the post size is reached, then checks
/// the resulting root. Every proof entry must be consumed.
pub fn verify_prefix_proof(cfg: &VerifyPrefixProofConfig) -> Result<(), PrefixProofError> {
    if cfg.pre_size == 0 {
        return Err(PrefixProofError::CannotBeZero);
    }
    if root(&cfg.pre_expansion)? != cfg.pre_root {
        return Err(PrefixProofError::PreRootMismatch);
    }
    if cfg.pre_size != tree_size(&cfg.pre_expansion) {
        return Err(PrefixProofError::TreeSizeMismatch);
    }
    if cfg.pre_size >= cfg.post_size {
        return Err(PrefixProofError::StartNotLessThanEnd {
            start: cfg.pre_size,
            end: cfg.post_size,
        });
    }

    let mut exp = cfg.pre_expansion.clone();
    let mut size = cfg.pre_size;
    let mut proof_index = 0usize;
    while size < cfg.post_size {
        let level = maximum_append_between(size, cfg.post_size)?;
        let Some(subtree_root) = cfg.prefix_proof.get(proof_index) else {
            return Err(PrefixProofError::IndexOutOfRange);
        };
        exp = append_complete_subtree(&exp, level, *subtree_root)?;
        size += 1 << level;
        if size > cfg.post_size {
            return Err(PrefixProofError::SizeExceedsPostSize {
                size,
                post_size: cfg.post_size,
            });
        }
        proof_index += 1;
    }
    if root(&exp)? != cfg.post_root {
        return Err(PrefixProofError::PostRootMismatch);
    }
    if proof_index != cfg.prefix_proof.len() {
        return Err(PrefixProofError::IncompleteProof {
            consumed: proof_index as u64,
            supplied: cfg.prefix_proof.len() as u64,
        });
    }
    Ok(())
}
