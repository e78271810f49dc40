//! Merkle expansions: the compact form of a possibly incomplete binary
//! tree.
//!
//! An expansion is a vector indexed by level; entry `i` is either the root
//! of the tree's complete subtree of size `2^i` or the empty hash if the
//! tree has none at that level. Any tree size decomposes uniquely this way,
//! exactly like the binary representation of the size.

use bisect_hash::{EMPTY_HASH, Hash, hash_leaf, hash_node};

use crate::error::PrefixProofError;

/// Deepest supported tree. Levels must stay strictly below this.
pub const MAX_LEVEL: u64 = 64;

/// Fold an expansion into the root of the tree it represents.
///
/// Larger subtrees sit on the left; smaller subtrees are balanced with
/// empty hashes on the right before being combined upward.
pub fn root(me: &[Hash]) -> Result<Hash, PrefixProofError> {
    if me.is_empty() {
        return Err(PrefixProofError::RootForEmptyExpansion);
    }
    if me.len() as u64 > MAX_LEVEL {
        return Err(PrefixProofError::ExpansionTooLarge);
    }
    let mut accum = EMPTY_HASH;
    for (i, val) in me.iter().enumerate() {
        if accum == EMPTY_HASH {
            if *val != EMPTY_HASH {
                accum = *val;
                // A lone subtree below the top level needs balancing with
                // an empty sibling before anything above can absorb it.
                if i != me.len() - 1 {
                    accum = hash_node(&accum, &EMPTY_HASH);
                }
            }
        } else if *val != EMPTY_HASH {
            accum = hash_node(val, &accum);
        } else {
            accum = hash_node(&accum, &EMPTY_HASH);
        }
    }
    Ok(accum)
}

/// The tree size an expansion represents: the sum of its set levels.
pub fn tree_size(me: &[Hash]) -> u64 {
    me.iter()
        .enumerate()
        .filter(|(_, h)| **h != EMPTY_HASH)
        .map(|(i, _)| 1u64 << i)
        .sum()
}

/// Append a complete subtree rooted at `subtree_root` to the expansion at
/// `level`.
///
/// Works like binary addition: the new subtree may complete the subtree a
/// level up, carrying until it lands in an empty slot. Appending is only
/// legal at or below the tree's least significant complete subtree; above
/// that it would leave a hole.
pub fn append_complete_subtree(
    me: &[Hash],
    level: u64,
    subtree_root: Hash,
) -> Result<Vec<Hash>, PrefixProofError> {
    if level >= MAX_LEVEL {
        return Err(PrefixProofError::LevelTooHigh);
    }
    if subtree_root == EMPTY_HASH {
        return Err(PrefixProofError::CannotAppendEmpty);
    }
    if me.len() as u64 > MAX_LEVEL {
        return Err(PrefixProofError::ExpansionTooLarge);
    }

    if me.is_empty() {
        let mut next = vec![EMPTY_HASH; level as usize + 1];
        next[level as usize] = subtree_root;
        return Ok(next);
    }
    if level >= me.len() as u64 {
        return Err(PrefixProofError::LevelTooHigh);
    }

    let mut accum = subtree_root;
    let mut next = vec![EMPTY_HASH; me.len()];
    for i in 0..me.len() {
        if (i as u64) < level {
            if me[i] != EMPTY_HASH {
                return Err(PrefixProofError::CannotAppendAboveLeastSignificant);
            }
        } else if accum == EMPTY_HASH {
            // Carry already absorbed; copy the rest through.
            next[i] = me[i];
        } else if me[i] == EMPTY_HASH {
            next[i] = accum;
            accum = EMPTY_HASH;
        } else {
            // Slot occupied: combine and carry to the level above.
            next[i] = EMPTY_HASH;
            accum = hash_node(&me[i], &accum);
        }
    }
    if accum != EMPTY_HASH {
        next.push(accum);
    }
    if next.len() as u64 >= MAX_LEVEL + 1 {
        return Err(PrefixProofError::LevelTooHigh);
    }
    Ok(next)
}

/// Append a single leaf: a complete subtree at level 0.
///
/// The leaf is re-hashed first so a 32-byte leaf preimage can never collide
/// with a 64-byte internal node preimage.
pub fn append_leaf(me: &[Hash], leaf: Hash) -> Result<Vec<Hash>, PrefixProofError> {
    append_complete_subtree(me, 0, hash_leaf(&leaf))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_of_empty_expansion_is_an_error() {
        assert_eq!(root(&[]), Err(PrefixProofError::RootForEmptyExpansion));
    }

    #[test]
    fn test_root_of_single_entry_is_itself() {
        let h = Hash::repeat_byte(0x12);
        assert_eq!(root(&[h]), Ok(h));
    }

    #[test]
    fn test_root_of_complete_tree_is_its_entry() {
        let r = Hash::repeat_byte(0xCC);
        assert_eq!(root(&[EMPTY_HASH, EMPTY_HASH, r]), Ok(r));
    }

    #[test]
    fn test_root_balances_dangling_subtree() {
        // Size 3: a level-1 subtree AB plus a dangling leaf C.
        let ab = Hash::repeat_byte(0xAB);
        let c = Hash::repeat_byte(0xC0);
        assert_eq!(
            root(&[c, ab]),
            Ok(hash_node(&ab, &hash_node(&c, &EMPTY_HASH)))
        );
    }

    #[test]
    fn test_root_accepts_exactly_max_level_entries() {
        let me = vec![EMPTY_HASH; MAX_LEVEL as usize];
        assert_eq!(root(&me), Ok(EMPTY_HASH));
    }

    #[test]
    fn test_root_rejects_oversized_expansion() {
        let me = vec![EMPTY_HASH; MAX_LEVEL as usize + 1];
        assert_eq!(root(&me), Err(PrefixProofError::ExpansionTooLarge));
    }

    #[test]
    fn test_tree_size_reads_set_levels() {
        let h = Hash::repeat_byte(1);
        assert_eq!(tree_size(&[]), 0);
        assert_eq!(tree_size(&[h]), 1);
        assert_eq!(tree_size(&[h, EMPTY_HASH, h]), 5);
        assert_eq!(tree_size(&[EMPTY_HASH, h, h]), 6);
    }

    #[test]
    fn test_append_into_empty_expansion() {
        let r = Hash::repeat_byte(2);
        let me = append_complete_subtree(&[], 2, r).expect("append");
        assert_eq!(me, vec![EMPTY_HASH, EMPTY_HASH, r]);
    }

    #[test]
    fn test_append_carries_like_binary_addition() {
        let a = Hash::repeat_byte(0x0A);
        let b = Hash::repeat_byte(0x0B);
        // Tree of size 1 plus a leaf completes a level-1 subtree.
        let me = append_complete_subtree(&[a], 0, b).expect("append");
        assert_eq!(me, vec![EMPTY_HASH, hash_node(&a, &b)]);
        assert_eq!(tree_size(&me), 2);
    }

    #[test]
    fn test_append_rejects_empty_root() {
        assert_eq!(
            append_complete_subtree(&[Hash::repeat_byte(1)], 0, EMPTY_HASH),
            Err(PrefixProofError::CannotAppendEmpty)
        );
    }

    #[test]
    fn test_append_rejects_level_above_least_significant() {
        let h = Hash::repeat_byte(3);
        // Expansion of size 3 has its lowest complete subtree at level 0;
        // appending at level 1 would leave a hole.
        assert_eq!(
            append_complete_subtree(&[h, h], 1, Hash::repeat_byte(4)),
            Err(PrefixProofError::CannotAppendAboveLeastSignificant)
        );
    }

    #[test]
    fn test_append_rejects_level_beyond_expansion() {
        let h = Hash::repeat_byte(5);
        assert_eq!(
            append_complete_subtree(&[h], 3, h),
            Err(PrefixProofError::LevelTooHigh)
        );
        assert_eq!(
            append_complete_subtree(&[], MAX_LEVEL, h),
            Err(PrefixProofError::LevelTooHigh)
        );
    }

    #[test]
    fn test_append_leaf_rehashes() {
        let leaf = Hash::repeat_byte(6);
        let me = append_leaf(&[], leaf).expect("append leaf");
        assert_eq!(me, vec![hash_leaf(&leaf)]);
    }

    #[test]
    fn test_leaf_appends_match_sequential_sizes() {
        let mut me: Vec<Hash> = Vec::new();
        for i in 0..9u64 {
            me = append_leaf(&me, Hash::repeat_byte(i as u8 + 1)).expect("append leaf");
            assert_eq!(tree_size(&me), i + 1);
        }
    }
}
