//! Challenge coordinate arithmetic.
//!
//! The protocol fixes a table of per-level leaf heights, level 0 being the
//! block challenge level and deeper levels covering progressively smaller
//! ranges of machine opcodes. A position in the challenge hierarchy is a
//! list of heights, one per level; mapping it to a flat opcode index is a
//! mixed-radix conversion where each digit's place value is the product of
//! all deeper level heights.

use crate::types::{Height, OpcodeIndex, StepSize};
use thiserror::Error;

/// Coordinate arithmetic errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapperError {
    /// A challenge level past the configured leaf height table.
    #[error("challenge level {level} is out of range for {levels} challenge levels")]
    ChallengeLevelOutOfRange {
        /// The requested level.
        level: u64,
        /// The number of configured levels.
        levels: u64,
    },
    /// The flat opcode index does not fit in a `u64`.
    #[error("computed machine start index overflows u64")]
    IndexOverflow,
    /// An end height past the level's maximum.
    #[error("end height {end} was greater than max height {max} for level")]
    RangeExceedsLevelMax {
        /// The requested end height.
        end: Height,
        /// The level's maximum height.
        max: Height,
    },
    /// An end height below the start height.
    #[error("end height {end} is below start height {from}")]
    InvalidRange {
        /// The range's start height.
        from: Height,
        /// The requested end height.
        end: Height,
    },
}

/// The challenge level a list of origin heights resolves to: one deeper
/// than the last enclosing level.
pub fn deepest_requested_challenge_level(origin_heights: &[Height]) -> u64 {
    origin_heights.len() as u64
}

/// The protocol's ordered per-level leaf height table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengeCoordinates {
    leaf_heights: Vec<Height>,
}

impl ChallengeCoordinates {
    /// Wrap a leaf height table, level 0 first.
    pub fn new(leaf_heights: Vec<Height>) -> Self {
        ChallengeCoordinates { leaf_heights }
    }

    /// The total number of challenge levels.
    pub fn number_of_levels(&self) -> u64 {
        self.leaf_heights.len() as u64
    }

    /// The leaf height constant at `level`.
    pub fn leaf_height_at(&self, level: u64) -> Result<Height, MapperError> {
        self.leaf_heights
            .get(level as usize)
            .copied()
            .ok_or(MapperError::ChallengeLevelOutOfRange {
                level,
                levels: self.number_of_levels(),
            })
    }

    /// Check that a list of origin heights addresses an existing level:
    /// there are only `L - 1` enclosing levels above the deepest one.
    pub fn validate_origin_heights<'h>(
        &self,
        origin_heights: &'h [Height],
    ) -> Result<&'h [Height], MapperError> {
        if origin_heights.len() as u64 + 1 > self.number_of_levels() {
            return Err(MapperError::ChallengeLevelOutOfRange {
                level: origin_heights.len() as u64,
                levels: self.number_of_levels(),
            });
        }
        Ok(origin_heights)
    }

    /// The opcode index a machine must be stepped to for the state at the
    /// given coordinates.
    ///
    /// The first origin height addresses the block challenge level, which
    /// is over messages rather than opcodes, so it contributes nothing.
    /// Each remaining height, with `from_height` as the final digit, is
    /// multiplied by the product of all deeper leaf heights. The sum is
    /// accumulated in `u128` and checked to fit `u64`, since the inputs are
    /// attacker-influenced.
    pub fn compute_machine_start_index(
        &self,
        origin_heights: &[Height],
        from_height: Height,
    ) -> Result<OpcodeIndex, MapperError> {
        if origin_heights.is_empty() {
            return Ok(OpcodeIndex(0));
        }
        let leaf_heights = self.leaf_heights.get(1..).unwrap_or(&[]);
        let digits = origin_heights[1..]
            .iter()
            .copied()
            .chain(std::iter::once(from_height));

        let mut opcode_index: u128 = 0;
        for (idx, digit) in digits.enumerate() {
            let mut place: u128 = 1;
            for leaf_height in leaf_heights.get(idx + 1..).unwrap_or(&[]) {
                place = place
                    .checked_mul(u128::from(leaf_height.0))
                    .ok_or(MapperError::IndexOverflow)?;
            }
            let increase = place
                .checked_mul(u128::from(digit.0))
                .ok_or(MapperError::IndexOverflow)?;
            opcode_index = opcode_index
                .checked_add(increase)
                .ok_or(MapperError::IndexOverflow)?;
        }
        u64::try_from(opcode_index)
            .map(OpcodeIndex)
            .map_err(|_| MapperError::IndexOverflow)
    }

    /// How many opcodes one step at `level` spans: the product of all
    /// deeper leaf heights, 1 at the deepest level.
    pub fn compute_step_size(&self, level: u64) -> Result<StepSize, MapperError> {
        // Resolves the out-of-range case before any slicing.
        self.leaf_height_at(level)?;
        if level + 1 == self.number_of_levels() {
            return Ok(StepSize(1));
        }
        let mut total: u64 = 1;
        for leaf_height in &self.leaf_heights[(level + 1) as usize..] {
            total = total
                .checked_mul(leaf_height.0)
                .ok_or(MapperError::IndexOverflow)?;
        }
        Ok(StepSize(total))
    }

    /// How many hashes a commitment at `level` needs: `to - from + 1`,
    /// with `to` defaulting to the level's maximum height.
    pub fn compute_required_number_of_hashes(
        &self,
        level: u64,
        from: Height,
        up_to: Option<Height>,
    ) -> Result<u64, MapperError> {
        let max = self.leaf_height_at(level)?;
        let end = match up_to {
            Some(end) => {
                // Committing past the level maximum is an operator error;
                // surfacing it beats silently truncating.
                if end > max {
                    return Err(MapperError::RangeExceedsLevelMax { end, max });
                }
                end
            }
            None => Height(max.0.saturating_sub(1)),
        };
        if end < from {
            return Err(MapperError::InvalidRange { from, end });
        }
        Ok(end.0 - from.0 + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn coordinates() -> ChallengeCoordinates {
        ChallengeCoordinates::new(vec![
            Height(32),
            Height(1024),
            Height(1024),
            Height(1024),
        ])
    }

    #[test]
    fn test_machine_start_index_mixed_radix() {
        // megastep 4, kilostep 5, step 10 inside a block challenge at 0:
        // 4 * 1024 * 1024 + 5 * 1024 + 10.
        let index = coordinates()
            .compute_machine_start_index(&[Height(0), Height(4), Height(5)], Height(10))
            .expect("start index");
        assert_eq!(index, OpcodeIndex(4_199_434));
    }

    #[test]
    fn test_machine_start_index_block_level_is_zero() {
        let index = coordinates()
            .compute_machine_start_index(&[], Height(77))
            .expect("start index");
        assert_eq!(index, OpcodeIndex(0));
    }

    #[test]
    fn test_machine_start_index_single_level() {
        // Only the block origin height: the from height is the sole digit,
        // with place value 1024 * 1024.
        let index = coordinates()
            .compute_machine_start_index(&[Height(9)], Height(3))
            .expect("start index");
        assert_eq!(index, OpcodeIndex(3 * 1024 * 1024));
    }

    #[test]
    fn test_machine_start_index_overflow() {
        let coords = ChallengeCoordinates::new(vec![
            Height(2),
            Height(u64::MAX),
            Height(u64::MAX),
            Height(u64::MAX),
        ]);
        assert_eq!(
            coords.compute_machine_start_index(
                &[Height(1), Height(1), Height(1)],
                Height(1)
            ),
            Err(MapperError::IndexOverflow)
        );
    }

    #[test]
    fn test_step_size_per_level() {
        let coords = coordinates();
        assert_eq!(coords.compute_step_size(0), Ok(StepSize(1024 * 1024 * 1024)));
        assert_eq!(coords.compute_step_size(1), Ok(StepSize(1024 * 1024)));
        assert_eq!(coords.compute_step_size(2), Ok(StepSize(1024)));
        assert_eq!(coords.compute_step_size(3), Ok(StepSize(1)));
        assert_matches!(
            coords.compute_step_size(4),
            Err(MapperError::ChallengeLevelOutOfRange { level: 4, levels: 4 })
        );
    }

    #[test]
    fn test_required_number_of_hashes() {
        let coords = coordinates();
        // Defaults to the full level range.
        assert_eq!(
            coords.compute_required_number_of_hashes(1, Height(0), None),
            Ok(1024)
        );
        assert_eq!(
            coords.compute_required_number_of_hashes(1, Height(0), Some(Height(10))),
            Ok(11)
        );
        // The level maximum itself is allowed as an end height.
        assert_eq!(
            coords.compute_required_number_of_hashes(1, Height(0), Some(Height(1024))),
            Ok(1025)
        );
        assert_matches!(
            coords.compute_required_number_of_hashes(1, Height(0), Some(Height(1025))),
            Err(MapperError::RangeExceedsLevelMax { .. })
        );
        assert_matches!(
            coords.compute_required_number_of_hashes(1, Height(5), Some(Height(3))),
            Err(MapperError::InvalidRange { .. })
        );
    }

    #[test]
    fn test_validate_origin_heights() {
        let coords = coordinates();
        assert!(coords.validate_origin_heights(&[]).is_ok());
        let three = [Height(1), Height(2), Height(3)];
        assert!(coords.validate_origin_heights(&three).is_ok());
        let four = [Height(1), Height(2), Height(3), Height(4)];
        assert_matches!(
            coords.validate_origin_heights(&four),
            Err(MapperError::ChallengeLevelOutOfRange { level: 4, levels: 4 })
        );
    }

    #[test]
    fn test_deepest_requested_challenge_level() {
        assert_eq!(deepest_requested_challenge_level(&[]), 0);
        assert_eq!(
            deepest_requested_challenge_level(&[Height(0), Height(4)]),
            2
        );
    }
}
