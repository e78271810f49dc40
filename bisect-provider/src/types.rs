//! Typed units and request shapes for the provider.
//!
//! Heights, batches, opcode indices and step sizes are all `u64` on the
//! wire; distinct newtypes keep them from being swapped in the mapper's
//! mixed-radix arithmetic.

use std::fmt::{self, Write as _};

use bisect_hash::Hash;

macro_rules! unit_u64 {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<u64> for $name {
            fn from(v: u64) -> Self {
                $name(v)
            }
        }
    };
}

unit_u64! {
    /// A leaf index within one challenge level.
    Height
}
unit_u64! {
    /// A batch number of L2 messages.
    Batch
}
unit_u64! {
    /// A flat index into a machine's opcode sequence.
    OpcodeIndex
}
unit_u64! {
    /// How many opcodes one collected hash spans.
    StepSize
}

/// The challenge level a commitment request is resolved at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChallengeLevel {
    /// The top level, over ranges of L2 messages.
    Block,
    /// Any deeper level, over ranges of machine opcodes.
    SubChallenge,
}

/// A request for a history commitment at some challenge level.
///
/// `upper_challenge_origin_heights` holds one height per enclosing
/// challenge level, deepest last; its length selects the level the request
/// resolves at. Empty means the block level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryCommitmentRequest {
    /// Root of the WASM module the machines execute.
    pub wasm_module_root: Hash,
    /// First batch of the claimed range.
    pub from_batch: Batch,
    /// Batch the claimed range must not reach past.
    pub batch_limit: Batch,
    /// Origin height at each enclosing challenge level.
    pub upper_challenge_origin_heights: Vec<Height>,
    /// Height the committed range starts from at the block level.
    pub from_height: Height,
    /// Last height to commit to; `None` commits up to the level's maximum.
    pub up_to_height: Option<Height>,
}

/// Instructions for one machine hash collection run.
///
/// Identical configs describe identical collections, so the string form of
/// a config doubles as the dedup key for in-flight collection runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashCollectorConfig {
    /// Root of the WASM module the machine executes.
    pub wasm_module_root: Hash,
    /// First batch of the assertion the collection belongs to.
    pub from_batch: Batch,
    /// Height within the block challenge where the rivals diverge.
    pub block_challenge_height: Height,
    /// Heights at the machine challenge levels above the collected one,
    /// deepest last. The block level is not included.
    pub step_heights: Vec<Height>,
    /// How many hashes to collect.
    pub num_desired_hashes: u64,
    /// Opcode index of the first collected state.
    pub machine_start_index: OpcodeIndex,
    /// Opcode distance between consecutive collected states.
    pub step_size: StepSize,
}

impl HashCollectorConfig {
    /// Canonical string form, used to collapse concurrent identical
    /// collections into one run.
    pub fn cache_key(&self) -> String {
        let mut key = String::new();
        let _ = write!(key, "{}/{}/{}/", self.wasm_module_root, self.from_batch, self.block_challenge_height);
        for height in &self.step_heights {
            let _ = write!(key, "{height}/");
        }
        let _ = write!(
            key,
            "{}/{}/{}",
            self.num_desired_hashes, self.machine_start_index, self.step_size
        );
        key
    }
}

/// Everything needed to submit a one-step proof on chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OneStepData {
    /// Machine state hash before the disputed step.
    pub before_hash: Hash,
    /// Machine state hash after the disputed step.
    pub after_hash: Hash,
    /// Serialized execution proof for the step.
    pub proof: Vec<u8>,
}
