//! History commitment orchestration.
//!
//! The provider turns challenge coordinates into collector work: it maps a
//! request to an opcode start index, step size and hash count, has the
//! collectors produce the state hashes, and wraps the result into the
//! commitments and proofs the protocol submits on chain.

use alloy_sol_types::SolValue;
use bisect_hash::Hash;
use bisect_history::{History, compute_root, generate_prefix_proof};
use bisect_prefix_proofs::{VerifyPrefixProofConfig, verify_prefix_proof};

use crate::{
    cache::ComputationCache,
    error::ProviderError,
    mapper::{ChallengeCoordinates, deepest_requested_challenge_level},
    types::{
        Batch, ChallengeLevel, HashCollectorConfig, Height, HistoryCommitmentRequest, OneStepData,
        OpcodeIndex,
    },
};

/// Steps a machine through opcode ranges and hashes its states.
///
/// The provider assumes collection is deterministic in the config: the
/// same config must always produce the same hashes.
pub trait MachineHashCollector {
    /// Collect `cfg.num_desired_hashes` machine state hashes, starting at
    /// `cfg.machine_start_index` and stepping by `cfg.step_size`.
    fn collect_machine_hashes(&self, cfg: &HashCollectorConfig) -> Result<Vec<Hash>, ProviderError>;
}

/// Produces a serialized one-step execution proof for a single opcode.
pub trait ProofCollector {
    /// Prove the execution of the opcode at `machine_index` within the
    /// challenged block.
    fn collect_proof(
        &self,
        wasm_module_root: Hash,
        from_batch: Batch,
        block_challenge_height: Height,
        machine_index: OpcodeIndex,
    ) -> Result<Vec<u8>, ProviderError>;
}

/// Produces the state hash after each L2 message in a range.
pub trait L2MessageStateCollector {
    /// State hashes from `from_height` through `up_to_height` (all
    /// available states when `None`), never reading past `batch_limit`.
    fn l2_message_states_up_to(
        &self,
        from_height: Height,
        up_to_height: Option<Height>,
        from_batch: Batch,
        batch_limit: Batch,
    ) -> Result<Vec<Hash>, ProviderError>;
}

/// Computes history commitments and the proofs that connect them.
///
/// The only shared mutable state is the collection cache; everything else
/// is pure arithmetic over the request, so the provider is freely shared
/// across threads and concurrent identical collections collapse into one
/// collector run.
pub struct HistoryCommitmentProvider<L, M, P> {
    l2_state_collector: L,
    machine_hash_collector: M,
    proof_collector: P,
    coordinates: ChallengeCoordinates,
    collection_cache: ComputationCache<String, Vec<Hash>, ProviderError>,
}

impl<L, M, P> HistoryCommitmentProvider<L, M, P>
where
    L: L2MessageStateCollector,
    M: MachineHashCollector,
    P: ProofCollector,
{
    /// Wire up a provider from its collectors and the protocol's leaf
    /// height table.
    pub fn new(
        l2_state_collector: L,
        machine_hash_collector: M,
        proof_collector: P,
        coordinates: ChallengeCoordinates,
    ) -> Self {
        HistoryCommitmentProvider {
            l2_state_collector,
            machine_hash_collector,
            proof_collector,
            coordinates,
            collection_cache: ComputationCache::new(),
        }
    }

    /// The virtual size for a commitment: one past the requested end
    /// height, or one past the level's maximum when no end is given.
    fn virtual_from(
        &self,
        up_to_height: Option<Height>,
        origin_heights: &[Height],
    ) -> Result<u64, ProviderError> {
        if let Some(height) = up_to_height {
            return height
                .0
                .checked_add(1)
                .ok_or(ProviderError::HeightOverflow(height.0));
        }
        let validated = self.coordinates.validate_origin_heights(origin_heights)?;
        let level = deepest_requested_challenge_level(validated);
        let leaf_height = self.coordinates.leaf_height_at(level)?;
        leaf_height
            .0
            .checked_add(1)
            .ok_or(ProviderError::HeightOverflow(leaf_height.0))
    }

    /// Compute a history commitment for the request.
    pub fn history_commitment(
        &self,
        req: &HistoryCommitmentRequest,
    ) -> Result<History, ProviderError> {
        let hashes = self.history_commitment_impl(req)?;
        let virtual_size =
            self.virtual_from(req.up_to_height, &req.upper_challenge_origin_heights)?;
        Ok(History::new(&hashes, virtual_size)?)
    }

    /// Collect the leaves a request commits to.
    ///
    /// Block-level requests go straight to the L2 state collector. Deeper
    /// requests are mapped to machine coordinates and run through the
    /// collection cache keyed by the collector config, collapsing
    /// concurrent identical collections.
    fn history_commitment_impl(
        &self,
        req: &HistoryCommitmentRequest,
    ) -> Result<Vec<Hash>, ProviderError> {
        let validated = self
            .coordinates
            .validate_origin_heights(&req.upper_challenge_origin_heights)?;
        if validated.is_empty() {
            return self.l2_state_collector.l2_message_states_up_to(
                req.from_height,
                req.up_to_height,
                req.from_batch,
                req.batch_limit,
            );
        }

        let level = deepest_requested_challenge_level(validated);
        // Commitments below the block level always start at the state just
        // before the first opcode of the narrowed range.
        let machine_start_index = self
            .coordinates
            .compute_machine_start_index(validated, Height(0))?;
        let step_size = self.coordinates.compute_step_size(level)?;
        let num_desired_hashes =
            self.coordinates
                .compute_required_number_of_hashes(level, Height(0), req.up_to_height)?;

        let cfg = HashCollectorConfig {
            wasm_module_root: req.wasm_module_root,
            from_batch: req.from_batch,
            block_challenge_height: validated[0],
            // The first origin height addresses the block challenge level,
            // which is over messages, not opcodes; the machine stepper only
            // sees the levels below it.
            step_heights: validated[1..].to_vec(),
            num_desired_hashes,
            machine_start_index,
            step_size,
        };
        self.collection_cache.compute(cfg.cache_key(), || {
            self.machine_hash_collector.collect_machine_hashes(&cfg)
        })
    }

    /// Prove that the commitment at `prefix_height` is a merkle prefix of
    /// the request's full commitment.
    ///
    /// The proof is verified locally before being returned, then ABI
    /// encoded as `(bytes32[] prefixExpansion, bytes32[] prefixProof)`, the
    /// exact calldata layout of the on-chain verifier.
    pub fn prefix_proof(
        &self,
        req: &HistoryCommitmentRequest,
        prefix_height: Height,
    ) -> Result<Vec<u8>, ProviderError> {
        let leaves = self.history_commitment_impl(req)?;
        let virtual_size =
            self.virtual_from(req.up_to_height, &req.upper_challenge_origin_heights)?;

        // The prefix may reach into the virtual padding.
        let pre_size = prefix_height
            .0
            .checked_add(1)
            .ok_or(ProviderError::HeightOverflow(prefix_height.0))?;
        let prefix_len = pre_size.min(leaves.len() as u64) as usize;
        let pre_root = compute_root(&leaves[..prefix_len], pre_size)?;
        let post_root = compute_root(&leaves, virtual_size)?;

        let (pre_expansion, prefix_proof) =
            generate_prefix_proof(prefix_height.0, &leaves, virtual_size)?;
        verify_prefix_proof(&VerifyPrefixProofConfig {
            pre_root,
            pre_size,
            post_root,
            post_size: virtual_size,
            pre_expansion: pre_expansion.clone(),
            prefix_proof: prefix_proof.clone(),
        })?;
        Ok((pre_expansion, prefix_proof).abi_encode_params())
    }

    /// Gather everything needed to submit a one-step proof for the opcode
    /// at `up_to_height` within the request's challenge coordinates.
    ///
    /// Returns the proof data plus the last-leaf inclusion proofs of the
    /// start and end commitments.
    pub fn one_step_proof_data(
        &self,
        req: &HistoryCommitmentRequest,
        up_to_height: Height,
    ) -> Result<(OneStepData, Vec<Hash>, Vec<Hash>), ProviderError> {
        if req.upper_challenge_origin_heights.is_empty() {
            return Err(ProviderError::MissingChallengeLevels);
        }
        let end_height = up_to_height
            .0
            .checked_add(1)
            .ok_or(ProviderError::HeightOverflow(up_to_height.0))?;
        let end_commit = self.history_commitment(&HistoryCommitmentRequest {
            up_to_height: Some(Height(end_height)),
            ..req.clone()
        })?;
        let start_commit = self.history_commitment(&HistoryCommitmentRequest {
            up_to_height: Some(up_to_height),
            ..req.clone()
        })?;

        let machine_index = self
            .coordinates
            .compute_machine_start_index(&req.upper_challenge_origin_heights, up_to_height)?;
        let proof = self.proof_collector.collect_proof(
            req.wasm_module_root,
            req.from_batch,
            req.upper_challenge_origin_heights[0],
            machine_index,
        )?;

        let data = OneStepData {
            before_hash: start_commit.last_leaf,
            after_hash: end_commit.last_leaf,
            proof,
        };
        Ok((data, start_commit.last_leaf_proof, end_commit.last_leaf_proof))
    }

    /// Whether our locally computed commitment matches `commitment` at its
    /// claimed height.
    pub fn agrees_with_history_commitment(
        &self,
        challenge_level: ChallengeLevel,
        req: &HistoryCommitmentRequest,
        commitment: &History,
    ) -> Result<bool, ProviderError> {
        let origin_heights = match challenge_level {
            ChallengeLevel::Block => Vec::new(),
            ChallengeLevel::SubChallenge => req.upper_challenge_origin_heights.clone(),
        };
        let local = self.history_commitment(&HistoryCommitmentRequest {
            upper_challenge_origin_heights: origin_heights,
            up_to_height: Some(Height(commitment.height)),
            ..req.clone()
        })?;
        Ok(local.height == commitment.height && local.merkle == commitment.merkle)
    }
}
