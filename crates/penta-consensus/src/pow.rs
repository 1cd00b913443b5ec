// Consensus-critical. Changes here can split the chain.
//! Proof-of-work validation.
//!
//! Two paths: a native header proves work with its own algorithm-specific
//! hash; a merge-mined (auxpow) header proves work with its parent-chain
//! block's hash, bound to this block by a Merkle branch the host verifies.
//! Only the work relation is checked here; nonce and timestamp rules live
//! with the header acceptance code.

use penta_core::{AuxPow, BlockHeader, Hash32, U256};

use crate::error::ConsensusError;
use crate::params::ConsensusParams;

/// Host-supplied collaborators for header validation.
///
/// The five hash algorithms and the auxpow Merkle-branch verifier live
/// outside the consensus core; validation only consumes their outputs.
pub trait PowHost {
    /// Canonical header hash (block identity).
    fn block_hash(&self, header: &BlockHeader) -> Hash32;

    /// Proof-of-work hash of the header, dispatched on the algorithm
    /// declared in its version word.
    fn pow_hash(&self, header: &BlockHeader) -> Hash32;

    /// Verify that the merge-mining Merkle branch binds `block_hash` to
    /// the auxpow's parent-chain block for `chain_id`.
    fn check_aux_pow(
        &self,
        aux_pow: &AuxPow,
        block_hash: &Hash32,
        chain_id: i32,
        params: &ConsensusParams,
    ) -> bool;
}

/// Check that `hash` satisfies the difficulty committed in `n_bits`.
pub fn check_proof_of_work(
    hash: &Hash32,
    n_bits: u32,
    params: &ConsensusParams,
) -> Result<(), ConsensusError> {
    let (target, negative, overflow) = U256::from_compact(n_bits);

    if negative || target.is_zero() || overflow || target > params.pow_limit {
        return Err(ConsensusError::InvalidTarget("nBits below minimum work"));
    }

    if U256::from(*hash) > target {
        return Err(ConsensusError::InsufficientWork);
    }

    Ok(())
}

/// Check a header's proof of work, taking auxpow into account.
///
/// Except for legacy (version 1) blocks, a strict-chain-id network rejects
/// any header carrying a foreign chain id. The auxpow flag in the version
/// word must agree with the presence of the auxpow itself; whichever hash
/// the chosen path designates is then checked against the header's own
/// `n_bits`.
pub fn check_aux_pow_proof_of_work<H: PowHost + ?Sized>(
    header: &BlockHeader,
    params: &ConsensusParams,
    host: &H,
) -> Result<(), ConsensusError> {
    let version = header.version;

    if !version.is_legacy()
        && params.strict_chain_id
        && version.chain_id() != params.auxpow_chain_id
    {
        return Err(ConsensusError::WrongChainId {
            got: version.chain_id(),
            expected: params.auxpow_chain_id,
            version: version.full_version(),
        });
    }

    let Some(aux_pow) = header.aux_pow.as_ref() else {
        if version.is_aux_pow() {
            return Err(ConsensusError::MissingAuxPow(
                "no auxpow on block with auxpow version",
            ));
        }
        return check_proof_of_work(&host.pow_hash(header), header.n_bits, params);
    };

    if !version.is_aux_pow() {
        return Err(ConsensusError::MissingAuxPow(
            "auxpow on block with non-auxpow version",
        ));
    }

    if !host.check_aux_pow(aux_pow, &host.block_hash(header), version.chain_id(), params) {
        return Err(ConsensusError::InvalidAuxPow);
    }

    check_proof_of_work(&aux_pow.parent_block_pow_hash, header.n_bits, params)
}
