// Consensus-critical. Changes here can split the chain.
//! Work quantification.
//!
//! Per-block work is `floor(2^256 / (target + 1))`, the expected number of
//! hashes needed to find one at or below the target. Cross-algorithm
//! comparisons additionally weight each algorithm's hash cost and, for the
//! geometric-mean aggregation, decay the most recent same-algorithm work
//! with chain distance.

use penta_core::{Algo, U256, NUM_ALGOS};

use crate::chain::BlockIndex;
use crate::params::ConsensusParams;

/// Backward window (blocks) for the short work-decay shapes.
const DECAY_WINDOW: u64 = 32;

/// Backward window (blocks) for the decay feeding the geometric mean.
const WIDE_DECAY_WINDOW: u64 = 100;

/// Work implied by a block's committed target, before any weighting.
///
/// Returns zero when the compact target is negative, overflowed, or zero.
pub fn block_proof_base(block: &BlockIndex) -> U256 {
    let (target, negative, overflow) = U256::from_compact(block.n_bits);
    if negative || overflow || target.is_zero() {
        return U256::zero();
    }
    // 2^256 / (target + 1) without representing 2^256:
    // ((2^256 - target - 1) / (target + 1)) + 1 == (~target / (target + 1)) + 1.
    (!target / (target + U256::one())) + U256::one()
}

/// Relative hash cost of each algorithm at an equal target.
///
/// Absolute work ratio times an optimisation factor; consensus constants,
/// preserved bit-exactly.
pub const fn algo_work_factor(algo: Algo) -> u64 {
    match algo {
        Algo::Sha256d => 1,
        Algo::Scrypt => 1024 * 4,
        Algo::Groestl => 64 * 8,
        Algo::Skein => 4 * 6,
        Algo::Qubit => 128 * 8,
    }
}

/// Base work of the nearest `algo` ancestor (including `block` itself).
///
/// Falls back to the pow limit when the chain holds no such block.
pub fn prev_work_for_algo(block: &BlockIndex, algo: Algo, params: &ConsensusParams) -> U256 {
    let mut pindex = Some(block);
    while let Some(index) = pindex {
        if index.algo() == algo {
            return block_proof_base(index);
        }
        pindex = index.prev.as_deref();
    }
    params.pow_limit
}

/// Base work of the nearest `algo` ancestor, decayed linearly with chain
/// distance over a 32-block window and floored at the pow limit.
///
/// Outside the window (or with no match at all) the pow limit is returned.
pub fn prev_work_for_algo_with_decay(
    block: &BlockIndex,
    algo: Algo,
    params: &ConsensusParams,
) -> U256 {
    let mut distance = 0u64;
    let mut pindex = Some(block);
    while let Some(index) = pindex {
        if distance > DECAY_WINDOW {
            return params.pow_limit;
        }
        if index.algo() == algo {
            let work = block_proof_base(index)
                .overflowing_mul(U256::from(DECAY_WINDOW - distance))
                .0
                / U256::from(DECAY_WINDOW);
            if work < params.pow_limit {
                return params.pow_limit;
            }
            return work;
        }
        pindex = index.prev.as_deref();
        distance += 1;
    }
    params.pow_limit
}

/// Same shape as [`prev_work_for_algo_with_decay`], decaying to zero
/// instead of flooring at the pow limit.
pub fn prev_work_for_algo_with_decay_to_zero(block: &BlockIndex, algo: Algo) -> U256 {
    decayed_work(block, algo, DECAY_WINDOW)
}

/// Linear decay to zero over the wider 100-block window used by the
/// geometric-mean aggregation.
pub fn prev_work_for_algo_with_wide_decay(block: &BlockIndex, algo: Algo) -> U256 {
    decayed_work(block, algo, WIDE_DECAY_WINDOW)
}

fn decayed_work(block: &BlockIndex, algo: Algo, window: u64) -> U256 {
    let mut distance = 0u64;
    let mut pindex = Some(block);
    while let Some(index) = pindex {
        if distance > window {
            return U256::zero();
        }
        if index.algo() == algo {
            return block_proof_base(index)
                .overflowing_mul(U256::from(window - distance))
                .0
                / U256::from(window);
        }
        pindex = index.prev.as_deref();
        distance += 1;
    }
    U256::zero()
}

/// Geometric mean of this block's work and every other algorithm's
/// decayed recent work.
///
/// Zero-valued contributions are skipped rather than zeroing the product,
/// and the root is always taken over the full algorithm count. The final
/// 8-bit shift scales the mean back into the range of the legacy per-algo
/// chain work so old and new chain-work values stay comparable.
pub fn geometric_mean_prev_work(block: &BlockIndex) -> U256 {
    let block_algo = block.algo();
    let mut product = block_proof_base(block);
    for algo in Algo::ALL {
        if algo == block_algo {
            continue;
        }
        let alt_work = prev_work_for_algo_with_wide_decay(block, algo);
        if !alt_work.is_zero() {
            product = product.overflowing_mul(alt_work).0;
        }
    }
    product.nth_root(NUM_ALGOS as u32) << 8usize
}

/// Work credited to a block for chain selection: base work weighted by the
/// algorithm's hash-cost factor.
pub fn block_proof(block: &BlockIndex) -> U256 {
    block_proof_base(block)
        .overflowing_mul(U256::from(algo_work_factor(block.algo())))
        .0
}

/// Express the chain-work gap between `to` and `from` as seconds of
/// hashing at the tip's current difficulty.
///
/// Negative when `to` is behind `from`. Clamped to `+-i64::MAX` when the
/// quotient needs more than 63 bits, or when the tip's proof is zero and
/// the gap can never be redone.
pub fn block_proof_equivalent_time(
    to: &BlockIndex,
    from: &BlockIndex,
    tip: &BlockIndex,
    params: &ConsensusParams,
) -> i64 {
    let (gap, sign) = if to.chain_work > from.chain_work {
        (to.chain_work - from.chain_work, 1i64)
    } else {
        (from.chain_work - to.chain_work, -1i64)
    };
    let proof = block_proof(tip);
    if proof.is_zero() {
        return sign * i64::MAX;
    }
    let r = gap
        .overflowing_mul(U256::from(params.pow_target_spacing as u64))
        .0
        / proof;
    if r.bits() > 63 {
        return sign * i64::MAX;
    }
    sign * r.low_u64() as i64
}
