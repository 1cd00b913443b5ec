// Consensus-critical. Changes here can split the chain.
//! Difficulty retargeting.
//!
//! Each algorithm retargets independently over a moving average of its own
//! last `averaging_interval` blocks. The actual timespan is measured
//! between median-times-past, which blunts timestamp manipulation, and is
//! clamped to [96%, 104%] of the expected timespan so an algorithm-specific
//! hash-rate swing cannot run the target away in one step.

use log::debug;

use penta_core::{Algo, BlockHeader, U256};

use crate::chain::BlockIndex;
use crate::params::ConsensusParams;

/// Maximum upward adjustment of the actual timespan, in percent.
const MAX_ADJUST_UP: i64 = 4;

/// Maximum downward adjustment of the actual timespan, in percent.
const MAX_ADJUST_DOWN: i64 = 4;

/// Nearest ancestor of `pindex` (including itself) mined with `algo`.
///
/// Walks past genesis to `None` when the chain holds no such block.
pub fn last_block_index_for_algo<'a>(
    mut pindex: Option<&'a BlockIndex>,
    algo: Algo,
) -> Option<&'a BlockIndex> {
    while let Some(index) = pindex {
        if index.algo() == algo {
            return Some(index);
        }
        pindex = index.prev.as_deref();
    }
    None
}

/// Compact target required of a new `algo` block extending `prev`.
///
/// Falls back to the pow-limit compact when there is no previous
/// same-algorithm block or the averaging window is not yet filled. On
/// networks permitting min-difficulty blocks, a gap of more than twice the
/// per-algorithm spacing also resets to the pow limit.
pub fn get_next_work_required(
    prev: Option<&BlockIndex>,
    header: &BlockHeader,
    params: &ConsensusParams,
    algo: Algo,
) -> u32 {
    let pow_limit_compact = params.pow_limit.to_compact();

    let Some(prev) = prev else {
        debug!("retarget({algo}): no previous block, returning pow limit");
        return pow_limit_compact;
    };

    let Some(pindex_prev) = last_block_index_for_algo(Some(prev), algo) else {
        debug!("retarget({algo}): no previous block for algo, returning pow limit");
        return pow_limit_compact;
    };

    if params.pow_allow_min_difficulty_blocks {
        let target_spacing_per_algo = params.pow_target_spacing * params.num_algos;
        if header.block_time() > pindex_prev.block_time() + target_spacing_per_algo * 2 {
            return pow_limit_compact;
        }
    }

    // Walk back until the averaging window holds nAveragingInterval
    // same-algorithm blocks.
    let mut pindex_first = pindex_prev;
    for _ in 0..params.averaging_interval - 1 {
        let Some(stepped) = last_block_index_for_algo(pindex_first.prev.as_deref(), algo) else {
            debug!("retarget({algo}): averaging window underfilled, returning pow limit");
            return pow_limit_compact;
        };
        pindex_first = stepped;
    }

    calculate_next_work_required(pindex_prev, pindex_first, params, algo)
}

/// Retarget from the window spanning `first..=prev` (both mined with
/// `algo`).
pub fn calculate_next_work_required(
    prev: &BlockIndex,
    first: &BlockIndex,
    params: &ConsensusParams,
    algo: Algo,
) -> u32 {
    let target_spacing_per_algo = params.pow_target_spacing * params.num_algos;
    let averaging_target_timespan = params.averaging_interval * target_spacing_per_algo;
    let min_actual_timespan = averaging_target_timespan * (100 - MAX_ADJUST_UP) / 100;
    let max_actual_timespan = averaging_target_timespan * (100 + MAX_ADJUST_DOWN) / 100;

    let actual_timespan = prev.median_time_past() - first.median_time_past();
    debug!(
        "retarget({algo}): actual timespan {actual_timespan} before bounds [{min_actual_timespan}, {max_actual_timespan}]"
    );
    let actual_timespan = actual_timespan.clamp(min_actual_timespan, max_actual_timespan);

    let (old_target, _, _) = U256::from_compact(prev.n_bits);
    let mut new_target = old_target
        .overflowing_mul(U256::from(actual_timespan as u64))
        .0
        / U256::from(averaging_target_timespan as u64);
    if new_target > params.pow_limit {
        new_target = params.pow_limit;
    }

    debug!(
        "retarget({algo}): {:#010x} -> {:#010x} (actual {actual_timespan} / expected {averaging_target_timespan})",
        prev.n_bits,
        new_target.to_compact(),
    );
    new_target.to_compact()
}

#[cfg(test)]
mod tests {
    use super::*;
    use penta_core::{BlockVersion, Hash32};
    use std::sync::Arc;

    fn version(algo: Algo) -> BlockVersion {
        BlockVersion::from_parts(4, algo, 0x50, false)
    }

    fn chain(algos: &[Algo]) -> Arc<BlockIndex> {
        let mut tip = BlockIndex::genesis(version(algos[0]), 0x1e0f_ffff, 1000, Hash32::zero());
        for (i, &algo) in algos[1..].iter().enumerate() {
            tip = BlockIndex::extend(&tip, version(algo), 0x1e0f_ffff, 1060 + 60 * i as u32, Hash32::zero());
        }
        tip
    }

    #[test]
    fn walks_to_nearest_matching_ancestor() {
        let tip = chain(&[Algo::Sha256d, Algo::Scrypt, Algo::Skein, Algo::Scrypt, Algo::Qubit]);
        let found = last_block_index_for_algo(Some(&tip), Algo::Scrypt).unwrap();
        assert_eq!(found.height, 3, "nearest scrypt block wins");
        let found = last_block_index_for_algo(Some(&tip), Algo::Qubit).unwrap();
        assert_eq!(found.height, 4, "a block matches itself");
        assert!(last_block_index_for_algo(Some(&tip), Algo::Groestl).is_none());
        assert!(last_block_index_for_algo(None, Algo::Sha256d).is_none());
    }
}
