//! Read-only view of the block graph.
//!
//! Index nodes are created by the host when a header is accepted and are
//! immutable afterwards; children share their ancestors through `Arc`, so
//! concurrent readers need no locking. Consensus code only ever walks
//! `prev` links backward.

use std::sync::Arc;

use penta_core::{Algo, BlockVersion, Hash32, U256};

use crate::work::block_proof;

/// Number of ancestor timestamps (including self) feeding median-time-past.
const MEDIAN_TIME_SPAN: usize = 11;

/// One accepted block header in the chain view.
#[derive(Clone, Debug)]
pub struct BlockIndex {
    /// Distance from genesis.
    pub height: u64,
    /// Packed version word (carries the algorithm tag).
    pub version: BlockVersion,
    /// Compact difficulty target the block committed to.
    pub n_bits: u32,
    /// Block timestamp (Unix seconds).
    pub n_time: u32,
    /// Total work of the chain ending at this block.
    pub chain_work: U256,
    /// Algorithm-specific proof-of-work hash, computed at acceptance.
    pub pow_hash: Hash32,
    /// Parent index, `None` for genesis.
    pub prev: Option<Arc<BlockIndex>>,
}

impl BlockIndex {
    /// Root index of a chain view.
    pub fn genesis(version: BlockVersion, n_bits: u32, n_time: u32, pow_hash: Hash32) -> Arc<Self> {
        let mut index = BlockIndex {
            height: 0,
            version,
            n_bits,
            n_time,
            chain_work: U256::zero(),
            pow_hash,
            prev: None,
        };
        index.chain_work = block_proof(&index);
        Arc::new(index)
    }

    /// Child index linked to `prev`.
    ///
    /// Accumulates [`block_proof`] into the chain work, which keeps
    /// `chain_work` strictly increasing along any parent chain as long as
    /// the committed targets are valid.
    pub fn extend(
        prev: &Arc<Self>,
        version: BlockVersion,
        n_bits: u32,
        n_time: u32,
        pow_hash: Hash32,
    ) -> Arc<Self> {
        let mut index = BlockIndex {
            height: prev.height + 1,
            version,
            n_bits,
            n_time,
            chain_work: U256::zero(),
            pow_hash,
            prev: Some(Arc::clone(prev)),
        };
        index.chain_work = prev.chain_work.overflowing_add(block_proof(&index)).0;
        Arc::new(index)
    }

    /// Algorithm declared by the block's version word.
    pub const fn algo(&self) -> Algo {
        self.version.algo()
    }

    /// Block timestamp widened for timespan arithmetic.
    pub const fn block_time(&self) -> i64 {
        self.n_time as i64
    }

    /// Median of the last up-to-11 block times, including this block.
    ///
    /// With an even number of available ancestors the upper middle value
    /// is taken, matching the reference implementation.
    pub fn median_time_past(&self) -> i64 {
        let mut times = [0i64; MEDIAN_TIME_SPAN];
        let mut count = 0;
        let mut pindex = Some(self);
        while let Some(index) = pindex {
            if count == MEDIAN_TIME_SPAN {
                break;
            }
            times[count] = index.block_time();
            count += 1;
            pindex = index.prev.as_deref();
        }
        let times = &mut times[..count];
        times.sort_unstable();
        times[count / 2]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sha_version() -> BlockVersion {
        BlockVersion::from_parts(4, Algo::Sha256d, 0x50, false)
    }

    fn chain_with_times(times: &[u32]) -> Arc<BlockIndex> {
        let mut tip = BlockIndex::genesis(sha_version(), 0x1e0f_ffff, times[0], Hash32::zero());
        for &t in &times[1..] {
            tip = BlockIndex::extend(&tip, sha_version(), 0x1e0f_ffff, t, Hash32::zero());
        }
        tip
    }

    #[test]
    fn median_time_past_uses_last_eleven() {
        let times: Vec<u32> = (0..20).collect();
        let tip = chain_with_times(&times);
        // Median of [9, 19] is 14.
        assert_eq!(tip.median_time_past(), 14);
    }

    #[test]
    fn median_time_past_short_chain() {
        // A lone genesis is its own median.
        let tip = chain_with_times(&[1000]);
        assert_eq!(tip.median_time_past(), 1000);

        // Even count takes the upper middle of the sorted times.
        let tip = chain_with_times(&[1000, 1060]);
        assert_eq!(tip.median_time_past(), 1060);

        let tip = chain_with_times(&[1000, 1060, 1030]);
        assert_eq!(tip.median_time_past(), 1030);
    }

    #[test]
    fn median_time_past_resists_skew() {
        // One wildly wrong timestamp does not move the median far.
        let tip = chain_with_times(&[100, 110, 120, 130, 140, 150, 160, 170, 180, 190, 1_000_000]);
        assert_eq!(tip.median_time_past(), 150);
    }

    #[test]
    fn chain_work_strictly_increases() {
        let times: Vec<u32> = (0..12).map(|i| 1000 + 60 * i).collect();
        let mut tip = chain_with_times(&times);
        let mut heights = 0;
        while let Some(prev) = tip.prev.clone() {
            assert!(tip.chain_work > prev.chain_work);
            assert_eq!(tip.height, prev.height + 1);
            tip = prev;
            heights += 1;
        }
        assert_eq!(heights, 11);
        assert!(!tip.chain_work.is_zero(), "genesis carries its own proof");
    }
}
