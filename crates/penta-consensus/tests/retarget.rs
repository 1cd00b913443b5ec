use std::sync::Arc;

use penta_consensus::{get_next_work_required, BlockIndex, ChainParams};
use penta_core::{Algo, BlockHeader, BlockVersion, Hash32, U256};

const POW_LIMIT_COMPACT: u32 = 0x1e0f_ffff;
const RETARGET_BITS: u32 = 0x1d00_ffff;

fn version(algo: Algo) -> BlockVersion {
    BlockVersion::from_parts(4, algo, 0x50, false)
}

fn header(algo: Algo, n_time: u32) -> BlockHeader {
    BlockHeader {
        version: version(algo),
        hash_prev_block: Hash32::zero(),
        hash_merkle_root: Hash32::zero(),
        n_time,
        n_bits: RETARGET_BITS,
        n_nonce: 0,
        aux_pow: None,
    }
}

/// Chain of `algos` blocks, all committing `n_bits`, spaced `spacing`
/// seconds apart starting at `start`.
fn chain(algos: &[Algo], n_bits: u32, start: u32, spacing: u32) -> Arc<BlockIndex> {
    let mut tip = BlockIndex::genesis(version(algos[0]), n_bits, start, Hash32::zero());
    for (i, &algo) in algos[1..].iter().enumerate() {
        let n_time = start + spacing * (i as u32 + 1);
        tip = BlockIndex::extend(&tip, version(algo), n_bits, n_time, Hash32::zero());
    }
    tip
}

#[test]
fn genesis_gets_pow_limit() {
    let params = &ChainParams::main().consensus;
    let bits = get_next_work_required(None, &header(Algo::Sha256d, 1000), params, Algo::Sha256d);
    assert_eq!(bits, POW_LIMIT_COMPACT);
}

#[test]
fn missing_algo_history_gets_pow_limit() {
    let params = &ChainParams::main().consensus;
    let tip = chain(&[Algo::Sha256d; 30], RETARGET_BITS, 100_000, 60);
    let bits = get_next_work_required(
        Some(&tip),
        &header(Algo::Scrypt, 102_000),
        params,
        Algo::Scrypt,
    );
    assert_eq!(bits, POW_LIMIT_COMPACT, "no scrypt ancestor at all");
}

#[test]
fn underfilled_window_gets_pow_limit() {
    let params = &ChainParams::main().consensus;

    // Nine sha blocks interleaved with scrypt: one short of the window.
    let mut algos = Vec::new();
    for _ in 0..9 {
        algos.extend([Algo::Sha256d, Algo::Scrypt]);
    }
    let tip = chain(&algos, RETARGET_BITS, 100_000, 60);
    let bits = get_next_work_required(
        Some(&tip),
        &header(Algo::Sha256d, 102_000),
        params,
        Algo::Sha256d,
    );
    assert_eq!(bits, POW_LIMIT_COMPACT);

    // A tenth sha block fills the window and retargeting kicks in.
    algos.extend([Algo::Sha256d, Algo::Scrypt]);
    let tip = chain(&algos, RETARGET_BITS, 100_000, 60);
    let bits = get_next_work_required(
        Some(&tip),
        &header(Algo::Sha256d, 102_400),
        params,
        Algo::Sha256d,
    );
    assert_ne!(bits, POW_LIMIT_COMPACT);
}

#[test]
fn fast_window_clamps_downward() {
    let params = &ChainParams::main().consensus;

    // Ten-second blocks: the 90-second measured timespan clamps to 96% of
    // the 3000-second expectation, so the target shrinks by 2880/3000.
    let tip = chain(&[Algo::Sha256d; 30], RETARGET_BITS, 100_000, 10);
    let bits = get_next_work_required(
        Some(&tip),
        &header(Algo::Sha256d, 100_500),
        params,
        Algo::Sha256d,
    );
    assert_eq!(bits, 0x1d00_f5c1);
}

#[test]
fn slow_window_clamps_upward() {
    let params = &ChainParams::main().consensus;

    // 400-second blocks: the 3600-second measured timespan clamps to 104%,
    // so the target grows by 3120/3000.
    let tip = chain(&[Algo::Sha256d; 30], RETARGET_BITS, 100_000, 400);
    let bits = get_next_work_required(
        Some(&tip),
        &header(Algo::Sha256d, 115_000),
        params,
        Algo::Sha256d,
    );
    assert_eq!(bits, 0x1d01_0a3c);
}

#[test]
fn in_bounds_window_scales_proportionally() {
    let params = &ChainParams::main().consensus;

    // 340-second blocks measure a 3060-second timespan, inside the clamp.
    let tip = chain(&[Algo::Sha256d; 30], RETARGET_BITS, 100_000, 340);
    let bits = get_next_work_required(
        Some(&tip),
        &header(Algo::Sha256d, 112_000),
        params,
        Algo::Sha256d,
    );

    let (old_target, _, _) = U256::from_compact(RETARGET_BITS);
    let expected = (old_target * U256::from(3060u64) / U256::from(3000u64)).to_compact();
    assert_eq!(bits, expected);
    assert_ne!(bits, RETARGET_BITS, "timespan drift must move the target");
}

#[test]
fn retarget_never_exceeds_pow_limit() {
    let params = &ChainParams::main().consensus;

    // Already at the pow limit with slow blocks: the upward step caps.
    let tip = chain(&[Algo::Sha256d; 30], POW_LIMIT_COMPACT, 100_000, 400);
    let bits = get_next_work_required(
        Some(&tip),
        &header(Algo::Sha256d, 115_000),
        params,
        Algo::Sha256d,
    );
    assert_eq!(bits, POW_LIMIT_COMPACT);
}

#[test]
fn min_difficulty_gap_resets_on_testnet() {
    let testnet = &ChainParams::testnet().consensus;
    let main = &ChainParams::main().consensus;

    let tip = chain(&[Algo::Sha256d; 30], RETARGET_BITS, 100_000, 60);
    let tip_time = 100_000 + 60 * 29;

    // Beyond twice the 300-second per-algo spacing: minimum difficulty.
    let late = header(Algo::Sha256d, tip_time + 601);
    let bits = get_next_work_required(Some(&tip), &late, testnet, Algo::Sha256d);
    assert_eq!(bits, POW_LIMIT_COMPACT);

    // On time: normal retarget applies.
    let on_time = header(Algo::Sha256d, tip_time + 60);
    let bits = get_next_work_required(Some(&tip), &on_time, testnet, Algo::Sha256d);
    assert_eq!(bits, 0x1d00_f5c1);

    // Mainnet ignores the gap rule entirely.
    let bits = get_next_work_required(Some(&tip), &late, main, Algo::Sha256d);
    assert_eq!(bits, 0x1d00_f5c1);
}
