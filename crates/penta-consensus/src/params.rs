// Consensus-critical. Changes here can split the chain.
//! Per-network chain parameters.
//!
//! Three immutable parameter sets (main, testnet, regtest) built as
//! independent values from a shared-defaults constructor. A process-wide
//! selector can record the active network once at startup, but validation
//! entry points always receive `&ConsensusParams` explicitly and never
//! read the selector.

use core::fmt;
use core::str::FromStr;
use std::sync::{LazyLock, OnceLock};

use penta_core::{CoreError, U256, NUM_ALGOS};

/// Consensus rules that differ per network.
#[derive(Clone, Debug)]
pub struct ConsensusParams {
    /// Highest permissible difficulty target.
    pub pow_limit: U256,
    /// Overall retarget horizon in seconds.
    pub pow_target_timespan: i64,
    /// Target seconds per block across all algorithms.
    pub pow_target_spacing: i64,
    /// Number of same-algorithm blocks in the retarget window.
    pub averaging_interval: i64,
    /// Count of supported proof-of-work algorithms.
    pub num_algos: i64,
    /// Whether blocks may fall back to the minimum difficulty after a
    /// long gap (testing networks only).
    pub pow_allow_min_difficulty_blocks: bool,
    /// Chain id expected in merge-mined block versions.
    pub auxpow_chain_id: i32,
    /// Whether a foreign chain id is rejected outright.
    pub strict_chain_id: bool,
    /// Blocks between subsidy halvings (not consumed here).
    pub subsidy_halving_interval: i64,
    /// Blocks in the upgrade-majority window required to enforce a new
    /// block version (not consumed here).
    pub majority_enforce_block_upgrade: i64,
    /// Blocks in the upgrade-majority window required to reject outdated
    /// versions (not consumed here).
    pub majority_reject_block_outdated: i64,
    /// Size of the upgrade-majority window (not consumed here).
    pub majority_window: i64,
}

impl ConsensusParams {
    /// Mainnet values, the base the other networks override.
    fn shared_defaults() -> Self {
        Self {
            pow_limit: U256::MAX >> 20,
            pow_target_timespan: 14 * 24 * 60 * 60,
            pow_target_spacing: 60,
            averaging_interval: 10,
            num_algos: NUM_ALGOS as i64,
            pow_allow_min_difficulty_blocks: false,
            auxpow_chain_id: 0x50,
            strict_chain_id: true,
            subsidy_halving_interval: 210_000,
            majority_enforce_block_upgrade: 750,
            majority_reject_block_outdated: 950,
            majority_window: 1000,
        }
    }
}

/// Genesis header constants embedded per network.
///
/// The core does not mine or hash the genesis block; these seed values are
/// exposed for hosts that materialize it.
#[derive(Clone, Copy, Debug)]
pub struct GenesisSeed {
    /// Genesis timestamp (Unix seconds).
    pub n_time: u32,
    /// Genesis compact target.
    pub n_bits: u32,
    /// Genesis nonce.
    pub n_nonce: u32,
}

/// A named network.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Network {
    /// Production network.
    Main,
    /// Public test network.
    Testnet,
    /// Local regression-test network.
    Regtest,
}

impl Network {
    /// Canonical network id string.
    pub const fn as_str(self) -> &'static str {
        match self {
            Network::Main => "main",
            Network::Testnet => "test",
            Network::Regtest => "regtest",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "main" => Ok(Network::Main),
            "test" => Ok(Network::Testnet),
            "regtest" => Ok(Network::Regtest),
            _ => Err(CoreError::InvalidValue("unknown network id")),
        }
    }
}

/// Immutable parameters of one network.
#[derive(Clone, Debug)]
pub struct ChainParams {
    /// Which network these parameters describe.
    pub network: Network,
    /// Consensus rules.
    pub consensus: ConsensusParams,
    /// P2P message-start (magic) bytes.
    pub message_start: [u8; 4],
    /// Default P2P port.
    pub default_port: u16,
    /// Genesis header constants.
    pub genesis: GenesisSeed,
}

impl ChainParams {
    /// Production network parameters.
    pub fn main() -> Self {
        Self {
            network: Network::Main,
            consensus: ConsensusParams::shared_defaults(),
            message_start: [0xf8, 0xbc, 0xb3, 0xd8],
            default_port: 58333,
            genesis: GenesisSeed {
                n_time: 1_455_597_574,
                n_bits: 0x1e0f_ffff,
                n_nonce: 1_434_119,
            },
        }
    }

    /// Public test network parameters.
    pub fn testnet() -> Self {
        Self {
            network: Network::Testnet,
            consensus: ConsensusParams {
                pow_allow_min_difficulty_blocks: true,
                strict_chain_id: false,
                majority_enforce_block_upgrade: 51,
                majority_reject_block_outdated: 75,
                majority_window: 100,
                ..ConsensusParams::shared_defaults()
            },
            message_start: [0xfa, 0xbc, 0xb3, 0xd8],
            default_port: 68333,
            genesis: GenesisSeed {
                n_time: 1_455_597_594,
                n_bits: 0x1e0f_ffff,
                n_nonce: 856_768,
            },
        }
    }

    /// Regression-test parameters: trivial difficulty, fast halvings.
    pub fn regtest() -> Self {
        let testnet = Self::testnet();
        Self {
            network: Network::Regtest,
            consensus: ConsensusParams {
                pow_limit: U256::MAX >> 1,
                subsidy_halving_interval: 150,
                majority_enforce_block_upgrade: 750,
                majority_reject_block_outdated: 950,
                majority_window: 1000,
                ..testnet.consensus
            },
            message_start: [0xfb, 0xbc, 0xb3, 0xd8],
            default_port: 18444,
            genesis: GenesisSeed {
                n_time: 1_455_597_514,
                n_bits: 0x207f_ffff,
                n_nonce: 0,
            },
        }
    }

    /// Shared immutable instance for `network`.
    pub fn for_network(network: Network) -> &'static ChainParams {
        static MAIN: LazyLock<ChainParams> = LazyLock::new(ChainParams::main);
        static TESTNET: LazyLock<ChainParams> = LazyLock::new(ChainParams::testnet);
        static REGTEST: LazyLock<ChainParams> = LazyLock::new(ChainParams::regtest);
        match network {
            Network::Main => &MAIN,
            Network::Testnet => &TESTNET,
            Network::Regtest => &REGTEST,
        }
    }
}

static SELECTED: OnceLock<Network> = OnceLock::new();

/// Record the process-wide active network.
///
/// Returns `false` if a selection was already made; the first selection
/// stays in effect. Intended to be called exactly once at startup.
pub fn select_network(network: Network) -> bool {
    SELECTED.set(network).is_ok()
}

/// Chain parameters for the network chosen via [`select_network`], if any.
pub fn active_params() -> Option<&'static ChainParams> {
    SELECTED.get().map(|network| ChainParams::for_network(*network))
}
