// Consensus-critical. Changes here can split the chain.
//! Canonical consensus-visible types.
//!
//! This module defines the primitive value types shared by validation and
//! by hosts: 32-byte hashes, the proof-of-work algorithm tag, the packed
//! block version word, and the header and auxpow containers. All types
//! here must remain backward-compatible once released.

use crate::arith::U256;
use borsh::{BorshDeserialize, BorshSerialize};
use core::fmt;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Length in bytes of a 32-byte hash.
pub const HASH32_LEN: usize = 32;

/// Number of supported proof-of-work algorithms.
pub const NUM_ALGOS: usize = 5;

/// Errors related to parsing or construction of core protocol types.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Hex string had an unexpected byte length.
    #[error("invalid hex length: expected {expected} bytes, got {got} bytes")]
    InvalidHexLength {
        /// Expected number of bytes.
        expected: usize,
        /// Actual number of bytes provided.
        got: usize,
    },

    /// Hex decoding failed.
    #[error("invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    /// A value violated protocol constraints.
    #[error("invalid value: {0}")]
    InvalidValue(&'static str),
}

/// Fixed-size 32-byte hash used throughout the protocol.
///
/// For target comparisons the bytes are interpreted as a big-endian
/// 256-bit integer (see [`U256::from`]).
#[derive(Clone, Copy, PartialEq, Eq, Hash, BorshSerialize, BorshDeserialize)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Hash32(pub [u8; HASH32_LEN]);

impl Hash32 {
    /// Returns an all-zero hash.
    pub const fn zero() -> Self {
        Self([0u8; HASH32_LEN])
    }

    /// Returns the underlying byte array.
    pub const fn as_bytes(&self) -> &[u8; HASH32_LEN] {
        &self.0
    }
}

impl fmt::Debug for Hash32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash32({})", hex::encode(self.0))
    }
}

impl fmt::Display for Hash32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl From<[u8; HASH32_LEN]> for Hash32 {
    fn from(value: [u8; HASH32_LEN]) -> Self {
        Self(value)
    }
}

impl From<Hash32> for [u8; HASH32_LEN] {
    fn from(value: Hash32) -> Self {
        value.0
    }
}

impl From<Hash32> for U256 {
    fn from(value: Hash32) -> Self {
        U256::from_big_endian(value.as_bytes())
    }
}

impl FromStr for Hash32 {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s)?;
        if bytes.len() != HASH32_LEN {
            return Err(CoreError::InvalidHexLength {
                expected: HASH32_LEN,
                got: bytes.len(),
            });
        }
        let mut arr = [0u8; HASH32_LEN];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

/// Block hash type.
pub type BlockHash = Hash32;

/// Proof-of-work algorithm declared by a block's version word.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, BorshSerialize, BorshDeserialize)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Algo {
    /// Double SHA-256 (the default when no algorithm bits are set).
    Sha256d,
    /// scrypt (1024, 1, 1).
    Scrypt,
    /// Groestl.
    Groestl,
    /// Skein.
    Skein,
    /// Qubit.
    Qubit,
}

impl Algo {
    /// Every supported algorithm, in version-bit order.
    pub const ALL: [Algo; NUM_ALGOS] = [
        Algo::Sha256d,
        Algo::Scrypt,
        Algo::Groestl,
        Algo::Skein,
        Algo::Qubit,
    ];

    /// Lower-case algorithm name as used in RPC output and logs.
    pub const fn name(self) -> &'static str {
        match self {
            Algo::Sha256d => "sha256d",
            Algo::Scrypt => "scrypt",
            Algo::Groestl => "groestl",
            Algo::Skein => "skein",
            Algo::Qubit => "qubit",
        }
    }
}

impl fmt::Display for Algo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algo {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sha256d" => Ok(Algo::Sha256d),
            "scrypt" => Ok(Algo::Scrypt),
            "groestl" => Ok(Algo::Groestl),
            "skein" => Ok(Algo::Skein),
            "qubit" => Ok(Algo::Qubit),
            _ => Err(CoreError::InvalidValue("unknown algorithm name")),
        }
    }
}

/// Packed block version word.
///
/// Layout: base version in bits 0-7, the auxpow flag in bit 8, the
/// algorithm tag in bits 9-11, and the merge-mining chain id in bits 16
/// and above. A full version of exactly 1 marks a legacy block predating
/// both multi-algo mining and merge-mining.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, BorshSerialize, BorshDeserialize)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BlockVersion(pub i32);

impl BlockVersion {
    /// Bit flag marking a merge-mined (auxpow) block.
    pub const AUXPOW_FLAG: i32 = 1 << 8;
    /// Mask covering the algorithm bits.
    pub const ALGO_MASK: i32 = 7 << 9;
    /// First bit of the chain id.
    pub const CHAIN_START: i32 = 1 << 16;

    const ALGO_SCRYPT: i32 = 1 << 9;
    const ALGO_GROESTL: i32 = 2 << 9;
    const ALGO_SKEIN: i32 = 3 << 9;
    const ALGO_QUBIT: i32 = 4 << 9;

    /// Assemble a version word from its parts.
    ///
    /// `base` must fit in the low 8 bits.
    pub const fn from_parts(base: i32, algo: Algo, chain_id: i32, aux_pow: bool) -> Self {
        let algo_bits = match algo {
            Algo::Sha256d => 0,
            Algo::Scrypt => Self::ALGO_SCRYPT,
            Algo::Groestl => Self::ALGO_GROESTL,
            Algo::Skein => Self::ALGO_SKEIN,
            Algo::Qubit => Self::ALGO_QUBIT,
        };
        let aux_bits = if aux_pow { Self::AUXPOW_FLAG } else { 0 };
        Self((base & 0xff) | aux_bits | algo_bits | chain_id * Self::CHAIN_START)
    }

    /// The full packed version word.
    pub const fn full_version(self) -> i32 {
        self.0
    }

    /// The base version in the low 8 bits.
    pub const fn base_version(self) -> i32 {
        self.0 & 0xff
    }

    /// Algorithm declared by the version bits.
    ///
    /// Unassigned bit patterns decode as [`Algo::Sha256d`].
    pub const fn algo(self) -> Algo {
        match self.0 & Self::ALGO_MASK {
            0 => Algo::Sha256d,
            Self::ALGO_SCRYPT => Algo::Scrypt,
            Self::ALGO_GROESTL => Algo::Groestl,
            Self::ALGO_SKEIN => Algo::Skein,
            Self::ALGO_QUBIT => Algo::Qubit,
            _ => Algo::Sha256d,
        }
    }

    /// Merge-mining chain id carried in the high bits.
    pub const fn chain_id(self) -> i32 {
        self.0 / Self::CHAIN_START
    }

    /// Whether the auxpow flag is set.
    pub const fn is_aux_pow(self) -> bool {
        self.0 & Self::AUXPOW_FLAG != 0
    }

    /// Whether this is a legacy (version 1) block, exempt from the
    /// chain-id rule.
    pub const fn is_legacy(self) -> bool {
        self.0 == 1
    }
}

/// Merge-mining proof attached to an auxpow block header.
///
/// The Merkle-branch layout is owned by the host's auxpow verifier; this
/// core carries the proof opaquely and reads only the parent block's
/// proof-of-work hash.
#[derive(Clone, PartialEq, Eq, Debug, BorshSerialize, BorshDeserialize)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AuxPow {
    /// Proof-of-work hash of the parent-chain block header.
    pub parent_block_pow_hash: Hash32,
    /// Serialized Merkle-branch material, verified by the host.
    pub branch: Vec<u8>,
}

/// Block header fields consumed by consensus validation.
#[derive(Clone, PartialEq, Eq, Debug, BorshSerialize, BorshDeserialize)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BlockHeader {
    /// Packed version word (algorithm tag, auxpow flag, chain id).
    pub version: BlockVersion,
    /// Hash of the previous block.
    pub hash_prev_block: BlockHash,
    /// Merkle root of the block's transactions.
    pub hash_merkle_root: Hash32,
    /// Block timestamp (Unix seconds).
    pub n_time: u32,
    /// Compact difficulty target.
    pub n_bits: u32,
    /// Proof-of-work nonce.
    pub n_nonce: u32,
    /// Merge-mining proof, present iff the version's auxpow flag is set
    /// on a well-formed header.
    pub aux_pow: Option<AuxPow>,
}

impl BlockHeader {
    /// Algorithm declared by the header's version word.
    pub const fn algo(&self) -> Algo {
        self.version.algo()
    }

    /// Block timestamp widened for timespan arithmetic.
    pub const fn block_time(&self) -> i64 {
        self.n_time as i64
    }
}
