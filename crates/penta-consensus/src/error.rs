//! Consensus error types.

use thiserror::Error;

/// Errors returned by proof-of-work validation.
///
/// Every kind is terminal for the header being validated and never for
/// the process; the host surfaces the message through its logger.
#[derive(Debug, Error)]
pub enum ConsensusError {
    /// `nBits` decoded to a negative, zero, overflowed, or above-limit
    /// target.
    #[error("invalid difficulty target: {0}")]
    InvalidTarget(&'static str),

    /// The candidate hash exceeds the decoded target.
    #[error("proof-of-work hash exceeds target")]
    InsufficientWork,

    /// Merge-mined header carries a foreign chain id under strict
    /// checking.
    #[error("block does not have our chain id (got {got}, expected {expected}, full version {version:#x})")]
    WrongChainId {
        /// Chain id found in the header's version word.
        got: i32,
        /// Chain id required by the network parameters.
        expected: i32,
        /// Full packed version word, for diagnostics.
        version: i32,
    },

    /// Auxpow presence disagrees with the version's auxpow flag.
    #[error("auxpow mismatch: {0}")]
    MissingAuxPow(&'static str),

    /// The delegated Merkle-branch check rejected the auxpow.
    #[error("auxpow is not valid")]
    InvalidAuxPow,
}
