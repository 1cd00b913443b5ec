#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

//! Penta consensus rules for multi-algorithm merge-mined PoW blocks.
//!
//! This crate is responsible for:
//! - per-network chain parameters and the startup network selector
//! - the read-only block-index view and median-time-past
//! - difficulty retargeting over per-algorithm averaging windows
//! - work quantification (per-block proof, decayed per-algorithm work,
//!   cross-algorithm geometric mean)
//! - proof-of-work validation for native and merge-mined (auxpow) headers
//!
//! It intentionally does **not** include the hash algorithms, the auxpow
//! Merkle-branch verifier, block storage, or reorg logic; those are
//! host-supplied collaborators.

pub mod chain;
pub mod difficulty;
pub mod error;
pub mod params;
pub mod pow;
pub mod work;

pub use chain::*;
pub use difficulty::*;
pub use error::*;
pub use params::*;
pub use pow::*;
pub use work::*;
