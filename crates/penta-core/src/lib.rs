#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

//! Penta core: consensus-visible primitive types and 256-bit arithmetic.
//!
//! This crate is responsible for:
//! - the fixed-width 256-bit integer backing difficulty targets and work
//! - the compact (`nBits`) target encoding
//! - block version bits (algorithm tag, auxpow flag, chain id)
//! - header and auxpow containers
//!
//! It intentionally does **not** include the hash algorithms themselves,
//! chain storage, or validation rules.

pub mod arith;
pub mod types;

pub use arith::*;
pub use types::*;
