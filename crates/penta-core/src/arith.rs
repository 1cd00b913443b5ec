// Consensus-critical. Changes here can split the chain.
//! Fixed-width 256-bit arithmetic for difficulty targets and chain work.
//!
//! Targets travel in block headers as a 32-bit "compact" value:
//! `bits = (exponent << 24) | mantissa`, where the low 24 bits hold the
//! mantissa and bit 23 of the mantissa is a sign bit. The represented
//! value is `mantissa * 256^(exponent - 3)`.
//!
//! Decoding reports sign and overflow as flags rather than errors;
//! validation code decides which combinations are acceptable. Encoding
//! normalizes so the sign bit is clear, which makes the round-trip exact
//! for any value whose significant bits fit in the top 24.

use uint::construct_uint;

construct_uint! {
    /// Unsigned 256-bit integer backing difficulty targets and chain work.
    pub struct U256(4);
}

/// Number of Newton refinement steps [`U256::nth_root`] is allowed to take.
///
/// Convergence is quadratic from the seeded approximation, so the bound is
/// never reached for 256-bit inputs; it caps the loop regardless.
const NTH_ROOT_MAX_ITERATIONS: usize = 20;

impl U256 {
    /// Decode a compact (`nBits`) target.
    ///
    /// Returns `(value, negative, overflow)`. The sign bit does not affect
    /// the returned magnitude, and `overflow` is set when the encoded value
    /// needs more than 256 bits. Both flags are false when the mantissa is
    /// zero.
    pub fn from_compact(compact: u32) -> (Self, bool, bool) {
        let size = (compact >> 24) as usize;
        let mut word = compact & 0x007f_ffff;
        let value = if size <= 3 {
            word >>= 8 * (3 - size);
            Self::from(word)
        } else {
            Self::from(word) << (8 * (size - 3))
        };
        let negative = word != 0 && (compact & 0x0080_0000) != 0;
        let overflow = word != 0
            && (size > 34 || (word > 0xff && size > 33) || (word > 0xffff && size > 32));
        (value, negative, overflow)
    }

    /// Encode this value as a compact (`nBits`) target.
    ///
    /// Lossy below the top 24 significant bits. The mantissa is normalized
    /// so its sign bit stays clear; zero encodes as zero.
    pub fn to_compact(&self) -> u32 {
        let mut size = (self.bits() + 7) / 8;
        let mut compact: u64 = if size <= 3 {
            self.low_u64() << (8 * (3 - size))
        } else {
            (*self >> (8 * (size - 3))).low_u64()
        };
        if compact & 0x0080_0000 != 0 {
            compact >>= 8;
            size += 1;
        }
        debug_assert_eq!(compact & !0x007f_ffffu64, 0);
        compact as u32 | (size as u32) << 24
    }

    /// Integer `n`-th root: the unique `r` with `r^n <= self < (r+1)^n`.
    ///
    /// The top `min(8, ceil(bits/n))` bits of the root are built exactly
    /// bit by bit, which keeps the subsequent Newton iteration from
    /// diverging on small inputs. Refinement steps use a signed delta kept
    /// as a magnitude/direction pair; near the root the step degenerates to
    /// +-1 and a direction reversal terminates the search.
    ///
    /// # Panics
    ///
    /// Panics if `n < 2`.
    pub fn nth_root(&self, n: u32) -> Self {
        assert!(n > 1, "nth_root is defined for n >= 2");
        if self.is_zero() {
            return Self::zero();
        }

        let root_bits = (self.bits() as u32 + n - 1) / n;
        let start = root_bits.min(8);
        let upper = *self >> (((root_bits - start) * n) as usize);
        let mut cur = Self::zero();
        for i in (0..start).rev() {
            let next = cur + (Self::one() << (i as usize));
            if next.overflowing_pow(Self::from(n)).0 <= upper {
                cur = next;
            }
        }
        if root_bits == start {
            return cur;
        }
        cur = cur << ((root_bits - start) as usize);

        // cur += (value / cur^(n-1) - cur) / n, until the delta vanishes
        // or oscillates across the root.
        let step = Self::from(n);
        let mut terminate = 0i8;
        for _ in 0..NTH_ROOT_MAX_ITERATIONS {
            let denominator = cur.overflowing_pow(Self::from(n - 1)).0;
            if denominator.is_zero() {
                // power wrapped past 2^256; the estimate cannot be refined
                return cur;
            }
            let quotient = *self / denominator;
            let (delta, delta_negative) = if quotient >= cur {
                (quotient - cur, false)
            } else {
                (cur - quotient, true)
            };
            if delta.is_zero() {
                return cur;
            }
            if delta_negative {
                if terminate == 1 {
                    return cur - Self::one();
                }
                if delta <= step {
                    cur = cur - Self::one();
                    terminate = -1;
                    continue;
                }
                cur = cur - delta / step;
            } else {
                if terminate == -1 {
                    return cur;
                }
                if delta <= step {
                    cur = cur + Self::one();
                    terminate = 1;
                    continue;
                }
                cur = cur + delta / step;
            }
            terminate = 0;
        }
        cur
    }
}
