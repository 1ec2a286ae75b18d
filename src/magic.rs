//! Magic-number arithmetic for the coders' hot paths.
//!
//! Division by an invariant divisor becomes a single widening multiply plus
//! a right shift ([`Reciprocal`]), and scaling a `u32` by a fraction in
//! `[0, 1]` becomes a 32.32 fixed-point multiply ([`Fraction`]). The
//! division scheme follows "Hacker's Delight" (Warren, 2002), chapter 10.

use crate::error::{Error, Result};

/// Precomputed magic multiplier and shift for dividing unsigned 31-bit
/// integers by an invariant divisor.
///
/// Exact for all numerators and divisors in `[0, 2^31)`. Extending the
/// scheme to full 32-bit operands would need a wider multiplier and a
/// correction step, which the coders never require: every divisor here is a
/// symbol frequency bounded by `2^23` and every numerator is a coder state
/// bounded by `2^31`.
#[derive(Debug, Clone, Copy)]
pub struct Reciprocal {
    divisor: u32,
    multiplier: u64,
    shift: u32,
}

impl Reciprocal {
    /// Precompute the magic constants for `divisor`.
    ///
    /// A zero divisor yields constants that make every quotient zero; the
    /// caller must never actually divide by zero. Divisors of `2^31` and
    /// above are rejected.
    pub fn new(divisor: u32) -> Result<Self> {
        if divisor == 0 {
            return Ok(Self {
                divisor,
                multiplier: 0,
                shift: 0,
            });
        }
        if divisor >= 1 << 31 {
            return Err(Error::DivisorTooLarge(divisor));
        }

        let width = ceil_log2(divisor);
        if divisor == 1 << width {
            // Power of two: a plain shift divides exactly.
            return Ok(Self {
                divisor,
                multiplier: 1,
                shift: width,
            });
        }

        let shift = 32 + width;
        let multiplier = ((1u64 << shift) + u64::from(divisor) - 1) / u64::from(divisor);
        Ok(Self {
            divisor,
            multiplier,
            shift,
        })
    }

    /// Quotient `numerator / divisor`, exact for `numerator < 2^31`.
    #[inline]
    pub fn divide(&self, numerator: u32) -> u32 {
        ((u64::from(numerator) * self.multiplier) >> self.shift) as u32
    }

    /// Quotient and remainder, exact for `numerator < 2^31`.
    #[inline]
    pub fn div_rem(&self, numerator: u32) -> (u32, u32) {
        let quotient = self.divide(numerator);
        (quotient, numerator - quotient * self.divisor)
    }

    /// The divisor these constants were derived from.
    pub fn divisor(&self) -> u32 {
        self.divisor
    }
}

/// Exponent of the closest power of two greater than or equal to `value`.
fn ceil_log2(value: u32) -> u32 {
    if value <= 1 {
        0
    } else {
        32 - (value - 1).leading_zeros()
    }
}

/// Fixed-point 32.32 multiplier for scaling a `u32` by a fraction in
/// `[0, 1]`.
#[derive(Debug, Clone, Copy)]
pub struct Fraction {
    scaled: u64,
}

impl Fraction {
    const SCALE: f64 = (1u64 << 32) as f64;

    /// Precompute the scaled multiplier `floor(fraction * 2^32)`.
    ///
    /// Fractions outside `[0, 1]`, including non-finite values, are
    /// rejected.
    pub fn new(fraction: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&fraction) {
            return Err(Error::InvalidFraction(fraction));
        }
        Ok(Self::saturating(fraction))
    }

    /// Like [`Fraction::new`] but clamps finite fractions into `[0, 1]`
    /// instead of rejecting them.
    pub fn saturating(fraction: f64) -> Self {
        Self {
            scaled: (fraction.clamp(0.0, 1.0) * Self::SCALE) as u64,
        }
    }

    /// Compute `(x * floor(fraction * 2^32)) >> 32`.
    ///
    /// The result never exceeds `floor(x * fraction)` and falls short of it
    /// by at most one.
    #[inline]
    pub fn multiply(&self, x: u32) -> u32 {
        ((u64::from(x) * self.scaled) >> 32) as u32
    }
}
