//! Binary arithmetic coding.
//!
//! A classic integer range coder over the two-symbol alphabet, following
//! the Witten-Neal-Cleary scheme. The unit interval is mapped to 32-bit
//! fixed point; each input bit narrows the current interval at a boundary
//! proportional to the probability of a zero bit, and the interval is
//! rescaled as soon as its position pins down an output bit: E1 when it
//! sits entirely below the midpoint, E2 entirely above, E3 when it
//! straddles the midpoint inside the middle half. Bits that E3 cannot
//! resolve are counted as pending and emitted, inverted, the moment the
//! interval commits to one half.

use crate::bits::{BitArray, BitStream};
use crate::error::{Error, Result};
use crate::magic::Fraction;

/// Width of the fixed-point interval endpoints.
const W: u32 = 32;
/// First quarter of the range.
const Q1: u32 = 1 << (W - 2);
/// Midpoint of the range.
const HALF: u32 = 1 << (W - 1);
/// Third quarter of the range.
const Q3: u32 = HALF + Q1;
/// Top of the initial interval, inclusive. One below `2^32` so the
/// endpoints can be doubled during renormalization without overflow.
const TOP: u32 = u32::MAX;

/// Probabilities are clipped this far away from 0 and 1 to keep both
/// sub-intervals non-empty.
const PROB_EPSILON: f64 = 1e-9;

/// Binary arithmetic coder for a fixed probability of the `1` symbol.
///
/// Encoding and decoding are pure functions of the input bits and the
/// probability; the coder itself only holds the precomputed fixed-point
/// multiplier for the zero-symbol sub-interval.
pub struct BinaryArithmeticCoder {
    fraction_of_zero: Fraction,
}

impl BinaryArithmeticCoder {
    /// Create a coder for the given probability of the `1` symbol.
    ///
    /// Finite probabilities outside `[0, 1]` are clipped into
    /// `[1e-9, 1 - 1e-9]`; non-finite probabilities are rejected.
    pub fn new(prob_of_one: f64) -> Result<Self> {
        if !prob_of_one.is_finite() {
            return Err(Error::InvalidProbability(prob_of_one));
        }
        let clipped = prob_of_one.clamp(PROB_EPSILON, 1.0 - PROB_EPSILON);
        Ok(Self {
            fraction_of_zero: Fraction::saturating(1.0 - clipped),
        })
    }

    /// Encode `input`, appending the code bits to `output`.
    pub fn encode(&self, input: &BitArray, output: &mut BitStream) {
        let mut low: u32 = 0;
        let mut high: u32 = TOP;
        let mut pending: u64 = 0;

        for position in 0..input.bit_len() {
            let mid = self.boundary(low, high);
            if input.read(position) == 0 {
                high = mid;
            } else {
                low = mid;
            }

            loop {
                if high < HALF {
                    // E1: interval in the lower half.
                    emit(output, 0, &mut pending);
                    low <<= 1;
                    high <<= 1;
                } else if low >= HALF {
                    // E2: interval in the upper half.
                    emit(output, 1, &mut pending);
                    low = (low - HALF) << 1;
                    high = (high - HALF) << 1;
                } else if low >= Q1 && high < Q3 {
                    // E3: interval straddles the midpoint inside the middle
                    // half. The output bit is deferred until E1 or E2
                    // resolves it.
                    pending += 1;
                    low = (low - Q1) << 1;
                    high = (high - Q1) << 1;
                } else {
                    break;
                }
            }
        }

        // One more definitive bit pins down the final interval; the
        // deferred bits follow it, inverted.
        pending += 1;
        let final_bit = if low < Q1 { 0 } else { 1 };
        emit(output, final_bit, &mut pending);
    }

    /// Decode `output.bit_len()` bits from `encoded` into `output`.
    ///
    /// The output length is authoritative: any bit stream decodes to some
    /// message of the requested length. `output` must be zeroed, as
    /// produced by [`BitArray::zeroed`].
    pub fn decode(&self, encoded: &BitArray, output: &mut BitArray) {
        let encoded_len = encoded.bit_len();
        let mut low: u32 = 0;
        let mut high: u32 = TOP;
        let mut read_pos: usize = 0;

        // Seed the code window with the first W encoded bits, MSB first,
        // zero-padded when the code is shorter than the window.
        let initial = encoded_len.min(W as usize);
        let mut window: u64 = 0;
        while read_pos < initial {
            window = (window << 1) | u64::from(encoded.read(read_pos));
            read_pos += 1;
        }
        let mut value = (window << (W as usize - initial)) as u32;

        for write_pos in 0..output.bit_len() {
            let mid = self.boundary(low, high);
            if value < mid {
                output.write(write_pos, 0);
                high = mid;
            } else {
                output.write(write_pos, 1);
                low = mid;
            }

            // Mirror the encoder's renormalization, shifting the next code
            // bit into the window each round. A code bit past the end of
            // the stream reads as 0. The window uses wrapping subtraction:
            // on streams the encoder produced it tracks the interval
            // exactly, on arbitrary streams it merely stays deterministic.
            loop {
                if high < HALF {
                    low <<= 1;
                    high <<= 1;
                    value <<= 1;
                } else if low >= HALF {
                    low = (low - HALF) << 1;
                    high = (high - HALF) << 1;
                    value = value.wrapping_sub(HALF) << 1;
                } else if low >= Q1 && high < Q3 {
                    low = (low - Q1) << 1;
                    high = (high - Q1) << 1;
                    value = value.wrapping_sub(Q1) << 1;
                } else {
                    break;
                }

                if read_pos < encoded_len {
                    value |= u32::from(encoded.read(read_pos));
                    read_pos += 1;
                }
            }
        }
    }

    /// Split point of `[low, high]`: the `0` symbol owns `[low, boundary)`,
    /// the `1` symbol owns `[boundary, high]`.
    #[inline]
    fn boundary(&self, low: u32, high: u32) -> u32 {
        low + self.fraction_of_zero.multiply(high - low)
    }
}

/// Push `bit`, then drain the pending counter as the opposite bit.
#[inline]
fn emit(output: &mut BitStream, bit: u8, pending: &mut u64) {
    output.push(bit);
    while *pending > 0 {
        output.push(bit ^ 1);
        *pending -= 1;
    }
}
