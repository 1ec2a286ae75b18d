//! # Binary Entropy Coders
//!
//! *Arithmetic coding and range ANS for a two-symbol alphabet.*
//!
//! ## Intuition First
//!
//! Suppose a coin comes up `1` with probability 0.9. A fair-coin encoding
//! spends one bit per toss, but Shannon says a 0.9-biased toss only carries
//! about 0.47 bits of information. Entropy coders close that gap by letting
//! a single output bit describe *more than one* input bit when the input is
//! predictable.
//!
//! Arithmetic coding does it geometrically: the message becomes a shrinking
//! sub-interval of `[0, 1)`, and the output is just enough bits to name a
//! point inside the final interval. ANS does it arithmetically: the message
//! becomes a single growing integer, where appending an improbable symbol
//! grows the integer faster than appending a probable one.
//!
//! ## The Problem
//!
//! For a binary alphabet the classic trade-off looks like this:
//! - **Arithmetic coding**: optimal rate, but historically seen as slow
//!   (a multiplication per bit, careful renormalization).
//! - **rANS**: the same rate with a simpler hot loop — one division per
//!   symbol, or none at all once transitions are tabulated.
//!
//! This crate implements both, bit-exactly, over 32-bit integer state. The
//! expensive operations are precomputed: the arithmetic coder's boundary
//! multiply is a 32.32 fixed-point multiplier, and the rANS divisions use
//! invariant-divisor magic numbers.
//!
//! ## Historical Context
//!
//! ```text
//! 1948  Shannon            Entropy as the fundamental limit
//! 1976  Rissanen/Pasco     Arithmetic coding: optimal rate
//! 1987  Witten-Neal-Cleary Practical integer arithmetic coding (CACM)
//! 2002  Warren             Hacker's Delight: division by invariant integers
//! 2009  Duda               Asymmetric numeral systems
//! 2014  zstd/LZFSE         ANS goes mainstream (tANS, rANS)
//! ```
//!
//! ## Mathematical Formulation
//!
//! Arithmetic coding keeps an interval `[low, high]` in 32-bit fixed point
//! and narrows it at the boundary `low + (high - low) * p_0` per input bit,
//! rescaling (and emitting bits) whenever the interval falls into one half
//! of the range.
//!
//! rANS keeps a state `x` and, with frequencies `f_s` summing to
//! `2^R`, encodes symbol `s` by
//!
//! ```text
//! C(x, s) = 2^R * (x / f_s) + cum_s + (x mod f_s)
//! ```
//!
//! which the decoder inverts from `x mod 2^R` alone. Keeping
//! `x < 2^R * 256` and flushing a byte at a time makes the whole state
//! machine fit comfortably in `u32`.
//!
//! ## Complexity Analysis
//!
//! - **Time**: `O(1)` per bit for both coders (a widening multiply for the
//!   arithmetic coder; a magic-number division or a table lookup for rANS).
//! - **Space**: `O(1)` in compute mode; `O(2^R * 256)` table entries in
//!   rANS table mode.
//!
//! ## Failure Modes
//!
//! 1. **Degenerate probabilities**: probabilities of exactly 0 or 1 would
//!    produce empty sub-intervals or zero frequencies; the coders clip them
//!    (`1e-9` for the arithmetic coder, frequency floor of 1 for rANS).
//! 2. **Table memory**: rANS tables at large `R` are enormous — at `R = 23`
//!    they run into gigabytes. Table mode is meant for `R` around 6..=12.
//!
//! ## Implementation Notes
//!
//! Both coders work on in-memory bit buffers ([`BitArray`], [`BitStream`])
//! packed LSB-first, carry no I/O and no threading, and need the original
//! message length at decode time — there is no framing. The rANS final
//! state is returned as a plain integer; serializing it is the caller's
//! concern.
//!
//! ## References
//!
//! - Witten, I., Neal, R., Cleary, J. (1987). "Arithmetic coding for data
//!   compression." Communications of the ACM.
//! - Duda, J. (2009). "Asymmetric numeral systems: entropy coding combining
//!   speed of Huffman coding with compression rate of arithmetic coding."
//! - Warren, H. S. (2002). "Hacker's Delight", chapter 10.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bac;
pub mod bits;
pub mod error;
pub mod magic;
pub mod rans;

pub use bac::BinaryArithmeticCoder;
pub use bits::{BitArray, BitStream};
pub use error::Error;
pub use magic::{Fraction, Reciprocal};
pub use rans::{BinaryRansCoder, StateAndSymbol};
