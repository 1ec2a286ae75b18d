//! Binary range Asymmetric Numeral Systems (rANS).
//!
//! The coder's entire state is a single integer `x`. Encoding a symbol `s`
//! maps `x` to roughly `x / p_s`, so improbable symbols grow the state
//! faster; decoding inverts the map exactly. The state is kept inside
//! `[total_freq, total_freq * 256)` by flushing its low byte to the output
//! whenever the next transition would overflow the window, and the decoder
//! recognizes those flush points because only a flush can leave the state
//! below `total_freq`.
//!
//! Encoding walks the message in reverse and reverses the flushed bytes at
//! the end, so the decoder consumes both the bytes and the states in
//! forward order (the stack discipline inherent to ANS).
//!
//! Transitions run in compute mode (one magic-number division per symbol,
//! see [`crate::magic::Reciprocal`]) or in table mode, where all
//! `total_freq * 256` transitions are precomputed tANS-style. Table mode
//! trades memory for speed; the tables hold `total_freq * 256` entries, so
//! it only pays off for small range widths, roughly `R` in 6..=12.

use crate::bits::BitArray;
use crate::error::{Error, Result};
use crate::magic::Reciprocal;

/// Smallest supported total-range bit width.
pub const MIN_RANGE_BITS: u32 = 2;
/// Largest supported total-range bit width. Keeps every reachable state,
/// bounded by `2^R * 256`, within 32 bits.
pub const MAX_RANGE_BITS: u32 = 23;

/// A decoder state transition: the next state plus the decoded symbol.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StateAndSymbol {
    /// State after the transition.
    pub state: u32,
    /// Decoded symbol, 0 or 1.
    pub symbol: u8,
}

/// Binary rANS coder with optional precomputed transition tables.
pub struct BinaryRansCoder {
    range_bits: u32,
    total_freq: u32,
    freq: [u32; 2],
    cum_freq: [u32; 2],
    flush_threshold: [u32; 2],
    reciprocal: [Reciprocal; 2],
    enc_table: Vec<u32>,
    dec_table: Vec<StateAndSymbol>,
}

impl BinaryRansCoder {
    /// Create a coder for the given probability of the `1` symbol and total
    /// range width `range_bits` (`total_freq = 2^range_bits`).
    ///
    /// Both symbol frequencies are clipped to at least 1 so that each
    /// symbol stays representable at any probability.
    ///
    /// # Errors
    /// Rejects probabilities outside `[0, 1]` and range widths outside
    /// `[2, 23]`.
    pub fn new(prob_of_one: f64, range_bits: u32) -> Result<Self> {
        if !(0.0..=1.0).contains(&prob_of_one) {
            return Err(Error::InvalidProbability(prob_of_one));
        }
        if !(MIN_RANGE_BITS..=MAX_RANGE_BITS).contains(&range_bits) {
            return Err(Error::InvalidRangeBits(range_bits));
        }

        let total_freq = 1u32 << range_bits;
        let freq_of_zero = (((1.0 - prob_of_one) * f64::from(total_freq)).round() as u32)
            .clamp(1, total_freq - 1);
        let freq = [freq_of_zero, total_freq - freq_of_zero];

        Ok(Self {
            range_bits,
            total_freq,
            freq,
            cum_freq: [0, freq_of_zero],
            flush_threshold: [freq[0] * 256, freq[1] * 256],
            reciprocal: [Reciprocal::new(freq[0])?, Reciprocal::new(freq[1])?],
            enc_table: Vec::new(),
            dec_table: Vec::new(),
        })
    }

    /// Total frequency of both symbols, `2^range_bits`.
    pub fn total_freq(&self) -> u32 {
        self.total_freq
    }

    /// Integer frequencies of the symbols 0 and 1.
    pub fn frequencies(&self) -> [u32; 2] {
        self.freq
    }

    /// Encode `input`, returning the flushed bytes in decoder order and the
    /// final state.
    ///
    /// The final state must reach [`BinaryRansCoder::decode`] out of band;
    /// no byte serialization of it is defined here. It always lies in
    /// `[total_freq, total_freq * 256)`.
    pub fn encode(&self, input: &BitArray) -> (Vec<u8>, u32) {
        let mut bytes = Vec::new();
        let mut state = self.total_freq;

        for position in (0..input.bit_len()).rev() {
            let symbol = usize::from(input.read(position));

            // Flush until the transition below cannot push the state past
            // total_freq * 256. A flush may drop the state below
            // total_freq, which is exactly what tells the decoder to read
            // a byte back at the matching point.
            while state >= self.flush_threshold[symbol] {
                bytes.push((state & 0xFF) as u8);
                state >>= 8;
            }

            state = self.encode_transition(state, symbol);
        }

        // The decoder visits the states in the opposite order; handing it
        // the bytes reversed lets it read forward.
        bytes.reverse();
        (bytes, state)
    }

    /// Decode `output.bit_len()` bits from `bytes` and the final encoder
    /// `state` into `output`, which must be zeroed.
    pub fn decode(&self, bytes: &[u8], mut state: u32, output: &mut BitArray) {
        let mut read_pos: usize = 0;

        for write_pos in 0..output.bit_len() {
            while state < self.total_freq && read_pos < bytes.len() {
                state = (state << 8) | u32::from(bytes[read_pos]);
                read_pos += 1;
            }

            let transition = self.decode_transition(state);
            state = transition.state;
            output.write(write_pos, transition.symbol);
        }
    }

    /// Encode `input` using the precomputed transition table.
    ///
    /// # Errors
    /// Returns [`Error::TableNotBuilt`] unless
    /// [`BinaryRansCoder::build_encoder_table`] ran first.
    pub fn encode_with_table(&self, input: &BitArray) -> Result<(Vec<u8>, u32)> {
        if !self.has_encoder_table() {
            return Err(Error::TableNotBuilt);
        }

        let mut bytes = Vec::new();
        let mut state = self.total_freq;

        for position in (0..input.bit_len()).rev() {
            let symbol = usize::from(input.read(position));

            while state >= self.flush_threshold[symbol] {
                bytes.push((state & 0xFF) as u8);
                state >>= 8;
            }

            state = self.enc_table[(state as usize) * 2 + symbol];
        }

        bytes.reverse();
        Ok((bytes, state))
    }

    /// Decode using the precomputed transition table. `state` must be the
    /// final state returned by the matching encode call.
    ///
    /// # Errors
    /// Returns [`Error::TableNotBuilt`] unless
    /// [`BinaryRansCoder::build_decoder_table`] ran first.
    pub fn decode_with_table(
        &self,
        bytes: &[u8],
        mut state: u32,
        output: &mut BitArray,
    ) -> Result<()> {
        if !self.has_decoder_table() {
            return Err(Error::TableNotBuilt);
        }

        let mut read_pos: usize = 0;

        for write_pos in 0..output.bit_len() {
            while state < self.total_freq && read_pos < bytes.len() {
                state = (state << 8) | u32::from(bytes[read_pos]);
                read_pos += 1;
            }

            let transition = self.dec_table[state as usize];
            state = transition.state;
            output.write(write_pos, transition.symbol);
        }

        Ok(())
    }

    /// Build the encoder transition table: for every state below
    /// `total_freq * 256`, the next state for symbol `s` sits at index
    /// `2 * state + s`. Does nothing if the table already exists.
    pub fn build_encoder_table(&mut self) {
        if self.has_encoder_table() {
            return;
        }

        let state_count = self.state_count();
        let mut table = Vec::with_capacity(state_count * 2);
        for state in 0..state_count as u32 {
            table.push(self.encode_transition(state, 0));
            table.push(self.encode_transition(state, 1));
        }
        self.enc_table = table;
    }

    /// Build the decoder transition table, one entry per state below
    /// `total_freq * 256`. Does nothing if the table already exists.
    pub fn build_decoder_table(&mut self) {
        if self.has_decoder_table() {
            return;
        }

        let state_count = self.state_count();
        let mut table = Vec::with_capacity(state_count);
        for state in 0..state_count as u32 {
            table.push(self.decode_transition(state));
        }
        self.dec_table = table;
    }

    /// Whether [`BinaryRansCoder::build_encoder_table`] has run.
    pub fn has_encoder_table(&self) -> bool {
        !self.enc_table.is_empty()
    }

    /// Whether [`BinaryRansCoder::build_decoder_table`] has run.
    pub fn has_decoder_table(&self) -> bool {
        !self.dec_table.is_empty()
    }

    /// Number of reachable states, `total_freq * 256`.
    fn state_count(&self) -> usize {
        (self.total_freq as usize) << 8
    }

    /// Encoder state transition for `symbol`:
    /// `x' = total_freq * (x / freq) + cum_freq + (x mod freq)`.
    ///
    /// Computed in 64 bits and truncated. For states below the symbol's
    /// flush threshold (the only ones the encoder reaches) the result fits
    /// 32 bits exactly; table entries above the threshold are never looked
    /// up.
    #[inline]
    fn encode_transition(&self, state: u32, symbol: usize) -> u32 {
        let (quotient, remainder) = self.reciprocal[symbol].div_rem(state);
        let next = u64::from(self.total_freq) * u64::from(quotient)
            + u64::from(self.cum_freq[symbol])
            + u64::from(remainder);
        next as u32
    }

    /// Decoder state transition: split the state into
    /// `q = x >> range_bits` and `r = x mod total_freq`, pick the symbol
    /// whose cumulative slot holds `r`, and rebuild
    /// `x' = freq * q + r - cum_freq`.
    #[inline]
    fn decode_transition(&self, state: u32) -> StateAndSymbol {
        let quotient = state >> self.range_bits;
        let remainder = state & (self.total_freq - 1);
        let symbol = usize::from(remainder >= self.cum_freq[1]);

        StateAndSymbol {
            state: self.freq[symbol] * quotient + remainder - self.cum_freq[symbol],
            symbol: symbol as u8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn roundtrip(bits: &[u8], prob_of_one: f64, range_bits: u32) -> (Vec<u8>, u32, BitArray) {
        let coder = BinaryRansCoder::new(prob_of_one, range_bits).unwrap();
        let input = BitArray::from_bits(bits);
        let (bytes, state) = coder.encode(&input);

        let mut decoded = BitArray::zeroed(bits.len());
        coder.decode(&bytes, state, &mut decoded);
        (bytes, state, decoded)
    }

    /// Deterministic pseudo-random bit pattern for the larger tests.
    fn lcg_bits(len: usize, ones_in_16: u32) -> Vec<u8> {
        let mut seed: u64 = 0x2545_F491_4F6C_DD1D;
        (0..len)
            .map(|_| {
                seed = seed.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
                u8::from((seed >> 60) as u32 % 16 < ones_in_16)
            })
            .collect()
    }

    #[test]
    fn test_nibble_pattern_roundtrip() {
        let bits = [1, 1, 1, 1, 0, 0, 0, 0];
        let (_, state, decoded) = roundtrip(&bits, 0.5, 8);
        assert_eq!(decoded, BitArray::from_bits(&bits));
        assert!((256..65536).contains(&state));
    }

    #[test]
    fn test_empty_message() {
        let (bytes, state, decoded) = roundtrip(&[], 0.5, 8);
        assert!(bytes.is_empty());
        assert_eq!(state, 256);
        assert_eq!(decoded.bit_len(), 0);
    }

    #[test]
    fn test_final_state_stays_in_window() {
        for (prob, range_bits) in [(0.5, 2), (0.1, 8), (0.9, 12), (0.7, 23)] {
            let coder = BinaryRansCoder::new(prob, range_bits).unwrap();
            let input = BitArray::from_bits(&lcg_bits(500, 8));
            let (_, state) = coder.encode(&input);
            assert!(state >= coder.total_freq());
            assert!(state < coder.total_freq() * 256);
        }
    }

    #[test]
    fn test_extreme_probabilities_keep_both_symbols_representable() {
        for prob in [0.0, 1.0] {
            let coder = BinaryRansCoder::new(prob, 8).unwrap();
            assert_eq!(coder.frequencies().iter().sum::<u32>(), 256);
            assert!(coder.frequencies().iter().all(|&f| f >= 1));

            // Even the "impossible" symbol must survive a round trip.
            let bits = [0, 1, 0, 1, 1, 0];
            let input = BitArray::from_bits(&bits);
            let (bytes, state) = coder.encode(&input);
            let mut decoded = BitArray::zeroed(bits.len());
            coder.decode(&bytes, state, &mut decoded);
            assert_eq!(decoded, input);
        }
    }

    #[test]
    fn test_constructor_rejects_bad_configuration() {
        assert!(matches!(
            BinaryRansCoder::new(-0.1, 8),
            Err(Error::InvalidProbability(_))
        ));
        assert!(matches!(
            BinaryRansCoder::new(1.1, 8),
            Err(Error::InvalidProbability(_))
        ));
        assert!(matches!(
            BinaryRansCoder::new(f64::NAN, 8),
            Err(Error::InvalidProbability(_))
        ));
        assert!(matches!(
            BinaryRansCoder::new(0.5, 1),
            Err(Error::InvalidRangeBits(1))
        ));
        assert!(matches!(
            BinaryRansCoder::new(0.5, 24),
            Err(Error::InvalidRangeBits(24))
        ));
    }

    #[test]
    fn test_table_mode_requires_built_tables() {
        let coder = BinaryRansCoder::new(0.5, 8).unwrap();
        let input = BitArray::from_bits(&[1, 0, 1]);
        assert!(matches!(
            coder.encode_with_table(&input),
            Err(Error::TableNotBuilt)
        ));
        let mut output = BitArray::zeroed(3);
        assert!(matches!(
            coder.decode_with_table(&[], 256, &mut output),
            Err(Error::TableNotBuilt)
        ));
    }

    #[test]
    fn test_table_build_is_idempotent() {
        let mut coder = BinaryRansCoder::new(0.3, 6).unwrap();
        coder.build_encoder_table();
        coder.build_decoder_table();
        let enc_len = coder.enc_table.len();
        let dec_len = coder.dec_table.len();
        coder.build_encoder_table();
        coder.build_decoder_table();
        assert_eq!(coder.enc_table.len(), enc_len);
        assert_eq!(coder.dec_table.len(), dec_len);
        assert_eq!(enc_len, 64 * 256 * 2);
        assert_eq!(dec_len, 64 * 256);
    }

    #[test]
    fn test_table_mode_matches_compute_mode() {
        let mut coder = BinaryRansCoder::new(0.7, 12).unwrap();
        coder.build_encoder_table();
        coder.build_decoder_table();

        let input = BitArray::from_bits(&lcg_bits(10_000, 11));
        let (bytes, state) = coder.encode(&input);
        let (table_bytes, table_state) = coder.encode_with_table(&input).unwrap();
        assert_eq!(bytes, table_bytes);
        assert_eq!(state, table_state);

        let mut decoded = BitArray::zeroed(input.bit_len());
        let mut table_decoded = BitArray::zeroed(input.bit_len());
        coder.decode(&bytes, state, &mut decoded);
        coder
            .decode_with_table(&table_bytes, table_state, &mut table_decoded)
            .unwrap();
        assert_eq!(decoded, input);
        assert_eq!(table_decoded, input);
    }

    #[test]
    fn test_transition_tables_match_transition_functions() {
        let mut coder = BinaryRansCoder::new(0.25, 6).unwrap();
        coder.build_encoder_table();
        coder.build_decoder_table();

        for state in 0..(coder.total_freq() * 256) {
            assert_eq!(
                coder.dec_table[state as usize],
                coder.decode_transition(state)
            );
            for symbol in 0..2usize {
                // Encoder entries only matter below the flush threshold;
                // states at or above it are flushed before any lookup.
                if state < coder.flush_threshold[symbol] {
                    assert_eq!(
                        coder.enc_table[(state as usize) * 2 + symbol],
                        coder.encode_transition(state, symbol)
                    );
                }
            }
        }
    }

    #[test]
    fn test_skewed_messages_compress() {
        let bits = lcg_bits(10_000, 1);
        let (bytes, _, decoded) = roundtrip(&bits, 1.0 / 16.0, 12);
        assert_eq!(decoded, BitArray::from_bits(&bits));
        // Entropy is about 0.34 bits per symbol here; allow generous slack.
        assert!(bytes.len() < 10_000 / 8 / 2, "got {} bytes", bytes.len());
    }

    proptest! {
        #[test]
        fn prop_roundtrip(
            bits in prop::collection::vec(0u8..2, 0..400),
            prob_of_one in 0.01f64..0.99,
            range_bits in 2u32..=16,
        ) {
            let (_, _, decoded) = roundtrip(&bits, prob_of_one, range_bits);
            prop_assert_eq!(decoded, BitArray::from_bits(&bits));
        }

        #[test]
        fn prop_table_mode_matches_compute_mode(
            bits in prop::collection::vec(0u8..2, 0..200),
            prob_of_one in 0.01f64..0.99,
            range_bits in 2u32..=8,
        ) {
            let mut coder = BinaryRansCoder::new(prob_of_one, range_bits).unwrap();
            coder.build_encoder_table();
            coder.build_decoder_table();

            let input = BitArray::from_bits(&bits);
            let (bytes, state) = coder.encode(&input);
            let (table_bytes, table_state) = coder.encode_with_table(&input).unwrap();
            prop_assert_eq!(&bytes, &table_bytes);
            prop_assert_eq!(state, table_state);

            let mut decoded = BitArray::zeroed(bits.len());
            coder.decode_with_table(&bytes, state, &mut decoded).unwrap();
            prop_assert_eq!(decoded, input);
        }
    }
}
