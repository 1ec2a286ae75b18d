#![no_main]
use bec::{BinaryRansCoder, BitArray};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: (Vec<u8>, u16, u8)| {
    let (input_bytes, prob_raw, range_raw) = data;

    let prob_of_one = f64::from(prob_raw) / f64::from(u16::MAX);
    let range_bits = u32::from(range_raw % 11) + 2; // 2 to 12 bits

    let bits: Vec<u8> = input_bytes.iter().map(|&b| b % 2).collect();
    let input = BitArray::from_bits(&bits);

    let coder = BinaryRansCoder::new(prob_of_one, range_bits).unwrap();
    let (bytes, state) = coder.encode(&input);

    assert!(state >= coder.total_freq());
    assert!(state < coder.total_freq() * 256);

    let mut decoded = BitArray::zeroed(bits.len());
    coder.decode(&bytes, state, &mut decoded);
    assert_eq!(decoded, input);
});
