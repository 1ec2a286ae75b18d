#![no_main]
use bec::{BinaryArithmeticCoder, BitArray, BitStream};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: (Vec<u8>, u16)| {
    let (input_bytes, prob_raw) = data;

    let prob_of_one = f64::from(prob_raw) / f64::from(u16::MAX);
    let bits: Vec<u8> = input_bytes.iter().map(|&b| b % 2).collect();
    let input = BitArray::from_bits(&bits);

    let coder = BinaryArithmeticCoder::new(prob_of_one).unwrap();
    let mut encoded = BitStream::with_bit_capacity(bits.len() + 8);
    coder.encode(&input, &mut encoded);

    let mut decoded = BitArray::zeroed(bits.len());
    coder.decode(&encoded.into_bit_array(), &mut decoded);
    assert_eq!(decoded, input);
});
