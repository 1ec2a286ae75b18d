use bec::{BinaryRansCoder, BitArray};

fn main() {
    let mut seed: u64 = 0x9E37_79B9_7F4A_7C15;
    let bits: Vec<u8> = (0..10_000)
        .map(|_| {
            seed = seed.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
            u8::from((seed >> 60) < 11)
        })
        .collect();
    let input = BitArray::from_bits(&bits);

    let mut coder = BinaryRansCoder::new(0.7, 12).unwrap();
    coder.build_encoder_table();
    coder.build_decoder_table();

    for _ in 0..1000 {
        let (bytes, state) = coder.encode_with_table(&input).unwrap();

        let mut decoded = BitArray::zeroed(input.bit_len());
        coder.decode_with_table(&bytes, state, &mut decoded).unwrap();
        assert_eq!(decoded.as_bytes(), input.as_bytes());
    }
}
