use honggfuzz::fuzz;
use lenzu::{decode, encode_with_config, EncodeConfig};

fn main() {
    loop {
        fuzz!(|data: &[u8]| {
            let Some((&bits, body)) = data.split_first() else {
                return;
            };
            let config = EncodeConfig {
                huff_bit_count: 3 + bits % 8,
            };
            let packed = encode_with_config(body, &config).unwrap();
            assert_eq!(decode(&packed).unwrap(), body);
        });
    }
}
