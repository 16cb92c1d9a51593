use honggfuzz::fuzz;
use lenzu::{decode_with_config, DecodeConfig};

fn main() {
    // Keep allocations small so hostile length fields fail fast.
    let config = DecodeConfig {
        max_output_len: 1 << 20,
        verify_checksum: true,
    };
    loop {
        fuzz!(|data: &[u8]| {
            let _ = decode_with_config(data, &config);
        });
    }
}
