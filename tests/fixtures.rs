//! Paired known vectors: every `tests/fixtures/NAME.ctd` must decode to the
//! bytes in `NAME.ctd.de`.
use std::fs;
use std::path::PathBuf;

use lenzu::{decode, encode_with_config, inspect, EncodeConfig};

fn fixture_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load(name: &str) -> (Vec<u8>, Vec<u8>) {
    let dir = fixture_dir();
    let packed = fs::read(dir.join(format!("{name}.ctd"))).unwrap();
    let plain = fs::read(dir.join(format!("{name}.ctd.de"))).unwrap();
    (packed, plain)
}

#[test]
fn every_fixture_decodes_to_its_pair() {
    let mut seen = 0;
    for entry in fs::read_dir(fixture_dir()).unwrap() {
        let path = entry.unwrap().path();
        if path.extension().and_then(|e| e.to_str()) != Some("ctd") {
            continue;
        }
        let packed = fs::read(&path).unwrap();
        let expected = fs::read(path.with_extension("ctd.de")).unwrap();
        let out = decode(&packed).unwrap_or_else(|e| panic!("{}: {e}", path.display()));
        assert_eq!(out, expected, "{}", path.display());
        seen += 1;
    }
    assert!(seen >= 4);
}

#[test]
fn overlapping_backreferences() {
    let (packed, plain) = load("backref_overlap");
    assert_eq!(plain, b"abcabcabcabcX");
    let (_, options) = inspect(&packed).unwrap();
    assert_eq!(options.backref_low_bit_count, 1);
    assert_eq!(options.first_real_entry(), 8);
    assert_eq!(decode(&packed).unwrap(), plain);
}

#[test]
fn single_symbol_table() {
    let (packed, plain) = load("single_symbol");
    assert_eq!(plain, b"helloworldoworld");
    assert_eq!(decode(&packed).unwrap(), plain);
}

#[test]
fn encoder_matches_literal_block_vectors() {
    for (name, bits) in [("literal_blocks", 7u8), ("wide_table", 9)] {
        let (packed, plain) = load(name);
        let ours = encode_with_config(&plain, &EncodeConfig { huff_bit_count: bits }).unwrap();
        assert_eq!(ours, packed, "{name}");
    }
}
