use num_bigint::BigUint;
use rsa::codec::{BLOCK_CHARS, CodecError, block_capacity, canonicalize, decode, encode};

#[test]
fn test_canonicalize_strips_and_pads() {
    assert_eq!(canonicalize("Hello, World!"), "hello  world   ");
    assert_eq!(canonicalize("abcde"), "abcde");
    assert_eq!(canonicalize(""), "");
    assert_eq!(canonicalize("Zürich"), "z rich    ");
}

#[test]
fn test_canonical_length_is_block_multiple() {
    for text in ["a", "ab", "abc", "abcd", "abcdef", "tab\there"] {
        assert_eq!(canonicalize(text).len() % BLOCK_CHARS, 0, "{:?}", text);
    }
}

#[test]
fn test_encode_known_values() {
    // "hello" = 17*37^4 + 14*37^3 + 21*37^2 + 21*37 + 24
    assert_eq!(encode("hello"), vec![BigUint::from(32_599_429u32)]);
    assert_eq!(encode("HELLO"), encode("hello"));
    assert_eq!(encode("00000"), vec![BigUint::from(0u32)]);
}

#[test]
fn test_encode_splits_into_blocks() {
    let blocks = encode("hello world");
    assert_eq!(blocks.len(), 3);
    assert!(blocks.iter().all(|b| b < &block_capacity()));
}

#[test]
fn test_decode_known_values() {
    assert_eq!(decode(&[BigUint::from(32_599_429u32)]).unwrap(), "hello");
    assert_eq!(decode(&[]).unwrap(), "");
}

#[test]
fn test_decode_is_lossy_for_case_and_punctuation() {
    let text = "It's 5 o'clock, SOMEWHERE.";
    assert_eq!(decode(&encode(text)).unwrap(), "it s 5 o clock  somewhere     ");
}

#[test]
fn test_decode_rejects_oversized_block() {
    let too_big = block_capacity();
    assert_eq!(
        decode(&[too_big.clone()]),
        Err(CodecError::BlockOutOfRange(too_big))
    );
}

#[test]
fn test_encode_not_injective_over_raw_input() {
    assert_eq!(encode("a,b.c"), encode("a b c"));
}

use quickcheck::quickcheck;

quickcheck! {
    fn prop_decode_inverts_encode(text: String) -> bool {
        decode(&encode(&text)).unwrap() == canonicalize(&text)
    }

    fn prop_blocks_fit_capacity(text: String) -> bool {
        let capacity = block_capacity();
        encode(&text).iter().all(|b| b < &capacity)
    }
}
