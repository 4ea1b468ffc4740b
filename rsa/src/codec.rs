//! Text ⇄ block codec over a 37-symbol alphabet.
//!
//! Text is canonicalized first: anything outside `[A-Za-z0-9 ]` becomes a
//! space, letters are lowercased, and the result is right-padded with spaces
//! to a multiple of [`BLOCK_CHARS`]. Each group of five characters is then
//! read as a base-37 number, most significant character first. Decoding
//! recovers the canonical form only; case and punctuation are gone for good.

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{ToPrimitive, Zero};
use thiserror::Error;

/// Characters per block.
pub const BLOCK_CHARS: usize = 5;

/// Digit order: `0-9` → 0..=9, `a-z` → 10..=35, space → 36.
pub const ALPHABET: &[u8; 37] = b"0123456789abcdefghijklmnopqrstuvwxyz ";

const RADIX: u32 = ALPHABET.len() as u32;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("block {0} does not fit in {BLOCK_CHARS} base-37 digits")]
    BlockOutOfRange(BigUint),
}

/// `37^5`: every block is strictly below this, so a modulus must exceed it
/// for blocks to survive encryption.
pub fn block_capacity() -> BigUint {
    BigUint::from(RADIX).pow(BLOCK_CHARS as u32)
}

pub fn canonicalize(text: &str) -> String {
    let mut canonical: String = text
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == ' ' { c.to_ascii_lowercase() } else { ' ' })
        .collect();

    let remainder = canonical.len() % BLOCK_CHARS;
    if remainder != 0 {
        canonical.extend(std::iter::repeat_n(' ', BLOCK_CHARS - remainder));
    }
    canonical
}

fn digit_of(c: u8) -> u32 {
    match c {
        b'0'..=b'9' => (c - b'0') as u32,
        b'a'..=b'z' => (c - b'a') as u32 + 10,
        _ => RADIX - 1,
    }
}

pub fn encode(text: &str) -> Vec<BigUint> {
    canonicalize(text)
        .as_bytes()
        .chunks(BLOCK_CHARS)
        .map(|group| {
            group
                .iter()
                .fold(BigUint::zero(), |acc, &c| acc * RADIX + digit_of(c))
        })
        .collect()
}

pub fn decode(blocks: &[BigUint]) -> Result<String, CodecError> {
    let capacity = block_capacity();
    let mut text = String::with_capacity(blocks.len() * BLOCK_CHARS);

    for block in blocks {
        if *block >= capacity {
            return Err(CodecError::BlockOutOfRange(block.clone()));
        }

        let mut digits = [0u8; BLOCK_CHARS];
        let mut rest = block.clone();
        for slot in digits.iter_mut().rev() {
            let (quotient, digit) = rest.div_rem(&BigUint::from(RADIX));
            // digit < 37 by construction
            *slot = ALPHABET[digit.to_usize().unwrap_or_default()];
            rest = quotient;
        }
        text.extend(digits.iter().map(|&b| b as char));
    }

    Ok(text)
}
