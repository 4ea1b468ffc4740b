//! Textbook RSA: prime generation, key derivation, a base-37 text codec,
//! the modular-exponentiation cipher, and two key-recovery attacks.

pub mod attacks;
pub mod codec;
pub mod number_theory;
pub mod primality;
pub mod rsa;

pub use codec::{CodecError, canonicalize, decode, encode};
pub use rsa::{KeyGenError, PrivateKey, PublicKey, RsaKeyGenerator, RsaKeyPair, RsaService};
