pub mod cipher;
pub mod keygen;

pub use cipher::{RsaService, decrypt, encrypt};
pub use keygen::{
    DEFAULT_PUBLIC_EXPONENT, KeyGenError, MAX_KEYPAIR_ATTEMPTS, PrivateKey, PublicKey, RsaKeyGenerator, RsaKeyPair,
    generate_primes,
};
