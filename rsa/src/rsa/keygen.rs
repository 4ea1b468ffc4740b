use crate::number_theory::{is_coprime, mod_inverse};
use crate::primality::{DEFAULT_MR_ROUNDS, MillerRabinTest, PrimalityTest};
use num_bigint::{BigUint, RandBigInt};
use num_traits::One;
use rand::rngs::OsRng;
use thiserror::Error;

/// Public exponent used unless the caller picks another one.
pub const DEFAULT_PUBLIC_EXPONENT: u32 = 65537;

/// Prime pairs drawn before giving up on an exponent. Small moduli have few
/// primes to choose from, and some exponents divide every φ they allow.
pub const MAX_KEYPAIR_ATTEMPTS: usize = 1024;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyGenError {
    #[error("cannot generate a {0}-bit prime, at least 2 bits are required")]
    PrimeTooSmall(usize),
    #[error("a {0}-bit modulus is too small, at least 5 bits are required")]
    ModulusTooSmall(usize),
    #[error("public exponent must be odd and at least 3")]
    InvalidExponent,
    #[error("no prime pair coprime to the exponent after {0} attempts")]
    ExponentNotCoprime(usize),
}

/// RSA key material. `p` and `q` stay inside the crate.
#[derive(Debug, Clone)]
pub struct RsaKeyPair {
    pub n: BigUint,
    pub e: BigUint,
    pub d: BigUint,
    pub(crate) p: BigUint,
    pub(crate) q: BigUint,
}

/// The `(e, n)` half handed to peers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    pub e: BigUint,
    pub n: BigUint,
}

/// The `(d, n)` half kept by the owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivateKey {
    pub d: BigUint,
    pub n: BigUint,
}

impl RsaKeyPair {
    pub fn public_key(&self) -> PublicKey {
        PublicKey { e: self.e.clone(), n: self.n.clone() }
    }

    pub fn private_key(&self) -> PrivateKey {
        PrivateKey { d: self.d.clone(), n: self.n.clone() }
    }

    #[doc(hidden)]
    pub fn get_p(&self) -> &BigUint {
        &self.p
    }

    #[doc(hidden)]
    pub fn get_q(&self) -> &BigUint {
        &self.q
    }

    /// φ(n) = (p-1)(q-1)
    pub fn phi(&self) -> BigUint {
        let one = BigUint::one();
        (&self.p - &one) * (&self.q - &one)
    }
}

/// Draws `count` probable primes of exactly `bits` bits from the OS CSPRNG.
///
/// Candidates get their top bit forced (exact length) and their low bit
/// forced (odd), then must survive [`DEFAULT_MR_ROUNDS`] Miller–Rabin rounds.
/// There is no attempt limit.
pub fn generate_primes(count: usize, bits: usize) -> Result<Vec<BigUint>, KeyGenError> {
    if bits < 2 {
        return Err(KeyGenError::PrimeTooSmall(bits));
    }

    let mut rng = OsRng;
    let test = MillerRabinTest;
    let bits = bits as u64;

    let primes = (0..count)
        .map(|_| loop {
            let mut candidate = rng.gen_biguint(bits);
            candidate.set_bit(bits - 1, true);
            candidate.set_bit(0, true);
            if test.is_probably_prime(&candidate, DEFAULT_MR_ROUNDS, &mut rng) {
                break candidate;
            }
        })
        .collect();

    Ok(primes)
}

/// Builds RSA key pairs with a fixed modulus size and public exponent.
pub struct RsaKeyGenerator {
    bit_length: usize,
    exponent: BigUint,
}

impl RsaKeyGenerator {
    pub fn new(bit_length: usize) -> Self {
        Self { bit_length, exponent: BigUint::from(DEFAULT_PUBLIC_EXPONENT) }
    }

    pub fn with_exponent(mut self, exponent: BigUint) -> Self {
        self.exponent = exponent;
        self
    }

    /// Generates `{e, d, n}`.
    ///
    /// `p` gets `bits/2` bits and `q` the remaining `bits - bits/2`, so an odd
    /// bit length yields primes one bit apart. Prime pairs whose φ shares a
    /// factor with `e` are thrown away and redrawn, up to
    /// [`MAX_KEYPAIR_ATTEMPTS`] times.
    pub fn generate_keypair(&self) -> Result<RsaKeyPair, KeyGenError> {
        if self.bit_length < 5 {
            return Err(KeyGenError::ModulusTooSmall(self.bit_length));
        }
        if self.exponent < BigUint::from(3u8) || !self.exponent.bit(0) {
            return Err(KeyGenError::InvalidExponent);
        }

        let p_bits = self.bit_length / 2;
        let q_bits = self.bit_length - p_bits;
        let one = BigUint::one();

        for _ in 0..MAX_KEYPAIR_ATTEMPTS {
            let p = generate_primes(1, p_bits)?.remove(0);
            let q = loop {
                let q = generate_primes(1, q_bits)?.remove(0);
                if q != p {
                    break q;
                }
            };

            let phi = (&p - &one) * (&q - &one);
            if !is_coprime(&self.exponent, &phi) {
                log::trace!("e shares a factor with phi(n), drawing new primes");
                continue;
            }

            let Some(d) = mod_inverse(&self.exponent, &phi) else {
                continue;
            };
            let n = &p * &q;
            log::debug!("generated private exponent of {} bits", d.bits());

            return Ok(RsaKeyPair { n, e: self.exponent.clone(), d, p, q });
        }

        log::warn!("e = {} divides every phi(n) drawn for {} bits", self.exponent, self.bit_length);
        Err(KeyGenError::ExponentNotCoprime(MAX_KEYPAIR_ATTEMPTS))
    }
}
