//! Demonstrates how little a small RSA key protects: generate a key pair of
//! the requested size, then recover it either by factoring the modulus or by
//! searching the private exponent space against known plaintexts.

use num_bigint::BigUint;
use rand::Rng;
use rand::distributions::Alphanumeric;
use rsa::attacks::{BruteForceAttack, FactorizationAttack, FactorizationResult, KnownPair, SearchRange, known_pairs};
use rsa::codec::block_capacity;
use rsa::rsa::{KeyGenError, RsaKeyGenerator, RsaKeyPair};
use thiserror::Error;

pub const DEFAULT_PRIVATE_KEY_SIZE: usize = 30;
pub const DEFAULT_SAMPLE_LEN: usize = 100;

#[derive(Debug, Clone)]
pub struct AttackConfig {
    /// Search the exponent space instead of factoring `n`.
    pub bruteforce: bool,
    /// Modulus size in bits; the exponent search covers `[0, 2^size)`.
    pub private_key_size: usize,
    /// Length of the random known plaintext.
    pub sample_len: usize,
    /// Search workers. `None` uses one per available thread.
    pub workers: Option<usize>,
}

impl Default for AttackConfig {
    fn default() -> Self {
        Self {
            bruteforce: false,
            private_key_size: DEFAULT_PRIVATE_KEY_SIZE,
            sample_len: DEFAULT_SAMPLE_LEN,
            workers: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error(transparent)]
    KeyGen(#[from] KeyGenError),

    #[error("no prime factors found for n = {0}")]
    NoFactors(BigUint),

    #[error("no private exponent below 2^{0} decrypts the known pairs")]
    KeyNotFound(usize),
}

#[derive(Debug)]
pub enum AttackOutcome {
    Factored(FactorizationResult),
    BruteForced(BigUint),
}

impl AttackOutcome {
    /// The private exponent the attack recovered.
    pub fn private_exponent(&self) -> &BigUint {
        match self {
            AttackOutcome::Factored(result) => &result.d,
            AttackOutcome::BruteForced(d) => d,
        }
    }
}

/// Random alphanumeric text used as known plaintext.
pub fn random_sample(len: usize) -> String {
    rand::thread_rng().sample_iter(&Alphanumeric).take(len).map(char::from).collect()
}

pub struct AttackHarness {
    config: AttackConfig,
}

impl AttackHarness {
    pub fn new(config: AttackConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AttackConfig {
        &self.config
    }

    pub fn generate_keypair(&self) -> Result<RsaKeyPair, HarnessError> {
        let keypair = RsaKeyGenerator::new(self.config.private_key_size).generate_keypair()?;
        log::info!("Values of e, d, n: {} {} {}", keypair.e, keypair.d, keypair.n);
        if keypair.n <= block_capacity() {
            log::warn!("n = {} does not exceed the block capacity; known plaintexts are reduced mod n", keypair.n);
        }
        Ok(keypair)
    }

    /// Encrypts a fresh random sample under the key's public half.
    pub fn sample_pairs(&self, keypair: &RsaKeyPair) -> Vec<KnownPair> {
        let blocks = rsa::encode(&random_sample(self.config.sample_len));
        known_pairs(&blocks, &keypair.public_key())
    }

    /// Runs the configured attack against the public half of `keypair`.
    pub fn attack(&self, keypair: &RsaKeyPair) -> Result<AttackOutcome, HarnessError> {
        if self.config.bruteforce {
            let pairs = self.sample_pairs(keypair);
            self.brute_force(&keypair.n, &pairs).map(AttackOutcome::BruteForced)
        } else {
            self.factor(&keypair.n, &keypair.e).map(AttackOutcome::Factored)
        }
    }

    fn factor(&self, n: &BigUint, e: &BigUint) -> Result<FactorizationResult, HarnessError> {
        log::info!("Attempting to find factors of n. Pass --bruteforce to search for the private key instead.");
        let result = FactorizationAttack::attack(n, e).ok_or_else(|| HarnessError::NoFactors(n.clone()))?;
        log::info!("Found prime factors of n [p, q]: {}, {}", result.p, result.q);
        log::info!("p * q = {}", &result.p * &result.q);
        Ok(result)
    }

    /// Searches `[0, 2^private_key_size)` for an exponent that decrypts `pairs`.
    pub fn brute_force(&self, n: &BigUint, pairs: &[KnownPair]) -> Result<BigUint, HarnessError> {
        let bits = self.config.private_key_size;
        let attack = match self.config.workers {
            Some(workers) => BruteForceAttack::new(workers),
            None => BruteForceAttack::default(),
        };

        log::info!("Attempting bruteforce. Searching private key space up to 2^{}", bits);
        for range in SearchRange::partition(bits, attack.workers()) {
            log::info!("Worker range [{}, {})", range.begin, range.end);
        }

        let d = attack.attack(n, bits, pairs).ok_or(HarnessError::KeyNotFound(bits))?;
        log::info!("Found private key: {}", d);
        Ok(d)
    }

    /// Generates a key pair and attacks it.
    pub fn run(&self) -> Result<(RsaKeyPair, AttackOutcome), HarnessError> {
        let keypair = self.generate_keypair()?;
        let outcome = self.attack(&keypair)?;
        Ok((keypair, outcome))
    }
}
