use crate::number_theory::mod_pow;
use crate::rsa::PublicKey;
use num_bigint::BigUint;
use num_traits::One;
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

/// A plaintext block and its ciphertext under the attacked key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnownPair {
    pub plaintext: BigUint,
    pub ciphertext: BigUint,
}

/// Encrypts `blocks` under `key` to build known pairs.
///
/// Plaintexts are reduced modulo `n` first; a block that does not fit below
/// the modulus could never be matched by any exponent.
pub fn known_pairs(blocks: &[BigUint], key: &PublicKey) -> Vec<KnownPair> {
    blocks
        .iter()
        .map(|block| {
            let plaintext = block % &key.n;
            let ciphertext = mod_pow(&plaintext, &key.e, &key.n);
            KnownPair { plaintext, ciphertext }
        })
        .collect()
}

/// Half-open interval `[begin, end)` of candidate exponents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRange {
    pub begin: BigUint,
    pub end: BigUint,
}

impl SearchRange {
    /// Splits `[0, 2^bits)` into `parts` contiguous ranges of equal size; the
    /// last one also takes whatever the division leaves over.
    pub fn partition(bits: usize, parts: usize) -> Vec<SearchRange> {
        let parts = parts.max(1);
        let max = BigUint::one() << bits;
        let chunk = &max / parts;

        (0..parts)
            .map(|i| {
                let begin = &chunk * i;
                let end = if i + 1 == parts { max.clone() } else { &chunk * (i + 1) };
                SearchRange { begin, end }
            })
            .collect()
    }

    pub fn len(&self) -> BigUint {
        if self.end > self.begin { &self.end - &self.begin } else { BigUint::default() }
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.begin
    }
}

/// State shared by every worker of one search.
struct Search<'a> {
    n: &'a BigUint,
    pairs: &'a [KnownPair],
    found: AtomicBool,
    winner: Mutex<Option<BigUint>>,
}

impl Search<'_> {
    fn decrypts_all(&self, candidate: &BigUint) -> bool {
        self.pairs
            .iter()
            .all(|pair| mod_pow(&pair.ciphertext, candidate, self.n) == pair.plaintext)
    }

    /// Scans `range` until it is exhausted or some worker has published a
    /// winner. Only the worker that flips `found` writes the winner cell.
    fn scan(&self, range: &SearchRange) {
        log::debug!("searching [{}, {})", range.begin, range.end);

        let mut candidate = range.begin.clone();
        while candidate < range.end {
            if self.found.load(Ordering::Acquire) {
                return;
            }

            if self.decrypts_all(&candidate) {
                if self
                    .found
                    .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                    .is_ok()
                {
                    log::info!("candidate {} decrypts every known pair", candidate);
                    let mut slot = self.winner.lock().unwrap_or_else(PoisonError::into_inner);
                    *slot = Some(candidate);
                }
                return;
            }

            candidate += 1u8;
        }

        log::debug!("exhausted [{}, {})", range.begin, range.end);
    }
}

/// Parallel exhaustive search for a private exponent.
pub struct BruteForceAttack {
    workers: usize,
}

impl Default for BruteForceAttack {
    fn default() -> Self {
        Self::new(rayon::current_num_threads())
    }
}

impl BruteForceAttack {
    pub fn new(workers: usize) -> Self {
        Self { workers: workers.max(1) }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Searches `[0, 2^bits)` for an exponent that decrypts every pair.
    ///
    /// The first worker to find one wins and the rest stop at their next
    /// candidate. Every exponent congruent to the real `d` modulo λ(n) passes,
    /// so with several workers any of those may be reported; a single worker
    /// always reports the smallest. `None` when the range holds no match or
    /// `pairs` is empty.
    pub fn attack(&self, n: &BigUint, bits: usize, pairs: &[KnownPair]) -> Option<BigUint> {
        if pairs.is_empty() {
            log::warn!("no known pairs given, every exponent would match");
            return None;
        }

        let ranges = SearchRange::partition(bits, self.workers);
        let search = Search {
            n,
            pairs,
            found: AtomicBool::new(false),
            winner: Mutex::new(None),
        };

        match rayon::ThreadPoolBuilder::new().num_threads(self.workers).build() {
            Ok(pool) => pool.install(|| ranges.par_iter().for_each(|range| search.scan(range))),
            Err(e) => {
                log::warn!("falling back to the global thread pool: {}", e);
                ranges.par_iter().for_each(|range| search.scan(range));
            }
        }

        search.winner.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}
