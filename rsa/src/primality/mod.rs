pub(crate) mod miller_rabin;
pub use miller_rabin::MillerRabinTest;

use num_bigint::BigUint;
use rand::RngCore;

/// Rounds used when generating key material. Each Miller–Rabin round lets a
/// composite through with probability at most 1/4, so 40 rounds bound the
/// error by 4^-40.
pub const DEFAULT_MR_ROUNDS: u32 = 40;

/// Probabilistic primality test built from a single randomized round.
pub trait PrimalityTest {
    /// Runs `rounds` independent iterations; `true` means "probably prime".
    fn is_probably_prime<R: RngCore + ?Sized>(&self, n: &BigUint, rounds: u32, rng: &mut R) -> bool {
        for _ in 0..rounds {
            if !self.run_iteration(n, rng) {
                return false;
            }
        }
        true
    }

    /// One witness round.
    fn run_iteration<R: RngCore + ?Sized>(&self, n: &BigUint, rng: &mut R) -> bool;
}
