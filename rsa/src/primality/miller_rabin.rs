use crate::number_theory::mod_pow;
use crate::primality::PrimalityTest;
use num_bigint::{BigUint, RandBigInt};
use num_integer::Integer;
use num_traits::{One, Zero};
use rand::RngCore;

const SMALL_PRIMES: [u32; 15] = [3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53];

/// Miller–Rabin with uniformly drawn witnesses in `[2, n-2]`.
pub struct MillerRabinTest;

impl MillerRabinTest {
    /// Cheap trial division by small odd primes. `Some(verdict)` when it
    /// settles the question, `None` when a full test is still needed.
    fn small_prime_verdict(n: &BigUint) -> Option<bool> {
        let two = BigUint::from(2u8);
        if *n < two {
            return Some(false);
        }
        if *n == two {
            return Some(true);
        }
        if n.is_even() {
            return Some(false);
        }
        for &p in SMALL_PRIMES.iter() {
            let p = BigUint::from(p);
            if *n == p {
                return Some(true);
            }
            if (n % &p).is_zero() {
                return Some(false);
            }
        }
        None
    }
}

impl PrimalityTest for MillerRabinTest {
    fn is_probably_prime<R: RngCore + ?Sized>(&self, n: &BigUint, rounds: u32, rng: &mut R) -> bool {
        if let Some(verdict) = Self::small_prime_verdict(n) {
            return verdict;
        }
        for _ in 0..rounds {
            if !self.run_iteration(n, rng) {
                return false;
            }
        }
        true
    }

    /// One witness round. Trial division is left to `is_probably_prime`;
    /// only inputs too small to draw a witness for are settled here.
    fn run_iteration<R: RngCore + ?Sized>(&self, n: &BigUint, rng: &mut R) -> bool {
        if *n < BigUint::from(5u8) || n.is_even() {
            return Self::small_prime_verdict(n).unwrap_or(false);
        }

        let one = BigUint::one();
        let two = BigUint::from(2u8);
        let n_minus_one = n - &one;

        // n - 1 = d * 2^s with d odd
        let mut d = n_minus_one.clone();
        let mut s = 0u32;
        while d.is_even() {
            d >>= 1;
            s += 1;
        }

        let a = rng.gen_biguint_range(&two, &n_minus_one);
        let mut x = mod_pow(&a, &d, n);
        if x == one || x == n_minus_one {
            return true;
        }

        for _ in 1..s {
            x = mod_pow(&x, &two, n);
            if x == n_minus_one {
                return true;
            }
            if x == one {
                return false;
            }
        }

        false
    }
}
