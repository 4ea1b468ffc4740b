use crate::number_theory::mod_inverse;
use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, Zero};

/// Factors recovered from a modulus and the private exponent they imply.
#[derive(Debug)]
pub struct FactorizationResult {
    pub p: BigUint,
    pub q: BigUint,
    pub phi_n: BigUint,
    pub d: BigUint,
}

/// Splits `n` into `(p, q)` by trial division, smallest factor first.
///
/// Even `n` gives `(2, n/2)`. Otherwise every odd `i` with `i*i <= n` is
/// tried. `None` when `n < 4` or `n` has no such divisor, i.e. `n` is prime.
/// Cost grows with `sqrt(n)`, so this is only practical for small moduli.
pub fn factor(n: &BigUint) -> Option<(BigUint, BigUint)> {
    let two = BigUint::from(2u8);
    if *n < BigUint::from(4u8) {
        return None;
    }
    if n.is_even() {
        return Some((two.clone(), n / &two));
    }

    let root = n.sqrt();
    let mut i = BigUint::from(3u8);
    while i <= root {
        let (quotient, remainder) = n.div_rem(&i);
        if remainder.is_zero() {
            return Some((i, quotient));
        }
        i += 2u8;
    }
    None
}

/// Recovers the private key of `(n, e)` by factoring `n`.
pub struct FactorizationAttack;

impl FactorizationAttack {
    pub fn attack(n: &BigUint, e: &BigUint) -> Option<FactorizationResult> {
        log::info!("trial dividing a {}-bit modulus", n.bits());
        let (p, q) = factor(n)?;

        let one = BigUint::one();
        let phi_n = (&p - &one) * (&q - &one);
        let d = mod_inverse(e, &phi_n)?;

        Some(FactorizationResult { p, q, phi_n, d })
    }
}
