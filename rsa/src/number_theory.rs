use num_bigint::{BigInt, BigUint, Sign};
use num_traits::{One, Zero};

/// Euclid's algorithm on non-negative integers.
pub fn gcd(a: &BigUint, b: &BigUint) -> BigUint {
    let mut a = a.clone();
    let mut b = b.clone();
    while !b.is_zero() {
        let r = &a % &b;
        a = b;
        b = r;
    }
    a
}

/// `true` iff the final non-zero remainder of Euclid's algorithm is 1.
pub fn is_coprime(a: &BigUint, b: &BigUint) -> bool {
    gcd(a, b).is_one()
}

/// Returns `(g, x, y)` with `a*x + b*y = g = gcd(a, b)`.
pub fn extended_gcd(a: &BigInt, b: &BigInt) -> (BigInt, BigInt, BigInt) {
    let (mut old_r, mut r) = (a.clone(), b.clone());
    let (mut old_s, mut s) = (BigInt::one(), BigInt::zero());
    let (mut old_t, mut t) = (BigInt::zero(), BigInt::one());

    while !r.is_zero() {
        let q = &old_r / &r;

        let next_r = &old_r - &q * &r;
        old_r = std::mem::replace(&mut r, next_r);

        let next_s = &old_s - &q * &s;
        old_s = std::mem::replace(&mut s, next_s);

        let next_t = &old_t - &q * &t;
        old_t = std::mem::replace(&mut t, next_t);
    }

    (old_r, old_s, old_t)
}

/// Inverse of `a` modulo `m`, or `None` when `gcd(a, m) != 1`.
pub fn mod_inverse(a: &BigUint, m: &BigUint) -> Option<BigUint> {
    if m.is_zero() {
        return None;
    }
    let a = BigInt::from_biguint(Sign::Plus, a.clone());
    let m = BigInt::from_biguint(Sign::Plus, m.clone());
    let (g, x, _) = extended_gcd(&a, &m);
    if !g.is_one() {
        return None;
    }
    // x may be negative; fold it back into [0, m)
    ((x % &m) + &m).to_biguint().map(|v| v % m.magnitude())
}

/// `base^exponent mod modulus`; a zero modulus yields zero.
pub fn mod_pow(base: &BigUint, exponent: &BigUint, modulus: &BigUint) -> BigUint {
    if modulus.is_zero() {
        return BigUint::zero();
    }
    base.modpow(exponent, modulus)
}

/// Carmichael's function for `n = p*q` with distinct primes: `lcm(p-1, q-1)`.
pub fn carmichael_lambda(p: &BigUint, q: &BigUint) -> BigUint {
    let one = BigUint::one();
    let a = p - &one;
    let b = q - &one;
    let g = gcd(&a, &b);
    (&a / g) * b
}
