use num_bigint::BigUint;
use num_traits::{FromPrimitive, One};
use rand::rngs::OsRng;
use rsa::attacks::factor;
use rsa::primality::{DEFAULT_MR_ROUNDS, MillerRabinTest, PrimalityTest};
use rsa::rsa::{KeyGenError, MAX_KEYPAIR_ATTEMPTS, RsaKeyGenerator, generate_primes};

#[test]
fn test_generate_primes_exact_bit_length() {
    let primes = generate_primes(4, 24).unwrap();
    assert_eq!(primes.len(), 4);
    for p in &primes {
        assert_eq!(p.bits(), 24);
        assert!(MillerRabinTest.is_probably_prime(p, DEFAULT_MR_ROUNDS, &mut OsRng));
    }
}

#[test]
fn test_generate_primes_rejects_one_bit() {
    assert_eq!(generate_primes(1, 1), Err(KeyGenError::PrimeTooSmall(1)));
}

#[test]
fn test_key_generation_basic() {
    let keypair = RsaKeyGenerator::new(64).generate_keypair().unwrap();

    assert_eq!(keypair.e, BigUint::from(65537u32));
    assert!(keypair.d.bits() > 1);
    // two 32-bit primes multiply to 63 or 64 bits
    assert!(keypair.n.bits() >= 63);
}

#[test]
fn test_key_generation_modinv_check() {
    let keypair = RsaKeyGenerator::new(64).generate_keypair().unwrap();

    let phi_n = (keypair.get_p() - 1u32) * (keypair.get_q() - 1u32);
    assert_eq!(phi_n, keypair.phi());
    assert_eq!((&keypair.e * &keypair.d) % &phi_n, BigUint::one());
}

#[test]
fn test_key_generation_prime_checks() {
    let keypair = RsaKeyGenerator::new(64).generate_keypair().unwrap();
    let test = MillerRabinTest;

    assert_ne!(keypair.get_p(), keypair.get_q());
    assert!(test.is_probably_prime(keypair.get_p(), DEFAULT_MR_ROUNDS, &mut OsRng));
    assert!(test.is_probably_prime(keypair.get_q(), DEFAULT_MR_ROUNDS, &mut OsRng));
    assert_eq!(keypair.get_p() * keypair.get_q(), keypair.n);
}

#[test]
fn test_modulus_has_exactly_two_prime_factors() {
    let keypair = RsaKeyGenerator::new(32).generate_keypair().unwrap();
    let (p, q) = factor(&keypair.n).expect("a semiprime has a factor below its root");
    let test = MillerRabinTest;

    assert_eq!(&p * &q, keypair.n);
    assert!(test.is_probably_prime(&p, DEFAULT_MR_ROUNDS, &mut OsRng));
    assert!(test.is_probably_prime(&q, DEFAULT_MR_ROUNDS, &mut OsRng));
    let mut expected = [keypair.get_p().clone(), keypair.get_q().clone()];
    expected.sort();
    assert_eq!([p, q], expected);
}

#[test]
fn test_odd_bit_length_splits_primes() {
    let keypair = RsaKeyGenerator::new(33).generate_keypair().unwrap();
    let mut lengths = [keypair.get_p().bits(), keypair.get_q().bits()];
    lengths.sort();
    assert_eq!(lengths, [16, 17]);
}

#[test]
fn test_tiny_modulus_still_distinct() {
    for _ in 0..10 {
        let keypair = RsaKeyGenerator::new(8).generate_keypair().unwrap();
        assert_ne!(keypair.get_p(), keypair.get_q());
        assert_eq!((&keypair.e * &keypair.d) % keypair.phi(), BigUint::one());
    }
}

#[test]
fn test_invalid_parameters() {
    assert_eq!(
        RsaKeyGenerator::new(4).generate_keypair().unwrap_err(),
        KeyGenError::ModulusTooSmall(4)
    );
    assert_eq!(
        RsaKeyGenerator::new(64)
            .with_exponent(BigUint::from_u32(4).unwrap())
            .generate_keypair()
            .unwrap_err(),
        KeyGenError::InvalidExponent
    );
}

#[test]
fn test_exponent_dividing_every_phi_gives_up() {
    // 6 bits leaves p, q in {5, 7}, so φ = 24 and 3 never has an inverse
    assert_eq!(
        RsaKeyGenerator::new(6)
            .with_exponent(BigUint::from_u32(3).unwrap())
            .generate_keypair()
            .unwrap_err(),
        KeyGenError::ExponentNotCoprime(MAX_KEYPAIR_ATTEMPTS)
    );
}

#[test]
fn test_custom_exponent() {
    let e = BigUint::from_u32(17).unwrap();
    let keypair = RsaKeyGenerator::new(48).with_exponent(e.clone()).generate_keypair().unwrap();
    assert_eq!(keypair.e, e);
    assert_eq!((&keypair.e * &keypair.d) % keypair.phi(), BigUint::one());
}

use quickcheck::quickcheck;

quickcheck! {
    fn prop_keygen_encrypt_decrypt_cycle(val: u64) -> bool {
        let keypair = RsaKeyGenerator::new(64).generate_keypair().unwrap();
        let m = BigUint::from(val) % &keypair.n;
        let c = m.modpow(&keypair.e, &keypair.n);
        c.modpow(&keypair.d, &keypair.n) == m
    }
}
