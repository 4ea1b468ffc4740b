use num_bigint::BigUint;
use num_traits::{FromPrimitive, Zero};
use rsa::attacks::{BruteForceAttack, FactorizationAttack, KnownPair, SearchRange, factor, known_pairs};
use rsa::number_theory::{carmichael_lambda, mod_pow};
use rsa::rsa::{PublicKey, RsaKeyGenerator};

fn big(v: u64) -> BigUint {
    BigUint::from_u64(v).unwrap()
}

/// p = 239, q = 233, e = 65537, d = 2049 (and 2049 < λ(n) = 27608).
fn small_key() -> (PublicKey, BigUint) {
    (PublicKey { e: big(65537), n: big(55_687) }, big(2049))
}

fn small_key_pairs() -> Vec<KnownPair> {
    let (public, _) = small_key();
    known_pairs(&[big(12_345), big(31_337), big(4_242)], &public)
}

#[test]
fn test_factor_small_semiprimes() {
    assert_eq!(factor(&big(33)), Some((big(3), big(11))));
    assert_eq!(factor(&big(35)), Some((big(5), big(7))));
    assert_eq!(factor(&big(4)), Some((big(2), big(2))));
    assert_eq!(factor(&big(55_687)), Some((big(233), big(239))));
}

#[test]
fn test_factor_perfect_squares() {
    assert_eq!(factor(&big(9)), Some((big(3), big(3))));
    assert_eq!(factor(&big(25)), Some((big(5), big(5))));
    assert_eq!(factor(&big(10_007 * 10_007)), Some((big(10_007), big(10_007))));
}

#[test]
fn test_factor_without_divisor() {
    assert_eq!(factor(&BigUint::zero()), None);
    assert_eq!(factor(&big(3)), None);
    assert_eq!(factor(&big(65_537)), None);
}

#[test]
fn test_factorization_attack_recovers_private_key() {
    let (public, d) = small_key();
    let result = FactorizationAttack::attack(&public.n, &public.e).expect("55687 = 233 * 239");

    assert_eq!(result.p, big(233));
    assert_eq!(result.q, big(239));
    assert_eq!(result.phi_n, big(232 * 238));
    assert_eq!(result.d, d);
}

#[test]
fn test_factorization_attack_on_generated_key() {
    let keypair = RsaKeyGenerator::new(36).generate_keypair().unwrap();
    let result = FactorizationAttack::attack(&keypair.n, &keypair.e).unwrap();

    assert_eq!(&result.p * &result.q, keypair.n);
    assert_eq!(result.phi_n, keypair.phi());
    assert_eq!(result.d, keypair.d);
}

#[test]
fn test_known_pairs_match_ciphertexts() {
    let pairs = small_key_pairs();
    let ciphertexts: Vec<BigUint> = pairs.iter().map(|p| p.ciphertext.clone()).collect();
    assert_eq!(ciphertexts, vec![big(19_197), big(45_582), big(18_014)]);
}

#[test]
fn test_known_pairs_reduce_oversized_plaintext() {
    let (public, d) = small_key();
    let pairs = known_pairs(&[big(55_687 + 10)], &public);
    assert_eq!(pairs[0].plaintext, big(10));
    assert_eq!(mod_pow(&pairs[0].ciphertext, &d, &public.n), big(10));
}

#[test]
fn test_partition_covers_space() {
    let ranges = SearchRange::partition(16, 3);
    assert_eq!(ranges.len(), 3);
    assert_eq!(ranges[0].begin, BigUint::zero());
    assert_eq!(ranges[2].end, big(1 << 16));
    for pair in ranges.windows(2) {
        assert_eq!(pair[0].end, pair[1].begin);
    }
    assert_eq!(ranges[0].len(), big(21_845));
    assert_eq!(ranges[2].len(), big(21_846));
}

#[test]
fn test_partition_more_parts_than_candidates() {
    let ranges = SearchRange::partition(1, 4);
    assert_eq!(ranges.len(), 4);
    assert!(ranges[..3].iter().all(SearchRange::is_empty));
    assert_eq!(ranges[3], SearchRange { begin: BigUint::zero(), end: big(2) });
}

#[test]
fn test_brute_force_single_worker_finds_true_d() {
    let (public, d) = small_key();
    let found = BruteForceAttack::new(1).attack(&public.n, 16, &small_key_pairs());
    assert_eq!(found, Some(d));
}

#[test]
fn test_brute_force_parallel_finds_equivalent_exponent() {
    let (public, d) = small_key();
    let pairs = small_key_pairs();
    let lambda = carmichael_lambda(&big(239), &big(233));

    let found = BruteForceAttack::new(4).attack(&public.n, 16, &pairs).expect("three valid exponents lie below 2^16");

    assert_eq!(&found % &lambda, &d % &lambda);
    assert!([big(2049), big(29_657), big(57_265)].contains(&found));
    for pair in &pairs {
        assert_eq!(mod_pow(&pair.ciphertext, &found, &public.n), pair.plaintext);
    }
}

#[test]
fn test_brute_force_bound_too_small() {
    let (public, _) = small_key();
    // every valid exponent is at least 2049 > 2^11
    assert_eq!(BruteForceAttack::new(2).attack(&public.n, 11, &small_key_pairs()), None);
}

#[test]
fn test_brute_force_requires_pairs() {
    assert_eq!(BruteForceAttack::new(2).attack(&big(55_687), 8, &[]), None);
}

#[test]
fn test_brute_force_on_generated_key() {
    let keypair = RsaKeyGenerator::new(16).generate_keypair().unwrap();
    let public = keypair.public_key();
    let blocks: Vec<BigUint> = [2u64, 3, 5, 7, 11].iter().map(|&v| big(v) % &keypair.n).collect();
    let pairs = known_pairs(&blocks, &public);

    let found = BruteForceAttack::default().attack(&keypair.n, 16, &pairs).expect("d < φ(n) < 2^16");

    for pair in &pairs {
        assert_eq!(mod_pow(&pair.ciphertext, &found, &keypair.n), pair.plaintext);
    }
}
