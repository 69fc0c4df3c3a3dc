//! End-to-end scenarios across the three schemes.

use crate::accumulator_only::AccumulatorOnly;
use crate::error::SignatureError;
use crate::keys::*;
use crate::large_universe::{LargeUniverse, LargeUniverseSignature};
use crate::small_universe::{SmallUniverse, SmallUniverseSignature};
use crate::universe::Universe;
use crate::RedactableSetSignature;
use ark_bls12_381::Bls12_381;
use rand::{rngs::StdRng, SeedableRng};
use std::collections::BTreeSet;

type Derler = AccumulatorOnly<Bls12_381>;

// Test keys use small RSA primes; production keys default to 2048 bits.
const TEST_PRIME_BITS: u64 = 256;

fn set(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|n| n.to_string()).collect()
}

fn large_keys(rng: &mut StdRng) -> (LargeUniverseSigningKey, LargeUniverseVerificationKey) {
    LargeUniverse::key_gen_with_prime_bits(rng, TEST_PRIME_BITS)
}

fn small_keys(
    rng: &mut StdRng,
    universe: &Universe,
) -> (SmallUniverseSigningKey, SmallUniverseVerificationKey) {
    SmallUniverse::key_gen_with_prime_bits(rng, universe, TEST_PRIME_BITS)
}

#[test]
fn large_universe_deep_policy() {
    let mut rng = StdRng::seed_from_u64(0u64);
    let (sk, vk) = large_keys(&mut rng);

    let full = set(&["a", "b", "c", "d"]);
    let policy = "(a and b) or (c and d)";
    let sig = LargeUniverse::sign(&mut rng, &sk, &full, Some(policy)).unwrap();
    assert!(LargeUniverse::verify(&vk, &sig, &full).unwrap());

    // Admissible redaction with a tightened policy
    let kept = set(&["a", "b"]);
    let redacted = LargeUniverse::redact(&vk, &full, &kept, &sig, Some("a and b"))
        .unwrap()
        .unwrap();
    assert!(LargeUniverse::verify(&vk, &redacted, &kept).unwrap());

    // {a, c} satisfies neither branch of the policy
    let cross = set(&["a", "c"]);
    assert!(LargeUniverse::redact(&vk, &full, &cross, &sig, Some("a or c"))
        .unwrap()
        .is_none());
}

#[test]
fn large_universe_redaction_keeps_policy_when_not_replaced() {
    let mut rng = StdRng::seed_from_u64(1u64);
    let (sk, vk) = large_keys(&mut rng);

    let full = set(&["a", "b", "c"]);
    let sig = LargeUniverse::sign(&mut rng, &sk, &full, Some("a and b")).unwrap();
    let kept = set(&["a", "b"]);
    let redacted = LargeUniverse::redact(&vk, &full, &kept, &sig, None)
        .unwrap()
        .unwrap();
    assert_eq!(redacted.policy, sig.policy);
    assert_eq!(redacted.accumulator, sig.accumulator);
    assert_eq!(redacted.ecdsa, sig.ecdsa);
    assert!(LargeUniverse::verify(&vk, &redacted, &kept).unwrap());
}

#[test]
fn large_universe_members_outside_policy_are_redactable() {
    let mut rng = StdRng::seed_from_u64(2u64);
    let (sk, vk) = large_keys(&mut rng);

    // d is not a policy atom; its record carries the empty share
    let full = set(&["a", "b", "d"]);
    let sig = LargeUniverse::sign(&mut rng, &sk, &full, Some("a and b")).unwrap();
    assert!(LargeUniverse::verify(&vk, &sig, &full).unwrap());

    let kept = set(&["a", "b"]);
    let redacted = LargeUniverse::redact(&vk, &full, &kept, &sig, None)
        .unwrap()
        .unwrap();
    assert!(LargeUniverse::verify(&vk, &redacted, &kept).unwrap());

    // The dropped member's witness is gone, so the original set no longer
    // verifies against the redacted signature
    assert!(!LargeUniverse::verify(&vk, &redacted, &full).unwrap());
}

#[test]
fn large_universe_replacement_policy_cannot_invent_shares() {
    // The redactor may substitute any policy the subset satisfies, but a
    // policy leaning on members that never held a share cannot recombine
    // the bound secret, so verification degrades to false.
    let mut rng = StdRng::seed_from_u64(30u64);
    let (sk, vk) = large_keys(&mut rng);

    let full = set(&["a", "b", "d"]);
    let sig = LargeUniverse::sign(&mut rng, &sk, &full, Some("a and b")).unwrap();

    // d is a member but not an atom of the signed policy
    let redacted = LargeUniverse::redact(&vk, &full, &full, &sig, Some("d"))
        .unwrap()
        .unwrap();
    assert!(!LargeUniverse::verify(&vk, &redacted, &full).unwrap());
}

#[test]
fn large_universe_policy_unsatisfied_at_verify() {
    let mut rng = StdRng::seed_from_u64(3u64);
    let (sk, vk) = large_keys(&mut rng);

    let full = set(&["a", "c"]);
    let sig = LargeUniverse::sign(&mut rng, &sk, &full, Some("a and b")).unwrap();
    // Every member has a witness, but the policy is not satisfied
    assert!(!LargeUniverse::verify(&vk, &sig, &full).unwrap());
}

#[test]
fn large_universe_non_subset_redaction() {
    let mut rng = StdRng::seed_from_u64(4u64);
    let (sk, vk) = large_keys(&mut rng);

    let full = set(&["a", "b"]);
    let sig = LargeUniverse::sign(&mut rng, &sk, &full, Some("a or b")).unwrap();
    let not_a_subset = set(&["a", "z"]);
    assert!(
        LargeUniverse::redact(&vk, &full, &not_a_subset, &sig, Some("a"))
            .unwrap()
            .is_none()
    );
}

#[test]
fn large_universe_sign_requires_a_policy() {
    let mut rng = StdRng::seed_from_u64(5u64);
    let (sk, _) = large_keys(&mut rng);
    let members = set(&["a"]);
    assert!(matches!(
        LargeUniverse::sign(&mut rng, &sk, &members, None),
        Err(SignatureError::PolicyRequired)
    ));
    assert!(matches!(
        LargeUniverse::sign(&mut rng, &sk, &members, Some("")),
        Err(SignatureError::PolicyRequired)
    ));
}

#[test]
fn large_universe_sign_rejects_malformed_policies() {
    let mut rng = StdRng::seed_from_u64(6u64);
    let (sk, _) = large_keys(&mut rng);
    let members = set(&["a"]);
    assert!(matches!(
        LargeUniverse::sign(&mut rng, &sk, &members, Some("a and")),
        Err(SignatureError::Policy(_))
    ));
}

#[test]
fn large_universe_tamper_rejection() {
    let mut rng = StdRng::seed_from_u64(7u64);
    let (sk, vk) = large_keys(&mut rng);

    let full = set(&["a", "b"]);
    let mut sig = LargeUniverse::sign(&mut rng, &sk, &full, Some("a and b")).unwrap();
    sig.ecdsa[0] ^= 0x01;
    // Flipping a byte of the ECDSA component must yield false, not an error
    assert!(!LargeUniverse::verify(&vk, &sig, &full).unwrap());
}

#[test]
fn large_universe_der_round_trip() {
    let mut rng = StdRng::seed_from_u64(8u64);
    let (sk, vk) = large_keys(&mut rng);

    let full = set(&["a", "b", "d"]);
    let sig = LargeUniverse::sign(&mut rng, &sk, &full, Some("(a and b) or c")).unwrap();
    let decoded = LargeUniverseSignature::from_der(&sig.to_der()).unwrap();
    assert_eq!(decoded, sig);
    assert!(LargeUniverse::verify(&vk, &decoded, &full).unwrap());

    let sk_decoded = LargeUniverseSigningKey::from_der(&sk.to_der().unwrap()).unwrap();
    assert_eq!(sk_decoded, sk);
    let vk_decoded = LargeUniverseVerificationKey::from_der(&vk.to_der().unwrap()).unwrap();
    assert_eq!(vk_decoded, vk);
}

fn hello_universe() -> Universe {
    Universe::from_members(["hello", "good", "fun", "dog", "cat"])
}

#[test]
fn small_universe_bit_string_policy() {
    let mut rng = StdRng::seed_from_u64(10u64);
    let universe = hello_universe();
    let (sk, vk) = small_keys(&mut rng, &universe);

    let full = set(&["hello", "good", "fun", "dog", "cat"]);
    let policy = "11111, 11000, 00111";
    let sig = SmallUniverse::sign(&mut rng, &sk, &full, Some(policy)).unwrap();
    assert!(SmallUniverse::verify(&vk, &sig, &full).unwrap());

    // Redact to {hello, good}, characteristic 11000
    let kept = set(&["hello", "good"]);
    let redacted = SmallUniverse::redact(&vk, &full, &kept, &sig, Some("11000"))
        .unwrap()
        .unwrap();
    assert!(SmallUniverse::verify(&vk, &redacted, &kept).unwrap());
    assert_eq!(redacted.accumulator, sig.accumulator);
    assert_eq!(redacted.ecdsa, sig.ecdsa);
    // 11111 and 00111 are not dominated by 11000 and must be gone
    assert_eq!(redacted.witnesses.len(), 1);
    assert!(redacted.witnesses.contains_key("11000"));

    // {hello, cat} has characteristic 10001, which the policy does not list
    let cross = set(&["hello", "cat"]);
    assert!(SmallUniverse::redact(&vk, &full, &cross, &sig, Some("10001"))
        .unwrap()
        .is_none());
}

#[test]
fn small_universe_sign_preconditions() {
    let mut rng = StdRng::seed_from_u64(11u64);
    let universe = hello_universe();
    let (sk, _) = small_keys(&mut rng, &universe);

    // Out-of-universe member
    let stray = set(&["hello", "bird"]);
    assert!(matches!(
        SmallUniverse::sign(&mut rng, &sk, &stray, Some("11000")),
        Err(SignatureError::SetNotInUniverse)
    ));

    // Policy does not list the set's characteristic
    let members = set(&["hello", "good"]);
    assert!(matches!(
        SmallUniverse::sign(&mut rng, &sk, &members, Some("11111")),
        Err(SignatureError::PolicyUnsatisfied)
    ));

    // Characteristic strings must be bit strings of universe length
    assert!(matches!(
        SmallUniverse::sign(&mut rng, &sk, &members, Some("110")),
        Err(SignatureError::MalformedCharacteristicSequence(_))
    ));
    assert!(matches!(
        SmallUniverse::sign(&mut rng, &sk, &members, Some("11002")),
        Err(SignatureError::MalformedCharacteristicSequence(_))
    ));
}

#[test]
fn small_universe_tamper_rejection_and_der_round_trip() {
    let mut rng = StdRng::seed_from_u64(12u64);
    let universe = hello_universe();
    let (sk, vk) = small_keys(&mut rng, &universe);

    let members = set(&["hello", "good"]);
    let sig = SmallUniverse::sign(&mut rng, &sk, &members, Some("11000, 10000")).unwrap();

    let decoded = SmallUniverseSignature::from_der(&sig.to_der()).unwrap();
    assert_eq!(decoded, sig);
    assert!(SmallUniverse::verify(&vk, &decoded, &members).unwrap());

    let sk_decoded =
        SmallUniverseSigningKey::from_der(&sk.to_der().unwrap(), universe.clone()).unwrap();
    assert_eq!(sk_decoded, sk);
    let vk_decoded =
        SmallUniverseVerificationKey::from_der(&vk.to_der().unwrap(), universe).unwrap();
    assert_eq!(vk_decoded, vk);

    let mut tampered = sig;
    tampered.ecdsa[0] ^= 0x01;
    assert!(!SmallUniverse::verify(&vk, &tampered, &members).unwrap());
}

#[test]
fn accumulator_only_scheme() {
    let mut rng = StdRng::seed_from_u64(20u64);
    let (sk, vk) = Derler::key_gen(&mut rng, None).unwrap();

    let full = set(&["alpha", "beta", "gamma"]);
    let sig = Derler::sign(&mut rng, &sk, &full, None).unwrap();
    assert!(Derler::verify(&vk, &sig, &full).unwrap());

    // Redact to {alpha}
    let kept = set(&["alpha"]);
    let redacted = Derler::redact(&vk, &full, &kept, &sig, None)
        .unwrap()
        .unwrap();
    assert!(Derler::verify(&vk, &redacted, &kept).unwrap());

    // beta's witness is gone, so {alpha, beta} must be rejected
    let stale = set(&["alpha", "beta"]);
    assert!(!Derler::verify(&vk, &redacted, &stale).unwrap());

    // Non-subset redaction
    let not_a_subset = set(&["alpha", "delta"]);
    assert!(Derler::redact(&vk, &full, &not_a_subset, &sig, None)
        .unwrap()
        .is_none());

    // A policy is refused
    assert!(matches!(
        Derler::sign(&mut rng, &sk, &full, Some("alpha and beta")),
        Err(SignatureError::PolicyNotSupported)
    ));
}

#[test]
fn accumulator_only_tamper_rejection_and_der_round_trip() {
    let mut rng = StdRng::seed_from_u64(21u64);
    let (sk, vk) = Derler::key_gen(&mut rng, None).unwrap();

    let members = set(&["alpha", "beta"]);
    let sig = Derler::sign(&mut rng, &sk, &members, None).unwrap();

    let decoded = crate::accumulator_only::AccumulatorOnlySignature::<Bls12_381>::from_der(
        &sig.to_der().unwrap(),
    )
    .unwrap();
    assert_eq!(decoded, sig);
    assert!(Derler::verify(&vk, &decoded, &members).unwrap());

    let sk_decoded =
        AccumulatorOnlySigningKey::<Bls12_381>::from_der(&sk.to_der().unwrap()).unwrap();
    assert_eq!(sk_decoded, sk);
    let vk_decoded =
        AccumulatorOnlyVerificationKey::<Bls12_381>::from_der(&vk.to_der().unwrap()).unwrap();
    assert_eq!(vk_decoded, vk);

    let mut tampered = sig;
    tampered.ecdsa[0] ^= 0x01;
    assert!(!Derler::verify(&vk, &tampered, &members).unwrap());
}
