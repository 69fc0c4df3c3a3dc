//! The small-universe scheme. The member universe is fixed at key
//! generation and the policy is a comma-separated list of characteristic
//! bit strings, one per acceptable subset. Signing accumulates the listed
//! characteristic strings in the RSA accumulator and signs the accumulator
//! value under ECDSA; a set verifies when its own characteristic string
//! holds a valid witness.
//!
//! Redaction keeps exactly the witnesses whose characteristic strings are
//! bitwise dominated by the subset's: `(c' OR k) == c'`. Anything else
//! could not be reached by removing further members.

use crate::ecdsa;
use crate::error::SignatureError;
use crate::keys::{SmallUniverseSigningKey, SmallUniverseVerificationKey};
use crate::universe::Universe;
use crate::RedactableSetSignature;
use membership_accumulator::rsa::{RsaAccumulator, RsaKeypair};
use num_bigint::BigUint;
use rand::RngCore;
use rss_crypto_utils::der;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmallUniverseSignature {
    pub accumulator: BigUint,
    pub policy: String,
    pub ecdsa: Vec<u8>,
    pub witnesses: BTreeMap<String, BigUint>,
}

/// Bitwise OR of two characteristic strings; `None` on length mismatch
fn or_char_seq(a: &str, b: &str) -> Option<String> {
    if a.len() != b.len() {
        return None;
    }
    Some(
        a.chars()
            .zip(b.chars())
            .map(|(x, y)| if x == '0' && y == '0' { '0' } else { '1' })
            .collect(),
    )
}

/// Split the policy text into its characteristic strings and check each is
/// a bit string of universe length
fn parse_policy(policy: &str, universe: &Universe) -> Result<BTreeSet<String>, SignatureError> {
    let mut entries = BTreeSet::new();
    for entry in policy.split(',') {
        let entry = entry.trim();
        if entry.len() != universe.len() || !entry.chars().all(|c| c == '0' || c == '1') {
            return Err(SignatureError::MalformedCharacteristicSequence(
                entry.to_string(),
            ));
        }
        entries.insert(entry.to_string());
    }
    Ok(entries)
}

pub struct SmallUniverse;

impl SmallUniverse {
    /// Key generation with a caller-chosen RSA prime size. The trait entry
    /// point uses the default size; tests use smaller primes.
    pub fn key_gen_with_prime_bits<R: RngCore>(
        rng: &mut R,
        universe: &Universe,
        bits: u64,
    ) -> (SmallUniverseSigningKey, SmallUniverseVerificationKey) {
        let rsa = RsaKeypair::generate_with_prime_bits(rng, bits);
        let ec = ecdsa::EcdsaKeypair::generate(rng);
        (
            SmallUniverseSigningKey {
                accumulator_key: rsa.secret_key,
                ec_key: ec.signing_key,
                universe: universe.clone(),
            },
            SmallUniverseVerificationKey {
                accumulator_key: rsa.public_key,
                ec_key: ec.verification_key,
                universe: universe.clone(),
            },
        )
    }
}

impl RedactableSetSignature for SmallUniverse {
    type SigningKey = SmallUniverseSigningKey;
    type VerificationKey = SmallUniverseVerificationKey;
    type Signature = SmallUniverseSignature;

    fn key_gen<R: RngCore>(
        rng: &mut R,
        universe: Option<&Universe>,
    ) -> Result<(Self::SigningKey, Self::VerificationKey), SignatureError> {
        let universe = universe.ok_or(SignatureError::UniverseRequired)?;
        Ok(Self::key_gen_with_prime_bits(
            rng,
            universe,
            membership_accumulator::rsa::DEFAULT_PRIME_BITS,
        ))
    }

    fn sign<R: RngCore>(
        rng: &mut R,
        sk: &Self::SigningKey,
        set: &BTreeSet<String>,
        policy: Option<&str>,
    ) -> Result<Self::Signature, SignatureError> {
        let policy_text = match policy {
            Some(p) if !p.is_empty() => p,
            _ => return Err(SignatureError::PolicyRequired),
        };
        let entries = parse_policy(policy_text, &sk.universe)?;

        let current = sk
            .universe
            .characteristic_sequence(set)
            .ok_or(SignatureError::SetNotInUniverse)?;
        if !entries.contains(&current) {
            return Err(SignatureError::PolicyUnsatisfied);
        }

        let (accumulator, aux) = RsaAccumulator::eval::<Sha256, _>(
            entries.iter().map(|entry| entry.as_bytes()),
            &sk.accumulator_key,
        );
        let mut witnesses = BTreeMap::new();
        for entry in entries {
            let witness = RsaAccumulator::membership_witness::<Sha256>(
                entry.as_bytes(),
                &sk.accumulator_key,
                &aux,
            )?;
            witnesses.insert(entry, witness);
        }

        let message = der::signed_bytes_be(accumulator.value());
        let signature = ecdsa::Signature::new(rng, &message, &sk.ec_key);

        Ok(SmallUniverseSignature {
            accumulator: accumulator.0,
            policy: policy_text.to_string(),
            ecdsa: signature.to_bytes()?,
            witnesses,
        })
    }

    fn redact(
        vk: &Self::VerificationKey,
        set: &BTreeSet<String>,
        subset: &BTreeSet<String>,
        sig: &Self::Signature,
        policy: Option<&str>,
    ) -> Result<Option<Self::Signature>, SignatureError> {
        if !subset.is_subset(set) {
            return Ok(None);
        }
        let Some(current) = vk.universe.characteristic_sequence(subset) else {
            return Ok(None);
        };
        if !sig.witnesses.contains_key(&current) {
            return Ok(None);
        }

        // Keep witnesses whose one-bits are a subset of the new
        // characteristic string's
        let witnesses: BTreeMap<String, BigUint> = sig
            .witnesses
            .iter()
            .filter(|(key, _)| or_char_seq(&current, key).as_deref() == Some(current.as_str()))
            .map(|(key, witness)| (key.clone(), witness.clone()))
            .collect();

        let policy_text = match policy {
            Some(p) => p.to_string(),
            None => sig.policy.clone(),
        };

        Ok(Some(SmallUniverseSignature {
            accumulator: sig.accumulator.clone(),
            policy: policy_text,
            ecdsa: sig.ecdsa.clone(),
            witnesses,
        }))
    }

    fn verify(
        vk: &Self::VerificationKey,
        sig: &Self::Signature,
        set: &BTreeSet<String>,
    ) -> Result<bool, SignatureError> {
        let Some(current) = vk.universe.characteristic_sequence(set) else {
            return Ok(false);
        };
        let Some(witness) = sig.witnesses.get(&current) else {
            return Ok(false);
        };
        let accumulator = RsaAccumulator(sig.accumulator.clone());
        if !accumulator.verify_membership::<Sha256>(
            current.as_bytes(),
            witness,
            &vk.accumulator_key,
        ) {
            return Ok(false);
        }

        let message = der::signed_bytes_be(&sig.accumulator);
        let Ok(signature) = ecdsa::Signature::from_bytes(&sig.ecdsa) else {
            return Ok(false);
        };
        Ok(signature.verify(&message, &vk.ec_key))
    }
}

impl SmallUniverseSignature {
    pub fn to_der(&self) -> Vec<u8> {
        let records: Vec<Vec<u8>> = self
            .witnesses
            .iter()
            .map(|(key, witness)| {
                der::encode_sequence(&[
                    der::encode_utf8_string(key),
                    der::encode_octet_string(&der::signed_bytes_be(witness)),
                ])
            })
            .collect();
        der::encode_sequence(&[
            der::encode_octet_string(&der::signed_bytes_be(&self.accumulator)),
            der::encode_utf8_string(&self.policy),
            der::encode_octet_string(&self.ecdsa),
            der::encode_sequence(&records),
        ])
    }

    pub fn from_der(input: &[u8]) -> Result<Self, SignatureError> {
        let parts = der::decode_sequence(input)?;
        if parts.len() != 4 {
            return Err(SignatureError::MalformedEncoding(
                "small-universe signature needs four components",
            ));
        }
        let mut witnesses = BTreeMap::new();
        for record in der::decode_sequence(parts[3])? {
            let fields = der::decode_sequence(record)?;
            if fields.len() != 2 {
                return Err(SignatureError::MalformedEncoding(
                    "witness record needs characteristic string and witness",
                ));
            }
            witnesses.insert(
                der::decode_utf8_string(fields[0])?,
                der::biguint_from_signed_bytes_be(&der::decode_octet_string(fields[1])?)?,
            );
        }
        Ok(Self {
            accumulator: der::biguint_from_signed_bytes_be(&der::decode_octet_string(parts[0])?)?,
            policy: der::decode_utf8_string(parts[1])?,
            ecdsa: der::decode_octet_string(parts[2])?,
            witnesses,
        })
    }
}
