//! The large-universe scheme. Members are arbitrary strings and the policy
//! is an `and`/`or` formula over them.
//!
//! Signing deals shares of a fresh secret to the policy's atoms, then
//! accumulates each member in its annotated form `member:(x, y)` (the
//! member's share pair, or `(0, 0)` when the member is not a policy atom)
//! in the RSA accumulator, and finally signs the accumulator value
//! concatenated with the recombined secret under ECDSA. The signature
//! stores one structured record `(share, witness)` per member; the
//! annotated text is derived from the record whenever the accumulator is
//! consulted, so the textual form never has to round-trip.
//!
//! Redaction drops the records of removed members and may substitute a
//! tighter policy. The substituted policy is checked against the subset
//! but its implication by the signed policy is the redactor's obligation;
//! verifiers that care must check the tightening themselves.

use crate::ecdsa;
use crate::error::SignatureError;
use crate::keys::{LargeUniverseSigningKey, LargeUniverseVerificationKey};
use crate::universe::Universe;
use crate::RedactableSetSignature;
use membership_accumulator::rsa::{RsaAccumulator, RsaKeypair};
use num_bigint::BigUint;
use policy_lang::{Policy, PolicyShare};
use rand::RngCore;
use rss_crypto_utils::der;
use secret_sharing::PrimeField;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::collections::{BTreeMap, BTreeSet};

/// Per-member payload of a signature: the member's policy share, or the
/// empty share `(0, 0)` for members outside the policy, and the RSA
/// witness of the annotated member.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRecord {
    pub share: PolicyShare,
    pub witness: BigUint,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LargeUniverseSignature {
    pub accumulator: BigUint,
    pub policy: String,
    pub ecdsa: Vec<u8>,
    pub members: BTreeMap<String, MemberRecord>,
}

/// The accumulated form of a member: `member:(x, y)` with decimal share
/// coordinates
fn annotated_member(member: &str, share: &PolicyShare) -> String {
    format!("{}:({}, {})", member, share.x, share.y)
}

/// ECDSA input: accumulator bytes followed by secret bytes, both in
/// minimal two's-complement form
fn binding_message(accumulator: &BigUint, secret: &BigUint) -> Vec<u8> {
    let mut message = der::signed_bytes_be(accumulator);
    message.extend_from_slice(&der::signed_bytes_be(secret));
    message
}

pub struct LargeUniverse;

impl LargeUniverse {
    /// Key generation with a caller-chosen RSA prime size. The trait entry
    /// point uses the default size; tests use smaller primes.
    pub fn key_gen_with_prime_bits<R: RngCore>(
        rng: &mut R,
        bits: u64,
    ) -> (LargeUniverseSigningKey, LargeUniverseVerificationKey) {
        let rsa = RsaKeypair::generate_with_prime_bits(rng, bits);
        let ec = ecdsa::EcdsaKeypair::generate(rng);
        (
            LargeUniverseSigningKey {
                accumulator_key: rsa.secret_key,
                ec_key: ec.signing_key,
            },
            LargeUniverseVerificationKey {
                accumulator_key: rsa.public_key,
                ec_key: ec.verification_key,
            },
        )
    }
}

impl RedactableSetSignature for LargeUniverse {
    type SigningKey = LargeUniverseSigningKey;
    type VerificationKey = LargeUniverseVerificationKey;
    type Signature = LargeUniverseSignature;

    /// The universe is ignored by this construction
    fn key_gen<R: RngCore>(
        rng: &mut R,
        _universe: Option<&Universe>,
    ) -> Result<(Self::SigningKey, Self::VerificationKey), SignatureError> {
        Ok(Self::key_gen_with_prime_bits(
            rng,
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
        let policy = Policy::parse(policy_text)?;

        // Shares for every policy atom, and the secret they recombine to
        let field = PrimeField::ffdhe2048();
        let shares = policy.deal_shares(rng, &field)?;
        let secret = policy
            .reconstruct(&shares, &field)
            .ok_or(SignatureError::SecretReconstruction)?;

        // Accumulate members in annotated form
        let annotated: BTreeMap<&String, (PolicyShare, String)> = set
            .iter()
            .map(|member| {
                let share = shares
                    .get(member)
                    .cloned()
                    .unwrap_or_else(PolicyShare::empty);
                let text = annotated_member(member, &share);
                (member, (share, text))
            })
            .collect();
        let (accumulator, aux) = RsaAccumulator::eval::<Sha256, _>(
            annotated.values().map(|(_, text)| text.as_bytes()),
            &sk.accumulator_key,
        );

        let mut members = BTreeMap::new();
        for (member, (share, text)) in annotated {
            let witness = RsaAccumulator::membership_witness::<Sha256>(
                text.as_bytes(),
                &sk.accumulator_key,
                &aux,
            )?;
            members.insert(member.clone(), MemberRecord { share, witness });
        }

        let message = binding_message(accumulator.value(), &secret);
        let signature = ecdsa::Signature::new(rng, &message, &sk.ec_key);

        Ok(LargeUniverseSignature {
            accumulator: accumulator.0,
            policy: policy_text.to_string(),
            ecdsa: signature.to_bytes()?,
            members,
        })
    }

    fn redact(
        _vk: &Self::VerificationKey,
        set: &BTreeSet<String>,
        subset: &BTreeSet<String>,
        sig: &Self::Signature,
        policy: Option<&str>,
    ) -> Result<Option<Self::Signature>, SignatureError> {
        if !subset.is_subset(set) {
            return Ok(None);
        }
        let existing = Policy::parse(&sig.policy)?;
        if !existing.is_satisfied_by(subset) {
            return Ok(None);
        }
        let policy_text = match policy {
            Some(p) => {
                let replacement = Policy::parse(p)?;
                if !replacement.is_satisfied_by(subset) {
                    return Ok(None);
                }
                p.to_string()
            }
            None => sig.policy.clone(),
        };

        let mut members = sig.members.clone();
        for member in set {
            if !subset.contains(member) {
                members.remove(member);
            }
        }

        Ok(Some(LargeUniverseSignature {
            accumulator: sig.accumulator.clone(),
            policy: policy_text,
            ecdsa: sig.ecdsa.clone(),
            members,
        }))
    }

    fn verify(
        vk: &Self::VerificationKey,
        sig: &Self::Signature,
        set: &BTreeSet<String>,
    ) -> Result<bool, SignatureError> {
        let policy = Policy::parse(&sig.policy)?;
        let accumulator = RsaAccumulator(sig.accumulator.clone());

        // Every set member needs a record whose annotated form the
        // accumulator accepts
        for member in set {
            let Some(record) = sig.members.get(member) else {
                return Ok(false);
            };
            let text = annotated_member(member, &record.share);
            if !accumulator.verify_membership::<Sha256>(
                text.as_bytes(),
                &record.witness,
                &vk.accumulator_key,
            ) {
                return Ok(false);
            }
        }

        if !policy.is_satisfied_by(set) {
            return Ok(false);
        }

        // Recombine the bound secret from the non-empty shares
        let field = PrimeField::ffdhe2048();
        let share_env: BTreeMap<String, PolicyShare> = sig
            .members
            .iter()
            .filter(|(_, record)| !record.share.is_empty())
            .map(|(member, record)| (member.clone(), record.share.clone()))
            .collect();
        let Some(secret) = policy.reconstruct(&share_env, &field) else {
            return Ok(false);
        };

        let message = binding_message(&sig.accumulator, &secret);
        let Ok(signature) = ecdsa::Signature::from_bytes(&sig.ecdsa) else {
            return Ok(false);
        };
        Ok(signature.verify(&message, &vk.ec_key))
    }
}

impl LargeUniverseSignature {
    pub fn to_der(&self) -> Vec<u8> {
        let records: Vec<Vec<u8>> = self
            .members
            .iter()
            .map(|(member, record)| {
                der::encode_sequence(&[
                    der::encode_utf8_string(member),
                    der::encode_integer(&record.share.x),
                    der::encode_integer(&record.share.y),
                    der::encode_integer(&record.witness),
                ])
            })
            .collect();
        der::encode_sequence(&[
            der::encode_integer(&self.accumulator),
            der::encode_utf8_string(&self.policy),
            der::encode_octet_string(&self.ecdsa),
            der::encode_sequence(&records),
        ])
    }

    pub fn from_der(input: &[u8]) -> Result<Self, SignatureError> {
        let parts = der::decode_sequence(input)?;
        if parts.len() != 4 {
            return Err(SignatureError::MalformedEncoding(
                "large-universe signature needs four components",
            ));
        }
        let mut members = BTreeMap::new();
        for record in der::decode_sequence(parts[3])? {
            let fields = der::decode_sequence(record)?;
            if fields.len() != 4 {
                return Err(SignatureError::MalformedEncoding(
                    "member record needs name, share pair and witness",
                ));
            }
            members.insert(
                der::decode_utf8_string(fields[0])?,
                MemberRecord {
                    share: PolicyShare {
                        x: der::decode_integer(fields[1])?,
                        y: der::decode_integer(fields[2])?,
                    },
                    witness: der::decode_integer(fields[3])?,
                },
            );
        }
        Ok(Self {
            accumulator: der::decode_integer(parts[0])?,
            policy: der::decode_utf8_string(parts[1])?,
            ecdsa: der::decode_octet_string(parts[2])?,
            members,
        })
    }
}
