//! The accumulator-only scheme, after Derler, Hanser and Slamanig's
//! generic construction: no policy at all. Every member of the set is
//! accumulated in the bilinear accumulator and receives a witness; the
//! ECDSA signature binds the accumulator value. Redacting to a subset is
//! nothing more than forgetting the removed members' witnesses, which any
//! holder of the signature can do.

use crate::ecdsa;
use crate::error::SignatureError;
use crate::keys::{AccumulatorOnlySigningKey, AccumulatorOnlyVerificationKey};
use crate::universe::Universe;
use crate::RedactableSetSignature;
use ark_ec::pairing::Pairing;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use membership_accumulator::bilinear::{
    BilinearAccumulator, Keypair, MembershipWitness, SetupParams,
};
use rand::RngCore;
use rss_crypto_utils::der;
use rss_crypto_utils::serde_utils::ArkObjectBytes;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use sha2::Sha256;
use std::collections::{BTreeMap, BTreeSet};
use std::marker::PhantomData;

#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct AccumulatorOnlySignature<E: Pairing> {
    #[serde_as(as = "ArkObjectBytes")]
    pub accumulator: BilinearAccumulator<E>,
    pub ecdsa: Vec<u8>,
    #[serde_as(as = "BTreeMap<_, ArkObjectBytes>")]
    pub witnesses: BTreeMap<String, MembershipWitness<E::G1Affine>>,
}

pub struct AccumulatorOnly<E: Pairing>(PhantomData<E>);

impl<E: Pairing> RedactableSetSignature for AccumulatorOnly<E> {
    type SigningKey = AccumulatorOnlySigningKey<E>;
    type VerificationKey = AccumulatorOnlyVerificationKey<E>;
    type Signature = AccumulatorOnlySignature<E>;

    /// The universe is ignored by this construction
    fn key_gen<R: RngCore>(
        rng: &mut R,
        _universe: Option<&Universe>,
    ) -> Result<(Self::SigningKey, Self::VerificationKey), SignatureError> {
        let params = SetupParams::<E>::generate_using_rng(rng);
        let keypair = Keypair::<E>::generate(rng, &params);
        let ec = ecdsa::EcdsaKeypair::generate(rng);
        Ok((
            AccumulatorOnlySigningKey {
                params: params.clone(),
                accumulator_key: keypair.secret_key,
                ec_key: ec.signing_key,
            },
            AccumulatorOnlyVerificationKey {
                params,
                accumulator_key: keypair.public_key,
                ec_key: ec.verification_key,
            },
        ))
    }

    fn sign<R: RngCore>(
        rng: &mut R,
        sk: &Self::SigningKey,
        set: &BTreeSet<String>,
        policy: Option<&str>,
    ) -> Result<Self::Signature, SignatureError> {
        if policy.is_some() {
            return Err(SignatureError::PolicyNotSupported);
        }

        let accumulator = BilinearAccumulator::<E>::eval::<Sha256, _>(
            set.iter().map(|member| member.as_bytes()),
            &sk.accumulator_key,
            &sk.params,
        );
        let witnesses: BTreeMap<String, MembershipWitness<E::G1Affine>> = set
            .iter()
            .cloned()
            .zip(accumulator.membership_witness_for_batch::<Sha256, _>(
                set.iter().map(|member| member.as_bytes()),
                &sk.accumulator_key,
            ))
            .collect();

        let mut acc_bytes = Vec::with_capacity(accumulator.compressed_size());
        accumulator.serialize_compressed(&mut acc_bytes)?;
        let signature = ecdsa::Signature::new(rng, &acc_bytes, &sk.ec_key);

        Ok(AccumulatorOnlySignature {
            accumulator,
            ecdsa: signature.to_bytes()?,
            witnesses,
        })
    }

    fn redact(
        _vk: &Self::VerificationKey,
        set: &BTreeSet<String>,
        subset: &BTreeSet<String>,
        sig: &Self::Signature,
        _policy: Option<&str>,
    ) -> Result<Option<Self::Signature>, SignatureError> {
        if !subset.is_subset(set) {
            return Ok(None);
        }
        for member in subset {
            if !sig.witnesses.contains_key(member) {
                return Ok(None);
            }
        }

        let mut witnesses = sig.witnesses.clone();
        for member in set {
            if !subset.contains(member) {
                witnesses.remove(member);
            }
        }

        Ok(Some(AccumulatorOnlySignature {
            accumulator: sig.accumulator.clone(),
            ecdsa: sig.ecdsa.clone(),
            witnesses,
        }))
    }

    fn verify(
        vk: &Self::VerificationKey,
        sig: &Self::Signature,
        set: &BTreeSet<String>,
    ) -> Result<bool, SignatureError> {
        for member in set {
            let Some(witness) = sig.witnesses.get(member) else {
                return Ok(false);
            };
            if !sig.accumulator.verify_membership::<Sha256>(
                member.as_bytes(),
                witness,
                &vk.accumulator_key,
                &vk.params,
            ) {
                return Ok(false);
            }
        }

        let mut acc_bytes = Vec::with_capacity(sig.accumulator.compressed_size());
        sig.accumulator.serialize_compressed(&mut acc_bytes)?;
        let Ok(signature) = ecdsa::Signature::from_bytes(&sig.ecdsa) else {
            return Ok(false);
        };
        Ok(signature.verify(&acc_bytes, &vk.ec_key))
    }
}

impl<E: Pairing> AccumulatorOnlySignature<E> {
    pub fn to_der(&self) -> Result<Vec<u8>, SignatureError> {
        let mut acc_bytes = Vec::with_capacity(self.accumulator.compressed_size());
        self.accumulator.serialize_compressed(&mut acc_bytes)?;
        let mut records = Vec::with_capacity(self.witnesses.len());
        for (member, witness) in &self.witnesses {
            let mut witness_bytes = Vec::with_capacity(witness.compressed_size());
            witness.serialize_compressed(&mut witness_bytes)?;
            records.push(der::encode_sequence(&[
                der::encode_utf8_string(member),
                der::encode_octet_string(&witness_bytes),
            ]));
        }
        Ok(der::encode_sequence(&[
            der::encode_octet_string(&acc_bytes),
            der::encode_octet_string(&self.ecdsa),
            der::encode_sequence(&records),
        ]))
    }

    pub fn from_der(input: &[u8]) -> Result<Self, SignatureError> {
        let parts = der::decode_sequence(input)?;
        if parts.len() != 3 {
            return Err(SignatureError::MalformedEncoding(
                "accumulator-only signature needs three components",
            ));
        }
        let mut witnesses = BTreeMap::new();
        for record in der::decode_sequence(parts[2])? {
            let fields = der::decode_sequence(record)?;
            if fields.len() != 2 {
                return Err(SignatureError::MalformedEncoding(
                    "witness record needs member and witness",
                ));
            }
            witnesses.insert(
                der::decode_utf8_string(fields[0])?,
                MembershipWitness::deserialize_compressed(
                    der::decode_octet_string(fields[1])?.as_slice(),
                )?,
            );
        }
        Ok(Self {
            accumulator: BilinearAccumulator::deserialize_compressed(
                der::decode_octet_string(parts[0])?.as_slice(),
            )?,
            ecdsa: der::decode_octet_string(parts[1])?,
            witnesses,
        })
    }
}
