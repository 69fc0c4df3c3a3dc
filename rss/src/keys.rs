//! Key material of the three schemes. Every key bundles an accumulator key
//! half with an EC signature key half and round-trips through DER:
//!
//! * RSA halves encode as `SEQUENCE(INTEGER g, INTEGER n)` (public) and
//!   `SEQUENCE(INTEGER g, INTEGER p, INTEGER q)` (private, the modulus is
//!   recomputed on decode);
//! * bilinear halves encode their setup parameters and key element as
//!   compressed canonical octet strings;
//! * the EC halves are compressed canonical octet strings of the scalar or
//!   point.
//!
//! The small-universe keys also carry the member universe, which is not
//! part of the DER body: callers re-attach it from the universe file named
//! next to the key.

use crate::ecdsa;
use crate::error::SignatureError;
use crate::universe::Universe;
use ark_ec::pairing::Pairing;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize, SerializationError};
use membership_accumulator::bilinear;
use membership_accumulator::rsa::{RsaPublicKey, RsaSecretKey};
use rss_crypto_utils::der;
use serde::{Deserialize, Serialize};

/// Signing key of the large-universe scheme
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LargeUniverseSigningKey {
    pub accumulator_key: RsaSecretKey,
    pub ec_key: ecdsa::SigningKey,
}

/// Verification key of the large-universe scheme
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LargeUniverseVerificationKey {
    pub accumulator_key: RsaPublicKey,
    pub ec_key: ecdsa::VerificationKey,
}

/// Signing key of the small-universe scheme. The universe is attached out
/// of band and never serialized into the DER body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmallUniverseSigningKey {
    pub accumulator_key: RsaSecretKey,
    pub ec_key: ecdsa::SigningKey,
    pub universe: Universe,
}

/// Verification key of the small-universe scheme
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmallUniverseVerificationKey {
    pub accumulator_key: RsaPublicKey,
    pub ec_key: ecdsa::VerificationKey,
    pub universe: Universe,
}

/// Signing key of the accumulator-only scheme
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct AccumulatorOnlySigningKey<E: Pairing> {
    pub params: bilinear::SetupParams<E>,
    pub accumulator_key: bilinear::SecretKey<E::ScalarField>,
    pub ec_key: ecdsa::SigningKey,
}

/// Verification key of the accumulator-only scheme
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct AccumulatorOnlyVerificationKey<E: Pairing> {
    pub params: bilinear::SetupParams<E>,
    pub accumulator_key: bilinear::PublicKey<E>,
    pub ec_key: ecdsa::VerificationKey,
}

fn ark_bytes<T: CanonicalSerialize>(value: &T) -> Result<Vec<u8>, SerializationError> {
    let mut bytes = Vec::with_capacity(value.compressed_size());
    value.serialize_compressed(&mut bytes)?;
    Ok(bytes)
}

fn encode_rsa_secret(key: &RsaSecretKey) -> Vec<u8> {
    der::encode_sequence(&[
        der::encode_integer(&key.g),
        der::encode_integer(&key.p),
        der::encode_integer(&key.q),
    ])
}

fn decode_rsa_secret(input: &[u8]) -> Result<RsaSecretKey, SignatureError> {
    let parts = der::decode_sequence(input)?;
    if parts.len() != 3 {
        return Err(SignatureError::MalformedEncoding(
            "RSA private key needs generator and two primes",
        ));
    }
    Ok(RsaSecretKey {
        g: der::decode_integer(parts[0])?,
        p: der::decode_integer(parts[1])?,
        q: der::decode_integer(parts[2])?,
    })
}

fn encode_rsa_public(key: &RsaPublicKey) -> Vec<u8> {
    der::encode_sequence(&[der::encode_integer(&key.g), der::encode_integer(&key.n)])
}

fn decode_rsa_public(input: &[u8]) -> Result<RsaPublicKey, SignatureError> {
    let parts = der::decode_sequence(input)?;
    if parts.len() != 2 {
        return Err(SignatureError::MalformedEncoding(
            "RSA public key needs generator and modulus",
        ));
    }
    Ok(RsaPublicKey {
        g: der::decode_integer(parts[0])?,
        n: der::decode_integer(parts[1])?,
    })
}

/// Outer layout shared by all keys: `SEQUENCE(accKey, OCTET STRING ecKey)`
fn split_key_body(input: &[u8]) -> Result<(Vec<u8>, Vec<u8>), SignatureError> {
    let parts = der::decode_sequence(input)?;
    if parts.len() != 2 {
        return Err(SignatureError::MalformedEncoding(
            "key needs an accumulator half and an EC half",
        ));
    }
    Ok((parts[0].to_vec(), der::decode_octet_string(parts[1])?))
}

impl LargeUniverseSigningKey {
    pub fn to_der(&self) -> Result<Vec<u8>, SignatureError> {
        Ok(der::encode_sequence(&[
            encode_rsa_secret(&self.accumulator_key),
            der::encode_octet_string(&ark_bytes(&self.ec_key)?),
        ]))
    }

    pub fn from_der(input: &[u8]) -> Result<Self, SignatureError> {
        let (acc, ec) = split_key_body(input)?;
        Ok(Self {
            accumulator_key: decode_rsa_secret(&acc)?,
            ec_key: ecdsa::SigningKey::deserialize_compressed(ec.as_slice())?,
        })
    }
}

impl LargeUniverseVerificationKey {
    pub fn to_der(&self) -> Result<Vec<u8>, SignatureError> {
        Ok(der::encode_sequence(&[
            encode_rsa_public(&self.accumulator_key),
            der::encode_octet_string(&ark_bytes(&self.ec_key)?),
        ]))
    }

    pub fn from_der(input: &[u8]) -> Result<Self, SignatureError> {
        let (acc, ec) = split_key_body(input)?;
        Ok(Self {
            accumulator_key: decode_rsa_public(&acc)?,
            ec_key: ecdsa::VerificationKey::deserialize_compressed(ec.as_slice())?,
        })
    }
}

impl SmallUniverseSigningKey {
    pub fn to_der(&self) -> Result<Vec<u8>, SignatureError> {
        Ok(der::encode_sequence(&[
            encode_rsa_secret(&self.accumulator_key),
            der::encode_octet_string(&ark_bytes(&self.ec_key)?),
        ]))
    }

    /// Decode the DER body and attach the universe loaded from its file
    pub fn from_der(input: &[u8], universe: Universe) -> Result<Self, SignatureError> {
        let (acc, ec) = split_key_body(input)?;
        Ok(Self {
            accumulator_key: decode_rsa_secret(&acc)?,
            ec_key: ecdsa::SigningKey::deserialize_compressed(ec.as_slice())?,
            universe,
        })
    }
}

impl SmallUniverseVerificationKey {
    pub fn to_der(&self) -> Result<Vec<u8>, SignatureError> {
        Ok(der::encode_sequence(&[
            encode_rsa_public(&self.accumulator_key),
            der::encode_octet_string(&ark_bytes(&self.ec_key)?),
        ]))
    }

    /// Decode the DER body and attach the universe loaded from its file
    pub fn from_der(input: &[u8], universe: Universe) -> Result<Self, SignatureError> {
        let (acc, ec) = split_key_body(input)?;
        Ok(Self {
            accumulator_key: decode_rsa_public(&acc)?,
            ec_key: ecdsa::VerificationKey::deserialize_compressed(ec.as_slice())?,
            universe,
        })
    }
}

impl<E: Pairing> AccumulatorOnlySigningKey<E> {
    pub fn to_der(&self) -> Result<Vec<u8>, SignatureError> {
        let acc = der::encode_sequence(&[
            der::encode_octet_string(&ark_bytes(&self.params)?),
            der::encode_octet_string(&ark_bytes(&self.accumulator_key)?),
        ]);
        Ok(der::encode_sequence(&[
            acc,
            der::encode_octet_string(&ark_bytes(&self.ec_key)?),
        ]))
    }

    pub fn from_der(input: &[u8]) -> Result<Self, SignatureError> {
        let (acc, ec) = split_key_body(input)?;
        let acc_parts = der::decode_sequence(&acc)?;
        if acc_parts.len() != 2 {
            return Err(SignatureError::MalformedEncoding(
                "accumulator key needs parameters and a key element",
            ));
        }
        Ok(Self {
            params: bilinear::SetupParams::deserialize_compressed(
                der::decode_octet_string(acc_parts[0])?.as_slice(),
            )?,
            accumulator_key: bilinear::SecretKey::deserialize_compressed(
                der::decode_octet_string(acc_parts[1])?.as_slice(),
            )?,
            ec_key: ecdsa::SigningKey::deserialize_compressed(ec.as_slice())?,
        })
    }
}

impl<E: Pairing> AccumulatorOnlyVerificationKey<E> {
    pub fn to_der(&self) -> Result<Vec<u8>, SignatureError> {
        let acc = der::encode_sequence(&[
            der::encode_octet_string(&ark_bytes(&self.params)?),
            der::encode_octet_string(&ark_bytes(&self.accumulator_key)?),
        ]);
        Ok(der::encode_sequence(&[
            acc,
            der::encode_octet_string(&ark_bytes(&self.ec_key)?),
        ]))
    }

    pub fn from_der(input: &[u8]) -> Result<Self, SignatureError> {
        let (acc, ec) = split_key_body(input)?;
        let acc_parts = der::decode_sequence(&acc)?;
        if acc_parts.len() != 2 {
            return Err(SignatureError::MalformedEncoding(
                "accumulator key needs parameters and a key element",
            ));
        }
        Ok(Self {
            params: bilinear::SetupParams::deserialize_compressed(
                der::decode_octet_string(acc_parts[0])?.as_slice(),
            )?,
            accumulator_key: bilinear::PublicKey::deserialize_compressed(
                der::decode_octet_string(acc_parts[1])?.as_slice(),
            )?,
            ec_key: ecdsa::VerificationKey::deserialize_compressed(ec.as_slice())?,
        })
    }
}
