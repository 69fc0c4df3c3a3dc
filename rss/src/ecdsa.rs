//! ECDSA over secp256r1 with SHA-256, the outer signature every scheme
//! finalizes with. The schemes only ever feed it the accumulator value's
//! bytes, optionally followed by the reconstructed policy secret's bytes.

use ark_ec::{AffineRepr, CurveGroup};
use ark_ff::{Field, PrimeField};
use ark_secp256r1::{Affine, Fr, G_GENERATOR_X, G_GENERATOR_Y};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize, SerializationError};
use ark_std::{rand::RngCore, UniformRand, Zero};
use rss_crypto_utils::serde_utils::ArkObjectBytes;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, ZeroizeOnDrop};

#[serde_as]
#[derive(
    Clone,
    PartialEq,
    Eq,
    Debug,
    CanonicalSerialize,
    CanonicalDeserialize,
    Serialize,
    Deserialize,
    Zeroize,
    ZeroizeOnDrop,
)]
pub struct SigningKey(#[serde_as(as = "ArkObjectBytes")] pub Fr);

#[serde_as]
#[derive(
    Clone, PartialEq, Eq, Debug, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize,
)]
pub struct VerificationKey(#[serde_as(as = "ArkObjectBytes")] pub Affine);

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct EcdsaKeypair {
    pub signing_key: SigningKey,
    pub verification_key: VerificationKey,
}

impl EcdsaKeypair {
    pub fn generate<R: RngCore>(rng: &mut R) -> Self {
        let sk = Fr::rand(rng);
        let pk = (Signature::generator() * sk).into_affine();
        Self {
            signing_key: SigningKey(sk),
            verification_key: VerificationKey(pk),
        }
    }
}

/// ECDSA signature
#[serde_as]
#[derive(
    Clone, PartialEq, Eq, Debug, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize,
)]
pub struct Signature {
    #[serde_as(as = "ArkObjectBytes")]
    pub rand_x_coord: Fr,
    #[serde_as(as = "ArkObjectBytes")]
    pub response: Fr,
}

/// SHA-256 digest of the message reduced into the scalar field
pub fn hash_message(message: &[u8]) -> Fr {
    Fr::from_be_bytes_mod_order(&Sha256::digest(message))
}

impl Signature {
    /// Sign a message, hashing it with SHA-256 first
    pub fn new<R: RngCore>(rng: &mut R, message: &[u8], secret_key: &SigningKey) -> Self {
        Self::new_prehashed(rng, hash_message(message), secret_key.0)
    }

    /// Create new signature given that the message has already been hashed
    /// into a scalar
    pub fn new_prehashed<R: RngCore>(rng: &mut R, hashed_message: Fr, secret_key: Fr) -> Self {
        let g = Self::generator();
        // r = k * g
        let mut r = Affine::zero();
        // x coordinate of r
        let mut rand_x_coord = Fr::zero();
        // response = 1/k * (message + secret_key * rand_x_coord)
        let mut response = Fr::zero();
        // response should be invertible
        while r.is_zero() || rand_x_coord.is_zero() || response.is_zero() {
            let mut k = Fr::rand(rng);
            // k should be invertible
            while k.is_zero() {
                k = Fr::rand(rng);
            }
            r = (g * k).into_affine();
            rand_x_coord = Fr::from(r.x.into_bigint());
            response = k.inverse().unwrap() * (hashed_message + secret_key * rand_x_coord);
        }
        Self {
            rand_x_coord,
            response,
        }
    }

    /// Verify against a message, hashing it with SHA-256 first
    pub fn verify(&self, message: &[u8], public_key: &VerificationKey) -> bool {
        self.verify_prehashed(hash_message(message), public_key.0)
    }

    /// Verify the signature given that the message has already been hashed
    /// into a scalar
    pub fn verify_prehashed(&self, hashed_message: Fr, public_key: Affine) -> bool {
        let g = Self::generator();
        let resp_inv = if let Some(inv) = self.response.inverse() {
            inv
        } else {
            return false;
        };
        let gc = g * (resp_inv * hashed_message);
        let yr = public_key * (resp_inv * self.rand_x_coord);
        self.rand_x_coord == Fr::from((gc + yr).into_affine().x.into_bigint())
    }

    /// Chosen generator of the group
    pub fn generator() -> Affine {
        Affine::new_unchecked(G_GENERATOR_X, G_GENERATOR_Y)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, SerializationError> {
        let mut bytes = Vec::with_capacity(self.compressed_size());
        self.serialize_compressed(&mut bytes)?;
        Ok(bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SerializationError> {
        Self::deserialize_compressed(bytes)
    }
}
