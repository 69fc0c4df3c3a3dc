#![allow(non_snake_case)]

//! Bilinear membership accumulator. The accumulated value for a set `S`
//! under secret key `alpha` is `V = P * prod_{s in S} (H(s) + alpha)` where
//! `H` hashes the member's bytes into the scalar field. The witness for a
//! member is `V * 1/(H(s) + alpha)` and membership is checked with one
//! multi-pairing:
//!
//! `e(witness, H(s)*P_tilde + Q_tilde) == e(V, P_tilde)`
//!
//! The variable names follow the paper, hence the lint exception above.

use ark_ec::{pairing::Pairing, AffineRepr, CurveGroup};
use ark_ff::{batch_inversion, Field, PrimeField, Zero};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_std::{rand::RngCore, One, UniformRand};
use digest::Digest;
use rss_crypto_utils::serde_utils::ArkObjectBytes;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Secret key of the accumulator manager
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
#[serde(bound = "")]
pub struct SecretKey<F: PrimeField>(#[serde_as(as = "ArkObjectBytes")] pub F);

/// Public key of the accumulator manager, `Q_tilde = P_tilde * alpha`
#[serde_as]
#[derive(
    Clone, PartialEq, Eq, Debug, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize,
)]
#[serde(bound = "")]
pub struct PublicKey<E: Pairing> {
    #[serde_as(as = "ArkObjectBytes")]
    pub Q_tilde: E::G2Affine,
}

/// Generators of both source groups. The G1 generator also serves as the
/// accumulated value of the empty set.
#[serde_as]
#[derive(
    Clone, PartialEq, Eq, Debug, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize,
)]
#[serde(bound = "")]
pub struct SetupParams<E: Pairing> {
    #[serde_as(as = "ArkObjectBytes")]
    pub P: E::G1Affine,
    #[serde_as(as = "ArkObjectBytes")]
    pub P_tilde: E::G2Affine,
}

#[derive(
    Clone, PartialEq, Eq, Debug, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize,
)]
#[serde(bound = "")]
pub struct Keypair<E: Pairing> {
    pub secret_key: SecretKey<E::ScalarField>,
    pub public_key: PublicKey<E>,
}

/// Witness of one accumulated member
#[serde_as]
#[derive(
    Clone, PartialEq, Eq, Debug, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize,
)]
#[serde(bound = "")]
pub struct MembershipWitness<G: AffineRepr>(#[serde_as(as = "ArkObjectBytes")] pub G);

/// The accumulated value. A digest of the member set it was evaluated over.
#[serde_as]
#[derive(
    Clone, PartialEq, Eq, Debug, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize,
)]
#[serde(bound = "")]
pub struct BilinearAccumulator<E: Pairing>(#[serde_as(as = "ArkObjectBytes")] pub E::G1Affine);

impl<E: Pairing> SetupParams<E> {
    pub fn generate_using_rng<R: RngCore>(rng: &mut R) -> Self {
        Self {
            P: E::G1::rand(rng).into_affine(),
            P_tilde: E::G2::rand(rng).into_affine(),
        }
    }
}

impl<E: Pairing> Keypair<E> {
    /// Create a secret key and corresponding public key
    pub fn generate<R: RngCore>(rng: &mut R, setup_params: &SetupParams<E>) -> Self {
        let alpha = E::ScalarField::rand(rng);
        let Q_tilde = (setup_params.P_tilde * alpha).into_affine();
        Self {
            secret_key: SecretKey(alpha),
            public_key: PublicKey { Q_tilde },
        }
    }
}

impl<E: Pairing> BilinearAccumulator<E> {
    /// The accumulated value
    pub fn value(&self) -> &E::G1Affine {
        &self.0
    }

    /// Hash a member's bytes into the scalar field
    pub fn member_to_field<D: Digest>(member: &[u8]) -> E::ScalarField {
        rss_crypto_utils::field_elem_from_try_and_incr::<E::ScalarField, D>(member)
    }

    /// Accumulate a set of members under the secret key. The value depends
    /// only on the multiset of members, not on iteration order.
    pub fn eval<'a, D: Digest, I: IntoIterator<Item = &'a [u8]>>(
        members: I,
        sk: &SecretKey<E::ScalarField>,
        params: &SetupParams<E>,
    ) -> Self {
        let mut product = E::ScalarField::one();
        for member in members {
            product *= Self::member_to_field::<D>(member) + sk.0;
        }
        Self((params.P * product).into_affine())
    }

    /// Witness for one member of the accumulated set,
    /// `V * 1/(H(member) + alpha)`
    pub fn membership_witness<D: Digest>(
        &self,
        member: &[u8],
        sk: &SecretKey<E::ScalarField>,
    ) -> MembershipWitness<E::G1Affine> {
        // Unwrap is fine as H(member) would have to equal -alpha for it to panic
        let y_plus_alpha_inv = (Self::member_to_field::<D>(member) + sk.0).inverse().unwrap();
        MembershipWitness((self.0 * y_plus_alpha_inv).into_affine())
    }

    /// Witnesses for several members at once, in the order of the passed
    /// members. Cheaper than independent witnesses as the field inversions
    /// are batched.
    pub fn membership_witness_for_batch<'a, D: Digest, I: IntoIterator<Item = &'a [u8]>>(
        &self,
        members: I,
        sk: &SecretKey<E::ScalarField>,
    ) -> Vec<MembershipWitness<E::G1Affine>> {
        let mut y_plus_alpha: Vec<E::ScalarField> = members
            .into_iter()
            .map(|member| Self::member_to_field::<D>(member) + sk.0)
            .collect();
        batch_inversion(&mut y_plus_alpha);
        y_plus_alpha
            .into_iter()
            .map(|inv| MembershipWitness((self.0 * inv).into_affine()))
            .collect()
    }

    /// Pairing check `e(witness, H(member)*P_tilde + Q_tilde) == e(V, P_tilde)`,
    /// written as a single product of two pairings equalling one.
    pub fn verify_membership<D: Digest>(
        &self,
        member: &[u8],
        witness: &MembershipWitness<E::G1Affine>,
        pk: &PublicKey<E>,
        params: &SetupParams<E>,
    ) -> bool {
        let y = Self::member_to_field::<D>(member);
        let P_tilde_y = params.P_tilde * y;
        E::multi_pairing(
            [
                E::G1Prepared::from(witness.0),
                E::G1Prepared::from(self.0),
            ],
            [
                E::G2Prepared::from((P_tilde_y + pk.Q_tilde).into_affine()),
                E::G2Prepared::from((-params.P_tilde.into_group()).into_affine()),
            ],
        )
        .is_zero()
    }
}
