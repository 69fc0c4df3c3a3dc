//! Membership accumulators for redactable set signatures.
//!
//! Two constructions share this crate. [`bilinear`] holds a dynamic
//! membership accumulator over a Type-III bilinear group in the style of
//! "Dynamic Universal Accumulator with Batch Update over Bilinear Groups"
//! by Vitto and Biryukov (only the membership half; no removals and no
//! non-membership witnesses). [`rsa`] holds the classic accumulator of
//! "Collision-Free Accumulators and Fail-Stop Signature Schemes Without
//! Trees" by Baric and Pfitzmann, over prime representatives produced by
//! [`hash_to_prime`].
//!
//! Witnesses of either accumulator stay valid when other members'
//! witnesses are discarded, because the accumulated value itself never
//! changes. That is the property the signature schemes lean on: redaction
//! is forgetting witnesses.
//!
//! A party holding the bilinear secret key can forge a witness for an
//! element that was never accumulated. The schemes treat the signer as
//! trusted, so this is a documented limitation rather than a bug.

pub mod bilinear;
pub mod error;
pub mod hash_to_prime;
pub mod rsa;

pub mod prelude {
    pub use crate::bilinear::{
        BilinearAccumulator, Keypair, MembershipWitness, PublicKey, SecretKey, SetupParams,
    };
    pub use crate::error::AccumulatorError;
    pub use crate::hash_to_prime::hash_to_prime;
    pub use crate::rsa::{MemberPrime, RsaAccumulator, RsaKeypair, RsaPublicKey, RsaSecretKey};
}
