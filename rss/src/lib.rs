//! Policy-based redactable set signatures.
//!
//! A signer signs an unordered set of strings together with a redaction
//! policy. Anyone holding the signature, and nothing secret, can then
//! derive a valid signature on a subset, as long as the subset still
//! satisfies the policy. Three schemes share the machinery:
//!
//! * [`large_universe`]: the policy is an `and`/`or` formula over
//!   arbitrary strings. Members are accumulated in an RSA accumulator
//!   together with their policy shares, and the outer ECDSA signature
//!   binds the accumulator value to the secret those shares recombine to.
//! * [`small_universe`]: the policy lists the characteristic bit strings
//!   of the acceptable subsets of a fixed universe; the admissible
//!   characteristic strings are accumulated.
//! * [`accumulator_only`]: no policy at all; every member of a bilinear
//!   accumulator gets a witness, and redaction is dropping witnesses.
//!
//! In every scheme the accumulator value and the ECDSA bytes survive
//! redaction unchanged; only witness (and share) material is removed.

pub mod accumulator_only;
pub mod ecdsa;
pub mod error;
pub mod keys;
pub mod large_universe;
pub mod small_universe;
pub mod universe;

#[cfg(test)]
mod tests;

pub use error::SignatureError;
pub use universe::Universe;

use rand::RngCore;
use std::collections::BTreeSet;

/// The contract every scheme exposes. Key generation may need a universe
/// (small-universe only); signing may need a policy (both policy-carrying
/// schemes); redaction may carry a replacement policy.
///
/// Redaction and verification treat cryptographic non-validity as data:
/// an inadmissible redaction is `Ok(None)` and a failing signature is
/// `Ok(false)`. Errors are reserved for precondition violations such as a
/// missing universe or an unparseable policy.
pub trait RedactableSetSignature {
    type SigningKey;
    type VerificationKey;
    type Signature;

    fn key_gen<R: RngCore>(
        rng: &mut R,
        universe: Option<&Universe>,
    ) -> Result<(Self::SigningKey, Self::VerificationKey), SignatureError>;

    fn sign<R: RngCore>(
        rng: &mut R,
        sk: &Self::SigningKey,
        set: &BTreeSet<String>,
        policy: Option<&str>,
    ) -> Result<Self::Signature, SignatureError>;

    fn redact(
        vk: &Self::VerificationKey,
        set: &BTreeSet<String>,
        subset: &BTreeSet<String>,
        sig: &Self::Signature,
        policy: Option<&str>,
    ) -> Result<Option<Self::Signature>, SignatureError>;

    fn verify(
        vk: &Self::VerificationKey,
        sig: &Self::Signature,
        set: &BTreeSet<String>,
    ) -> Result<bool, SignatureError>;
}

pub mod prelude {
    pub use crate::accumulator_only::{AccumulatorOnly, AccumulatorOnlySignature};
    pub use crate::ecdsa;
    pub use crate::error::SignatureError;
    pub use crate::keys::*;
    pub use crate::large_universe::{LargeUniverse, LargeUniverseSignature, MemberRecord};
    pub use crate::small_universe::{SmallUniverse, SmallUniverseSignature};
    pub use crate::universe::Universe;
    pub use crate::RedactableSetSignature;
}
