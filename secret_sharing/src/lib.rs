//! Shamir secret sharing over a large prime field.
//!
//! Shares of a secret `s` under a `(threshold, total)` policy are points
//! `(i, f(i))` of a random polynomial with constant term `s`; any
//! `threshold` of them reconstruct `s` by Lagrange interpolation at zero.
//! The field is the prime field of the RFC 7919 `ffdhe2048` modulus, which
//! is also the field the policy-tree share compiler works in.

pub mod error;
pub mod field;
pub mod shamir;

pub use error::SSError;
pub use field::PrimeField;
pub use shamir::{deal_random_secret, deal_secret, Share, ShareId, Shares};
