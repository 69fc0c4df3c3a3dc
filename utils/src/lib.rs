//! Utilities shared by the redactable set signature crates: a small DER
//! codec for the on-wire key and signature forms, the two's-complement byte
//! convention used when binding integers under ECDSA, hashing of arbitrary
//! bytes to field elements, and serde adapters for arkworks objects.

pub mod der;
pub mod serde_utils;

/// Hashing utilities like hashing arbitrary bytes to a field element
pub mod hashing_utils;
pub mod macros;

pub use hashing_utils::field_elem_from_try_and_incr;
