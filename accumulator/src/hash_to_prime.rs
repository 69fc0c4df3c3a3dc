//! Deterministic mapping of byte strings to probable primes, and random
//! prime generation for the RSA accumulator modulus.
//!
//! The candidate for counter `c` is `digest(bytes) || LE(c)` read as a
//! big-endian unsigned integer, where `LE(c)` is the minimal little-endian
//! encoding of the counter. The counter starts at zero and increments until
//! the candidate is a probable prime, and is returned alongside the prime so
//! the mapping can be re-derived without a search.

use digest::Digest;
use num_bigint::{BigUint, RandBigInt};
use num_integer::Integer;
use num_traits::{One, Zero};
use rss_crypto_utils::concat_slices;

/// Bases for the Miller-Rabin rounds. Ten rounds, matching the confidence
/// used when the representatives were first generated; fixed bases keep the
/// mapping deterministic.
const MR_BASES: [u64; 10] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29];

const SMALL_PRIMES: [u64; 12] = [3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41];

/// Map `bytes` to a probable prime, returning the prime and the counter
/// that produced it.
pub fn hash_to_prime<D: Digest>(bytes: &[u8]) -> (BigUint, u64) {
    let digest = D::digest(bytes);
    let mut counter = 0u64;
    loop {
        let counter_bytes = BigUint::from(counter).to_bytes_le();
        let candidate = BigUint::from_bytes_be(&concat_slices!(digest, counter_bytes));
        if is_probable_prime(&candidate) {
            return (candidate, counter);
        }
        counter += 1;
    }
}

/// Miller-Rabin primality test with a small-prime fast path.
pub fn is_probable_prime(n: &BigUint) -> bool {
    let two = BigUint::from(2u64);
    if *n < two {
        return false;
    }
    if *n == two {
        return true;
    }
    if n.is_even() {
        return false;
    }
    for p in SMALL_PRIMES {
        let p = BigUint::from(p);
        if *n == p {
            return true;
        }
        if (n % &p).is_zero() {
            return false;
        }
    }
    // n - 1 = d * 2^s with d odd
    let n_minus_1 = n - BigUint::one();
    let mut d = n_minus_1.clone();
    let mut s = 0u32;
    while d.is_even() {
        d >>= 1;
        s += 1;
    }
    for a in MR_BASES {
        let a = BigUint::from(a);
        if a >= n_minus_1 {
            continue;
        }
        if !miller_rabin_round(n, &a, &d, s, &n_minus_1) {
            return false;
        }
    }
    true
}

fn miller_rabin_round(n: &BigUint, a: &BigUint, d: &BigUint, s: u32, n_minus_1: &BigUint) -> bool {
    let mut x = a.modpow(d, n);
    if x.is_one() || x == *n_minus_1 {
        return true;
    }
    for _ in 1..s {
        x = x.modpow(&BigUint::from(2u64), n);
        if x == *n_minus_1 {
            return true;
        }
    }
    false
}

/// Generate a random probable prime of exactly `bits` bits.
pub fn generate_prime<R: rand::RngCore + ?Sized>(rng: &mut R, bits: u64) -> BigUint {
    loop {
        let mut candidate = rng.gen_biguint(bits);
        candidate.set_bit(bits - 1, true);
        candidate.set_bit(0, true);
        if is_probable_prime(&candidate) {
            return candidate;
        }
    }
}
