//! RSA membership accumulator over prime representatives. The accumulated
//! value for a set `S` is `g^{prod_i prime_i} mod n` where each `prime_i`
//! comes from [`hash_to_prime`] applied to a member's bytes. The witness for
//! a member is the same power with that member's prime left out, and
//! verification raises the witness back: `witness^prime == acc (mod n)`.

use crate::error::AccumulatorError;
use crate::hash_to_prime::{generate_prime, hash_to_prime};
use digest::Digest;
use num_bigint::{BigUint, RandBigInt};
use num_traits::One;
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// Bit length of each of the two modulus primes
pub const DEFAULT_PRIME_BITS: u64 = 2048;

/// Secret key: the factorization of the modulus and the generator
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RsaSecretKey {
    pub p: BigUint,
    pub q: BigUint,
    pub g: BigUint,
}

/// Public key: the modulus and the generator
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RsaPublicKey {
    pub g: BigUint,
    pub n: BigUint,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RsaKeypair {
    pub secret_key: RsaSecretKey,
    pub public_key: RsaPublicKey,
}

/// One entry of the auxiliary data produced by evaluation. Two entries
/// denote the same member only when prime and counter both match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberPrime {
    pub prime: BigUint,
    pub counter: u64,
}

/// The accumulated value, a positive integer below the modulus
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RsaAccumulator(pub BigUint);

impl RsaSecretKey {
    pub fn modulus(&self) -> BigUint {
        &self.p * &self.q
    }
}

impl RsaKeypair {
    /// Generate a keypair with the default 2048-bit modulus primes
    pub fn generate<R: RngCore>(rng: &mut R) -> Self {
        Self::generate_with_prime_bits(rng, DEFAULT_PRIME_BITS)
    }

    /// Generate a keypair whose modulus primes have `bits` bits each.
    /// Smaller sizes are only appropriate for tests.
    pub fn generate_with_prime_bits<R: RngCore>(rng: &mut R, bits: u64) -> Self {
        let p = generate_prime(rng, bits);
        let mut q = generate_prime(rng, bits);
        while p == q {
            q = generate_prime(rng, bits);
        }
        let n = &p * &q;
        let g = rng.gen_biguint_range(&BigUint::from(2u64), &n);
        Self {
            secret_key: RsaSecretKey { p, q, g: g.clone() },
            public_key: RsaPublicKey { g, n },
        }
    }
}

impl RsaAccumulator {
    /// The accumulated value
    pub fn value(&self) -> &BigUint {
        &self.0
    }

    /// Accumulate a set of members, returning the value and the
    /// `(prime, counter)` pairs needed later for witness computation.
    pub fn eval<'a, D: Digest, I: IntoIterator<Item = &'a [u8]>>(
        members: I,
        sk: &RsaSecretKey,
    ) -> (Self, Vec<MemberPrime>) {
        let aux: Vec<MemberPrime> = members
            .into_iter()
            .map(|m| {
                let (prime, counter) = hash_to_prime::<D>(m);
                MemberPrime { prime, counter }
            })
            .collect();
        let product = aux
            .iter()
            .fold(BigUint::one(), |acc, entry| acc * &entry.prime);
        (Self(sk.g.modpow(&product, &sk.modulus())), aux)
    }

    /// Witness for one accumulated member: the generator raised to the
    /// product of every other member's prime.
    pub fn membership_witness<D: Digest>(
        member: &[u8],
        sk: &RsaSecretKey,
        aux: &[MemberPrime],
    ) -> Result<BigUint, AccumulatorError> {
        let (prime, counter) = hash_to_prime::<D>(member);
        if !aux.iter().any(|e| e.prime == prime && e.counter == counter) {
            return Err(AccumulatorError::ElementAbsent);
        }
        let product = aux
            .iter()
            .filter(|e| e.prime != prime || e.counter != counter)
            .fold(BigUint::one(), |acc, entry| acc * &entry.prime);
        Ok(sk.g.modpow(&product, &sk.modulus()))
    }

    /// Check `witness^prime == value (mod n)` for the member's prime
    pub fn verify_membership<D: Digest>(
        &self,
        member: &[u8],
        witness: &BigUint,
        pk: &RsaPublicKey,
    ) -> bool {
        let (prime, _) = hash_to_prime::<D>(member);
        witness.modpow(&prime, &pk.n) == self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};
    use sha2::Sha256;

    // Test keys use small primes; production keys default to 2048 bits.
    const TEST_PRIME_BITS: u64 = 256;

    #[test]
    fn accumulate_and_verify() {
        let mut rng = StdRng::seed_from_u64(0u64);
        let keypair = RsaKeypair::generate_with_prime_bits(&mut rng, TEST_PRIME_BITS);

        let members: Vec<&[u8]> = vec![b"alpha", b"beta", b"gamma"];
        let (acc, aux) = RsaAccumulator::eval::<Sha256, _>(members.clone(), &keypair.secret_key);

        for member in &members {
            let wit =
                RsaAccumulator::membership_witness::<Sha256>(member, &keypair.secret_key, &aux)
                    .unwrap();
            assert!(acc.verify_membership::<Sha256>(member, &wit, &keypair.public_key));
        }
    }

    #[test]
    fn witness_for_absent_member_is_refused() {
        let mut rng = StdRng::seed_from_u64(1u64);
        let keypair = RsaKeypair::generate_with_prime_bits(&mut rng, TEST_PRIME_BITS);

        let (_, aux) =
            RsaAccumulator::eval::<Sha256, _>([&b"alpha"[..]], &keypair.secret_key);
        assert!(matches!(
            RsaAccumulator::membership_witness::<Sha256>(b"beta", &keypair.secret_key, &aux),
            Err(AccumulatorError::ElementAbsent)
        ));
    }

    #[test]
    fn wrong_member_fails_verification() {
        let mut rng = StdRng::seed_from_u64(2u64);
        let keypair = RsaKeypair::generate_with_prime_bits(&mut rng, TEST_PRIME_BITS);

        let members: Vec<&[u8]> = vec![b"alpha", b"beta"];
        let (acc, aux) = RsaAccumulator::eval::<Sha256, _>(members, &keypair.secret_key);
        let wit = RsaAccumulator::membership_witness::<Sha256>(b"alpha", &keypair.secret_key, &aux)
            .unwrap();
        assert!(!acc.verify_membership::<Sha256>(b"beta", &wit, &keypair.public_key));
        assert!(!acc.verify_membership::<Sha256>(b"gamma", &wit, &keypair.public_key));
    }

    #[test]
    fn adversarial_witnesses_do_not_verify_absent_members() {
        // Bounded negative trial: random witnesses for a member that was
        // never accumulated.
        let mut rng = StdRng::seed_from_u64(3u64);
        let keypair = RsaKeypair::generate_with_prime_bits(&mut rng, TEST_PRIME_BITS);

        let members: Vec<&[u8]> = vec![b"alpha", b"beta", b"gamma"];
        let (acc, _) = RsaAccumulator::eval::<Sha256, _>(members, &keypair.secret_key);

        for _ in 0..32 {
            let fake = rng.gen_biguint_below(&keypair.public_key.n);
            assert!(!acc.verify_membership::<Sha256>(b"delta", &fake, &keypair.public_key));
        }
    }

    #[test]
    fn witnesses_survive_forgetting_other_witnesses() {
        let mut rng = StdRng::seed_from_u64(4u64);
        let keypair = RsaKeypair::generate_with_prime_bits(&mut rng, TEST_PRIME_BITS);

        let members: Vec<&[u8]> = vec![b"alpha", b"beta", b"gamma"];
        let (acc, aux) = RsaAccumulator::eval::<Sha256, _>(members, &keypair.secret_key);
        let wit = RsaAccumulator::membership_witness::<Sha256>(b"alpha", &keypair.secret_key, &aux)
            .unwrap();

        // Nothing about the other members is needed at verification time
        assert!(acc.verify_membership::<Sha256>(b"alpha", &wit, &keypair.public_key));
    }
}
