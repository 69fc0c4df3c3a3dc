//! Arithmetic in a prime field over `num-bigint` integers. Elements are
//! canonical residues in `[0, modulus)`; every operation expects and
//! returns canonical values.

use num_bigint::{BigInt, BigUint, RandBigInt, Sign};
use num_integer::Integer;
use num_traits::{One, Zero};
use rand::RngCore;

/// The RFC 7919 `ffdhe2048` prime.
const FFDHE2048_HEX: &[u8] = b"ffffffffffffffffadf85458a2bb4a9aafdc5620273d3cf1\
d8b9c583ce2d3695a9e13641146433fbcc939dce249b3ef9\
7d2fe363630c75d8f681b202aec4617ad3df1ed5d5fd6561\
2433f51f5f066ed0856365553ded1af3b557135e7f57c935\
984f0c70e0e68b77e2a689daf3efe8721df158a136ade735\
30acca4f483a797abc0ab182b324fb61d108a94bb2c8e3fb\
b96adab760d7f4681d4f42a3de394df4ae56ede76372bb19\
0b07a7c8ee0a6d709e02fce1cdf7e2ecc03404cd28342f61\
9172fe9ce98583ff8e4f1232eef28183c3fe3b1b4c6fad73\
3bb5fcbc2ec22005c58ef1837d1683b2c6f34a26c1b2effa\
886b423861285c97ffffffffffffffff";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrimeField {
    modulus: BigUint,
}

impl PrimeField {
    /// The field the share compiler works in
    pub fn ffdhe2048() -> Self {
        Self {
            // The constant is a valid hex literal
            modulus: BigUint::parse_bytes(FFDHE2048_HEX, 16).unwrap(),
        }
    }

    pub fn modulus(&self) -> &BigUint {
        &self.modulus
    }

    /// Uniform element of `[0, modulus)`
    pub fn sample_element<R: RngCore + ?Sized>(&self, rng: &mut R) -> BigUint {
        rng.gen_biguint_below(&self.modulus)
    }

    pub fn add(&self, a: &BigUint, b: &BigUint) -> BigUint {
        (a + b) % &self.modulus
    }

    pub fn sub(&self, a: &BigUint, b: &BigUint) -> BigUint {
        ((a + &self.modulus) - (b % &self.modulus)) % &self.modulus
    }

    pub fn mul(&self, a: &BigUint, b: &BigUint) -> BigUint {
        (a * b) % &self.modulus
    }

    /// Multiplicative inverse by the extended Euclidean algorithm.
    /// `None` for zero and for elements sharing a factor with the modulus.
    pub fn inverse(&self, a: &BigUint) -> Option<BigUint> {
        if a.is_zero() {
            return None;
        }
        let a = BigInt::from_biguint(Sign::Plus, a % &self.modulus);
        let m = BigInt::from_biguint(Sign::Plus, self.modulus.clone());
        let gcd = a.extended_gcd(&m);
        if !gcd.gcd.is_one() {
            return None;
        }
        let inv = gcd.x.mod_floor(&m);
        inv.to_biguint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn modulus_is_the_expected_size() {
        let field = PrimeField::ffdhe2048();
        assert_eq!(field.modulus().bits(), 2048);
    }

    #[test]
    fn inverse_round_trip() {
        let field = PrimeField::ffdhe2048();
        let mut rng = StdRng::seed_from_u64(0u64);
        for _ in 0..8 {
            let a = field.sample_element(&mut rng);
            if a.is_zero() {
                continue;
            }
            let inv = field.inverse(&a).unwrap();
            assert!(field.mul(&a, &inv).is_one());
        }
    }

    #[test]
    fn zero_has_no_inverse() {
        let field = PrimeField::ffdhe2048();
        assert_eq!(field.inverse(&BigUint::zero()), None);
    }

    #[test]
    fn subtraction_wraps() {
        let field = PrimeField::ffdhe2048();
        let one = BigUint::one();
        let two = &one + &one;
        let expected = field.modulus() - &one;
        assert_eq!(field.sub(&one, &two), expected);
    }
}
