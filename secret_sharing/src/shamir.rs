//! Shamir secret sharing

use crate::error::SSError;
use crate::field::PrimeField;
use num_bigint::BigUint;
use num_traits::{One, Zero};
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// ShareId must be greater than 0
pub type ShareId = u16;

/// Share used in Shamir secret sharing
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Share {
    pub id: ShareId,
    pub threshold: ShareId,
    pub share: BigUint,
}

/// Collection of [`Share`]s. A sufficient number of them reconstruct the
/// secret. Shares are expected to be unique and carry the same threshold.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shares(pub Vec<Share>);

/// Generate a random secret with its shares. At least `threshold` shares
/// are needed to reconstruct it.
pub fn deal_random_secret<R: RngCore>(
    rng: &mut R,
    threshold: ShareId,
    total: ShareId,
    field: &PrimeField,
) -> Result<(BigUint, Shares), SSError> {
    let secret = field.sample_element(rng);
    let shares = deal_secret(rng, &secret, threshold, total, field)?;
    Ok((secret, shares))
}

/// Same as [`deal_random_secret`] but accepts the secret to share
pub fn deal_secret<R: RngCore>(
    rng: &mut R,
    secret: &BigUint,
    threshold: ShareId,
    total: ShareId,
    field: &PrimeField,
) -> Result<Shares, SSError> {
    if threshold < 1 || total < 2 || threshold > total {
        return Err(SSError::InvalidThresholdOrTotal(threshold, total));
    }
    let mut coefficients = Vec::with_capacity(threshold as usize);
    coefficients.push(secret % field.modulus());
    for _ in 1..threshold {
        coefficients.push(field.sample_element(rng));
    }
    let shares = (1..=total)
        .map(|id| Share {
            id,
            threshold,
            share: evaluate(&coefficients, id, field),
        })
        .collect();
    Ok(Shares(shares))
}

/// Horner evaluation of the share polynomial at `x`
fn evaluate(coefficients: &[BigUint], x: ShareId, field: &PrimeField) -> BigUint {
    let x = BigUint::from(x);
    coefficients
        .iter()
        .rev()
        .fold(BigUint::zero(), |acc, c| field.add(&field.mul(&acc, &x), c))
}

impl Shares {
    pub fn threshold(&self) -> ShareId {
        self.0[0].threshold
    }

    /// Reconstruct the secret from the first `threshold` shares by Lagrange
    /// interpolation at zero.
    pub fn reconstruct_secret(&self, field: &PrimeField) -> Result<BigUint, SSError> {
        let threshold = self.threshold();
        let len = self.0.len() as ShareId;
        if threshold > len {
            return Err(SSError::BelowThreshold(threshold, len));
        }
        let shares = &self.0[0..threshold as usize];
        let ids: Vec<ShareId> = shares.iter().map(|s| s.id).collect();
        let basis = lagrange_basis_at_0(&ids, field)?;
        Ok(basis
            .iter()
            .zip(shares)
            .fold(BigUint::zero(), |acc, (b, s)| {
                field.add(&acc, &field.mul(b, &s.share))
            }))
    }
}

/// The Lagrange basis polynomials evaluated at zero for the given `x`
/// coordinates: `prod_{j != i} x_j / (x_j - x_i)` for each `i`.
pub fn lagrange_basis_at_0(ids: &[ShareId], field: &PrimeField) -> Result<Vec<BigUint>, SSError> {
    for (idx, id) in ids.iter().enumerate() {
        if *id == 0 {
            return Err(SSError::ShareIdCannotBeZero);
        }
        if ids[..idx].contains(id) {
            return Err(SSError::DuplicateShareId(*id));
        }
    }
    let mut basis = Vec::with_capacity(ids.len());
    for x_i in ids {
        let mut numerator = BigUint::one();
        let mut denominator = BigUint::one();
        for x_j in ids {
            if x_j == x_i {
                continue;
            }
            let xj = BigUint::from(*x_j);
            numerator = field.mul(&numerator, &xj);
            denominator = field.mul(&denominator, &field.sub(&xj, &BigUint::from(*x_i)));
        }
        // Invertible: the denominator is a product of non-zero differences
        let denominator_inv = field.inverse(&denominator).unwrap();
        basis.push(field.mul(&numerator, &denominator_inv));
    }
    Ok(basis)
}
