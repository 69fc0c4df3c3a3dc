//! The monotone policy language of the large-universe redactable set
//! signature scheme.
//!
//! Grammar:
//!
//! ```text
//! expr   := factor ((and | or) factor)*
//! factor := ID | "(" expr ")"
//! ```
//!
//! `and` and `or` have equal precedence and are left-associative, so
//! `a or b and c` parses as `(a or b) and c`. This is a fixed property of
//! the language: changing it would silently change every share map dealt
//! from an unparenthesized policy.
//!
//! A [`Policy`] supports three operations: truth evaluation against a set
//! of members (unbound identifiers are false), dealing shares of a fresh
//! secret to the policy's atoms such that exactly the satisfying sets can
//! recombine it, and reconstructing the secret from a share map.

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;

pub use ast::{BinOp, PolicyShare, SyntaxNode};
pub use error::PolicyError;

use num_bigint::BigUint;
use num_traits::Zero;
use rand::RngCore;
use secret_sharing::PrimeField;
use std::collections::{BTreeMap, BTreeSet};

/// A parsed policy formula
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Policy {
    source: String,
    root: SyntaxNode,
}

impl Policy {
    pub fn parse(source: &str) -> Result<Self, PolicyError> {
        Ok(Self {
            source: source.to_string(),
            root: parser::parse(source)?,
        })
    }

    /// The formula text this policy was parsed from
    pub fn text(&self) -> &str {
        &self.source
    }

    /// The identifiers appearing as leaves of the formula
    pub fn atoms(&self) -> BTreeSet<String> {
        let mut atoms = BTreeSet::new();
        self.root.atoms(&mut atoms);
        atoms
    }

    /// Monotone evaluation with the given members bound true and every
    /// other identifier false
    pub fn is_satisfied_by(&self, members: &BTreeSet<String>) -> bool {
        self.root.evaluate(members)
    }

    /// Deal shares of a freshly sampled secret to the policy's atoms. The
    /// full share map reconstructs the secret, as does the restriction to
    /// any satisfying set of atoms.
    pub fn deal_shares<R: RngCore>(
        &self,
        rng: &mut R,
        field: &PrimeField,
    ) -> Result<BTreeMap<String, PolicyShare>, PolicyError> {
        let root_secret = field.sample_element(rng);
        let mut shares = BTreeMap::new();
        self.root.deal_shares(
            rng,
            field,
            PolicyShare {
                x: BigUint::zero(),
                y: root_secret,
            },
            &mut shares,
        )?;
        Ok(shares)
    }

    /// Recombine the secret from the shares of present atoms, or `None`
    /// when the present atoms do not satisfy the formula
    pub fn reconstruct(
        &self,
        shares: &BTreeMap<String, PolicyShare>,
        field: &PrimeField,
    ) -> Option<BigUint> {
        self.root.reconstruct(shares, field).map(|share| share.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn members(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn truth_evaluation() {
        let policy = Policy::parse("(a and b) or (c and d)").unwrap();
        assert!(policy.is_satisfied_by(&members(&["a", "b"])));
        assert!(policy.is_satisfied_by(&members(&["c", "d"])));
        assert!(policy.is_satisfied_by(&members(&["a", "b", "c", "d"])));
        assert!(!policy.is_satisfied_by(&members(&["a", "c"])));
        assert!(!policy.is_satisfied_by(&members(&["a"])));
        assert!(!policy.is_satisfied_by(&members(&[])));
    }

    #[test]
    fn unbound_identifiers_are_false() {
        let policy = Policy::parse("a and b").unwrap();
        assert!(!policy.is_satisfied_by(&members(&["a"])));
        assert!(!policy.is_satisfied_by(&members(&["a", "x"])));
    }

    #[test]
    fn operators_are_left_associative_with_equal_precedence() {
        // `a or b and c` parses as `(a or b) and c`
        let policy = Policy::parse("a or b and c").unwrap();
        assert!(!policy.is_satisfied_by(&members(&["a"])));
        assert!(policy.is_satisfied_by(&members(&["a", "c"])));
        assert!(policy.is_satisfied_by(&members(&["b", "c"])));
        assert!(!policy.is_satisfied_by(&members(&["c"])));
    }

    #[test]
    fn parse_errors() {
        assert!(Policy::parse("a and").is_err());
        assert!(Policy::parse("(a and b").is_err());
        assert!(Policy::parse("a b").is_err());
        assert!(Policy::parse("and a").is_err());
        assert!(Policy::parse("").is_err());
        assert!(Policy::parse("()").is_err());
    }

    #[test]
    fn atoms_are_collected() {
        let policy = Policy::parse("(a and b) or (c and d)").unwrap();
        assert_eq!(policy.atoms(), members(&["a", "b", "c", "d"]));
    }

    #[test]
    fn satisfying_sets_reconstruct_the_root_secret() {
        let field = PrimeField::ffdhe2048();
        let mut rng = StdRng::seed_from_u64(0u64);
        let policy = Policy::parse("(a and b) or (c and d)").unwrap();

        let shares = policy.deal_shares(&mut rng, &field).unwrap();
        assert_eq!(shares.len(), 4);
        let secret = policy.reconstruct(&shares, &field).unwrap();

        for satisfying in [&["a", "b"][..], &["c", "d"], &["a", "b", "c"]] {
            let submap: BTreeMap<_, _> = shares
                .iter()
                .filter(|(k, _)| satisfying.contains(&k.as_str()))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            assert_eq!(policy.reconstruct(&submap, &field), Some(secret.clone()));
        }
    }

    #[test]
    fn unsatisfying_sets_reconstruct_nothing() {
        let field = PrimeField::ffdhe2048();
        let mut rng = StdRng::seed_from_u64(1u64);
        let policy = Policy::parse("(a and b) or (c and d)").unwrap();
        let shares = policy.deal_shares(&mut rng, &field).unwrap();

        for unsatisfying in [&["a", "c"][..], &["a"], &[]] {
            let submap: BTreeMap<_, _> = shares
                .iter()
                .filter(|(k, _)| unsatisfying.contains(&k.as_str()))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            assert_eq!(policy.reconstruct(&submap, &field), None);
        }
    }

    #[test]
    fn nested_policies_reconstruct() {
        let field = PrimeField::ffdhe2048();
        let mut rng = StdRng::seed_from_u64(2u64);
        let policy = Policy::parse("((a and b) and c) or d").unwrap();
        let shares = policy.deal_shares(&mut rng, &field).unwrap();
        let secret = policy.reconstruct(&shares, &field).unwrap();

        let only_d: BTreeMap<_, _> = shares
            .iter()
            .filter(|(k, _)| k.as_str() == "d")
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        assert_eq!(policy.reconstruct(&only_d, &field), Some(secret.clone()));

        let abc: BTreeMap<_, _> = shares
            .iter()
            .filter(|(k, _)| k.as_str() != "d")
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        assert_eq!(policy.reconstruct(&abc, &field), Some(secret));
    }

    #[test]
    fn or_shares_are_replicated_and_shares_are_split() {
        let field = PrimeField::ffdhe2048();
        let mut rng = StdRng::seed_from_u64(3u64);

        let policy = Policy::parse("a or b").unwrap();
        let shares = policy.deal_shares(&mut rng, &field).unwrap();
        assert_eq!(shares["a"].y, shares["b"].y);
        assert_eq!(shares["a"].x, BigUint::from(1u32));
        assert_eq!(shares["b"].x, BigUint::from(2u32));

        let policy = Policy::parse("a and b").unwrap();
        let shares = policy.deal_shares(&mut rng, &field).unwrap();
        assert_ne!(shares["a"].y, shares["b"].y);
    }
}
