//! Policy syntax tree and the share semantics of its nodes.
//!
//! Dealing walks the tree top-down carrying an `(x, y)` pair, starting from
//! `(0, root_secret)`. An `and` node splits its secret with a (2,2) Shamir
//! sharing, handing abscissa 1 to the left subtree and 2 to the right; an
//! `or` node hands the same secret to both subtrees under those abscissae;
//! a leaf binds its identifier to the pair it received. Reconstruction runs
//! the same walk bottom-up: `and` interpolates `(1, left.y)` and
//! `(2, right.y)` at zero, `or` takes whichever subtree recombined,
//! preferring the left.

use crate::error::PolicyError;
use num_bigint::BigUint;
use num_traits::Zero;
use rand::RngCore;
use secret_sharing::{deal_secret, PrimeField, Share, Shares};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// The `(x, y)` pair bound to one policy atom. `x` is the abscissa of the
/// share in its parent's polynomial, `y` the share value. `(0, 0)` is the
/// empty share marking a member outside the policy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyShare {
    pub x: BigUint,
    pub y: BigUint,
}

impl PolicyShare {
    pub fn empty() -> Self {
        Self {
            x: BigUint::zero(),
            y: BigUint::zero(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_zero() && self.y.is_zero()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinOp {
    And,
    Or,
}

/// Owned policy tree; children only, no back-edges
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SyntaxNode {
    Leaf(String),
    BinOp {
        op: BinOp,
        left: Box<SyntaxNode>,
        right: Box<SyntaxNode>,
    },
}

impl SyntaxNode {
    /// Monotone truth evaluation; identifiers absent from `members` are false
    pub fn evaluate(&self, members: &BTreeSet<String>) -> bool {
        match self {
            Self::Leaf(id) => members.contains(id),
            Self::BinOp { op, left, right } => match op {
                BinOp::And => left.evaluate(members) && right.evaluate(members),
                BinOp::Or => left.evaluate(members) || right.evaluate(members),
            },
        }
    }

    /// Collect the leaf identifiers
    pub fn atoms(&self, out: &mut BTreeSet<String>) {
        match self {
            Self::Leaf(id) => {
                out.insert(id.clone());
            }
            Self::BinOp { left, right, .. } => {
                left.atoms(out);
                right.atoms(out);
            }
        }
    }

    /// Distribute `share` over this subtree, binding each leaf identifier.
    /// A repeated identifier keeps the binding made last.
    pub fn deal_shares<R: RngCore>(
        &self,
        rng: &mut R,
        field: &PrimeField,
        share: PolicyShare,
        out: &mut BTreeMap<String, PolicyShare>,
    ) -> Result<(), PolicyError> {
        match self {
            Self::Leaf(id) => {
                out.insert(id.clone(), share);
                Ok(())
            }
            Self::BinOp { op, left, right } => {
                let (left_share, right_share) = match op {
                    BinOp::And => {
                        let halves = deal_secret(rng, &share.y, 2, 2, field)?;
                        (
                            PolicyShare {
                                x: BigUint::from(1u32),
                                y: halves.0[0].share.clone(),
                            },
                            PolicyShare {
                                x: BigUint::from(2u32),
                                y: halves.0[1].share.clone(),
                            },
                        )
                    }
                    BinOp::Or => (
                        PolicyShare {
                            x: BigUint::from(1u32),
                            y: share.y.clone(),
                        },
                        PolicyShare {
                            x: BigUint::from(2u32),
                            y: share.y,
                        },
                    ),
                };
                left.deal_shares(rng, field, left_share, out)?;
                right.deal_shares(rng, field, right_share, out)
            }
        }
    }

    /// Recombine this subtree's secret from the bound shares, or `None`
    /// when the bound atoms do not satisfy the subtree
    pub fn reconstruct(
        &self,
        env: &BTreeMap<String, PolicyShare>,
        field: &PrimeField,
    ) -> Option<PolicyShare> {
        match self {
            Self::Leaf(id) => env.get(id).cloned(),
            Self::BinOp { op, left, right } => match op {
                BinOp::And => {
                    let l = left.reconstruct(env, field)?;
                    let r = right.reconstruct(env, field)?;
                    let halves = Shares(vec![
                        Share {
                            id: 1,
                            threshold: 2,
                            share: l.y,
                        },
                        Share {
                            id: 2,
                            threshold: 2,
                            share: r.y,
                        },
                    ]);
                    let y = halves.reconstruct_secret(field).ok()?;
                    Some(PolicyShare {
                        x: BigUint::zero(),
                        y,
                    })
                }
                BinOp::Or => left
                    .reconstruct(env, field)
                    .or_else(|| right.reconstruct(env, field)),
            },
        }
    }
}
