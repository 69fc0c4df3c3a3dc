//! The fixed member universe of the small-universe scheme: a mapping from
//! member to zero-based index, fixed at key generation.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Universe {
    indices: BTreeMap<String, usize>,
    size: usize,
}

impl Universe {
    /// Build a universe from members in declaration order: the member at
    /// position `i` gets index `i`.
    pub fn from_members<I, S>(members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut indices = BTreeMap::new();
        let mut size = 0;
        for member in members {
            indices.insert(member.into(), size);
            size += 1;
        }
        Self { indices, size }
    }

    /// Number of declared members, which is also the length of every
    /// characteristic sequence
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn index_of(&self, member: &str) -> Option<usize> {
        self.indices.get(member).copied()
    }

    /// The characteristic sequence of a set: bit `i` is one iff the member
    /// at universe index `i` is in the set. `None` when the set is not a
    /// subset of the universe.
    pub fn characteristic_sequence(&self, set: &BTreeSet<String>) -> Option<String> {
        let mut bits = vec!['0'; self.size];
        for member in set {
            bits[self.index_of(member)?] = '1';
        }
        Some(bits.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn universe() -> Universe {
        Universe::from_members(["hello", "good", "fun", "dog", "cat"])
    }

    fn set(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn indices_follow_declaration_order() {
        let u = universe();
        assert_eq!(u.len(), 5);
        assert_eq!(u.index_of("hello"), Some(0));
        assert_eq!(u.index_of("cat"), Some(4));
        assert_eq!(u.index_of("bird"), None);
    }

    #[test]
    fn characteristic_sequences() {
        let u = universe();
        assert_eq!(
            u.characteristic_sequence(&set(&["hello", "good", "fun", "dog", "cat"])),
            Some("11111".to_string())
        );
        assert_eq!(
            u.characteristic_sequence(&set(&["hello", "good"])),
            Some("11000".to_string())
        );
        assert_eq!(
            u.characteristic_sequence(&set(&["hello", "cat"])),
            Some("10001".to_string())
        );
        assert_eq!(u.characteristic_sequence(&set(&[])), Some("00000".to_string()));
        assert_eq!(u.characteristic_sequence(&set(&["bird"])), None);
    }
}
