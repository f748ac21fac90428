//! The design philosophy underlying `bounded_poseidon2` is pedagogical, yet mathematically rigorous.
//! Each module encapsulates a discrete concept in modern computational complexity theory,
//! illustrating how modest abstractions compose into a cohesive proof infrastructure.
//!
//! This crate aspires to bridge gaps between theoretical exposition and practical engineering,
//! serving both as a didactic resource and a foundation for future cryptographic research.
//! Small-field values carried as native circuit quantities with a magnitude bound.
//!
//! A [`BoundedVar`] pairs a backend handle with an integer that dominates the
//! handle's value before any native wraparound.  The handle is congruent to
//! the small-field element it represents; it only equals that element once
//! the bound drops to `p - 1`.  Values are immutable: arithmetic in
//! [`FieldChip`](crate::chip::FieldChip) always produces a new `BoundedVar`.

use crate::field::MODULUS;
use num_bigint::BigUint;

/// The bound of a fully reduced element, `p - 1`.
pub fn canonical_bound() -> BigUint {
    BigUint::from(MODULUS - 1)
}

/// A native-field handle plus a sound upper bound on its integer value.
#[derive(Debug, Clone)]
pub struct BoundedVar<V> {
    value: V,
    upper_bound: BigUint,
}

impl<V> BoundedVar<V> {
    /// Wraps a handle known to hold a canonical residue.
    pub fn canonical(value: V) -> Self {
        Self {
            value,
            upper_bound: canonical_bound(),
        }
    }

    /// Wraps a handle with an explicit bound.  The caller vouches that
    /// `bound` dominates the handle's integer value.
    pub fn with_bound(value: V, upper_bound: BigUint) -> Self {
        Self { value, upper_bound }
    }

    /// The backend handle.
    pub fn value(&self) -> &V {
        &self.value
    }

    /// The tracked magnitude bound.
    pub fn upper_bound(&self) -> &BigUint {
        &self.upper_bound
    }

    /// `true` when the bound proves the value is already below `p`.
    pub fn is_canonical(&self) -> bool {
        self.upper_bound < BigUint::from(MODULUS)
    }

    /// Consumes the element, returning the handle.
    pub fn into_value(self) -> V {
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_bound() {
        let v = BoundedVar::canonical(7u8);
        assert!(v.is_canonical());
        assert_eq!(*v.upper_bound(), BigUint::from(MODULUS - 1));
        assert_eq!(v.into_value(), 7);
    }

    #[test]
    fn test_wide_bound_is_not_canonical() {
        let v = BoundedVar::with_bound((), BigUint::from(MODULUS));
        assert!(!v.is_canonical());
        let v = BoundedVar::with_bound((), BigUint::from(3u8));
        assert!(v.is_canonical());
    }
}
