//! The design philosophy underlying `bounded_poseidon2` is pedagogical, yet mathematically rigorous.
//! Each module encapsulates a discrete concept in modern computational complexity theory,
//! illustrating how modest abstractions compose into a cohesive proof infrastructure.
//!
//! This crate aspires to bridge gaps between theoretical exposition and practical engineering,
//! serving both as a didactic resource and a foundation for future cryptographic research.
//! Out-of-circuit arithmetic in the small prime field.
//!
//! The [`KoalaBear`](struct.KoalaBear.html) type stores a canonical residue
//! modulo [`MODULUS`] and exposes addition, subtraction, multiplication,
//! exponentiation and inversion.  Every operation returns a canonical value.
//! It is the reference against which the in-circuit gadgets are checked and
//! the type in which constants are handed to them.

use ark_bn254::Fr;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

/// Modulus of the small field, `15 * 2^27 + 1`.
pub const MODULUS: u32 = 2_013_265_921;

/// Number of bits needed to hold any canonical residue.
pub const MODULUS_BITS: usize = 31;

/// A canonical element of the small prime field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KoalaBear(u32);

impl KoalaBear {
    /// The additive identity.
    pub const ZERO: Self = KoalaBear(0);
    /// The multiplicative identity.
    pub const ONE: Self = KoalaBear(1);

    /// Creates an element from an arbitrary integer, reducing it modulo `p`.
    #[inline]
    pub const fn new(value: u64) -> Self {
        KoalaBear((value % MODULUS as u64) as u32)
    }

    /// Returns the canonical residue.
    #[inline]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    /// Returns `true` for the zero element.
    #[inline]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Doubles the element.
    #[inline]
    pub fn double(self) -> Self {
        self + self
    }

    /// Exponentiates by `e` using square-and-multiply.
    pub fn pow(self, mut e: u64) -> Self {
        let mut base = self;
        let mut result = Self::ONE;
        while e > 0 {
            if e & 1 == 1 {
                result = result * base;
            }
            base = base * base;
            e >>= 1;
        }
        result
    }

    /// Computes the multiplicative inverse, or `None` for zero.
    ///
    /// Uses Fermat's little theorem: `a^(p-2) mod p`.
    pub fn inverse(self) -> Option<Self> {
        if self.is_zero() {
            None
        } else {
            Some(self.pow(MODULUS as u64 - 2))
        }
    }

    /// Embeds the canonical residue into the native circuit field.
    #[inline]
    pub fn to_native(self) -> Fr {
        Fr::from(self.0 as u64)
    }
}

impl From<u32> for KoalaBear {
    fn from(value: u32) -> Self {
        KoalaBear::new(value as u64)
    }
}

impl fmt::Display for KoalaBear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for KoalaBear {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.0)
    }
}

/// Accepts only canonical residues; a value `>= p` is an error, not reduced.
impl<'de> Deserialize<'de> for KoalaBear {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = u32::deserialize(deserializer)?;
        if raw >= MODULUS {
            return Err(de::Error::custom(format!(
                "{raw} is not a canonical residue modulo {MODULUS}"
            )));
        }
        Ok(KoalaBear(raw))
    }
}

impl Add for KoalaBear {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        // Both operands are below 2^31, so the sum fits in a u32.
        let mut s = self.0 + rhs.0;
        if s >= MODULUS {
            s -= MODULUS;
        }
        KoalaBear(s)
    }
}

impl Sub for KoalaBear {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        if self.0 >= rhs.0 {
            KoalaBear(self.0 - rhs.0)
        } else {
            KoalaBear(MODULUS - (rhs.0 - self.0))
        }
    }
}

impl Mul for KoalaBear {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        KoalaBear::new(self.0 as u64 * rhs.0 as u64)
    }
}

impl Neg for KoalaBear {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        KoalaBear::ZERO - self
    }
}

/// Lifts an array of raw integers into field elements, reducing each.
pub fn lift_all<const N: usize>(values: [u32; N]) -> [KoalaBear; N] {
    values.map(KoalaBear::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reduction_on_construction() {
        assert_eq!(KoalaBear::new(MODULUS as u64).as_u32(), 0);
        assert_eq!(KoalaBear::new(MODULUS as u64 + 5).as_u32(), 5);
        assert_eq!(KoalaBear::from(u32::MAX).as_u32(), u32::MAX - 2 * MODULUS);
    }

    #[test]
    fn test_add_sub_wrap() {
        let a = KoalaBear::new(MODULUS as u64 - 1);
        let b = KoalaBear::new(3);
        assert_eq!((a + b).as_u32(), 2);
        assert_eq!((b - a).as_u32(), 4);
        assert_eq!(-KoalaBear::ONE, a);
    }

    #[test]
    fn test_inverse() {
        let two = KoalaBear::new(2);
        let inv = two.inverse().expect("two is invertible");
        assert_eq!(two * inv, KoalaBear::ONE);
        // 1/2 appears in the internal diagonal.
        assert_eq!(inv.as_u32(), 1_006_632_961);
        assert!(KoalaBear::ZERO.inverse().is_none());
    }

    #[test]
    fn test_pow_matches_repeated_mul() {
        let x = KoalaBear::new(123_456_789);
        let mut acc = KoalaBear::ONE;
        for _ in 0..7 {
            acc = acc * x;
        }
        assert_eq!(x.pow(7), acc);
    }

    #[test]
    fn test_serde_accepts_only_canonical() {
        let x = KoalaBear::new(1_509_949_441);
        let json = serde_json::to_string(&x).unwrap();
        assert_eq!(json, "1509949441");
        assert_eq!(serde_json::from_str::<KoalaBear>(&json).unwrap(), x);
        let top = (MODULUS - 1).to_string();
        assert_eq!(serde_json::from_str::<KoalaBear>(&top).unwrap(), -KoalaBear::ONE);
        assert!(serde_json::from_str::<KoalaBear>(&MODULUS.to_string()).is_err());
        assert!(serde_json::from_str::<KoalaBear>("4294967295").is_err());
        assert!(serde_json::from_str::<KoalaBear>("-1").is_err());
    }

    #[test]
    fn test_modulus_bits() {
        assert!((MODULUS as u64) < (1u64 << MODULUS_BITS));
        assert!((MODULUS as u64) >= (1u64 << (MODULUS_BITS - 1)));
    }
}
