//! The design philosophy underlying `bounded_poseidon2` is pedagogical, yet mathematically rigorous.
//! Each module encapsulates a discrete concept in modern computational complexity theory,
//! illustrating how modest abstractions compose into a cohesive proof infrastructure.
//!
//! This crate aspires to bridge gaps between theoretical exposition and practical engineering,
//! serving both as a didactic resource and a foundation for future cryptographic research.
//! Tunables for the bounded arithmetic chip.

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Smallest accepted threshold.  The S-box output `(p-1)^7` needs 217 bits.
pub const MIN_BOUND_BITS: u32 = 218;

/// Largest accepted threshold.  Keeps `2^(bits-30) * p` below the BN254
/// scalar modulus so a reduction's quotient decomposition cannot wrap.
pub const MAX_BOUND_BITS: u32 = 250;

/// Errors raised when validating a [`ChipConfig`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("max_bound_bits {actual} outside supported range [{min}, {max}]")]
    /// The reduction threshold is unsound or too small for the S-box.
    BoundBitsOutOfRange {
        /// Requested value.
        actual: u32,
        /// Lower limit.
        min: u32,
        /// Upper limit.
        max: u32,
    },
}

/// Configuration of the lazy-reduction discipline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChipConfig {
    /// Tracked bounds must stay strictly below `2^max_bound_bits`; an
    /// operand is reduced whenever a result would reach it.
    pub max_bound_bits: u32,
}

impl Default for ChipConfig {
    fn default() -> Self {
        Self {
            max_bound_bits: MAX_BOUND_BITS,
        }
    }
}

impl ChipConfig {
    /// Checks the threshold against the supported range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if (MIN_BOUND_BITS..=MAX_BOUND_BITS).contains(&self.max_bound_bits) {
            Ok(())
        } else {
            Err(ConfigError::BoundBitsOutOfRange {
                actual: self.max_bound_bits,
                min: MIN_BOUND_BITS,
                max: MAX_BOUND_BITS,
            })
        }
    }

    /// The exclusive bound `2^max_bound_bits`.
    pub fn threshold(&self) -> BigUint {
        BigUint::from(1u8) << self.max_bound_bits as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::MODULUS;
    use ark_bn254::Fr;
    use ark_ff::PrimeField;

    #[test]
    fn test_default_is_valid() {
        assert!(ChipConfig::default().validate().is_ok());
    }

    #[test]
    fn test_out_of_range_rejected() {
        let low = ChipConfig { max_bound_bits: 64 };
        assert_eq!(
            low.validate(),
            Err(ConfigError::BoundBitsOutOfRange {
                actual: 64,
                min: MIN_BOUND_BITS,
                max: MAX_BOUND_BITS
            })
        );
        assert!(ChipConfig { max_bound_bits: 253 }.validate().is_err());
    }

    #[test]
    fn test_limits_are_sound() {
        let p = BigUint::from(MODULUS);
        let sbox_bound = (&p - 1u32).pow(7);
        assert!(sbox_bound < ChipConfig { max_bound_bits: MIN_BOUND_BITS }.threshold());
        let native: BigUint = Fr::MODULUS.into();
        let widest_quotient = BigUint::from(1u8) << (MAX_BOUND_BITS - 30) as usize;
        assert!(widest_quotient * &p < native);
    }

    #[test]
    fn test_deserialize_defaults() {
        let cfg: ChipConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, ChipConfig::default());
        let cfg: ChipConfig = serde_json::from_str(r#"{"max_bound_bits":230}"#).unwrap();
        assert_eq!(cfg.max_bound_bits, 230);
    }
}
