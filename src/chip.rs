//! The design philosophy underlying `bounded_poseidon2` is pedagogical, yet mathematically rigorous.
//! Each module encapsulates a discrete concept in modern computational complexity theory,
//! illustrating how modest abstractions compose into a cohesive proof infrastructure.
//!
//! This crate aspires to bridge gaps between theoretical exposition and practical engineering,
//! serving both as a didactic resource and a foundation for future cryptographic research.
//! Field arithmetic over [`BoundedVar`]s with deferred reduction.
//!
//! Additions and constant scalings are free in the native field, while a
//! modular reduction costs a range-check proof.  [`FieldChip`] therefore
//! lets bounds grow and only reduces an operand when a result bound would
//! reach `2^max_bound_bits`, or when a multiplication would combine two
//! unreduced operands.

use crate::backend::{native_to_biguint, ArithmeticBackend};
use crate::bounded::BoundedVar;
use crate::config::{ChipConfig, ConfigError};
use crate::field::{KoalaBear, MODULUS};
use ark_relations::r1cs::SynthesisError;
use num_bigint::BigUint;

/// Emits small-field arithmetic into an [`ArithmeticBackend`].
#[derive(Debug)]
pub struct FieldChip<B> {
    backend: B,
    config: ChipConfig,
    threshold: BigUint,
    reductions: usize,
}

impl<B: ArithmeticBackend> FieldChip<B> {
    /// Creates a chip after validating `config`.
    pub fn new(backend: B, config: ChipConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_validated(backend, config))
    }

    /// Creates a chip from a configuration that already passed `validate`.
    pub(crate) fn from_validated(backend: B, config: ChipConfig) -> Self {
        Self {
            backend,
            threshold: config.threshold(),
            config,
            reductions: 0,
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &ChipConfig {
        &self.config
    }

    /// Shared access to the backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Releases the backend.
    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Number of reductions emitted by this chip so far.
    pub fn reduction_count(&self) -> usize {
        self.reductions
    }

    /// Embeds a public constant.  Constants carry the canonical bound.
    pub fn constant(&mut self, value: KoalaBear) -> BoundedVar<B::Var> {
        BoundedVar::canonical(self.backend.constant(value))
    }

    /// Allocates a range-checked input wire.
    pub fn alloc_input(
        &mut self,
        value: Option<KoalaBear>,
        public: bool,
    ) -> Result<BoundedVar<B::Var>, SynthesisError> {
        let var = self.backend.alloc_canonical(value, public)?;
        Ok(BoundedVar::canonical(var))
    }

    /// `a + b`, reducing an operand first only if the sum's bound would
    /// reach the threshold.
    pub fn add(
        &mut self,
        a: &BoundedVar<B::Var>,
        b: &BoundedVar<B::Var>,
    ) -> Result<BoundedVar<B::Var>, SynthesisError> {
        let (a, b) = self.make_room(a.clone(), b.clone(), |x, y| x + y)?;
        let bound = a.upper_bound() + b.upper_bound();
        let value = self.backend.add(a.value(), b.value());
        Ok(self.checked(value, bound))
    }

    /// `a * b`.  At least one operand is reduced beforehand so the product
    /// never folds extra multiples of `p` from both sides.
    pub fn mul(
        &mut self,
        a: &BoundedVar<B::Var>,
        b: &BoundedVar<B::Var>,
    ) -> Result<BoundedVar<B::Var>, SynthesisError> {
        let (mut a, mut b) = (a.clone(), b.clone());
        if !a.is_canonical() && !b.is_canonical() {
            if a.upper_bound() >= b.upper_bound() {
                a = self.reduce(&a)?;
            } else {
                b = self.reduce(&b)?;
            }
        }
        let (a, b) = self.make_room(a, b, |x, y| x * y)?;
        let bound = a.upper_bound() * b.upper_bound();
        let value = self.backend.mul(a.value(), b.value());
        Ok(self.checked(value, bound))
    }

    /// `a * k` for a public constant `k`.
    pub fn mul_by_constant(
        &mut self,
        a: &BoundedVar<B::Var>,
        k: KoalaBear,
    ) -> Result<BoundedVar<B::Var>, SynthesisError> {
        let scale = BigUint::from(k.as_u32());
        let mut a = a.clone();
        if !self.fits(&(a.upper_bound() * &scale)) {
            a = self.reduce(&a)?;
        }
        let bound = a.upper_bound() * scale;
        let value = self.backend.mul_by_constant(a.value(), k.to_native());
        Ok(self.checked(value, bound))
    }

    /// Returns the canonical representative of `a`.  Already canonical
    /// inputs are returned unchanged and cost nothing.
    pub fn reduce(&mut self, a: &BoundedVar<B::Var>) -> Result<BoundedVar<B::Var>, SynthesisError> {
        if a.is_canonical() {
            return Ok(a.clone());
        }
        let value = self.backend.reduce_modulus(a.value(), a.upper_bound())?;
        self.reductions += 1;
        Ok(BoundedVar::canonical(value))
    }

    /// `x^7` via `x^2, x^4, x^6 = x^4 * x^2, x^7 = x^6 * x`.
    ///
    /// Every factor is a power of one canonical base, so the product bounds
    /// are exact powers of `p - 1` and stay below `2^217`.  The result is
    /// reduced straight away.
    pub fn sbox(&mut self, a: &BoundedVar<B::Var>) -> Result<BoundedVar<B::Var>, SynthesisError> {
        let x = self.reduce(a)?;
        let x2 = self.power_step(&x, &x);
        let x4 = self.power_step(&x2, &x2);
        let x6 = self.power_step(&x4, &x2);
        let x7 = self.power_step(&x6, &x);
        self.reduce(&x7)
    }

    /// Constrains `a` and `b` to represent the same small-field element.
    pub fn assert_equal(
        &mut self,
        a: &BoundedVar<B::Var>,
        b: &BoundedVar<B::Var>,
    ) -> Result<(), SynthesisError> {
        let a = self.reduce(a)?;
        let b = self.reduce(b)?;
        self.backend.assert_equal(a.value(), b.value())
    }

    /// The small-field element carried by `a`, when the backend knows it.
    pub fn residue(&self, a: &BoundedVar<B::Var>) -> Option<KoalaBear> {
        let native = self.backend.value(a.value())?;
        let r = native_to_biguint(native) % MODULUS;
        Some(KoalaBear::new(r.to_u64_digits().first().copied().unwrap_or(0)))
    }

    fn power_step(&mut self, a: &BoundedVar<B::Var>, b: &BoundedVar<B::Var>) -> BoundedVar<B::Var> {
        let bound = a.upper_bound() * b.upper_bound();
        let value = self.backend.mul(a.value(), b.value());
        self.checked(value, bound)
    }

    fn fits(&self, bound: &BigUint) -> bool {
        *bound < self.threshold
    }

    fn checked(&self, value: B::Var, bound: BigUint) -> BoundedVar<B::Var> {
        assert!(
            self.fits(&bound),
            "bound of {} bits exceeds the {}-bit threshold",
            bound.bits(),
            self.config.max_bound_bits
        );
        BoundedVar::with_bound(value, bound)
    }

    /// Reduces the wider operand until `combine` of the two bounds fits.
    fn make_room(
        &mut self,
        mut a: BoundedVar<B::Var>,
        mut b: BoundedVar<B::Var>,
        combine: impl Fn(&BigUint, &BigUint) -> BigUint,
    ) -> Result<(BoundedVar<B::Var>, BoundedVar<B::Var>), SynthesisError> {
        while !self.fits(&combine(a.upper_bound(), b.upper_bound())) {
            assert!(
                !(a.is_canonical() && b.is_canonical()),
                "canonical operands cannot be combined below the threshold"
            );
            tracing::trace!(
                lhs_bits = a.upper_bound().bits(),
                rhs_bits = b.upper_bound().bits(),
                "reducing operand to stay below threshold"
            );
            if a.upper_bound() >= b.upper_bound() {
                a = self.reduce(&a)?;
            } else {
                b = self.reduce(&b)?;
            }
        }
        Ok((a, b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{NativeBackend, R1csBackend};
    use crate::bounded::canonical_bound;
    use crate::prng::{random_element, sampler};
    use ark_bn254::Fr;
    use ark_relations::r1cs::ConstraintSystem;
    use proptest::prelude::*;

    fn native_chip() -> FieldChip<NativeBackend> {
        FieldChip::new(NativeBackend::new(), ChipConfig::default()).unwrap()
    }

    /// An element congruent to `v` but carrying `extra` multiples of `p`.
    fn unreduced(v: KoalaBear, extra: u64) -> BoundedVar<Fr> {
        let raw = v.as_u32() as u64 + extra * MODULUS as u64;
        BoundedVar::with_bound(Fr::from(raw), BigUint::from(raw))
    }

    #[test]
    fn test_add_tracks_bound_without_reducing() {
        let mut chip = native_chip();
        let a = chip.constant(KoalaBear::new(5));
        let b = chip.constant(KoalaBear::new(MODULUS as u64 - 1));
        let c = chip.add(&a, &b).unwrap();
        assert_eq!(*c.upper_bound(), canonical_bound() * 2u32);
        assert_eq!(chip.reduction_count(), 0);
        assert_eq!(chip.residue(&c), Some(KoalaBear::new(4)));
    }

    #[test]
    fn test_mul_reduces_one_unreduced_operand() {
        let mut chip = native_chip();
        let a = unreduced(KoalaBear::new(3), 4);
        let b = unreduced(KoalaBear::new(7), 2);
        let c = chip.mul(&a, &b).unwrap();
        assert_eq!(chip.reduction_count(), 1);
        assert_eq!(chip.residue(&c), Some(KoalaBear::new(21)));
        // The wider operand was reduced, the narrower one kept its bound.
        let expected = canonical_bound() * (7u64 + 2 * MODULUS as u64);
        assert_eq!(*c.upper_bound(), expected);
    }

    #[test]
    fn test_repeated_scaling_reduces_at_threshold() {
        let mut chip = native_chip();
        let mut acc = chip.constant(KoalaBear::new(11));
        let k = KoalaBear::new(MODULUS as u64 - 2);
        let mut expected = KoalaBear::new(11);
        for _ in 0..40 {
            acc = chip.mul_by_constant(&acc, k).unwrap();
            expected = expected * k;
            assert!(acc.upper_bound().bits() <= chip.config().max_bound_bits as u64);
        }
        assert!(chip.reduction_count() > 0);
        assert_eq!(chip.residue(&acc), Some(expected));
    }

    #[test]
    fn test_sbox_matches_seventh_power() {
        let mut chip = native_chip();
        let x = unreduced(KoalaBear::new(1_234_567), 30);
        let y = chip.sbox(&x).unwrap();
        assert!(y.is_canonical());
        assert_eq!(chip.residue(&y), Some(KoalaBear::new(1_234_567).pow(7)));
        assert_eq!(chip.backend().counts().muls, 4);
        assert_eq!(chip.reduction_count(), 2);
    }

    #[test]
    fn test_assert_equal_on_congruent_values() {
        let mut chip = native_chip();
        let a = unreduced(KoalaBear::new(42), 9);
        let b = chip.constant(KoalaBear::new(42));
        chip.assert_equal(&a, &b).unwrap();
        assert!(chip.backend().is_satisfied());
        let c = chip.constant(KoalaBear::new(43));
        chip.assert_equal(&a, &c).unwrap();
        assert!(!chip.into_backend().is_satisfied());
    }

    #[test]
    fn test_r1cs_chip_is_satisfied() {
        let cs = ConstraintSystem::<Fr>::new_ref();
        let mut chip = FieldChip::new(R1csBackend::new(cs.clone()), ChipConfig::default()).unwrap();
        let mut rng = sampler(7);
        let a_val = random_element(&mut rng);
        let b_val = random_element(&mut rng);
        let a = chip.alloc_input(Some(a_val), false).unwrap();
        let b = chip.alloc_input(Some(b_val), false).unwrap();
        let s = chip.add(&a, &b).unwrap();
        let m = chip.mul(&s, &a).unwrap();
        let y = chip.sbox(&m).unwrap();
        let expected = chip.constant(((a_val + b_val) * a_val).pow(7));
        chip.assert_equal(&y, &expected).unwrap();
        assert!(cs.is_satisfied().unwrap());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let err = FieldChip::new(NativeBackend::new(), ChipConfig { max_bound_bits: 300 });
        assert!(err.is_err());
    }

    proptest! {
        #[test]
        fn prop_add_and_scale_match_reference(
            a in 0u32..MODULUS,
            b in 0u32..MODULUS,
            k in 0u32..MODULUS,
            extra_a in 0u64..1_000,
            extra_b in 0u64..1_000,
        ) {
            let mut chip = native_chip();
            let (a, b, k) = (KoalaBear::from(a), KoalaBear::from(b), KoalaBear::from(k));
            let x = unreduced(a, extra_a);
            let y = unreduced(b, extra_b);
            let sum = chip.add(&x, &y).unwrap();
            let sum = chip.reduce(&sum).unwrap();
            prop_assert_eq!(chip.residue(&sum), Some(a + b));
            let scaled = chip.mul_by_constant(&x, k).unwrap();
            let scaled = chip.reduce(&scaled).unwrap();
            prop_assert_eq!(chip.residue(&scaled), Some(a * k));
            let product = chip.mul(&x, &y).unwrap();
            prop_assert_eq!(chip.residue(&product), Some(a * b));
        }

        #[test]
        fn prop_reduce_is_idempotent(v in 0u32..MODULUS, extra in 0u64..(1u64 << 32)) {
            let mut chip = native_chip();
            let v = KoalaBear::from(v);
            let x = unreduced(v, extra);
            let once = chip.reduce(&x).unwrap();
            let count = chip.reduction_count();
            let twice = chip.reduce(&once).unwrap();
            prop_assert_eq!(once.value(), twice.value());
            prop_assert_eq!(twice.upper_bound(), &canonical_bound());
            prop_assert_eq!(chip.reduction_count(), count);
            prop_assert_eq!(chip.residue(&twice), Some(v));
        }
    }
}
