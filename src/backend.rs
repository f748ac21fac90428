//! The design philosophy underlying `bounded_poseidon2` is pedagogical, yet mathematically rigorous.
//! Each module encapsulates a discrete concept in modern computational complexity theory,
//! illustrating how modest abstractions compose into a cohesive proof infrastructure.
//!
//! This crate aspires to bridge gaps between theoretical exposition and practical engineering,
//! serving both as a didactic resource and a foundation for future cryptographic research.
//! Arithmetic capabilities consumed from a constraint-system backend.
//!
//! The gadgets in this crate never talk to a proof system directly.  They
//! drive an [`ArithmeticBackend`], which exposes native-field addition,
//! multiplication, scaling, equality assertions and a modular-reduction
//! primitive backed by a range-check proof.  Two backends ship with the
//! crate: [`R1csBackend`] emits rank-1 constraints through arkworks, and
//! [`NativeBackend`] evaluates the same program directly over the native
//! field while auditing the magnitude bounds the gadgets track.

use crate::field::{KoalaBear, MODULUS, MODULUS_BITS};
use ark_bn254::Fr;
use ark_ff::{Field, One, PrimeField};
use ark_r1cs_std::{
    alloc::AllocVar, boolean::Boolean, eq::EqGadget, fields::fp::FpVar, fields::FieldVar, R1CSVar,
};
use ark_relations::r1cs::{ConstraintSystemRef, SynthesisError};
use num_bigint::BigUint;
use std::fmt;

/// Converts a native field element into its integer representative in `[0, r)`.
pub fn native_to_biguint(value: Fr) -> BigUint {
    value.into_bigint().into()
}

/// Converts an integer into the native field, reducing modulo the native order.
pub fn biguint_to_native(value: &BigUint) -> Fr {
    Fr::from_le_bytes_mod_order(&value.to_bytes_le())
}

/// Minimal arithmetic interface a proof backend must provide.
///
/// Values are opaque handles (`Var`).  Operations that only combine
/// existing handles are infallible; operations that allocate witnesses or
/// emit equality constraints may fail with a [`SynthesisError`].
pub trait ArithmeticBackend {
    /// Handle to a native-field quantity inside the backend.
    type Var: Clone + fmt::Debug;

    /// Embeds a public small-field constant.
    fn constant(&mut self, value: KoalaBear) -> Self::Var;

    /// Allocates a new wire holding `value` and constrains it to `[0, p)`.
    fn alloc_canonical(
        &mut self,
        value: Option<KoalaBear>,
        public: bool,
    ) -> Result<Self::Var, SynthesisError>;

    /// Native addition.
    fn add(&mut self, x: &Self::Var, y: &Self::Var) -> Self::Var;

    /// Native multiplication.
    fn mul(&mut self, x: &Self::Var, y: &Self::Var) -> Self::Var;

    /// Native multiplication by a public constant.
    fn mul_by_constant(&mut self, x: &Self::Var, k: Fr) -> Self::Var;

    /// Constrains two handles to carry the same native value.
    fn assert_equal(&mut self, x: &Self::Var, y: &Self::Var) -> Result<(), SynthesisError>;

    /// Returns the canonical residue of `x` modulo `p`, proving
    /// `x = q * p + r` with `r < p`.  `bound` must dominate the integer value
    /// of `x`; it sizes the quotient range check.
    fn reduce_modulus(&mut self, x: &Self::Var, bound: &BigUint)
        -> Result<Self::Var, SynthesisError>;

    /// Returns the assigned native value, if the backend knows it.
    fn value(&self, x: &Self::Var) -> Option<Fr>;
}

/// Rank-1 constraint backend over the BN254 scalar field.
#[derive(Clone)]
pub struct R1csBackend {
    cs: ConstraintSystemRef<Fr>,
}

impl R1csBackend {
    /// Wraps an arkworks constraint system.
    pub fn new(cs: ConstraintSystemRef<Fr>) -> Self {
        Self { cs }
    }

    /// Returns the underlying constraint system.
    pub fn cs(&self) -> &ConstraintSystemRef<Fr> {
        &self.cs
    }

    /// Number of constraints emitted so far.
    pub fn num_constraints(&self) -> usize {
        self.cs.num_constraints()
    }

    /// Allocates `num_bits` boolean witnesses and returns their little-endian
    /// composition.
    fn decompose(
        &self,
        value: Option<&BigUint>,
        num_bits: usize,
    ) -> Result<FpVar<Fr>, SynthesisError> {
        let mut acc = FpVar::zero();
        let mut coeff = Fr::one();
        for i in 0..num_bits {
            let bit = Boolean::new_witness(self.cs.clone(), || {
                value
                    .map(|v| v.bit(i as u64))
                    .ok_or(SynthesisError::AssignmentMissing)
            })?;
            acc += FpVar::from(bit) * coeff;
            coeff.double_in_place();
        }
        Ok(acc)
    }

    /// Enforces `0 <= x <= p - 1` given the integer witness of `x`.
    fn enforce_canonical(
        &self,
        x: &FpVar<Fr>,
        value: Option<&BigUint>,
    ) -> Result<(), SynthesisError> {
        let top = BigUint::from(MODULUS - 1);
        let low = self.decompose(value, MODULUS_BITS)?;
        low.enforce_equal(x)?;
        // An out-of-range witness gets a zero complement, which leaves the
        // system unsatisfied instead of aborting synthesis.
        let complement = value.map(|v| if *v <= top { &top - v } else { BigUint::default() });
        let gap = self.decompose(complement.as_ref(), MODULUS_BITS)?;
        (FpVar::Constant(biguint_to_native(&top)) - x).enforce_equal(&gap)
    }
}

impl fmt::Debug for R1csBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("R1csBackend")
            .field("num_constraints", &self.cs.num_constraints())
            .finish()
    }
}

impl ArithmeticBackend for R1csBackend {
    type Var = FpVar<Fr>;

    fn constant(&mut self, value: KoalaBear) -> Self::Var {
        FpVar::Constant(value.to_native())
    }

    fn alloc_canonical(
        &mut self,
        value: Option<KoalaBear>,
        public: bool,
    ) -> Result<Self::Var, SynthesisError> {
        let native = || {
            value
                .map(KoalaBear::to_native)
                .ok_or(SynthesisError::AssignmentMissing)
        };
        let var = if public {
            FpVar::new_input(self.cs.clone(), native)?
        } else {
            FpVar::new_witness(self.cs.clone(), native)?
        };
        let integer = value.map(|v| BigUint::from(v.as_u32()));
        self.enforce_canonical(&var, integer.as_ref())?;
        Ok(var)
    }

    fn add(&mut self, x: &Self::Var, y: &Self::Var) -> Self::Var {
        x + y
    }

    fn mul(&mut self, x: &Self::Var, y: &Self::Var) -> Self::Var {
        x * y
    }

    fn mul_by_constant(&mut self, x: &Self::Var, k: Fr) -> Self::Var {
        x * k
    }

    fn assert_equal(&mut self, x: &Self::Var, y: &Self::Var) -> Result<(), SynthesisError> {
        x.enforce_equal(y)
    }

    fn reduce_modulus(
        &mut self,
        x: &Self::Var,
        bound: &BigUint,
    ) -> Result<Self::Var, SynthesisError> {
        let p = BigUint::from(MODULUS);
        let quotient_bits = (bound / &p).bits() as usize;
        tracing::trace!(quotient_bits, "emitting modular reduction");

        let witness = x.value().ok().map(|v| {
            let v = native_to_biguint(v);
            (&v / &p, &v % &p)
        });
        let quotient = self.decompose(witness.as_ref().map(|(q, _)| q), quotient_bits)?;
        let residue = FpVar::new_witness(self.cs.clone(), || {
            witness
                .as_ref()
                .map(|(_, r)| biguint_to_native(r))
                .ok_or(SynthesisError::AssignmentMissing)
        })?;
        self.enforce_canonical(&residue, witness.as_ref().map(|(_, r)| r))?;
        let recomposed = quotient * Fr::from(MODULUS as u64) + &residue;
        recomposed.enforce_equal(x)?;
        Ok(residue)
    }

    fn value(&self, x: &Self::Var) -> Option<Fr> {
        x.value().ok()
    }
}

/// Operation tallies recorded by [`NativeBackend`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OpCounts {
    /// Native additions.
    pub adds: usize,
    /// Native variable-by-variable multiplications.
    pub muls: usize,
    /// Multiplications by public constants.
    pub constant_muls: usize,
    /// Modular reductions.
    pub reductions: usize,
    /// Allocated input wires.
    pub allocations: usize,
    /// Equality assertions.
    pub assertions: usize,
}

/// Constraint-free backend that evaluates directly over the native field.
///
/// Every reduction checks that the bound supplied by the caller really
/// dominates the value being reduced, so a bookkeeping mistake in a gadget
/// panics here instead of silently wrapping.  Failed equality assertions
/// are recorded, mirroring an unsatisfied constraint system.
#[derive(Debug, Clone)]
pub struct NativeBackend {
    counts: OpCounts,
    satisfied: bool,
}

impl Default for NativeBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl NativeBackend {
    /// Creates an empty evaluator.
    pub fn new() -> Self {
        Self {
            counts: OpCounts::default(),
            satisfied: true,
        }
    }

    /// Operation tallies so far.
    pub fn counts(&self) -> OpCounts {
        self.counts
    }

    /// `false` once any equality assertion has failed.
    pub fn is_satisfied(&self) -> bool {
        self.satisfied
    }
}

impl ArithmeticBackend for NativeBackend {
    type Var = Fr;

    fn constant(&mut self, value: KoalaBear) -> Fr {
        value.to_native()
    }

    fn alloc_canonical(
        &mut self,
        value: Option<KoalaBear>,
        _public: bool,
    ) -> Result<Fr, SynthesisError> {
        self.counts.allocations += 1;
        value
            .map(KoalaBear::to_native)
            .ok_or(SynthesisError::AssignmentMissing)
    }

    fn add(&mut self, x: &Fr, y: &Fr) -> Fr {
        self.counts.adds += 1;
        *x + y
    }

    fn mul(&mut self, x: &Fr, y: &Fr) -> Fr {
        self.counts.muls += 1;
        *x * y
    }

    fn mul_by_constant(&mut self, x: &Fr, k: Fr) -> Fr {
        self.counts.constant_muls += 1;
        *x * k
    }

    fn assert_equal(&mut self, x: &Fr, y: &Fr) -> Result<(), SynthesisError> {
        self.counts.assertions += 1;
        if x != y {
            self.satisfied = false;
        }
        Ok(())
    }

    fn reduce_modulus(&mut self, x: &Fr, bound: &BigUint) -> Result<Fr, SynthesisError> {
        self.counts.reductions += 1;
        let v = native_to_biguint(*x);
        assert!(
            v <= *bound,
            "tracked bound {bound} does not dominate value {v}"
        );
        Ok(biguint_to_native(&(v % MODULUS)))
    }

    fn value(&self, x: &Fr) -> Option<Fr> {
        Some(*x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_relations::r1cs::ConstraintSystem;

    fn big(v: u64) -> BigUint {
        BigUint::from(v)
    }

    #[test]
    fn test_r1cs_reduce_produces_residue() {
        let cs = ConstraintSystem::<Fr>::new_ref();
        let mut backend = R1csBackend::new(cs.clone());
        let raw = MODULUS as u64 * 5 + 17;
        let x = FpVar::new_witness(cs.clone(), || Ok(Fr::from(raw))).unwrap();
        let r = backend.reduce_modulus(&x, &big(raw)).unwrap();
        assert_eq!(r.value().unwrap(), Fr::from(17u64));
        assert!(cs.is_satisfied().unwrap());
    }

    #[test]
    fn test_r1cs_reduce_rejects_understated_bound() {
        let cs = ConstraintSystem::<Fr>::new_ref();
        let mut backend = R1csBackend::new(cs.clone());
        // The quotient is 8, but a bound below 2p only leaves room for one bit.
        let raw = MODULUS as u64 * 8 + 3;
        let x = FpVar::new_witness(cs.clone(), || Ok(Fr::from(raw))).unwrap();
        backend
            .reduce_modulus(&x, &big(MODULUS as u64 + 1))
            .unwrap();
        assert!(!cs.is_satisfied().unwrap());
    }

    #[test]
    fn test_alloc_canonical_range_checked() {
        let cs = ConstraintSystem::<Fr>::new_ref();
        let mut backend = R1csBackend::new(cs.clone());
        let top = KoalaBear::new(MODULUS as u64 - 1);
        let var = backend.alloc_canonical(Some(top), false).unwrap();
        assert_eq!(var.value().unwrap(), top.to_native());
        assert!(cs.is_satisfied().unwrap());
        assert!(cs.num_constraints() >= 2 * MODULUS_BITS);
    }

    #[test]
    fn test_alloc_canonical_setup_mode() {
        use ark_relations::r1cs::SynthesisMode;
        let cs = ConstraintSystem::<Fr>::new_ref();
        cs.set_mode(SynthesisMode::Setup);
        let mut backend = R1csBackend::new(cs.clone());
        let var = backend.alloc_canonical(None, true).unwrap();
        backend.reduce_modulus(&var, &big(u32::MAX as u64)).unwrap();
        assert!(cs.num_constraints() > 0);
    }

    #[test]
    fn test_native_backend_counts_and_assertions() {
        let mut backend = NativeBackend::new();
        let a = backend.constant(KoalaBear::new(3));
        let b = backend.constant(KoalaBear::new(4));
        let c = backend.mul(&a, &b);
        let d = backend.add(&c, &a);
        backend.assert_equal(&d, &Fr::from(15u64)).unwrap();
        assert!(backend.is_satisfied());
        backend.assert_equal(&d, &Fr::from(16u64)).unwrap();
        assert!(!backend.is_satisfied());
        let counts = backend.counts();
        assert_eq!(counts.muls, 1);
        assert_eq!(counts.adds, 1);
        assert_eq!(counts.assertions, 2);
    }

    #[test]
    #[should_panic(expected = "does not dominate")]
    fn test_native_backend_catches_unsound_bound() {
        let mut backend = NativeBackend::new();
        let x = Fr::from(MODULUS as u64 * 3);
        let _ = backend.reduce_modulus(&x, &big(MODULUS as u64));
    }
}
