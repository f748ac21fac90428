#![deny(missing_docs)]

//! The design philosophy underlying `bounded_poseidon2` is pedagogical, yet mathematically rigorous.
//! Each module encapsulates a discrete concept in modern computational complexity theory,
//! illustrating how modest abstractions compose into a cohesive proof infrastructure.
//!
//! This crate aspires to bridge gaps between theoretical exposition and practical engineering,
//! serving both as a didactic resource and a foundation for future cryptographic research.
//! # bounded_poseidon2
//!
//! **bounded_poseidon2** constrains the width-16 Poseidon2 permutation over the
//! 31-bit KoalaBear field `p = 2013265921` inside a BN254 rank-1 constraint
//! system.  Small-field elements are carried as native BN254 variables
//! together with an integer bound on their magnitude, and a modular reduction
//! is only emitted when a result could otherwise wrap the native field.
//!
//! ## Features
//!
//! * **Reference field** via the [`KoalaBear`](field/struct.KoalaBear.html) type.
//! * **Bounded arithmetic**: [`FieldChip`](chip/struct.FieldChip.html) performs
//!   additions, multiplications and reductions on
//!   [`BoundedVar`](bounded/struct.BoundedVar.html) values, over either the R1CS
//!   backend or a native counting backend.
//! * **Poseidon2 gadget**: [`Poseidon2Chip`](poseidon2/struct.Poseidon2Chip.html)
//!   runs 4 full rounds, 13 partial rounds and 4 full rounds with the `x^7` S-box,
//!   next to an out-of-circuit reference permutation.
//! * **Conformance harness**: [`run_harness`](harness/fn.run_harness.html)
//!   checks a permutation in circuit, optionally through Groth16.
//!
//! ## Usage
//!
//! ```rust
//! use bounded_poseidon2::{ChipConfig, FieldChip, KoalaBear, NativeBackend};
//! use bounded_poseidon2::{Poseidon2Chip, RoundConstants, WIDTH};
//!
//! let constants = RoundConstants::standard().unwrap();
//! let perm = Poseidon2Chip::new(&constants).unwrap();
//! let mut chip = FieldChip::new(NativeBackend::new(), ChipConfig::default()).unwrap();
//!
//! let input = [KoalaBear::new(1); WIDTH];
//! let state = input.map(|v| chip.constant(v));
//! let out = perm.permute(&mut chip, state).unwrap();
//!
//! let expected = perm.permute_native(input);
//! for (lane, want) in out.iter().zip(expected) {
//!     assert_eq!(chip.residue(lane), Some(want));
//! }
//! ```

pub mod backend;
pub mod bounded;
pub mod chip;
pub mod config;
pub mod constants;
pub mod field;
pub mod harness;
pub mod poseidon2;
pub mod prng;

pub use backend::{ArithmeticBackend, NativeBackend, OpCounts, R1csBackend};
pub use bounded::BoundedVar;
pub use chip::FieldChip;
pub use config::{ChipConfig, ConfigError};
pub use constants::{ConstantsError, RoundConstants, RC16_TABLE, WIDTH};
pub use field::{lift_all, KoalaBear, MODULUS};
pub use harness::{
    run_harness, HarnessError, HarnessMode, HarnessParams, HarnessReport, Poseidon2Circuit,
};
pub use poseidon2::{Poseidon2Chip, RoundKind, RoundSchedule, State};
pub use prng::{random_element, random_state, sampler};
