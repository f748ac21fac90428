//! The design philosophy underlying `bounded_poseidon2` is pedagogical, yet mathematically rigorous.
//! Each module encapsulates a discrete concept in modern computational complexity theory,
//! illustrating how modest abstractions compose into a cohesive proof infrastructure.
//!
//! This crate aspires to bridge gaps between theoretical exposition and practical engineering,
//! serving both as a didactic resource and a foundation for future cryptographic research.
//! Poseidon2 permutation gadget, width 16.
//!
//! The permutation applies one external linear layer to the input, then
//! four full rounds, thirteen partial rounds and four more full rounds.  A
//! full round adds sixteen constants, raises every lane to the seventh power
//! and applies the external layer.  A partial round touches only lane 0
//! before the diffusion layer `state[i] = state[i] * M[i] + sum(state)`.
//!
//! [`Poseidon2Chip::permute_mut`] emits this schedule through a
//! [`FieldChip`]; [`Poseidon2Chip::permute_native`] computes the same
//! function out of circuit.

use crate::backend::ArithmeticBackend;
use crate::bounded::BoundedVar;
use crate::chip::FieldChip;
use crate::constants::{ConstantsError, RoundConstants, INTERNAL_DIAG_M1, WIDTH};
use crate::field::KoalaBear;
use ark_relations::r1cs::SynthesisError;

/// Number of full rounds, split evenly around the partial rounds.
pub const EXTERNAL_ROUNDS: usize = 8;

/// Number of partial rounds.
pub const INTERNAL_ROUNDS: usize = 13;

/// A permutation state inside a circuit.
pub type State<V> = [BoundedVar<V>; WIDTH];

/// Kind of a scheduled round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundKind {
    /// S-box on every lane, external linear layer.
    Full,
    /// S-box on lane 0, diffusion layer.
    Partial,
}

/// Fixed round schedule of the permutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundSchedule {
    external_rounds: usize,
    internal_rounds: usize,
}

impl Default for RoundSchedule {
    fn default() -> Self {
        Self {
            external_rounds: EXTERNAL_ROUNDS,
            internal_rounds: INTERNAL_ROUNDS,
        }
    }
}

impl RoundSchedule {
    /// Total rounds, and therefore constant rows consumed.
    pub fn total_rounds(&self) -> usize {
        self.external_rounds + self.internal_rounds
    }

    /// Rounds in execution order, tagged with their kind.  The index doubles
    /// as the constant row.
    pub fn phases(&self) -> impl Iterator<Item = (usize, RoundKind)> + '_ {
        (0..self.total_rounds()).filter_map(move |r| self.kind(r).map(|kind| (r, kind)))
    }

    /// Kind of round `round`, or `None` past the end of the schedule.
    pub fn kind(&self, round: usize) -> Option<RoundKind> {
        let head = self.external_rounds / 2;
        let tail = head + self.internal_rounds;
        if round >= self.total_rounds() {
            None
        } else if round < head || round >= tail {
            Some(RoundKind::Full)
        } else {
            Some(RoundKind::Partial)
        }
    }
}

/// The width-16 permutation over a shared constant table.
#[derive(Debug, Clone)]
pub struct Poseidon2Chip<'a> {
    constants: &'a RoundConstants,
    schedule: RoundSchedule,
    diagonal: [KoalaBear; WIDTH],
}

impl<'a> Poseidon2Chip<'a> {
    /// Binds the permutation to `constants`, which must cover every
    /// scheduled round.
    pub fn new(constants: &'a RoundConstants) -> Result<Self, ConstantsError> {
        let schedule = RoundSchedule::default();
        constants.ensure_rounds(schedule.total_rounds())?;
        Ok(Self {
            constants,
            schedule,
            diagonal: INTERNAL_DIAG_M1.map(KoalaBear::from),
        })
    }

    /// The round schedule driven by this chip.
    pub fn schedule(&self) -> &RoundSchedule {
        &self.schedule
    }

    /// Permutes `state` in place.
    pub fn permute_mut<B: ArithmeticBackend>(
        &self,
        chip: &mut FieldChip<B>,
        state: &mut State<B::Var>,
    ) -> Result<(), SynthesisError> {
        let reductions_before = chip.reduction_count();
        self.external_linear_layer(chip, state)?;
        for (round, kind) in self.schedule.phases() {
            tracing::trace!(round, ?kind, "poseidon2 round");
            self.add_round_constants(chip, state, round)?;
            match kind {
                RoundKind::Full => {
                    for lane in state.iter_mut() {
                        *lane = chip.sbox(lane)?;
                    }
                    self.external_linear_layer(chip, state)?;
                }
                RoundKind::Partial => {
                    state[0] = chip.sbox(&state[0])?;
                    self.diffusion_layer(chip, state)?;
                }
            }
        }
        tracing::debug!(
            reductions = chip.reduction_count() - reductions_before,
            "poseidon2 permutation emitted"
        );
        Ok(())
    }

    /// Permutes `state`, returning the result.
    pub fn permute<B: ArithmeticBackend>(
        &self,
        chip: &mut FieldChip<B>,
        mut state: State<B::Var>,
    ) -> Result<State<B::Var>, SynthesisError> {
        self.permute_mut(chip, &mut state)?;
        Ok(state)
    }

    /// Adds the constants of `round` to the lanes that round touches: every
    /// lane in a full round, lane 0 in a partial round.
    ///
    /// # Panics
    ///
    /// Panics if `round` lies outside the schedule.
    pub fn add_round_constants<B: ArithmeticBackend>(
        &self,
        chip: &mut FieldChip<B>,
        state: &mut State<B::Var>,
        round: usize,
    ) -> Result<(), SynthesisError> {
        let kind = self.schedule.kind(round);
        assert!(kind.is_some(), "round {round} is outside the schedule");
        let lanes = match kind {
            Some(RoundKind::Partial) => 1,
            _ => WIDTH,
        };
        let rc = &self.constants.rows()[round];
        for (lane, c) in state.iter_mut().zip(rc).take(lanes) {
            let c = chip.constant(*c);
            *lane = chip.add(lane, &c)?;
        }
        Ok(())
    }

    /// Circulant `(2, 3, 1, 1)` mix of one group of four lanes, using only
    /// additions and doublings.
    fn mds_light_4x4<B: ArithmeticBackend>(
        chip: &mut FieldChip<B>,
        s: &mut [BoundedVar<B::Var>],
    ) -> Result<(), SynthesisError> {
        let two = KoalaBear::new(2);
        let t01 = chip.add(&s[0], &s[1])?;
        let t23 = chip.add(&s[2], &s[3])?;
        let t0123 = chip.add(&t01, &t23)?;
        let t01123 = chip.add(&t0123, &s[1])?;
        let t01233 = chip.add(&t0123, &s[3])?;
        let double_s0 = chip.mul_by_constant(&s[0], two)?;
        let double_s2 = chip.mul_by_constant(&s[2], two)?;
        s[3] = chip.add(&t01233, &double_s0)?;
        s[1] = chip.add(&t01123, &double_s2)?;
        s[0] = chip.add(&t01123, &t01)?;
        s[2] = chip.add(&t01233, &t23)?;
        Ok(())
    }

    /// Mixes each group of four lanes, then adds the per-column sums across
    /// groups to every lane.
    pub fn external_linear_layer<B: ArithmeticBackend>(
        &self,
        chip: &mut FieldChip<B>,
        state: &mut State<B::Var>,
    ) -> Result<(), SynthesisError> {
        for group in state.chunks_mut(4) {
            Self::mds_light_4x4(chip, group)?;
        }
        let mut sums: [BoundedVar<B::Var>; 4] = std::array::from_fn(|j| state[j].clone());
        for group in state[4..].chunks(4) {
            for (sum, lane) in sums.iter_mut().zip(group) {
                *sum = chip.add(sum, lane)?;
            }
        }
        for (i, lane) in state.iter_mut().enumerate() {
            *lane = chip.add(lane, &sums[i % 4])?;
        }
        Ok(())
    }

    /// Applies `I + diag(M)` as `state[i] * M[i] + sum(state)`.
    pub fn diffusion_layer<B: ArithmeticBackend>(
        &self,
        chip: &mut FieldChip<B>,
        state: &mut State<B::Var>,
    ) -> Result<(), SynthesisError> {
        let mut total = state[0].clone();
        for lane in &state[1..] {
            total = chip.add(&total, lane)?;
        }
        // The sum feeds all sixteen lanes, so a wide one is reduced up front.
        if total.upper_bound().bits() + 1 >= chip.config().max_bound_bits as u64 {
            total = chip.reduce(&total)?;
        }
        for (lane, m) in state.iter_mut().zip(self.diagonal) {
            let scaled = chip.mul_by_constant(lane, m)?;
            *lane = chip.add(&scaled, &total)?;
        }
        Ok(())
    }

    /// Out-of-circuit evaluation of the same permutation.
    pub fn permute_native(&self, mut state: [KoalaBear; WIDTH]) -> [KoalaBear; WIDTH] {
        external_linear_layer_native(&mut state);
        for (round, kind) in self.schedule.phases() {
            let rc = &self.constants.rows()[round];
            match kind {
                RoundKind::Full => {
                    for (lane, c) in state.iter_mut().zip(rc) {
                        *lane = (*lane + *c).pow(7);
                    }
                    external_linear_layer_native(&mut state);
                }
                RoundKind::Partial => {
                    state[0] = (state[0] + rc[0]).pow(7);
                    diffusion_layer_native(&self.diagonal, &mut state);
                }
            }
        }
        state
    }
}

/// Out-of-circuit external linear layer.
pub fn external_linear_layer_native(state: &mut [KoalaBear; WIDTH]) {
    for s in state.chunks_mut(4) {
        let t01 = s[0] + s[1];
        let t23 = s[2] + s[3];
        let t0123 = t01 + t23;
        let t01123 = t0123 + s[1];
        let t01233 = t0123 + s[3];
        s[3] = t01233 + s[0].double();
        s[1] = t01123 + s[2].double();
        s[0] = t01123 + t01;
        s[2] = t01233 + t23;
    }
    let mut sums = [KoalaBear::ZERO; 4];
    for (i, lane) in state.iter().enumerate() {
        sums[i % 4] = sums[i % 4] + *lane;
    }
    for (i, lane) in state.iter_mut().enumerate() {
        *lane = *lane + sums[i % 4];
    }
}

/// Out-of-circuit diffusion layer for a given diagonal.
pub fn diffusion_layer_native(diagonal: &[KoalaBear; WIDTH], state: &mut [KoalaBear; WIDTH]) {
    let total = state.iter().fold(KoalaBear::ZERO, |acc, x| acc + *x);
    for (lane, m) in state.iter_mut().zip(diagonal) {
        *lane = *lane * *m + total;
    }
}
