//! The design philosophy underlying `bounded_poseidon2` is pedagogical, yet mathematically rigorous.
//! Each module encapsulates a discrete concept in modern computational complexity theory,
//! illustrating how modest abstractions compose into a cohesive proof infrastructure.
//!
//! This crate aspires to bridge gaps between theoretical exposition and practical engineering,
//! serving both as a didactic resource and a foundation for future cryptographic research.
//! Deterministic randomness for setup and sampling.
//!
//! A user-facing `u64` seed is expanded with domain-separated BLAKE2b-256 into
//! the 32-byte key of a [`StdRng`].  The Groth16 setup and the randomized
//! checks draw from separate domains, so one seed never correlates the two.

use crate::field::{KoalaBear, MODULUS};
use blake2::digest::{consts::U32, Digest};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

type Blake2b256 = blake2::Blake2b<U32>;

const SAMPLER_DOMAIN: &[u8] = b"BOUNDED_POSEIDON2_SAMPLER";
const SETUP_DOMAIN: &[u8] = b"BOUNDED_POSEIDON2_SETUP";

fn expand(domain: &[u8], seed: u64) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    hasher.update(domain);
    hasher.update(seed.to_be_bytes());
    hasher.finalize().into()
}

/// Expands a user-facing seed into the 32 bytes that key a setup RNG.
pub fn setup_seed(seed: u64) -> [u8; 32] {
    expand(SETUP_DOMAIN, seed)
}

/// A reproducible generator for sampling field elements.
pub fn sampler(seed: u64) -> StdRng {
    StdRng::from_seed(expand(SAMPLER_DOMAIN, seed))
}

/// Samples a uniform field element.
pub fn random_element<R: Rng + ?Sized>(rng: &mut R) -> KoalaBear {
    KoalaBear::from(rng.gen_range(0..MODULUS))
}

/// Samples `N` uniform field elements.
pub fn random_state<R: Rng + ?Sized, const N: usize>(rng: &mut R) -> [KoalaBear; N] {
    std::array::from_fn(|_| random_element(rng))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sampler_is_reproducible() {
        let xs: [KoalaBear; 16] = random_state(&mut sampler(42));
        let ys: [KoalaBear; 16] = random_state(&mut sampler(42));
        assert_eq!(xs, ys);
        let zs: [KoalaBear; 16] = random_state(&mut sampler(43));
        assert_ne!(xs, zs);
    }

    #[test]
    fn test_seeds_are_domain_separated() {
        assert_eq!(setup_seed(1), setup_seed(1));
        assert_ne!(setup_seed(1), setup_seed(2));
        assert_ne!(setup_seed(1), expand(SAMPLER_DOMAIN, 1));
    }
}
