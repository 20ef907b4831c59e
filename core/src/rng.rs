//! Deterministic random number generation.
//!
//! RULE: Nothing in the dataset generator may call any platform RNG.
//! Every draw is a pure function of (master seed, integer index): a fresh
//! PCG stream is seeded from `master_seed XOR index * golden-ratio` and
//! sampled once. Re-running generation therefore reproduces every value,
//! and reordering draws never shifts unrelated ones.

use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

/// Master seed for the synthetic compliance dataset.
pub const DATASET_SEED: u64 = 0x4147_5249_5345_4E53;

const GOLDEN_GAMMA: u64 = 0x9e37_79b9_7f4a_7c15;

/// A deterministic RNG stream derived from a master seed and a stable index.
pub struct SeededRng {
    inner: Pcg64Mcg,
}

impl SeededRng {
    /// The index must never change once assigned to a draw site.
    pub fn new(master_seed: u64, index: u64) -> Self {
        let derived_seed = master_seed ^ index.wrapping_mul(GOLDEN_GAMMA);
        Self {
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }
}

/// Index-addressed unit floats for one dataset build.
#[derive(Debug, Clone, Copy)]
pub struct RngBank {
    master_seed: u64,
}

impl RngBank {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    /// A float in [0.0, 1.0) fixed entirely by the index.
    pub fn unit(&self, index: u64) -> f64 {
        SeededRng::new(self.master_seed, index).next_f64()
    }
}

impl Default for RngBank {
    fn default() -> Self {
        Self::new(DATASET_SEED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_index_yields_same_value() {
        let bank = RngBank::default();
        assert_eq!(bank.unit(13), bank.unit(13));
        assert_eq!(RngBank::new(7).unit(400), RngBank::new(7).unit(400));
    }

    #[test]
    fn units_stay_in_half_open_range() {
        let bank = RngBank::default();
        for index in 0..2_000 {
            let value = bank.unit(index);
            assert!((0.0..1.0).contains(&value), "index {index} produced {value}");
        }
    }

    #[test]
    fn different_seeds_diverge() {
        let a: Vec<f64> = (0..16).map(|i| RngBank::new(1).unit(i)).collect();
        let b: Vec<f64> = (0..16).map(|i| RngBank::new(2).unit(i)).collect();
        assert_ne!(a, b, "Different master seeds produced identical draws");
    }

    #[test]
    fn stream_continues_past_first_draw() {
        let mut rng = SeededRng::new(DATASET_SEED, 99);
        let first = rng.next_f64();
        let second = rng.next_f64();
        assert_eq!(first, RngBank::default().unit(99));
        assert_ne!(first, second, "Consecutive draws should differ");
    }
}
