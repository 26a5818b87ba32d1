//! Seeded deviation source for naturalized ("anti-AI") processing.
//!
//! Algorithmically perfect corrections read as sterile: a ruler-flat EQ
//! curve, pitch snapped exactly onto the grid. Naturalization perturbs the
//! result with small, bounded, reproducible deviations. The seed is always
//! injected by the caller so tests can pin outputs while production callers
//! vary it per run.

/// A seeded generator of bounded deviations.
#[derive(Debug)]
pub struct Naturalizer {
    rng: fastrand::Rng,
}

impl Naturalizer {
    pub fn with_seed(seed: u64) -> Self {
        Naturalizer {
            rng: fastrand::Rng::with_seed(seed),
        }
    }

    /// A single uniform deviation in [-spread, +spread].
    pub fn jitter(&mut self, spread: f32) -> f32 {
        (self.rng.f32() * 2.0 - 1.0) * spread
    }

    /// Band-correlated deviations for a gain curve.
    ///
    /// Raw per-band jitter in [-max_db, +max_db] is smoothed with its
    /// neighbors so adjacent bands drift together rather than producing a
    /// comb-like zigzag no human engineer would dial in.
    pub fn band_deviations(&mut self, bands: usize, max_db: f32) -> Vec<f32> {
        let raw: Vec<f32> = (0..bands).map(|_| self.jitter(max_db)).collect();
        (0..bands)
            .map(|i| {
                let prev = raw[i.saturating_sub(1)];
                let next = raw[(i + 1).min(bands.saturating_sub(1))];
                0.25 * prev + 0.5 * raw[i] + 0.25 * next
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_deviations() {
        let a = Naturalizer::with_seed(7).band_deviations(9, 0.3);
        let b = Naturalizer::with_seed(7).band_deviations(9, 0.3);
        assert_eq!(a, b);
    }

    #[test]
    fn different_seeds_differ() {
        let a = Naturalizer::with_seed(1).band_deviations(9, 0.3);
        let b = Naturalizer::with_seed(2).band_deviations(9, 0.3);
        assert_ne!(a, b);
    }

    #[test]
    fn deviations_stay_bounded() {
        for seed in 0..50 {
            let devs = Naturalizer::with_seed(seed).band_deviations(9, 0.3);
            assert!(devs.iter().all(|d| d.abs() <= 0.3), "seed {seed}: {devs:?}");
        }
    }
}
