//! Park-Miller "minimal standard" generator behind `$RND`.

use tortoise_graphics::types::Scalar;

const MULTIPLIER: u64 = 48_271;
const MODULUS: u64 = 2_147_483_647;

/// Deterministic generator; every run starts from the same seed.
#[derive(Debug, Clone)]
pub struct Random {
    seed: u64,
}

impl Random {
    #[must_use]
    pub const fn new() -> Self {
        Self { seed: 1 }
    }

    /// Advance and return a value in (0, 1).
    #[expect(clippy::cast_precision_loss, reason = "seed < 2^31 is exact in f64")]
    pub const fn next_scalar(&mut self) -> Scalar {
        self.seed = self.seed * MULTIPLIER % MODULUS;
        self.seed as Scalar / MODULUS as Scalar
    }
}

impl Default for Random {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_values() {
        let mut r = Random::new();
        let a = r.next_scalar();
        assert!((a - 48_271.0 / 2_147_483_647.0).abs() < 1e-15);
        let b = r.next_scalar();
        assert!((b - 182_605_794.0 / 2_147_483_647.0).abs() < 1e-15);
    }

    #[test]
    fn stays_in_open_unit_interval() {
        let mut r = Random::new();
        for _ in 0..10_000 {
            let v = r.next_scalar();
            assert!(v > 0.0 && v < 1.0, "{v}");
        }
    }

    #[test]
    fn sequences_are_reproducible() {
        let mut a = Random::new();
        let mut b = Random::default();
        for _ in 0..100 {
            assert_eq!(a.next_scalar(), b.next_scalar());
        }
    }
}
