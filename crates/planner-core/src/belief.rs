//! Belief state: a finite-support probability distribution over states.

use std::collections::BTreeMap;

use crate::error::BeliefError;

/// A sparse distribution over state hashes. Missing entries are implicitly
/// zero. Value type — copy on write, like the rest of this crate's model
/// objects.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Belief {
    mass: BTreeMap<u32, f64>,
}

impl Belief {
    #[must_use]
    pub fn new() -> Self {
        Self { mass: BTreeMap::new() }
    }

    /// A belief with all mass on a single state.
    #[must_use]
    pub fn point(state_hash: u32) -> Self {
        let mut b = Self::new();
        b.set(state_hash, 1.0);
        b
    }

    /// Uniform belief over the given states.
    #[must_use]
    pub fn uniform(state_hashes: &[u32]) -> Self {
        let mut b = Self::new();
        if state_hashes.is_empty() {
            return b;
        }
        let p = 1.0 / state_hashes.len() as f64;
        for &h in state_hashes {
            b.set(h, p);
        }
        b
    }

    pub fn set(&mut self, state_hash: u32, probability: f64) {
        if probability == 0.0 {
            self.mass.remove(&state_hash);
        } else {
            self.mass.insert(state_hash, probability);
        }
    }

    #[must_use]
    pub fn get(&self, state_hash: u32) -> f64 {
        self.mass.get(&state_hash).copied().unwrap_or(0.0)
    }

    /// Hashes with strictly positive mass, in ascending order.
    pub fn support(&self) -> impl Iterator<Item = u32> + '_ {
        self.mass.keys().copied()
    }

    #[must_use]
    pub fn total_mass(&self) -> f64 {
        self.mass.values().sum()
    }

    /// Divide every entry by the total mass.
    pub fn normalize(&mut self) {
        let total = self.total_mass();
        if total != 0.0 {
            for v in self.mass.values_mut() {
                *v /= total;
            }
        }
    }

    /// Like [`normalize`](Self::normalize), but fails rather than silently
    /// leaving an unnormalizable (all-zero) belief untouched. Idempotent:
    /// calling it on an already-normalized belief is a no-op.
    pub fn renormalize_after_update(&mut self) -> Result<(), BeliefError> {
        let total = self.total_mass();
        if total.abs() < 1e-12 {
            return Err(BeliefError::Unnormalizable);
        }
        for v in self.mass.values_mut() {
            *v /= total;
        }
        Ok(())
    }

    /// True if the total mass is within `tolerance` of 1.0.
    #[must_use]
    pub fn is_normalized(&self, tolerance: f64) -> bool {
        (self.total_mass() - 1.0).abs() <= tolerance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_on_missing_entry_is_zero() {
        let b = Belief::new();
        assert_eq!(b.get(7), 0.0);
    }

    #[test]
    fn normalize_divides_by_sum() {
        let mut b = Belief::new();
        b.set(0, 2.0);
        b.set(1, 6.0);
        b.normalize();
        assert!((b.get(0) - 0.25).abs() < 1e-12);
        assert!((b.get(1) - 0.75).abs() < 1e-12);
    }

    #[test]
    fn renormalize_after_update_fails_on_zero_mass() {
        let mut b = Belief::new();
        b.set(0, 0.0);
        assert_eq!(b.renormalize_after_update(), Err(BeliefError::Unnormalizable));
    }

    #[test]
    fn renormalize_after_update_is_idempotent() {
        let mut b = Belief::uniform(&[0, 1, 2]);
        b.renormalize_after_update().unwrap();
        let snapshot = b.clone();
        b.renormalize_after_update().unwrap();
        assert_eq!(b, snapshot);
    }

    #[test]
    fn uniform_sums_to_one() {
        let b = Belief::uniform(&[0, 1, 2, 3]);
        assert!((b.total_mass() - 1.0).abs() < 1e-12);
    }
}
