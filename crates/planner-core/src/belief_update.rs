//! Bayesian belief update: `b'(s') ∝ O(a, s', z) · Σ_s T(s, a, s') · b(s)`.

use crate::belief::Belief;
use crate::error::BeliefError;
use crate::tensor::{ObservationModel, Transition};

/// Update `belief` after taking action `a` and observing `z`, given the
/// problem's transition and observation models. `candidate_states` is the
/// set of state hashes to consider as the successor `s'` (the sparse
/// representation has no enumerable domain of its own, so callers must
/// supply it — typically the full state table).
pub fn update(
    belief: &Belief,
    action_hash: u32,
    observation_hash: u32,
    transition: &Transition,
    observation_model: &ObservationModel,
    candidate_states: &[u32],
) -> Result<Belief, BeliefError> {
    let mut next = Belief::new();
    for &s_next in candidate_states {
        let obs_prob = observation_model.get(action_hash, s_next, observation_hash);
        if obs_prob == 0.0 {
            continue;
        }
        let predicted: f64 =
            belief.support().map(|s| transition.get(s, action_hash, s_next) * belief.get(s)).sum();
        let mass = obs_prob * predicted;
        if mass != 0.0 {
            next.set(s_next, mass);
        }
    }
    next.renormalize_after_update().map_err(|_| BeliefError::ImpossibleObservation)?;
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_renormalizes_over_consistent_successors() {
        let mut t = Transition::sparse();
        t.0.set_sparse(crate::key::Key::Entity(1), crate::key::Key::Entity(0), crate::key::Key::Entity(1), 0.7);
        t.0.set_sparse(crate::key::Key::Entity(1), crate::key::Key::Entity(0), crate::key::Key::Entity(2), 0.3);
        let mut o = ObservationModel::sparse();
        o.0.set_sparse(crate::key::Key::Entity(0), crate::key::Key::Entity(1), crate::key::Key::Entity(5), 1.0);
        o.0.set_sparse(crate::key::Key::Entity(0), crate::key::Key::Entity(2), crate::key::Key::Entity(5), 1.0);

        let belief = Belief::point(1);
        let next = update(&belief, 0, 5, &t, &o, &[1, 2]).unwrap();
        assert!((next.get(1) - 0.7).abs() < 1e-9);
        assert!((next.get(2) - 0.3).abs() < 1e-9);
    }

    #[test]
    fn update_fails_on_impossible_observation() {
        let t = Transition::sparse();
        let o = ObservationModel::sparse(); // no observation ever has nonzero probability
        let belief = Belief::point(1);
        assert_eq!(update(&belief, 0, 5, &t, &o, &[1, 2]), Err(BeliefError::ImpossibleObservation));
    }
}
