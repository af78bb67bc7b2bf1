//! Exact POMDP value iteration: repeated exact cross-sum backups over the
//! full α-vector set, with no belief-point sampling.

use crate::alpha::AlphaVector;
use crate::backup::exact_cross_sum_backup;
use crate::entities::Action;
use crate::error::{ModelError, PlannerError};
use crate::horizon::Horizon;
use crate::horizon_estimator::compute_num_iterations;
use crate::policy::PomdpPolicy;
use crate::reward::Reward;
use crate::tensor::{ObservationModel, Transition};

/// Finite-horizon exact value iteration: commits every `Γ_t`, so the
/// resulting policy is step-indexed (non-stationary).
pub fn solve_finite(
    states: &[u32],
    actions: &[Action],
    observations: &[u32],
    transition: &Transition,
    observation_model: &ObservationModel,
    reward: &Reward,
    horizon: &Horizon,
) -> Result<PomdpPolicy, PlannerError> {
    if states.is_empty() {
        return Err(ModelError::NoStates.into());
    }
    if actions.is_empty() {
        return Err(ModelError::NoActions.into());
    }
    let steps = horizon.steps().unwrap_or(1);
    let gamma = horizon.gamma();
    let mut per_step = Vec::with_capacity(steps as usize);
    let mut current: Vec<AlphaVector> = Vec::new();
    for _ in 0..steps {
        current = exact_cross_sum_backup(&current, states, actions, observations, transition, observation_model, reward, gamma)?;
        per_step.push(current.clone());
    }
    per_step.reverse();
    Ok(PomdpPolicy::new(per_step))
}

/// Infinite-horizon exact value iteration: iterates until `epsilon`-optimal
/// (via [`compute_num_iterations`]) and commits only the final `Γ`.
pub fn solve_infinite(
    states: &[u32],
    actions: &[Action],
    observations: &[u32],
    transition: &Transition,
    observation_model: &ObservationModel,
    reward: &Reward,
    gamma: f64,
    epsilon: f64,
) -> Result<PomdpPolicy, PlannerError> {
    if states.is_empty() {
        return Err(ModelError::NoStates.into());
    }
    if actions.is_empty() {
        return Err(ModelError::NoActions.into());
    }
    let rmin = reward.min();
    let rmax = reward.max();
    let iterations = compute_num_iterations(gamma, rmin, rmax, epsilon)?;
    let mut current: Vec<AlphaVector> = Vec::new();
    for _ in 0..iterations {
        current = exact_cross_sum_backup(&current, states, actions, observations, transition, observation_model, reward, gamma)?;
    }
    Ok(PomdpPolicy::new(vec![current]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::belief::Belief;
    use crate::entities::{Entity, IndexAllocator};
    use crate::key::Key;
    use crate::reward::RewardArity;

    fn tiger_like_model() -> (Vec<u32>, Vec<Action>, Vec<u32>, Transition, ObservationModel, Reward) {
        let states = vec![0u32, 1u32];
        let mut alloc = IndexAllocator::new();
        let actions = vec![Entity::indexed(&mut alloc, "listen"), Entity::indexed(&mut alloc, "open0")];
        let observations = vec![0u32, 1u32];

        let mut t = Transition::sparse();
        t.0.set_sparse(Key::Any, Key::Entity(0), Key::Entity(0), 0.5);
        t.0.set_sparse(Key::Any, Key::Entity(0), Key::Entity(1), 0.5);

        let mut o = ObservationModel::sparse();
        o.0.set_sparse(Key::Entity(0), Key::Any, Key::Entity(0), 0.85);
        o.0.set_sparse(Key::Entity(0), Key::Any, Key::Entity(1), 0.15);
        o.0.set_sparse(Key::Entity(1), Key::Any, Key::Entity(0), 0.5);
        o.0.set_sparse(Key::Entity(1), Key::Any, Key::Entity(1), 0.5);

        let mut r = Reward::sparse(RewardArity::Sa);
        r.set_sparse(vec![Key::Any, Key::Entity(0)], -1.0).unwrap();
        r.set_sparse(vec![Key::Entity(0), Key::Entity(1)], 10.0).unwrap();
        r.set_sparse(vec![Key::Entity(1), Key::Entity(1)], -100.0).unwrap();

        (states, actions, observations, t, o, r)
    }

    #[test]
    fn finite_horizon_returns_one_gamma_per_step() {
        let (states, actions, observations, t, o, r) = tiger_like_model();
        let horizon = crate::horizon::Horizon::finite(2, 0.95);
        let policy = solve_finite(&states, &actions, &observations, &t, &o, &r, &horizon).unwrap();
        assert_eq!(policy.num_steps(), 2);
    }

    #[test]
    fn infinite_horizon_produces_nonempty_stationary_gamma() {
        let (states, actions, observations, t, o, r) = tiger_like_model();
        let policy = solve_infinite(&states, &actions, &observations, &t, &o, &r, 0.95, 1.0).unwrap();
        assert_eq!(policy.num_steps(), 1);
        let belief = Belief::uniform(&states);
        assert!(policy.best_action(0, &belief).is_some());
    }
}
