//! Fully-observable value iteration: `V*(s) = max_a [ R(s,a) + γ Σ_s' T(s,a,s') V*(s') ]`.

use std::collections::BTreeMap;

use crate::entities::Action;
use crate::error::{ModelError, PlannerError};
use crate::horizon::Horizon;
use crate::horizon_estimator::compute_num_iterations;
use crate::policy::MdpPolicy;
use crate::reward::Reward;
use crate::tensor::Transition;

fn bellman_backup_state(
    s: u32,
    states: &[u32],
    actions: &[Action],
    transition: &Transition,
    reward: &Reward,
    gamma: f64,
    value: &BTreeMap<u32, f64>,
) -> (f64, Option<Action>) {
    let mut best_value = f64::NEG_INFINITY;
    let mut best_action: Option<Action> = None;
    for action in actions {
        let a = action.hash();
        let q: f64 = states
            .iter()
            .map(|&s_next| {
                transition.get(s, a, s_next)
                    * (reward.get(s, a, s_next, 0) + gamma * value.get(&s_next).copied().unwrap_or(0.0))
            })
            .sum();
        if q > best_value {
            best_value = q;
            best_action = Some(action.clone());
        }
    }
    (best_value, best_action)
}

/// One full sweep of value iteration over every state.
fn backup_sweep(
    states: &[u32],
    actions: &[Action],
    transition: &Transition,
    reward: &Reward,
    gamma: f64,
    value: &BTreeMap<u32, f64>,
) -> (BTreeMap<u32, f64>, BTreeMap<u32, Action>) {
    let mut next_value = BTreeMap::new();
    let mut policy = BTreeMap::new();
    for &s in states {
        let (v, a) = bellman_backup_state(s, states, actions, transition, reward, gamma, value);
        next_value.insert(s, v);
        if let Some(a) = a {
            policy.insert(s, a);
        }
    }
    (next_value, policy)
}

/// Finite-horizon value iteration: runs exactly `horizon.steps()` sweeps and
/// returns the full step-indexed policy (`policy[0]` is the first action to
/// take, `policy[horizon-1]` the last).
pub fn solve_finite(
    states: &[u32],
    actions: &[Action],
    transition: &Transition,
    reward: &Reward,
    horizon: &Horizon,
) -> Result<MdpPolicy, PlannerError> {
    if states.is_empty() {
        return Err(ModelError::NoStates.into());
    }
    if actions.is_empty() {
        return Err(ModelError::NoActions.into());
    }
    let steps = horizon.steps().unwrap_or(1);
    let gamma = horizon.gamma();
    let mut value: BTreeMap<u32, f64> = states.iter().map(|&s| (s, 0.0)).collect();
    let mut per_step_policies = Vec::with_capacity(steps as usize);
    for _ in 0..steps {
        let (next_value, policy) = backup_sweep(states, actions, transition, reward, gamma, &value);
        per_step_policies.push(policy);
        value = next_value;
    }
    per_step_policies.reverse(); // backup ran value[T] .. value[0]; policy[0] is the first action
    Ok(MdpPolicy::new(per_step_policies))
}

/// Infinite-horizon value iteration: runs enough sweeps to guarantee
/// `epsilon`-optimality (per [`compute_num_iterations`]) and returns a
/// single stationary policy.
pub fn solve_infinite(
    states: &[u32],
    actions: &[Action],
    transition: &Transition,
    reward: &Reward,
    gamma: f64,
    epsilon: f64,
) -> Result<MdpPolicy, PlannerError> {
    if states.is_empty() {
        return Err(ModelError::NoStates.into());
    }
    if actions.is_empty() {
        return Err(ModelError::NoActions.into());
    }
    let rmin = reward.min();
    let rmax = reward.max();
    let iterations = compute_num_iterations(gamma, rmin, rmax, epsilon)?;
    let mut value: BTreeMap<u32, f64> = states.iter().map(|&s| (s, 0.0)).collect();
    let mut policy = BTreeMap::new();
    for _ in 0..iterations {
        let (next_value, next_policy) = backup_sweep(states, actions, transition, reward, gamma, &value);
        value = next_value;
        policy = next_policy;
    }
    Ok(MdpPolicy::new(vec![policy]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Entity, IndexAllocator};
    use crate::key::Key;
    use crate::reward::RewardArity;

    fn two_state_model() -> (Vec<u32>, Vec<Action>, Transition, Reward) {
        let states = vec![0u32, 1u32];
        let mut alloc = IndexAllocator::new();
        let actions = vec![Entity::indexed(&mut alloc, "stay"), Entity::indexed(&mut alloc, "move")];

        let mut t = Transition::sparse();
        t.0.set_sparse(Key::Entity(0), Key::Entity(0), Key::Entity(0), 1.0); // stay in 0
        t.0.set_sparse(Key::Entity(0), Key::Entity(1), Key::Entity(1), 1.0); // move to 1
        t.0.set_sparse(Key::Entity(1), Key::Any, Key::Entity(1), 1.0); // absorbing goal

        let mut r = Reward::sparse(RewardArity::Sa);
        r.set_sparse(vec![Key::Entity(0), Key::Entity(0)], 0.0).unwrap();
        r.set_sparse(vec![Key::Entity(0), Key::Entity(1)], 1.0).unwrap();
        r.set_sparse(vec![Key::Entity(1), Key::Any], 0.0).unwrap();

        (states, actions, t, r)
    }

    #[test]
    fn finite_horizon_prefers_moving_to_goal() {
        let (states, actions, t, r) = two_state_model();
        let horizon = Horizon::finite(3, 0.9);
        let policy = solve_finite(&states, &actions, &t, &r, &horizon).unwrap();
        assert_eq!(policy.action_at(0, 0).unwrap().label(), "move");
    }

    #[test]
    fn infinite_horizon_rejects_gamma_one() {
        let (states, actions, t, r) = two_state_model();
        let result = solve_infinite(&states, &actions, &t, &r, 1.0, 0.01);
        assert!(result.is_err());
    }

    #[test]
    fn infinite_horizon_converges_to_move_action() {
        let (states, actions, t, r) = two_state_model();
        let policy = solve_infinite(&states, &actions, &t, &r, 0.9, 0.001).unwrap();
        assert_eq!(policy.action_at(0, 0).unwrap().label(), "move");
    }

    #[test]
    fn empty_state_set_is_rejected() {
        let (_, actions, t, r) = two_state_model();
        let result = solve_infinite(&[], &actions, &t, &r, 0.9, 0.01);
        assert!(matches!(result, Err(PlannerError::Model(ModelError::NoStates))));
    }
}
