//! The Bellman backup operator for POMDP value functions, in two forms:
//! the exact cross-sum backup (every observation branch, full Γ) used by
//! exact value iteration, and the per-belief-point backup used by PBVI.

use crate::alpha::{cross_sum, prune, AlphaVector};
use crate::belief::Belief;
use crate::belief_update;
use crate::entities::Action;
use crate::error::PlannerError;
use crate::reward::Reward;
use crate::tensor::{ObservationModel, Transition};

/// Project a single α-vector through one `(action, observation)` branch:
/// `g(s) = Σ_{s'} T(s, a, s') · O(a, s', z) · α(s')`.
fn project_one(
    alpha: &AlphaVector,
    action_hash: u32,
    observation_hash: u32,
    transition: &Transition,
    observation_model: &ObservationModel,
    states: &[u32],
) -> AlphaVector {
    let mut out = AlphaVector::new(None);
    for &s in states {
        let value: f64 = states
            .iter()
            .map(|&s_next| {
                transition.get(s, action_hash, s_next)
                    * observation_model.get(action_hash, s_next, observation_hash)
                    * alpha.get(s_next)
            })
            .sum();
        out.set(s, value);
    }
    out
}

/// Project every α-vector in `gamma` through one `(action, observation)` branch.
fn project_set(
    gamma: &[AlphaVector],
    action_hash: u32,
    observation_hash: u32,
    transition: &Transition,
    observation_model: &ObservationModel,
    states: &[u32],
) -> Vec<AlphaVector> {
    gamma.iter().map(|a| project_one(a, action_hash, observation_hash, transition, observation_model, states)).collect()
}

/// `Γ_{a,*}(s) = Σ_s′ T(s,a,s′) · Σ_z O(a,s′,z) · R(s,a,s′,z)` (§4.8): the
/// immediate-reward component for one action, marginalized over every
/// successor state and observation so arities above `Sa` (which vary with
/// `s′` and/or `z`) are weighted correctly rather than sampled at a fixed
/// `(s′, z) = (0, 0)`.
fn gamma_a_star(s: u32, action_hash: u32, states: &[u32], observations: &[u32], transition: &Transition, observation_model: &ObservationModel, reward: &Reward) -> f64 {
    states
        .iter()
        .map(|&s_next| {
            let t = transition.get(s, action_hash, s_next);
            if t == 0.0 {
                return 0.0;
            }
            let reward_over_z: f64 = observations
                .iter()
                .map(|&z| observation_model.get(action_hash, s_next, z) * reward.get(s, action_hash, s_next, z))
                .sum();
            t * reward_over_z
        })
        .sum()
}

fn add_immediate_reward(
    av: &AlphaVector,
    action_hash: u32,
    reward: &Reward,
    gamma_discount: f64,
    states: &[u32],
    observations: &[u32],
    transition: &Transition,
    observation_model: &ObservationModel,
) -> AlphaVector {
    let mut out = AlphaVector::new(None);
    for &s in states {
        let immediate = gamma_a_star(s, action_hash, states, observations, transition, observation_model, reward);
        out.set(s, immediate + gamma_discount * av.get(s));
    }
    out
}

/// The exact Bellman backup: for every action, cross-sum the per-observation
/// projection sets, add the immediate reward, then prune the union over
/// actions for dominance. This is the full `Γ_{t+1} = H Γ_t` operator.
pub fn exact_cross_sum_backup(
    prev_gamma: &[AlphaVector],
    states: &[u32],
    actions: &[Action],
    observations: &[u32],
    transition: &Transition,
    observation_model: &ObservationModel,
    reward: &Reward,
    discount: f64,
) -> Result<Vec<AlphaVector>, PlannerError> {
    let mut unioned = Vec::new();
    for action in actions {
        let a = action.hash();
        let mut acc: Vec<AlphaVector> = Vec::new();
        for &z in observations {
            let gaz = project_set(prev_gamma, a, z, transition, observation_model, states);
            acc = cross_sum(&acc, &gaz);
        }
        for av in &acc {
            let mut tagged = add_immediate_reward(av, a, reward, discount, states, observations, transition, observation_model);
            tagged.set_action(Some(action.clone()));
            unioned.push(tagged);
        }
    }
    Ok(prune(&unioned)?)
}

/// The PBVI per-belief-point backup: for each action, pick the best
/// projected α per observation against the *updated* belief (rather than
/// cross-summing every combination), sum those, and add the immediate
/// reward. Returns the single best resulting α-vector for `belief`.
///
/// `O(|A| · |Z| · |Γ|)` instead of the exact backup's `O(|A| · |Γ|^{|Z|})`.
pub fn belief_point_backup(
    belief: &Belief,
    prev_gamma: &[AlphaVector],
    states: &[u32],
    actions: &[Action],
    observations: &[u32],
    transition: &Transition,
    observation_model: &ObservationModel,
    reward: &Reward,
    discount: f64,
) -> Option<AlphaVector> {
    if prev_gamma.is_empty() {
        return None;
    }
    let mut best: Option<(AlphaVector, f64, u32)> = None;
    for action in actions {
        let a = action.hash();
        let mut summed = AlphaVector::new(None);
        for &z in observations {
            let updated = belief_update::update(belief, a, z, transition, observation_model, states);
            let Ok(updated_belief) = updated else { continue };
            let best_proj = prev_gamma
                .iter()
                .map(|alpha| project_one(alpha, a, z, transition, observation_model, states))
                .max_by(|x, y| x.dot(&updated_belief).partial_cmp(&y.dot(&updated_belief)).unwrap_or(std::cmp::Ordering::Equal));
            if let Some(proj) = best_proj {
                summed = summed.add(&proj);
            }
        }
        let mut candidate = add_immediate_reward(&summed, a, reward, discount, states, observations, transition, observation_model);
        candidate.set_action(Some(action.clone()));
        let value = candidate.dot(belief);
        // Break ties by lowest action hash (§4.8), not by encounter order.
        let keep = match &best {
            None => true,
            Some((_, best_value, best_hash)) => value > *best_value || (value == *best_value && a < *best_hash),
        };
        if keep {
            best = Some((candidate, value, a));
        }
    }
    best.map(|(av, _, _)| av)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Entity, IndexAllocator};
    use crate::key::Key;
    use crate::reward::RewardArity;

    fn two_state_one_action_model() -> (Vec<u32>, Vec<Action>, Vec<u32>, Transition, ObservationModel, Reward) {
        let states = vec![0u32, 1u32];
        let mut alloc = IndexAllocator::new();
        let actions = vec![Entity::indexed(&mut alloc, "a0")];
        let observations = vec![0u32, 1u32];

        let mut t = Transition::sparse();
        t.0.set_sparse(Key::Entity(0), Key::Any, Key::Entity(0), 1.0);
        t.0.set_sparse(Key::Entity(1), Key::Any, Key::Entity(1), 1.0);

        let mut o = ObservationModel::sparse();
        o.0.set_sparse(Key::Any, Key::Entity(0), Key::Entity(0), 1.0);
        o.0.set_sparse(Key::Any, Key::Entity(1), Key::Entity(1), 1.0);

        let mut r = Reward::sparse(RewardArity::Sa);
        r.set_sparse(vec![Key::Entity(0), Key::Any], 1.0).unwrap();
        r.set_sparse(vec![Key::Entity(1), Key::Any], -1.0).unwrap();

        (states, actions, observations, t, o, r)
    }

    #[test]
    fn exact_backup_produces_nonempty_pruned_set() {
        let (states, actions, observations, t, o, r) = two_state_one_action_model();
        let result = exact_cross_sum_backup(&[], &states, &actions, &observations, &t, &o, &r, 0.9).unwrap();
        assert!(!result.is_empty());
    }

    #[test]
    fn belief_point_backup_returns_some_alpha_for_nonempty_gamma() {
        let (states, actions, observations, t, o, r) = two_state_one_action_model();
        let seed = vec![AlphaVector::new(None)];
        let belief = Belief::point(0);
        let result = belief_point_backup(&belief, &seed, &states, &actions, &observations, &t, &o, &r, 0.9);
        assert!(result.is_some());
    }
}
