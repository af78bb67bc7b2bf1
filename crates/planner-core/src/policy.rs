//! Extracted policies: the product of MDP and POMDP value iteration.

use std::collections::BTreeMap;

use crate::alpha::AlphaVector;
use crate::belief::Belief;
use crate::entities::Action;

/// A step-indexed MDP policy: `policy[t][state_hash] = action`. A single-entry
/// vector represents a stationary (infinite-horizon) policy.
#[derive(Debug, Clone, Default)]
pub struct MdpPolicy {
    steps: Vec<BTreeMap<u32, Action>>,
}

impl MdpPolicy {
    #[must_use]
    pub fn new(steps: Vec<BTreeMap<u32, Action>>) -> Self {
        Self { steps }
    }

    #[must_use]
    pub fn num_steps(&self) -> usize {
        self.steps.len()
    }

    /// The action prescribed at `step` for `state_hash`, or `None` if the
    /// state was never reached during backup.
    #[must_use]
    pub fn action_at(&self, step: usize, state_hash: u32) -> Option<&Action> {
        let idx = step.min(self.steps.len().saturating_sub(1));
        self.steps.get(idx)?.get(&state_hash)
    }
}

/// A step-indexed POMDP policy: `policy[t]` is the α-vector set Γ_t. A
/// single-entry vector represents a stationary (infinite-horizon) policy.
#[derive(Debug, Clone, Default)]
pub struct PomdpPolicy {
    steps: Vec<Vec<AlphaVector>>,
}

impl PomdpPolicy {
    #[must_use]
    pub fn new(steps: Vec<Vec<AlphaVector>>) -> Self {
        Self { steps }
    }

    #[must_use]
    pub fn num_steps(&self) -> usize {
        self.steps.len()
    }

    #[must_use]
    pub fn alpha_vectors_at(&self, step: usize) -> &[AlphaVector] {
        let idx = step.min(self.steps.len().saturating_sub(1));
        self.steps.get(idx).map_or(&[], Vec::as_slice)
    }

    /// The action of the α-vector that maximizes `α · belief` at `step`.
    /// Ties break on the lowest action hash, for determinism.
    #[must_use]
    pub fn best_action(&self, step: usize, belief: &Belief) -> Option<&Action> {
        let gamma = self.alpha_vectors_at(step);
        gamma
            .iter()
            .map(|av| (av, av.dot(belief)))
            .max_by(|(a_av, a_val), (b_av, b_val)| {
                a_val
                    .partial_cmp(b_val)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| {
                        let a_hash = a_av.action().map_or(u32::MAX, Action::hash);
                        let b_hash = b_av.action().map_or(u32::MAX, Action::hash);
                        b_hash.cmp(&a_hash) // reverse: lower hash should win the max_by tie
                    })
            })
            .and_then(|(av, _)| av.action())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Entity;

    #[test]
    fn mdp_policy_looks_up_stationary_action() {
        let mut step0 = BTreeMap::new();
        let a0 = Entity::named("a0");
        step0.insert(1u32, a0.clone());
        let policy = MdpPolicy::new(vec![step0]);
        assert_eq!(policy.action_at(0, 1), Some(&a0));
        assert_eq!(policy.action_at(50, 1), Some(&a0)); // clamps to last step
    }

    #[test]
    fn pomdp_policy_best_action_picks_max_dot_product() {
        let mut av0 = AlphaVector::new(Some(Entity::named("stay")));
        av0.set(1, 1.0);
        let mut av1 = AlphaVector::new(Some(Entity::named("go")));
        av1.set(1, 5.0);
        let policy = PomdpPolicy::new(vec![vec![av0, av1]]);
        let belief = Belief::point(1);
        assert_eq!(policy.best_action(0, &belief).unwrap().label(), "go");
    }

    #[test]
    fn pomdp_policy_tie_breaks_on_lowest_action_hash() {
        let mut alloc = crate::entities::IndexAllocator::new();
        let act_low = Entity::indexed(&mut alloc, "low");
        let act_high = Entity::indexed(&mut alloc, "high");
        let mut av_high = AlphaVector::new(Some(act_high));
        av_high.set(1, 3.0);
        let mut av_low = AlphaVector::new(Some(act_low));
        av_low.set(1, 3.0);
        let policy = PomdpPolicy::new(vec![vec![av_high, av_low]]);
        let belief = Belief::point(1);
        assert_eq!(policy.best_action(0, &belief).unwrap().label(), "low");
    }
}
