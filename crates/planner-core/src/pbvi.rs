//! Point-based value iteration: approximates exact POMDP value iteration by
//! backing up only a finite, growing set of sampled belief points instead of
//! the full belief simplex.

use rand::seq::SliceRandom;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::alpha::AlphaVector;
use crate::backup::belief_point_backup;
use crate::belief::Belief;
use crate::belief_update;
use crate::entities::Action;
use crate::error::{ModelError, PlannerError, SolveError};
use crate::policy::PomdpPolicy;
use crate::reward::Reward;
use crate::tensor::{ObservationModel, Transition};

/// Strategy for growing the belief set between backup stages. Named after
/// the expansion rules of the PBVI family; not every rule is implemented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpansionRule {
    None,
    RandomBeliefSelection,
    StochasticSimulationRandomAction,
    StochasticSimulationGreedyAction,
    StochasticSimulationExploratoryAction,
    GreedyErrorReduction,
}

/// A point-based value iteration solver. Owns its own seeded RNG so that two
/// solver instances (or two runs with the same seed) produce byte-identical
/// belief expansions — no process-wide or thread-local random source is used
/// anywhere in this crate.
pub struct PbviSolver {
    beliefs: Vec<Belief>,
    rng: ChaCha8Rng,
}

impl PbviSolver {
    #[must_use]
    pub fn new(seed: u64, initial_beliefs: Vec<Belief>) -> Self {
        Self { beliefs: initial_beliefs, rng: ChaCha8Rng::seed_from_u64(seed) }
    }

    #[must_use]
    pub fn belief_count(&self) -> usize {
        self.beliefs.len()
    }

    #[must_use]
    pub fn beliefs(&self) -> &[Belief] {
        &self.beliefs
    }

    /// Grow the belief set by one new point per existing belief point, per
    /// `rule`'s particular sampling/simulation strategy.
    #[allow(clippy::too_many_arguments)]
    pub fn expand(
        &mut self,
        rule: ExpansionRule,
        states: &[u32],
        actions: &[Action],
        observations: &[u32],
        transition: &Transition,
        observation_model: &ObservationModel,
        gamma: &[AlphaVector],
    ) -> Result<(), SolveError> {
        if rule == ExpansionRule::GreedyErrorReduction {
            return Err(SolveError::NotSupported("GreedyErrorReduction expansion rule"));
        }
        if rule == ExpansionRule::None {
            return Ok(());
        }

        let current_beliefs = self.beliefs.clone();
        let new_points = match rule {
            ExpansionRule::RandomBeliefSelection => {
                current_beliefs.iter().map(|_| self.random_simplex_point(states)).collect()
            }
            ExpansionRule::StochasticSimulationExploratoryAction => self.expand_exploratory_action(
                &current_beliefs,
                states,
                actions,
                observations,
                transition,
                observation_model,
            ),
            _ => {
                let mut new_points = Vec::new();
                for belief in &current_beliefs {
                    let action = match rule {
                        ExpansionRule::StochasticSimulationGreedyAction => {
                            greedy_action(belief, actions, gamma).unwrap_or_else(|| actions[0].clone())
                        }
                        _ => actions.choose(&mut self.rng).cloned().unwrap_or_else(|| actions[0].clone()),
                    };
                    if let Some(point) = self.simulate_step(belief, &action, observations, transition, observation_model, states) {
                        new_points.push(point);
                    }
                }
                new_points
            }
        };
        self.beliefs.extend(new_points);
        self.beliefs.dedup_by(|a, b| a == b);
        Ok(())
    }

    /// `RandomBeliefSelection`: sample `|S|` i.i.d. uniforms, sort them, and
    /// take adjacent differences as the mass on each state (the last state
    /// takes the remainder), per the original's sorted-uniform simplex draw.
    fn random_simplex_point(&mut self, states: &[u32]) -> Belief {
        let mut draws: Vec<f64> = (0..states.len()).map(|_| self.rng.gen_range(0.0..1.0)).collect();
        draws.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let mut belief = Belief::new();
        let mut sum = 0.0;
        for (i, &s) in states.iter().enumerate() {
            let value = if i + 1 < states.len() { draws[i + 1] - draws[i] } else { 1.0 - sum };
            sum += value;
            belief.set(s, value);
        }
        belief
    }

    /// `StochasticSimulationExploratoryAction`: for each belief, simulate one
    /// successor per action and keep the one whose L¹-distance to its
    /// nearest neighbor (across the current belief set and the points
    /// already chosen for this expansion round) is largest.
    #[allow(clippy::too_many_arguments)]
    fn expand_exploratory_action(
        &mut self,
        current_beliefs: &[Belief],
        states: &[u32],
        actions: &[Action],
        observations: &[u32],
        transition: &Transition,
        observation_model: &ObservationModel,
    ) -> Vec<Belief> {
        let mut new_points: Vec<Belief> = Vec::new();
        for belief in current_beliefs {
            let mut best: Option<(Belief, f64)> = None;
            for action in actions {
                let Some(candidate) = self.simulate_step(belief, action, observations, transition, observation_model, states) else {
                    continue;
                };
                let nearest = current_beliefs
                    .iter()
                    .chain(new_points.iter())
                    .map(|other| l1_distance(&candidate, other, states))
                    .fold(f64::INFINITY, f64::min);
                let keep = match &best {
                    None => true,
                    Some((_, best_nearest)) => nearest > *best_nearest,
                };
                if keep {
                    best = Some((candidate, nearest));
                }
            }
            if let Some((candidate, _)) = best {
                new_points.push(candidate);
            }
        }
        new_points
    }

    /// Sample one observation from the distribution induced by taking
    /// `action` in `belief`, then return the Bayes-updated successor belief.
    fn simulate_step(
        &mut self,
        belief: &Belief,
        action: &Action,
        observations: &[u32],
        transition: &Transition,
        observation_model: &ObservationModel,
        states: &[u32],
    ) -> Option<Belief> {
        let a = action.hash();
        let weights: Vec<f64> =
            observations.iter().map(|&z| observation_weight(belief, a, z, transition, observation_model, states)).collect();
        let total: f64 = weights.iter().sum();
        if total <= 0.0 {
            return None;
        }
        let threshold = self.rng.gen_range(0.0..total);
        let mut cumulative = 0.0;
        let mut chosen_z = observations[0];
        for (&z, &w) in observations.iter().zip(&weights) {
            cumulative += w;
            if cumulative >= threshold {
                chosen_z = z;
                break;
            }
        }
        belief_update::update(belief, a, chosen_z, transition, observation_model, states).ok()
    }
}

/// `Σ_s b(s) · Σ_s' T(s, a, s') · O(a, s', z)`: the probability of observing
/// `z` after taking `a` in `belief`, marginalizing over every candidate
/// successor state.
fn observation_weight(
    belief: &Belief,
    action_hash: u32,
    observation_hash: u32,
    transition: &Transition,
    observation_model: &ObservationModel,
    states: &[u32],
) -> f64 {
    belief
        .support()
        .map(|s| {
            states
                .iter()
                .map(|&s_next| transition.get(s, action_hash, s_next) * observation_model.get(action_hash, s_next, observation_hash))
                .sum::<f64>()
                * belief.get(s)
        })
        .sum()
}

/// `Σ_s |a(s) - b(s)|` over every state, for ranking candidate belief points
/// by distance from the existing belief set.
fn l1_distance(a: &Belief, b: &Belief, states: &[u32]) -> f64 {
    states.iter().map(|&s| (a.get(s) - b.get(s)).abs()).sum()
}

/// The action whose best α-vector has the highest dot product with `belief`.
fn greedy_action(belief: &Belief, actions: &[Action], gamma: &[AlphaVector]) -> Option<Action> {
    if gamma.is_empty() {
        return None;
    }
    actions
        .iter()
        .map(|action| {
            let best = gamma
                .iter()
                .filter(|av| av.action() == Some(action))
                .map(|av| av.dot(belief))
                .fold(f64::NEG_INFINITY, f64::max);
            (action, best)
        })
        .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(action, _)| action.clone())
}

/// Run `num_backups` rounds of belief-point backup over the current belief
/// set, returning the final (stationary) α-vector set as a single-step
/// policy.
#[allow(clippy::too_many_arguments)]
pub fn solve(
    solver: &PbviSolver,
    states: &[u32],
    actions: &[Action],
    observations: &[u32],
    transition: &Transition,
    observation_model: &ObservationModel,
    reward: &Reward,
    discount: f64,
    num_backups: u32,
) -> Result<PomdpPolicy, PlannerError> {
    if states.is_empty() {
        return Err(ModelError::NoStates.into());
    }
    if actions.is_empty() {
        return Err(ModelError::NoActions.into());
    }
    if solver.beliefs.is_empty() {
        return Err(SolveError::NotSupported("PBVI requires at least one initial belief point").into());
    }
    let mut gamma: Vec<AlphaVector> = Vec::new();
    for _ in 0..num_backups {
        let mut next_gamma = Vec::with_capacity(solver.beliefs.len());
        for belief in &solver.beliefs {
            if let Some(av) =
                belief_point_backup(belief, &gamma, states, actions, observations, transition, observation_model, reward, discount)
            {
                next_gamma.push(av);
            }
        }
        if next_gamma.is_empty() {
            break;
        }
        gamma = next_gamma;
    }
    Ok(PomdpPolicy::new(vec![gamma]))
}
