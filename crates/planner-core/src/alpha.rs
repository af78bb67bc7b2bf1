//! α-vector algebra: the value-function representation shared by exact
//! POMDP value iteration and PBVI.

use std::collections::BTreeMap;

use crate::belief::Belief;
use crate::entities::Action;
use crate::error::AlphaError;

/// A single linear piece of a piecewise-linear, convex value function, tagged
/// with the action it witnesses. Sparse over state hashes: a missing entry is
/// an implicit `0.0` coefficient.
#[derive(Debug, Clone, PartialEq)]
pub struct AlphaVector {
    coeffs: BTreeMap<u32, f64>,
    action: Option<Action>,
}

impl AlphaVector {
    #[must_use]
    pub fn new(action: Option<Action>) -> Self {
        Self { coeffs: BTreeMap::new(), action }
    }

    #[must_use]
    pub fn zero(num_states_hint: usize) -> Self {
        let _ = num_states_hint;
        Self::new(None)
    }

    pub fn set(&mut self, state_hash: u32, value: f64) {
        if value == 0.0 {
            self.coeffs.remove(&state_hash);
        } else {
            self.coeffs.insert(state_hash, value);
        }
    }

    #[must_use]
    pub fn get(&self, state_hash: u32) -> f64 {
        self.coeffs.get(&state_hash).copied().unwrap_or(0.0)
    }

    #[must_use]
    pub fn action(&self) -> Option<&Action> {
        self.action.as_ref()
    }

    pub fn set_action(&mut self, action: Option<Action>) {
        self.action = action;
    }

    /// `α · b = Σ_s α(s) · b(s)`, summed over the α-vector's own support
    /// (entries the belief doesn't cover contribute `0.0`, per the
    /// implicit-zero contract).
    #[must_use]
    pub fn dot(&self, belief: &Belief) -> f64 {
        self.coeffs.iter().map(|(&s, &v)| v * belief.get(s)).sum()
    }

    /// Pointwise sum over the union of both vectors' supports. The result is
    /// not tagged with an action — only a backup assigns those.
    #[must_use]
    pub fn add(&self, other: &AlphaVector) -> AlphaVector {
        let mut out = AlphaVector::new(None);
        for (&s, &v) in &self.coeffs {
            out.set(s, v);
        }
        for (&s, &v) in &other.coeffs {
            let prev = out.get(s);
            out.set(s, prev + v);
        }
        out
    }

    /// Pointwise difference, `self - other`, over the union of supports.
    #[must_use]
    pub fn sub(&self, other: &AlphaVector) -> AlphaVector {
        let mut out = AlphaVector::new(None);
        for (&s, &v) in &self.coeffs {
            out.set(s, v);
        }
        for (&s, &v) in &other.coeffs {
            let prev = out.get(s);
            out.set(s, prev - v);
        }
        out
    }
}

impl std::ops::Add for &AlphaVector {
    type Output = AlphaVector;
    fn add(self, rhs: &AlphaVector) -> AlphaVector {
        AlphaVector::add(self, rhs)
    }
}

impl std::ops::Sub for &AlphaVector {
    type Output = AlphaVector;
    fn sub(self, rhs: &AlphaVector) -> AlphaVector {
        AlphaVector::sub(self, rhs)
    }
}

/// The cross-sum (Minkowski sum) of two α-vector sets: every pairwise sum,
/// `|result| = |a| * |b|`. Either side being empty is the fringe case: the
/// cross-sum is then just a copy of the other side (the "no contribution"
/// identity element), not an empty set.
#[must_use]
pub fn cross_sum(a: &[AlphaVector], b: &[AlphaVector]) -> Vec<AlphaVector> {
    if a.is_empty() {
        return b.to_vec();
    }
    if b.is_empty() {
        return a.to_vec();
    }
    let mut out = Vec::with_capacity(a.len() * b.len());
    for av in a {
        for bv in b {
            out.push(av.add(bv));
        }
    }
    out
}

/// Componentwise dominance pruning: drop any α-vector for which some other
/// vector in the set is at least as good at every state in the union of
/// their supports (no LP witness-region step, per the simplified contract).
/// Errors on an empty input — there is no well-formed pruned set of nothing.
pub fn prune(gamma: &[AlphaVector]) -> Result<Vec<AlphaVector>, AlphaError> {
    if gamma.is_empty() {
        return Err(AlphaError::InvalidGamma);
    }
    let mut keep = vec![true; gamma.len()];
    for i in 0..gamma.len() {
        if !keep[i] {
            continue;
        }
        for j in 0..gamma.len() {
            if i == j || !keep[j] {
                continue;
            }
            if dominates(&gamma[j], &gamma[i]) && !dominates(&gamma[i], &gamma[j]) {
                keep[i] = false;
                break;
            }
            // Equal vectors: keep the earlier index, drop the later one.
            if i < j && dominates(&gamma[j], &gamma[i]) && dominates(&gamma[i], &gamma[j]) {
                keep[j] = false;
            }
        }
    }
    Ok(gamma.iter().zip(keep).filter(|(_, k)| *k).map(|(v, _)| v.clone()).collect())
}

/// `lhs(s) >= rhs(s)` for every state in the union of both supports.
fn dominates(lhs: &AlphaVector, rhs: &AlphaVector) -> bool {
    let states: std::collections::BTreeSet<u32> =
        lhs.coeffs.keys().chain(rhs.coeffs.keys()).copied().collect();
    states.iter().all(|&s| lhs.get(s) >= rhs.get(s))
}
