//! Crate-wide error types.
//!
//! Each concern owns a small `thiserror` enum; [`PlannerError`] composes them
//! via `#[from]` so solver entry points can return a single error type.
//! Wildcard-lookup misses are never an error (they resolve to `0.0`, per the
//! "undefined = 0" contract of the input format) and so have no variant here.

use thiserror::Error;

/// Entity table errors (states, actions, observations).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntityError {
    #[error("no entity with hash {0} in table")]
    UnknownEntity(u32),
    #[error("table is sealed: entities cannot be added or removed once solving begins")]
    TableSealed,
    #[error("joint table requires at least one factor, and every factor non-empty")]
    EmptyJointFactor,
}

/// Dense tensor/reward index errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TensorError {
    #[error("index {index} out of range for dimension of size {size}")]
    BadIndex { index: usize, size: usize },
}

/// Reward construction/assignment errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RewardError {
    #[error("assigned a {got:?} value to a reward of arity {expected:?}")]
    ArityMismatch { expected: crate::reward::RewardArity, got: crate::reward::RewardArity },
    #[error("factored reward has {components} components but {weights} weights")]
    WeightDimensionMismatch { components: usize, weights: usize },
}

/// Belief errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BeliefError {
    #[error("belief has zero total mass and cannot be normalized")]
    Unnormalizable,
    #[error("observation has zero probability under this belief, action, and model")]
    ImpossibleObservation,
}

/// α-vector algebra errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AlphaError {
    #[error("dominance pruning requires a non-empty set of alpha vectors")]
    InvalidGamma,
}

/// Model construction errors (missing or inconsistent components).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("model has no states")]
    NoStates,
    #[error("model has no actions")]
    NoActions,
    #[error("discount factor must be < 1.0 for infinite horizon, got {0}")]
    GammaNotLessThanOne(f64),
    #[error("factored reward weights sum to zero")]
    ZeroWeightSum,
}

/// Errors surfaced by solver entry points.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolveError {
    #[error("{0} is a reserved/unimplemented feature")]
    NotSupported(&'static str),
}

/// Crate-wide error, composing each concern's error type.
///
/// Exit codes for a CLI wrapper built on top of this crate (not part of the
/// core, prescribed here only for uniformity with a future parser/CLI):
/// `EntityError`/`TensorError`/`RewardError`/`ModelError` → 3 (model error),
/// `BeliefError`/`AlphaError`/`SolveError` → 4 (solve error). Parse errors (2)
/// and I/O errors (5) belong to the out-of-scope parser and are not variants
/// of this type.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlannerError {
    #[error(transparent)]
    Entity(#[from] EntityError),
    #[error(transparent)]
    Tensor(#[from] TensorError),
    #[error(transparent)]
    Reward(#[from] RewardError),
    #[error(transparent)]
    Belief(#[from] BeliefError),
    #[error(transparent)]
    Alpha(#[from] AlphaError),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Solve(#[from] SolveError),
}
