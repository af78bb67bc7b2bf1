//! Deterministic planning primitives for fully- and partially-observable
//! sequential decision problems: MDPs, POMDPs, and the data model for
//! multi-agent Dec-POMDPs.
//!
//! The crate is organized in two layers:
//!
//! - A data model ([`entities`], [`horizon`], [`belief`], [`key`],
//!   [`tensor`], [`reward`], [`alpha`], [`policy`]) representing states,
//!   actions, observations, transition/observation probabilities, and
//!   reward, all with a dense/sparse dual representation.
//! - Solvers ([`horizon_estimator`], [`belief_update`], [`backup`], [`mdp`],
//!   [`pomdp_vi`], [`pbvi`]) implementing value iteration over that model.
//!
//! Every floating-point result that crosses a solver boundary is
//! deterministic: no process-wide RNG or hash map iteration order is ever
//! observable in a solve's output (see [`determinism`]).

pub mod alpha;
pub mod backup;
pub mod belief;
pub mod belief_update;
pub mod determinism;
pub mod entities;
pub mod error;
pub mod horizon;
pub mod horizon_estimator;
pub mod key;
pub mod mdp;
pub mod pbvi;
pub mod policy;
pub mod pomdp_vi;
pub mod reward;
pub mod tensor;

pub use alpha::AlphaVector;
pub use belief::Belief;
pub use entities::{Action, Entity, EntityTable, IndexAllocator, JointTable, JointTableIter, Observation, State};
pub use error::PlannerError;
pub use horizon::Horizon;
pub use key::Key;
pub use policy::{MdpPolicy, PomdpPolicy};
pub use reward::{Reward, RewardArity};
pub use tensor::{ObservationModel, Transition};
