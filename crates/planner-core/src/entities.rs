//! States, actions, and observations: opaque entities identified by a stable
//! 32-bit hash, plus the append-only tables that hold them.
//!
//! `State`, `Action`, and `Observation` are all aliases of [`Entity`]: the
//! three roles share the same representation and behave identically with
//! respect to identity, equality, and ordering (by hash). Distinguishing
//! them at the type level would only reproduce the 3x case explosion the
//! original C++ (`NamedState`/`IndexedState`/`JointState`, times three roles)
//! carries for no benefit here, since no operation in this crate depends on
//! which role an `Entity` plays — that's determined entirely by which table
//! it lives in.

use indexmap::IndexMap;
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use crate::error::EntityError;

/// An opaque entity: a state, action, or observation.
#[derive(Debug, Clone)]
pub enum Entity {
    /// Hash derived from the label (Cassandra-format `states: a b c` style).
    Named { hash: u32, label: String },
    /// Hash equals a monotonically assigned index (dense-array friendly).
    Indexed { hash: u32, label: String },
    /// A multi-agent joint entity: an ordered tuple of sub-entities.
    Joint { hash: u32, parts: Vec<Entity> },
}

pub type State = Entity;
pub type Action = Entity;
pub type Observation = Entity;

impl Entity {
    /// Construct a named entity; hash is derived deterministically from the label.
    pub fn named(label: impl Into<String>) -> Self {
        let label = label.into();
        let hash = fnv1a(label.as_bytes());
        Entity::Named { hash, label }
    }

    /// Construct an indexed entity using the next value from `alloc`.
    pub fn indexed(alloc: &mut IndexAllocator, label: impl Into<String>) -> Self {
        let hash = alloc.next();
        Entity::Indexed { hash, label: label.into() }
    }

    /// Construct a joint entity. The hash is a deterministic, order-sensitive
    /// fold over the children's hashes.
    pub fn joint(parts: Vec<Entity>) -> Self {
        let hash = parts.iter().fold(0u32, |acc, p| acc.wrapping_mul(31).wrapping_add(p.hash()));
        Entity::Joint { hash, parts }
    }

    /// This entity's stable identity.
    pub fn hash(&self) -> u32 {
        match self {
            Entity::Named { hash, .. } | Entity::Indexed { hash, .. } | Entity::Joint { hash, .. } => *hash,
        }
    }

    /// Human-readable label. Joint entities render as `a|b|c`.
    pub fn label(&self) -> String {
        match self {
            Entity::Named { label, .. } | Entity::Indexed { label, .. } => label.clone(),
            Entity::Joint { parts, .. } => {
                parts.iter().map(Entity::label).collect::<Vec<_>>().join("|")
            }
        }
    }
}

/// FNV-1a, used to derive a stable 32-bit hash from a label. Deterministic
/// across platforms and Rust versions (unlike `DefaultHasher`), which matters
/// for byte-reproducible policies.
fn fnv1a(bytes: &[u8]) -> u32 {
    const OFFSET_BASIS: u32 = 0x811c_9dc5;
    const PRIME: u32 = 0x0100_0193;
    let mut hash = OFFSET_BASIS;
    for &b in bytes {
        hash ^= u32::from(b);
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}

impl PartialEq for Entity {
    fn eq(&self, other: &Self) -> bool {
        self.hash() == other.hash()
    }
}
impl Eq for Entity {}

impl Hash for Entity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.hash().hash(state);
    }
}

impl PartialOrd for Entity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Entity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.hash().cmp(&other.hash())
    }
}

/// Explicit, per-problem-instance counter for assigning indexed-entity
/// hashes. The original C++ used a process-wide static counter inside each
/// `IndexedState`/`IndexedAction`/`IndexedObservation` class; this type makes
/// that state an explicit value threaded through construction instead, so
/// two problem instances (or two test cases) never share or clobber counters.
#[derive(Debug, Default, Clone, Copy)]
pub struct IndexAllocator {
    counter: u32,
}

impl IndexAllocator {
    #[must_use]
    pub fn new() -> Self {
        Self { counter: 0 }
    }

    /// Returns the next index and advances the counter.
    pub fn next(&mut self) -> u32 {
        let v = self.counter;
        self.counter += 1;
        v
    }

    /// Resets the counter to zero. Used only between test cases or between
    /// distinct problem instances, never mid-solve.
    pub fn reset(&mut self) {
        self.counter = 0;
    }
}

/// An insertion-ordered, append-only (until sealed) collection of entities,
/// indexed by hash.
#[derive(Debug, Clone, Default)]
pub struct EntityTable {
    entries: IndexMap<u32, Entity>,
    sealed: bool,
}

impl EntityTable {
    #[must_use]
    pub fn new() -> Self {
        Self { entries: IndexMap::new(), sealed: false }
    }

    /// Add an entity. Fails if the table has been sealed (solving has begun).
    pub fn add(&mut self, entity: Entity) -> Result<(), EntityError> {
        if self.sealed {
            return Err(EntityError::TableSealed);
        }
        self.entries.insert(entity.hash(), entity);
        Ok(())
    }

    /// Remove an entity by hash. Fails with `UnknownEntity` if absent, or
    /// `TableSealed` once solving has begun.
    pub fn remove(&mut self, hash: u32) -> Result<Entity, EntityError> {
        if self.sealed {
            return Err(EntityError::TableSealed);
        }
        self.entries.shift_remove(&hash).ok_or(EntityError::UnknownEntity(hash))
    }

    #[must_use]
    pub fn get_by_hash(&self, hash: u32) -> Option<&Entity> {
        self.entries.get(&hash)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entities in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entries.values()
    }

    /// Seal the table. Solvers call this once, before the first backup step;
    /// further `add`/`remove` calls fail with `TableSealed`.
    pub fn seal(&mut self) {
        self.sealed = true;
    }

    #[must_use]
    pub fn is_sealed(&self) -> bool {
        self.sealed
    }
}

/// Builds the joint-action/joint-observation table for a multi-agent model:
/// the cross-product of each factor's (agent's) own entity list. Grounded on
/// `JointActionsMap::update_step`, which recursively appends one factor's
/// action at a time and emits a `JointAction` at the base case; here the same
/// traversal (last factor varies fastest) is done with an explicit counter
/// per factor instead of recursion.
#[derive(Debug, Clone)]
pub struct JointTable {
    factors: Vec<Vec<Entity>>,
}

impl JointTable {
    /// `factors[i]` is the `i`th agent's own entity list. Every factor must
    /// be non-empty, mirroring the original's `update()` check that throws
    /// if any factor is undefined before building joint entities.
    pub fn new(factors: Vec<Vec<Entity>>) -> Result<Self, EntityError> {
        if factors.is_empty() || factors.iter().any(Vec::is_empty) {
            return Err(EntityError::EmptyJointFactor);
        }
        Ok(Self { factors })
    }

    #[must_use]
    pub fn num_factors(&self) -> usize {
        self.factors.len()
    }

    /// Total number of joint entities this table produces: `Π |factor_i|`.
    #[must_use]
    pub fn len(&self) -> usize {
        self.factors.iter().map(Vec::len).product()
    }

    /// Iterate every joint entity, one factor-combination at a time, in
    /// odometer order (the last factor advances fastest).
    pub fn iter(&self) -> JointTableIter<'_> {
        JointTableIter { factors: &self.factors, counters: vec![0; self.factors.len()], done: false }
    }
}

/// Odometer over a [`JointTable`]'s factors: a counter per digit/factor,
/// incremented like a multi-digit counter with carry, last digit fastest.
pub struct JointTableIter<'a> {
    factors: &'a [Vec<Entity>],
    counters: Vec<usize>,
    done: bool,
}

impl Iterator for JointTableIter<'_> {
    type Item = Entity;

    fn next(&mut self) -> Option<Entity> {
        if self.done {
            return None;
        }
        let parts: Vec<Entity> = self.counters.iter().zip(self.factors).map(|(&i, f)| f[i].clone()).collect();

        let mut digit = self.counters.len();
        loop {
            if digit == 0 {
                self.done = true;
                break;
            }
            digit -= 1;
            self.counters[digit] += 1;
            if self.counters[digit] < self.factors[digit].len() {
                break;
            }
            self.counters[digit] = 0;
            if digit == 0 {
                self.done = true;
            }
        }
        Some(Entity::joint(parts))
    }
}
