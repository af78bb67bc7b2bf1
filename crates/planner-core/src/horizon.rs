//! Planning horizon: a fixed step count, or infinite with a discount factor.

use ordered_float::OrderedFloat;

/// The horizon of an MDP-like model.
///
/// A horizon of `0` in an input file denotes infinite; by the time a
/// `Horizon` value exists, that has already been resolved to `Infinite`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Horizon {
    Finite { steps: u32, gamma: OrderedFloat<f64> },
    Infinite { gamma: OrderedFloat<f64> },
}

impl Horizon {
    /// A finite horizon of `steps` (clamped to at least 1) and discount `gamma`
    /// (clamped into `[0, 1]`).
    #[must_use]
    pub fn finite(steps: u32, gamma: f64) -> Self {
        Horizon::Finite { steps: steps.max(1), gamma: OrderedFloat(gamma.clamp(0.0, 1.0)) }
    }

    /// An infinite horizon with discount `gamma` (clamped into `[0, 1]`).
    #[must_use]
    pub fn infinite(gamma: f64) -> Self {
        Horizon::Infinite { gamma: OrderedFloat(gamma.clamp(0.0, 1.0)) }
    }

    /// Build from the raw `horizon: h` field of an input file: `0` means infinite.
    #[must_use]
    pub fn from_raw(steps: u32, gamma: f64) -> Self {
        if steps == 0 {
            Horizon::infinite(gamma)
        } else {
            Horizon::finite(steps, gamma)
        }
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        matches!(self, Horizon::Finite { .. })
    }

    #[must_use]
    pub fn gamma(&self) -> f64 {
        match self {
            Horizon::Finite { gamma, .. } | Horizon::Infinite { gamma } => gamma.0,
        }
    }

    /// Number of steps, if finite.
    #[must_use]
    pub fn steps(&self) -> Option<u32> {
        match self {
            Horizon::Finite { steps, .. } => Some(*steps),
            Horizon::Infinite { .. } => None,
        }
    }
}

impl Default for Horizon {
    /// Finite horizon of 1 step, discount 1.0 — the canonical reset default.
    fn default() -> Self {
        Horizon::finite(1, 1.0)
    }
}
