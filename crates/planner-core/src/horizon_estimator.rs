//! Translates an infinite-horizon discount factor and reward range into a
//! finite number of value-iteration backups sufficient to guarantee
//! `epsilon`-optimality.

use crate::error::ModelError;

/// Number of backups needed so the Bellman residual is within `epsilon`,
/// given discount `gamma` and reward range `[rmin, rmax]`:
///
/// `N = ceil( (ln(epsilon) - ln(rmax - rmin)) / ln(gamma) )`
///
/// `rmax - rmin` is guarded against zero by adding `1e-6`, matching the
/// original formula rather than special-casing a zero reward range.
/// Requires `gamma < 1.0` (infinite-horizon value iteration only converges
/// under discounting).
pub fn compute_num_iterations(gamma: f64, rmin: f64, rmax: f64, epsilon: f64) -> Result<u32, ModelError> {
    if gamma >= 1.0 {
        return Err(ModelError::GammaNotLessThanOne(gamma));
    }
    let range = (rmax - rmin).abs() + 1e-6;
    let n = (epsilon.ln() - range.ln()) / gamma.ln();
    Ok(n.ceil().max(1.0) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gamma_at_least_one_is_rejected() {
        assert_eq!(
            compute_num_iterations(1.0, 0.0, 1.0, 0.01),
            Err(ModelError::GammaNotLessThanOne(1.0))
        );
    }

    #[test]
    fn zero_reward_range_needs_one_iteration() {
        assert_eq!(compute_num_iterations(0.9, 5.0, 5.0, 0.01), Ok(1));
    }

    #[test]
    fn tighter_epsilon_needs_more_iterations() {
        let loose = compute_num_iterations(0.9, 0.0, 1.0, 0.1).unwrap();
        let tight = compute_num_iterations(0.9, 0.0, 1.0, 0.0001).unwrap();
        assert!(tight > loose);
    }
}
