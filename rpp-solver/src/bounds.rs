use crate::SolverError;
use rpp_core::models::{PricePair, PricingConfig};

/// The box of prices the optimizers search.
///
/// The exclusive price must cover the operating cost and may not exceed
/// `p_max`. The pooled price is capped where, at the largest degradation and
/// the detour `delta_small`, a rider valuing the ride at `p_max` would be
/// indifferent to pooling.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PriceBounds {
    /// `(lo, hi)` of the exclusive price
    pub p_x: (f64, f64),
    /// `(lo, hi)` of the pooled price
    pub p_s: (f64, f64),
    k_delta_max: f64,
    delta_small: f64,
}

impl PriceBounds {
    /// The bounds for a rider with maximum degradation `k_delta_max`
    pub fn new(config: &PricingConfig, k_delta_max: f64) -> Self {
        Self {
            p_x: (config.c_op, config.p_max),
            p_s: (0.0, k_delta_max * config.p_max / (1.0 + config.delta_small)),
            k_delta_max,
            delta_small: config.delta_small,
        }
    }

    /// The maximum degradation the pooled price bound was derived from
    pub fn k_delta_max(&self) -> f64 {
        self.k_delta_max
    }

    /// The starting point of the search, clamped into the box.
    ///
    /// `p_x = (1 + c_op) / 2` is the monopoly price for a standard uniform
    /// valuation, and `p_s` is the same price scaled to the pooled ride.
    /// Fails with [`SolverError::InfeasibleBounds`] when the clamped guess
    /// still violates a bound, which happens exactly when the box is empty,
    /// e.g. `p_max < c_op`.
    pub fn initial_guess(&self, c_op: f64) -> Result<PricePair, SolverError> {
        let p_x = ((1.0 + c_op) / 2.0).max(self.p_x.0).min(self.p_x.1);
        let p_s = (self.k_delta_max * (1.0 + c_op) / (2.0 * (1.0 + self.delta_small)))
            .max(self.p_s.0)
            .min(self.p_s.1);

        check("p_x", p_x, self.p_x)?;
        check("p_s", p_s, self.p_s)?;
        Ok(PricePair::new(p_x, p_s))
    }
}

fn check(name: &'static str, value: f64, (lo, hi): (f64, f64)) -> Result<(), SolverError> {
    if lo <= value && value <= hi {
        Ok(())
    } else {
        Err(SolverError::InfeasibleBounds {
            name,
            value,
            lo,
            hi,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rpp_core::models::RawPricingConfig;

    fn config(p_max: f64) -> PricingConfig {
        PricingConfig::try_from(RawPricingConfig {
            p_max: Some(p_max),
            delta_small: Some(0.3),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_bounds() {
        let bounds = PriceBounds::new(&config(1.0), 0.85);
        assert_eq!(bounds.p_x, (0.1, 1.0));
        assert_eq!(bounds.p_s.0, 0.0);
        assert_abs_diff_eq!(bounds.p_s.1, 0.85 / 1.3, epsilon = 1e-12);
    }

    #[test]
    fn test_initial_guess_inside_bounds() {
        let bounds = PriceBounds::new(&config(1.0), 0.85);
        let guess = bounds.initial_guess(0.1).unwrap();
        assert_abs_diff_eq!(guess.p_x, 0.55, epsilon = 1e-12);
        assert_abs_diff_eq!(guess.p_s, 0.85 * 1.1 / 2.6, epsilon = 1e-12);
    }

    #[test]
    fn test_initial_guess_clamped() {
        // p_max below the monopoly price pulls both prices onto their caps
        let bounds = PriceBounds::new(&config(0.4), 0.85);
        let guess = bounds.initial_guess(0.1).unwrap();
        assert_eq!(guess.p_x, 0.4);
        assert_abs_diff_eq!(guess.p_s, 0.85 * 0.4 / 1.3, epsilon = 1e-12);
    }

    #[test]
    fn test_price_cap_below_cost() {
        let bounds = PriceBounds::new(&config(0.05), 0.85);
        assert!(matches!(
            bounds.initial_guess(0.1).unwrap_err(),
            SolverError::InfeasibleBounds { name: "p_x", .. }
        ));
    }
}
