use super::DomainError;

/// The support `[lo, hi]` of the uniform distribution riders draw their
/// valuation of an exclusive ride from.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "(f64, f64)", into = "(f64, f64)")
)]
pub struct Support {
    lo: f64,
    hi: f64,
}

impl Support {
    /// Creates a new support, validating that it is a finite, non-degenerate interval
    pub fn new(lo: f64, hi: f64) -> Result<Self, DomainError> {
        if lo.is_nan() || hi.is_nan() {
            return Err(DomainError::NaN);
        }
        if !(lo.is_finite() && hi.is_finite() && lo < hi) {
            return Err(DomainError::MalformedSupport { lo, hi });
        }
        Ok(Self { lo, hi })
    }

    /// The lower end of the support
    pub fn lo(&self) -> f64 {
        self.lo
    }

    /// The upper end of the support
    pub fn hi(&self) -> f64 {
        self.hi
    }

    /// The probability density of valuation `v`.
    ///
    /// Returns `1 / (hi - lo)` on the closed interval and 0 elsewhere.
    pub fn density(&self, v: f64) -> f64 {
        if v >= self.lo && v <= self.hi {
            1.0 / (self.hi - self.lo)
        } else {
            0.0
        }
    }

    /// The cumulative distribution of valuation `v`, clamped to [0, 1].
    ///
    /// A NaN argument (e.g. the 0/0 threshold produced by a zero detour bound)
    /// maps to 0, as `f64::max` discards the NaN.
    pub fn cumulative(&self, v: f64) -> f64 {
        ((v - self.lo) / (self.hi - self.lo)).max(0.0).min(1.0)
    }
}

impl Default for Support {
    fn default() -> Self {
        Self { lo: 0.0, hi: 1.0 }
    }
}

impl TryFrom<(f64, f64)> for Support {
    type Error = DomainError;

    fn try_from((lo, hi): (f64, f64)) -> Result<Self, Self::Error> {
        Self::new(lo, hi)
    }
}

impl From<Support> for (f64, f64) {
    fn from(value: Support) -> Self {
        (value.lo, value.hi)
    }
}

/// Inverse of the virtual valuation `φ(v) = 2v - 1` of the standard uniform distribution.
///
/// Not used by the optimizers; kept for mechanism-design callers that price
/// off the inverse demand directly.
pub fn inverse_virtual_valuation(y: f64) -> f64 {
    0.5 * (1.0 + y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_support() {
        assert_eq!(
            Support::new(1.0, 0.0).unwrap_err(),
            DomainError::MalformedSupport { lo: 1.0, hi: 0.0 }
        );
        assert_eq!(
            Support::new(0.5, 0.5).unwrap_err(),
            DomainError::MalformedSupport { lo: 0.5, hi: 0.5 }
        );
        assert_eq!(
            Support::new(0.0, f64::INFINITY).unwrap_err(),
            DomainError::MalformedSupport {
                lo: 0.0,
                hi: f64::INFINITY
            }
        );
        assert_eq!(Support::new(f64::NAN, 1.0).unwrap_err(), DomainError::NaN);
    }

    #[test]
    fn test_density_vanishes_outside_support() {
        let support = Support::new(2.0, 6.0).unwrap();
        for v in [-1.0, 1.999, 6.001, 100.0] {
            assert_eq!(support.density(v), 0.0);
        }
        for v in [2.0, 3.5, 6.0] {
            assert_eq!(support.density(v), 0.25);
        }
    }

    #[test]
    fn test_cumulative_endpoints_and_clamping() {
        let support = Support::new(2.0, 6.0).unwrap();
        assert_eq!(support.cumulative(2.0), 0.0);
        assert_eq!(support.cumulative(6.0), 1.0);
        assert_eq!(support.cumulative(4.0), 0.5);
        assert_eq!(support.cumulative(-10.0), 0.0);
        assert_eq!(support.cumulative(10.0), 1.0);
        assert_eq!(support.cumulative(f64::INFINITY), 1.0);
        assert_eq!(support.cumulative(f64::NEG_INFINITY), 0.0);
        assert_eq!(support.cumulative(f64::NAN), 0.0);
    }

    #[test]
    fn test_cumulative_is_non_decreasing() {
        let support = Support::default();
        let mut prev = support.cumulative(-0.5);
        for step in 1..=200 {
            let v = -0.5 + step as f64 * 0.01;
            let next = support.cumulative(v);
            assert!(next >= prev, "cdf decreased at v = {v}");
            prev = next;
        }
    }

    #[test]
    fn test_inverse_virtual_valuation() {
        assert_eq!(inverse_virtual_valuation(-1.0), 0.0);
        assert_eq!(inverse_virtual_valuation(0.0), 0.5);
        assert_eq!(inverse_virtual_valuation(1.0), 1.0);
    }
}
