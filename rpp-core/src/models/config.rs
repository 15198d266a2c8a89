use super::{DomainError, Point, Rider, RiderError, RiderSpec, Support};

/// Which optimizer prices the newest rider.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SolverType {
    /// Analytic first-order solution; currently a placeholder returning the initial guess
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = "closed_form"))]
    ClosedForm,
    /// Exhaustive evaluation over an evenly spaced price grid
    #[cfg_attr(feature = "serde", serde(rename = "gridsearch"))]
    GridSearch,
}

/// How densely the grid search samples each price axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GridDensity {
    /// Spacing between grid points; each axis gets `floor(width / resolution)` points
    Resolution(f64),
    /// A fixed number of points per axis
    Points(usize),
}

impl GridDensity {
    /// The number of grid points on an axis spanning `[lo, hi]`.
    pub fn points(&self, lo: f64, hi: f64) -> usize {
        match *self {
            // Truncation toward zero, a negative width yields an empty axis
            Self::Resolution(resolution) => ((hi - lo) / resolution).max(0.0) as usize,
            Self::Points(n) => n,
        }
    }
}

/// The validated parameters of the pricing model and its optimizer.
///
/// Built from a [`RawPricingConfig`], which carries the same options as plain,
/// partially optional values. The exclusive price cap `p_max` and the detour
/// used to bound pooled prices, `delta_small`, have no sensible default, so a
/// raw config lacking either is rejected here rather than guessed at.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "RawPricingConfig", into = "RawPricingConfig")
)]
pub struct PricingConfig {
    /// Support of the riders' valuation distribution
    pub support: Support,
    /// Operating cost per unit of distance
    pub c_op: f64,
    /// The detour bound given to every rider in symmetric scenarios
    pub delta_same: f64,
    /// Slope of the detour-to-quality-discount mapping
    pub degradation_multiplier: f64,
    /// Weight of the expected ex-post IR penalty in the pooled profit
    pub eepp_coeff: f64,
    /// Pooled price of the bootstrapped rider, per unit of distance
    pub p_s_1_per_mile: f64,
    /// The optimizer to run
    pub solver_type: SolverType,
    /// Density of the grid search
    pub grid: GridDensity,
    /// Upper bound on the exclusive price
    pub p_max: f64,
    /// Detour fraction used in the pooled price bound and grid feasibility
    pub delta_small: f64,
}

impl PricingConfig {
    /// A copy of this config with a different ex-post penalty weight, for sweeps
    pub fn with_eepp_coeff(&self, eepp_coeff: f64) -> Result<Self, ConfigError> {
        let mut raw = RawPricingConfig::from(self.clone());
        raw.eepp_coeff = eepp_coeff;
        Self::try_from(raw)
    }

    /// A rider whose detour bound is `delta_same`
    pub fn rider(&self, source: Point, destination: Point) -> Result<Rider, RiderError> {
        Rider::new(
            RiderSpec::new(source, destination, self.delta_same),
            self.degradation_multiplier,
        )
    }

    /// The bootstrapped first rider, priced at `p_s_1_per_mile`, with detour bound `delta_same`
    pub fn bootstrapped_rider(
        &self,
        source: Point,
        destination: Point,
    ) -> Result<Rider, RiderError> {
        Rider::bootstrapped(
            RiderSpec::new(source, destination, self.delta_same)
                .with_shared_price(self.p_s_1_per_mile),
            self.degradation_multiplier,
            &self.support,
            self.c_op,
        )
    }
}

/// The unvalidated form of [`PricingConfig`], as it would be written in a parameter file.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RawPricingConfig {
    /// Support of the valuation distribution, `(lo, hi)`
    pub support_v: (f64, f64),
    /// Operating cost per unit of distance
    pub c_op: f64,
    /// Default detour bound
    pub delta_same: f64,
    /// Detour-to-quality-discount slope
    pub degradation_multiplier: f64,
    /// Ex-post penalty weight
    #[cfg_attr(feature = "serde", serde(rename = "EEPP_coeff"))]
    pub eepp_coeff: f64,
    /// Pooled price of the bootstrapped rider
    pub p_s_1_per_mile: f64,
    /// Optimizer mode
    pub solver_type: SolverType,
    /// Number of grid points per axis, used when no resolution is given
    pub gridsearch_num: Option<usize>,
    /// Spacing between grid points; takes precedence over `gridsearch_num`
    pub gridsearch_resolution: Option<f64>,
    /// Upper bound on the exclusive price; required
    pub p_max: Option<f64>,
    /// Detour fraction bounding pooled prices; required
    pub delta_small: Option<f64>,
}

impl Default for RawPricingConfig {
    fn default() -> Self {
        Self {
            support_v: (0.0, 1.0),
            c_op: 0.1,
            delta_same: 0.3,
            degradation_multiplier: 2.0,
            eepp_coeff: 1.0,
            p_s_1_per_mile: 0.15,
            solver_type: SolverType::ClosedForm,
            gridsearch_num: Some(21),
            gridsearch_resolution: None,
            p_max: None,
            delta_small: None,
        }
    }
}

impl TryFrom<RawPricingConfig> for PricingConfig {
    type Error = ConfigError;

    /// Validates a raw config.
    ///
    /// # Validation
    ///
    /// 1. The support is a finite interval with lo < hi
    /// 2. Costs, prices and weights are finite and non-negative
    /// 3. Detour fractions lie in [0, 1] and the degradation multiplier is positive
    /// 4. `p_max` and `delta_small` are present
    /// 5. A grid density is given, and a resolution is positive
    fn try_from(value: RawPricingConfig) -> Result<Self, Self::Error> {
        let support = Support::try_from(value.support_v)?;

        for (name, x) in [
            ("c_op", value.c_op),
            ("EEPP_coeff", value.eepp_coeff),
            ("p_s_1_per_mile", value.p_s_1_per_mile),
        ] {
            non_negative(name, x)?;
        }

        detour(value.delta_same)?;
        if !(value.degradation_multiplier > 0.0 && value.degradation_multiplier.is_finite()) {
            return Err(DomainError::NonPositiveMultiplier(value.degradation_multiplier).into());
        }

        let p_max = value.p_max.ok_or(ConfigError::Missing("p_max"))?;
        non_negative("p_max", p_max)?;
        let delta_small = value.delta_small.ok_or(ConfigError::Missing("delta_small"))?;
        detour(delta_small)?;

        let grid = match (value.gridsearch_resolution, value.gridsearch_num) {
            (Some(resolution), _) => {
                if !(resolution > 0.0 && resolution.is_finite()) {
                    return Err(ConfigError::NonPositiveResolution(resolution));
                }
                GridDensity::Resolution(resolution)
            }
            (None, Some(n)) => GridDensity::Points(n),
            (None, None) => return Err(ConfigError::Missing("gridsearch_resolution")),
        };

        Ok(Self {
            support,
            c_op: value.c_op,
            delta_same: value.delta_same,
            degradation_multiplier: value.degradation_multiplier,
            eepp_coeff: value.eepp_coeff,
            p_s_1_per_mile: value.p_s_1_per_mile,
            solver_type: value.solver_type,
            grid,
            p_max,
            delta_small,
        })
    }
}

impl From<PricingConfig> for RawPricingConfig {
    fn from(value: PricingConfig) -> Self {
        let (gridsearch_resolution, gridsearch_num) = match value.grid {
            GridDensity::Resolution(r) => (Some(r), None),
            GridDensity::Points(n) => (None, Some(n)),
        };
        Self {
            support_v: value.support.into(),
            c_op: value.c_op,
            delta_same: value.delta_same,
            degradation_multiplier: value.degradation_multiplier,
            eepp_coeff: value.eepp_coeff,
            p_s_1_per_mile: value.p_s_1_per_mile,
            solver_type: value.solver_type,
            gridsearch_num,
            gridsearch_resolution,
            p_max: Some(value.p_max),
            delta_small: Some(value.delta_small),
        }
    }
}

fn non_negative(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_nan() {
        Err(DomainError::NaN.into())
    } else if !(value.is_finite() && value >= 0.0) {
        Err(ConfigError::Negative { name, value })
    } else {
        Ok(())
    }
}

fn detour(value: f64) -> Result<(), ConfigError> {
    if value.is_nan() {
        Err(DomainError::NaN.into())
    } else if !(0.0..=1.0).contains(&value) {
        Err(DomainError::DetourOutOfRange(value).into())
    } else {
        Ok(())
    }
}

/// Errors that can occur when validating a pricing config
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// A parameter without a default was not supplied
    #[error("missing required parameter `{0}`")]
    Missing(&'static str),
    /// A parameter is outside its mathematical domain
    #[error("invalid config: {0}")]
    Domain(#[from] DomainError),
    /// A cost, price or weight is negative or infinite
    #[error("`{name}` must be finite and non-negative, got {value}")]
    Negative {
        /// The parameter name
        name: &'static str,
        /// The rejected value
        value: f64,
    },
    /// The grid resolution must be a positive step
    #[error("grid resolution must be positive, got {0}")]
    NonPositiveResolution(f64),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw() -> RawPricingConfig {
        RawPricingConfig {
            p_max: Some(1.0),
            delta_small: Some(0.3),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults_validate_once_required_inputs_are_given() {
        let config = PricingConfig::try_from(raw()).unwrap();
        assert_eq!(config.support, Support::default());
        assert_eq!(config.c_op, 0.1);
        assert_eq!(config.solver_type, SolverType::ClosedForm);
        assert_eq!(config.grid, GridDensity::Points(21));
        assert_eq!(config.p_max, 1.0);
        assert_eq!(config.delta_small, 0.3);
    }

    #[test]
    fn test_missing_required_inputs() {
        assert_eq!(
            PricingConfig::try_from(RawPricingConfig::default()).unwrap_err(),
            ConfigError::Missing("p_max")
        );
        assert_eq!(
            PricingConfig::try_from(RawPricingConfig {
                p_max: Some(1.0),
                ..Default::default()
            })
            .unwrap_err(),
            ConfigError::Missing("delta_small")
        );
        assert_eq!(
            PricingConfig::try_from(RawPricingConfig {
                gridsearch_num: None,
                ..raw()
            })
            .unwrap_err(),
            ConfigError::Missing("gridsearch_resolution")
        );
    }

    #[test]
    fn test_invalid_values() {
        assert_eq!(
            PricingConfig::try_from(RawPricingConfig {
                support_v: (1.0, 0.0),
                ..raw()
            })
            .unwrap_err(),
            ConfigError::Domain(DomainError::MalformedSupport { lo: 1.0, hi: 0.0 })
        );
        assert_eq!(
            PricingConfig::try_from(RawPricingConfig {
                c_op: -0.1,
                ..raw()
            })
            .unwrap_err(),
            ConfigError::Negative {
                name: "c_op",
                value: -0.1
            }
        );
        assert_eq!(
            PricingConfig::try_from(RawPricingConfig {
                delta_small: Some(1.3),
                ..raw()
            })
            .unwrap_err(),
            ConfigError::Domain(DomainError::DetourOutOfRange(1.3))
        );
        assert_eq!(
            PricingConfig::try_from(RawPricingConfig {
                degradation_multiplier: 0.0,
                ..raw()
            })
            .unwrap_err(),
            ConfigError::Domain(DomainError::NonPositiveMultiplier(0.0))
        );
        assert_eq!(
            PricingConfig::try_from(RawPricingConfig {
                gridsearch_resolution: Some(0.0),
                ..raw()
            })
            .unwrap_err(),
            ConfigError::NonPositiveResolution(0.0)
        );
    }

    #[test]
    fn test_resolution_takes_precedence() {
        let config = PricingConfig::try_from(RawPricingConfig {
            gridsearch_resolution: Some(0.05),
            ..raw()
        })
        .unwrap();
        assert_eq!(config.grid, GridDensity::Resolution(0.05));
    }

    #[test]
    fn test_grid_points() {
        assert_eq!(GridDensity::Points(7).points(0.0, 1.0), 7);
        assert_eq!(GridDensity::Resolution(0.25).points(0.0, 1.0), 4);
        assert_eq!(GridDensity::Resolution(0.25).points(0.5, 1.5), 4);
        assert_eq!(GridDensity::Resolution(0.1).points(1.0, 0.5), 0);
    }

    #[test]
    fn test_with_eepp_coeff() {
        let config = PricingConfig::try_from(raw()).unwrap();
        let swept = config.with_eepp_coeff(50.0).unwrap();
        assert_eq!(swept.eepp_coeff, 50.0);
        assert_eq!(swept.p_max, config.p_max);
        assert!(config.with_eepp_coeff(-1.0).is_err());
    }

    #[test]
    fn test_json_roundtrip() {
        let config = PricingConfig::try_from(RawPricingConfig {
            solver_type: SolverType::GridSearch,
            ..raw()
        })
        .unwrap();
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["EEPP_coeff"], 1.0);
        assert_eq!(json["solver_type"], "gridsearch");
        let back: PricingConfig = serde_json::from_value(json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_json_rejects_missing_p_max() {
        let json = serde_json::json!({ "delta_small": 0.3 });
        assert!(serde_json::from_value::<PricingConfig>(json).is_err());
    }

    #[test]
    fn test_riders_from_config() {
        let config = PricingConfig::try_from(raw()).unwrap();
        let first = config
            .bootstrapped_rider(Point::new(0.0, 0.0), Point::new(2.5, 0.0))
            .unwrap();
        assert!(first.is_bootstrapped());
        assert_eq!(first.shared_price(), Some(0.15));
        assert_eq!(first.delta_bar(), 0.3);

        let second = config
            .rider(Point::new(1.0, 3.0), Point::new(2.5, 0.0))
            .unwrap();
        assert!(!second.is_bootstrapped());
        assert_eq!(second.shared_price(), None);
    }
}
