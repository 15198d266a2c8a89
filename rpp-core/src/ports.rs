use crate::models::{PricePair, PricingConfig, RouteLedger};

/// Whether an outcome was actually optimized, or is a placeholder standing in
/// for an optimizer that is not implemented yet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SolveStatus {
    /// The prices were chosen by searching the objective
    Optimized,
    /// The prices are the initial guess, returned unchanged
    Placeholder,
}

/// The expected incremental profit sampled over an evenly spaced price grid.
///
/// Rows follow the exclusive price axis, columns the pooled price axis. Cells
/// the grid search skipped as infeasible hold 0.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProfitSurface {
    p_x: Vec<f64>,
    p_s: Vec<f64>,
    values: Vec<f64>,
}

impl ProfitSurface {
    /// A zero-filled surface over the given axes
    pub fn zeros(p_x: Vec<f64>, p_s: Vec<f64>) -> Self {
        let values = vec![0.0; p_x.len() * p_s.len()];
        Self { p_x, p_s, values }
    }

    /// The grid values of the exclusive price
    pub fn p_x(&self) -> &[f64] {
        &self.p_x
    }

    /// The grid values of the pooled price
    pub fn p_s(&self) -> &[f64] {
        &self.p_s
    }

    /// `(rows, columns)`
    pub fn shape(&self) -> (usize, usize) {
        (self.p_x.len(), self.p_s.len())
    }

    /// The profit at row `i`, column `j`, if in range
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        (i < self.p_x.len() && j < self.p_s.len()).then(|| self.values[i * self.p_s.len() + j])
    }

    /// Sets the profit at row `i`, column `j`.
    ///
    /// # Panics
    ///
    /// Panics if the cell is out of range.
    pub fn set(&mut self, i: usize, j: usize, value: f64) {
        assert!(i < self.p_x.len() && j < self.p_s.len(), "cell out of range");
        let cols = self.p_s.len();
        self.values[i * cols + j] = value;
    }

    /// Iterates over the rows of the surface, one per exclusive price
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        // chunks() rejects a zero size, and an empty p_s axis means no cells anyway
        self.values.chunks(self.p_s.len().max(1))
    }
}

/// The result of pricing the newest rider.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OptimizationOutcome {
    /// The expected incremental profit at `prices`
    pub profit: f64,
    /// The chosen exclusive and pooled prices
    pub prices: PricePair,
    /// The sampled profit surface, for optimizers that produce one
    pub surface: Option<ProfitSurface>,
    /// Whether `prices` was optimized or is a placeholder
    pub status: SolveStatus,
}

/// Interface for optimizers that price the newest rider on a route.
///
/// An optimizer takes the validated config and a ledger on which the newest
/// rider's drop-off position has already been applied, and produces the price
/// pair maximizing the firm's expected incremental profit. The ledger is only
/// read.
pub trait Optimizer {
    /// Error type for optimizer failures
    type Error: std::error::Error;

    /// Price rider `rider`, which must be the newest rider on `ledger`.
    fn optimize(
        &self,
        config: &PricingConfig,
        rider: usize,
        ledger: &RouteLedger,
    ) -> Result<OptimizationOutcome, Self::Error>;
}
