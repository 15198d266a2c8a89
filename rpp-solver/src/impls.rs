use crate::profit::IncrementalProfit;
use crate::{PriceBounds, SolverError};
use rpp_core::models::{LedgerError, PricePair, PricingConfig, RouteLedger};

/// Exhaustive evaluation over an evenly spaced price grid
pub mod gridsearch;
pub use gridsearch::GridSearch;

/// The analytical first-order solution, not implemented yet
pub mod closed_form;
pub use closed_form::ClosedForm;

/// What every optimizer needs before it starts searching: the objective,
/// the box it searches and where it starts.
pub(crate) struct PricingProblem {
    pub(crate) profit: IncrementalProfit,
    pub(crate) bounds: PriceBounds,
    pub(crate) initial_guess: PricePair,
    pub(crate) baseline: f64,
}

impl PricingProblem {
    pub(crate) fn new(
        config: &PricingConfig,
        rider: usize,
        ledger: &RouteLedger,
    ) -> Result<Self, SolverError> {
        let candidate = ledger.rider(rider)?;
        let newest = ledger.len();
        if rider != newest {
            return Err(LedgerError::NotNewest { rider, newest }.into());
        }

        let k_delta_max = candidate
            .k_delta_max()
            .ok_or(SolverError::MissingParameter("k_delta_max"))?;

        let profit = IncrementalProfit::new(config, ledger)?;
        let bounds = PriceBounds::new(config, k_delta_max);
        let initial_guess = bounds.initial_guess(config.c_op)?;
        let baseline = profit.expected(initial_guess);

        Ok(Self {
            profit,
            bounds,
            initial_guess,
            baseline,
        })
    }
}
