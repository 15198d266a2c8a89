use super::PricingProblem;
use crate::SolverError;
use rpp_core::models::{PricingConfig, RouteLedger};
use rpp_core::ports::{OptimizationOutcome, Optimizer, SolveStatus};
use tracing::{Level, event};

/// Prices from the first-order conditions of the expected profit.
///
/// The conditions are not solved yet: the optimizer validates its inputs like
/// any other, then returns the starting prices with their profit, marked
/// [`SolveStatus::Placeholder`] so that callers cannot mistake them for an
/// optimum.
#[derive(Clone, Copy, Debug, Default)]
pub struct ClosedForm;

impl Optimizer for ClosedForm {
    type Error = SolverError;

    fn optimize(
        &self,
        config: &PricingConfig,
        rider: usize,
        ledger: &RouteLedger,
    ) -> Result<OptimizationOutcome, Self::Error> {
        let problem = PricingProblem::new(config, rider, ledger)?;

        event!(
            Level::WARN,
            rider,
            p_x = problem.initial_guess.p_x,
            p_s = problem.initial_guess.p_s,
            "closed-form pricing is not implemented, returning the initial guess"
        );

        Ok(OptimizationOutcome {
            profit: problem.baseline,
            prices: problem.initial_guess,
            surface: None,
            status: SolveStatus::Placeholder,
        })
    }
}
