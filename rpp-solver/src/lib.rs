#![warn(missing_docs)]
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/README.md"))]

use rpp_core::models::{PricingConfig, RouteLedger, SolverType};
use rpp_core::ports::{OptimizationOutcome, Optimizer as _};

/// Route detours and drop-off placement for the newest rider.
pub mod geometry;

/// Choice probabilities of an arriving rider facing an exclusive and a pooled price.
pub mod choice;

/// The expected incremental profit of admitting the newest rider.
pub mod profit;

/// Named artifacts describing a priced rider, for downstream reporting.
pub mod report;

/// Price bounds and the starting point shared by the optimizers.
mod bounds;
pub use bounds::PriceBounds;

mod error;
pub use error::SolverError;

/**
 * These are implementations of the price optimizer.
 */
mod impls;
pub use impls::*;

/// Prices the newest rider with the optimizer named by `config.solver_type`.
///
/// `ledger` must already carry the newest rider's drop-off position, as set by
/// [`geometry::apply_insertion`].
pub fn optimize_prices(
    config: &PricingConfig,
    rider: usize,
    ledger: &RouteLedger,
) -> Result<OptimizationOutcome, SolverError> {
    match config.solver_type {
        SolverType::ClosedForm => ClosedForm.optimize(config, rider, ledger),
        SolverType::GridSearch => GridSearch.optimize(config, rider, ledger),
    }
}
