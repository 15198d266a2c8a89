//! If the newest rider `j` rides exclusively, the firm earns its margin over
//! the operating cost on the direct trip. If `j` pools, the firm earns `j`'s
//! pooled fare on its (detoured) trip, plus the fares of the riders aboard
//! during the pickup and drop-off detours net of the cost of driving them,
//! less the weighted penalty for riders whose ex-post participation breaks.

use crate::choice::ChoiceProbabilities;
use crate::{SolverError, geometry};
use rpp_core::models::{LedgerError, PricePair, PricingConfig, RouteLedger, Support};

/// The expected ex-post individual-rationality penalty of one rider.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ExpostPenalty {
    /// The penalty integral is not implemented; counts as 0
    Placeholder,
    /// An evaluated expected penalty
    Expected(f64),
}

impl ExpostPenalty {
    /// The penalty's contribution to the profit; 0 for a placeholder
    pub fn value(&self) -> f64 {
        match *self {
            Self::Placeholder => 0.0,
            Self::Expected(value) => value,
        }
    }

    /// Whether this is a placeholder rather than an evaluated penalty
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder)
    }
}

/// The expected penalty for rider `idx` ending up worse off than not riding
/// once the route is final, integrated over the valuation distribution and
/// conditioned on the rider having accepted ex ante.
///
/// For the bootstrapped rider this is evaluated against its exogenous price
/// and realized detour; for later riders against their pooled price. Neither
/// integral is implemented, so every rider yields [`ExpostPenalty::Placeholder`].
pub fn expost_penalty(ledger: &RouteLedger, idx: usize) -> Result<ExpostPenalty, SolverError> {
    ledger.rider(idx)?;
    Ok(ExpostPenalty::Placeholder)
}

/// The sum of the agreed pooled prices of riders `start_idx..=N`.
///
/// Riders without an agreed price contribute nothing.
pub fn sum_shared_prices(ledger: &RouteLedger, start_idx: usize) -> f64 {
    ledger
        .iter()
        .filter(|(idx, _)| *idx >= start_idx)
        .filter_map(|(_, rider)| rider.shared_price())
        .sum()
}

/// The pieces the expected incremental profit is assembled from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProfitComponents {
    /// Probability that the newest rider rides exclusively
    pub prob_exclusive: f64,
    /// Probability that the newest rider pools
    pub prob_pool: f64,
    /// Incremental profit if the newest rider rides exclusively
    pub incr_profit_exclusive: f64,
    /// Incremental profit if the newest rider pools
    pub incr_profit_pool: f64,
    /// The unweighted sum of every rider's expected ex-post penalty
    pub expost_penalty_sum: f64,
}

impl ProfitComponents {
    /// `prob_exclusive * incr_profit_exclusive + prob_pool * incr_profit_pool`
    pub fn expected(&self) -> f64 {
        self.prob_exclusive * self.incr_profit_exclusive + self.prob_pool * self.incr_profit_pool
    }

    /// The probability that the newest rider declines
    pub fn prob_nothing(&self) -> f64 {
        1.0 - self.prob_exclusive - self.prob_pool
    }
}

/// The expected incremental profit of the newest rider, as a function of its prices.
///
/// Everything that does not depend on the prices (the route detours, the
/// fares collected on them and the penalty) is computed once, so the
/// evaluation inside an optimizer's loop is cheap. The evaluator borrows
/// nothing and can be shared across threads.
#[derive(Clone, Debug)]
pub struct IncrementalProfit {
    support: Support,
    c_op: f64,
    trip_distance: f64,
    detour_with_insertion: f64,
    delta_bar: f64,
    k_delta_bar: f64,
    route_term: f64,
    expost_penalty_sum: f64,
    penalty_term: f64,
    insertion_point: usize,
}

impl IncrementalProfit {
    /// Prepares the evaluation for the newest rider of `ledger`.
    ///
    /// The newest rider's drop-off position must already be applied.
    pub fn new(config: &PricingConfig, ledger: &RouteLedger) -> Result<Self, SolverError> {
        ledger.check_insertable()?;
        let t_j = ledger
            .insertion_point()
            .ok_or(LedgerError::InsertionPending)?;
        let rider = &ledger[ledger.len()];

        let source_detour = geometry::source_detour(ledger)?;
        let destination_detour = geometry::destination_detour(ledger, t_j)?;
        let route_term = (sum_shared_prices(ledger, 1) - config.c_op) * source_detour
            + (sum_shared_prices(ledger, t_j) - config.c_op) * destination_detour;

        let mut expost_penalty_sum = 0.0;
        for (idx, _) in ledger.iter() {
            expost_penalty_sum += expost_penalty(ledger, idx)?.value();
        }

        Ok(Self {
            support: config.support,
            c_op: config.c_op,
            trip_distance: rider.trip_distance(),
            detour_with_insertion: rider.actual_detour_with_insertion,
            delta_bar: rider.delta_bar(),
            k_delta_bar: rider.k_delta_bar(),
            route_term,
            expost_penalty_sum,
            penalty_term: config.eepp_coeff * expost_penalty_sum,
            insertion_point: t_j,
        })
    }

    /// The drop-off position `t_j` the evaluation was prepared for
    pub fn insertion_point(&self) -> usize {
        self.insertion_point
    }

    /// The profit components at `prices`
    pub fn components(&self, prices: PricePair) -> ProfitComponents {
        let probs =
            ChoiceProbabilities::new(prices, self.delta_bar, self.k_delta_bar, &self.support);

        ProfitComponents {
            prob_exclusive: probs.exclusive,
            prob_pool: probs.pool,
            incr_profit_exclusive: (prices.p_x - self.c_op) * self.trip_distance,
            incr_profit_pool: prices.p_s * self.trip_distance * (1.0 + self.detour_with_insertion)
                + self.route_term
                - self.penalty_term,
            expost_penalty_sum: self.expost_penalty_sum,
        }
    }

    /// The expected incremental profit at `prices`
    pub fn expected(&self, prices: PricePair) -> f64 {
        self.components(prices).expected()
    }
}
