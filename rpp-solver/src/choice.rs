//! A rider with valuation `v` for an exclusive ride gets surplus `v - p_x` from
//! it, `k * v - p_s * (1 + delta)` from a pooled ride degraded by `k` at
//! detour `delta`, and 0 from declining. Comparing these pairwise yields two
//! valuation thresholds: riders above `v_upper` take the exclusive ride,
//! riders between `v_lower` and `v_upper` pool, and the rest decline.

use rpp_core::models::{PricePair, Support};
use tracing::{Level, event};

/// How far `v_upper` may fall below `v_lower` before the pooled region is treated as empty
pub const POOL_REGION_TOLERANCE: f64 = 1e-4;

/// The valuation above which the exclusive ride beats pooling
pub fn upper_threshold(prices: PricePair, delta_bar: f64, k_delta_bar: f64) -> f64 {
    (prices.p_x - prices.p_s * (1.0 + delta_bar)) / (1.0 - k_delta_bar)
}

/// The valuation above which pooling beats declining
pub fn lower_threshold(prices: PricePair, delta_bar: f64, k_delta_bar: f64) -> f64 {
    prices.p_s * (1.0 + delta_bar) / k_delta_bar
}

/// The probability that the rider takes the exclusive ride
pub fn prob_exclusive(
    prices: PricePair,
    delta_bar: f64,
    k_delta_bar: f64,
    support: &Support,
) -> f64 {
    1.0 - support.cumulative(upper_threshold(prices, delta_bar, k_delta_bar))
}

/// The probability that the rider pools.
///
/// If the thresholds cross by more than [`POOL_REGION_TOLERANCE`], no
/// valuation prefers pooling; this is logged and reported as probability 0.
pub fn prob_pool(prices: PricePair, delta_bar: f64, k_delta_bar: f64, support: &Support) -> f64 {
    let v_upper = upper_threshold(prices, delta_bar, k_delta_bar);
    let v_lower = lower_threshold(prices, delta_bar, k_delta_bar);

    if v_upper - v_lower < -POOL_REGION_TOLERANCE {
        event!(
            Level::WARN,
            v_upper,
            v_lower,
            p_x = prices.p_x,
            p_s = prices.p_s,
            "pooled choice region is empty, using probability 0"
        );
        return 0.0;
    }

    (support.cumulative(v_upper) - support.cumulative(v_lower))
        .max(0.0)
        .min(1.0)
}

/// Whether the pooled price is low enough, relative to the exclusive price,
/// for pooling to be worth considering at all.
///
/// `(k_delta_bar / (1 + delta_bar)) * p_x - p_s`, which must be non-negative.
/// At exactly 0 the pooled price no longer matters, which covers the choice
/// between the exclusive ride and declining.
pub fn feasibility(prices: PricePair, delta_bar: f64, k_delta_bar: f64) -> f64 {
    (k_delta_bar / (1.0 + delta_bar)) * prices.p_x - prices.p_s
}

/// The probabilities of the three choices a rider can make.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChoiceProbabilities {
    /// Probability of choosing the exclusive ride
    pub exclusive: f64,
    /// Probability of pooling
    pub pool: f64,
}

impl ChoiceProbabilities {
    /// Evaluates both probabilities at `prices`
    pub fn new(prices: PricePair, delta_bar: f64, k_delta_bar: f64, support: &Support) -> Self {
        Self {
            exclusive: prob_exclusive(prices, delta_bar, k_delta_bar, support),
            pool: prob_pool(prices, delta_bar, k_delta_bar, support),
        }
    }

    /// The probability of declining both rides, `1 - exclusive - pool`
    pub fn nothing(&self) -> f64 {
        1.0 - self.exclusive - self.pool
    }
}
