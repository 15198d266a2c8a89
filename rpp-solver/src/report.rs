use crate::profit::IncrementalProfit;
use rpp_core::models::Map;
use rpp_core::ports::{OptimizationOutcome, SolveStatus};

/// The names under which the quantities of a priced rider are reported.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ArtifactKey {
    /// Expected incremental profit at the chosen prices
    Profitval,
    /// Sum of the expected ex-post penalties
    ExpostPenalty,
    /// Chosen pooled price
    Ps,
    /// Chosen exclusive price
    Px,
    /// Probability of pooling
    ProbPool,
    /// Probability of the exclusive ride
    ProbExclusive,
    /// Probability of declining
    ProbNothing,
    /// Drop-off position of the newest rider
    TJ,
    /// The share of the expected profit that comes from pooling, `prob_pool * incr_profit_pool`
    ProfitvalAndProbPool,
}

impl ArtifactKey {
    /// Every key, in reporting order
    pub const ALL: [Self; 9] = [
        Self::Profitval,
        Self::ExpostPenalty,
        Self::Ps,
        Self::Px,
        Self::ProbPool,
        Self::ProbExclusive,
        Self::ProbNothing,
        Self::TJ,
        Self::ProfitvalAndProbPool,
    ];

    /// The key's name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Profitval => "profitval",
            Self::ExpostPenalty => "expost_penalty",
            Self::Ps => "ps",
            Self::Px => "px",
            Self::ProbPool => "prob_pool",
            Self::ProbExclusive => "prob_exclusive",
            Self::ProbNothing => "prob_nothing",
            Self::TJ => "t_j",
            Self::ProfitvalAndProbPool => "profitval_and_prob_pool",
        }
    }
}

impl std::fmt::Display for ArtifactKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The artifacts of one pricing decision, ready to be handed to whatever
/// stores or plots them.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PricingReport {
    /// Whether the prices were optimized
    pub status: SolveStatus,
    /// The artifact values, in [`ArtifactKey::ALL`] order
    pub artifacts: Map<ArtifactKey, f64>,
}

impl PricingReport {
    /// Evaluates the artifacts at the outcome's prices.
    ///
    /// The drop-off position is the one `profit` was prepared for.
    pub fn new(outcome: &OptimizationOutcome, profit: &IncrementalProfit) -> Self {
        let components = profit.components(outcome.prices);

        let artifacts = ArtifactKey::ALL
            .into_iter()
            .map(|key| {
                let value = match key {
                    ArtifactKey::Profitval => outcome.profit,
                    ArtifactKey::ExpostPenalty => components.expost_penalty_sum,
                    ArtifactKey::Ps => outcome.prices.p_s,
                    ArtifactKey::Px => outcome.prices.p_x,
                    ArtifactKey::ProbPool => components.prob_pool,
                    ArtifactKey::ProbExclusive => components.prob_exclusive,
                    ArtifactKey::ProbNothing => components.prob_nothing(),
                    ArtifactKey::TJ => profit.insertion_point() as f64,
                    ArtifactKey::ProfitvalAndProbPool => {
                        components.prob_pool * components.incr_profit_pool
                    }
                };
                (key, value)
            })
            .collect();

        Self {
            status: outcome.status,
            artifacts,
        }
    }

    /// The value reported under `key`
    pub fn get(&self, key: ArtifactKey) -> Option<f64> {
        self.artifacts.get(&key).copied()
    }
}
