use rpp_core::models::{ConfigError, DomainError, LedgerError, RiderError};

/// Errors that stop the pricing of a rider.
///
/// These are hard failures on inputs that make no economic sense; a pooled
/// option that no valuation would choose is not an error and simply has
/// probability 0.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum SolverError {
    /// A model input is outside its domain
    #[error("invalid domain: {0}")]
    InvalidDomain(#[from] DomainError),
    /// The config failed validation
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// A rider failed validation
    #[error(transparent)]
    Rider(#[from] RiderError),
    /// The route does not satisfy the operation's preconditions
    #[error("invalid ledger: {0}")]
    InvalidLedger(#[from] LedgerError),
    /// An input the optimizer needs was not supplied
    #[error("missing required parameter `{0}`")]
    MissingParameter(&'static str),
    /// The starting price lies outside the price bounds
    #[error("{name} = {value} lies outside [{lo}, {hi}]")]
    InfeasibleBounds {
        /// Which price is out of bounds
        name: &'static str,
        /// The out-of-bounds value
        value: f64,
        /// Lower bound
        lo: f64,
        /// Upper bound
        hi: f64,
    },
    /// The requested computation is reserved but not implemented
    #[error("{0} is not implemented")]
    NotImplemented(&'static str),
}
