/// Errors raised when a model input lies outside the domain it is defined on.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum DomainError {
    /// A NaN was provided where a number was expected
    #[error("NaN value encountered")]
    NaN,
    /// The valuation support must be a finite interval with lo < hi
    #[error("support [{lo}, {hi}] must be finite with lo < hi")]
    MalformedSupport {
        /// The lower end of the offending interval
        lo: f64,
        /// The upper end of the offending interval
        hi: f64,
    },
    /// Detour fractions are normalized by the rider's own trip distance and must lie in [0, 1]
    #[error("detour fraction {0} lies outside [0, 1]")]
    DetourOutOfRange(f64),
    /// The degradation multiplier divides the detour and must be positive
    #[error("degradation multiplier must be positive, got {0}")]
    NonPositiveMultiplier(f64),
}
