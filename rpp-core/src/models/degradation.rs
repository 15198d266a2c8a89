use super::DomainError;

/// The quality discount a rider perceives for a pooled ride with detour fraction `delta`.
///
/// `delta` must already be normalized by the rider's own trip distance, so it
/// is rejected outside of [0, 1]. The result `1 - delta / multiplier` is the
/// fraction of an exclusive ride's value the rider still attaches to the pooled
/// ride; it decreases strictly in `delta` and equals 1 for a zero detour.
pub fn degradation(delta: f64, multiplier: f64) -> Result<f64, DomainError> {
    if delta.is_nan() || multiplier.is_nan() {
        return Err(DomainError::NaN);
    }
    if !(0.0..=1.0).contains(&delta) {
        return Err(DomainError::DetourOutOfRange(delta));
    }
    if multiplier <= 0.0 {
        return Err(DomainError::NonPositiveMultiplier(multiplier));
    }
    Ok(1.0 - delta / multiplier)
}
