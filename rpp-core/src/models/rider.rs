use super::{DomainError, Point, Support, degradation};

/// The raw description of a rider, before validation.
///
/// This is what callers assemble from their own sources; [`Rider::new`] and
/// [`Rider::bootstrapped`] turn it into a [`Rider`] with its derived quantities.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RiderSpec {
    /// Pickup location
    pub source: Point,
    /// Drop-off location
    pub destination: Point,
    /// The largest detour fraction the rider tolerates, in [0, 1]
    pub delta_bar: f64,
    /// The rider's maximum degradation value, needed only when this rider's prices are optimized
    #[cfg_attr(feature = "serde", serde(default))]
    pub k_delta_max: Option<f64>,
    /// The pooled price this rider pays, if already agreed
    #[cfg_attr(feature = "serde", serde(default))]
    pub shared_price: Option<f64>,
    /// The detour fraction the rider already incurs on the current route
    #[cfg_attr(feature = "serde", serde(default))]
    pub detour_without_insertion: f64,
}

impl RiderSpec {
    /// A rider with the given trip and detour bound, and no further state
    pub fn new(source: Point, destination: Point, delta_bar: f64) -> Self {
        Self {
            source,
            destination,
            delta_bar,
            k_delta_max: None,
            shared_price: None,
            detour_without_insertion: 0.0,
        }
    }

    /// Sets the rider's maximum degradation value
    pub fn with_k_delta_max(mut self, k_delta_max: f64) -> Self {
        self.k_delta_max = Some(k_delta_max);
        self
    }

    /// Sets the rider's agreed pooled price
    pub fn with_shared_price(mut self, shared_price: f64) -> Self {
        self.shared_price = Some(shared_price);
        self
    }
}

/// A rider admitted (or being admitted) onto the route.
///
/// The trip geometry, the detour bound and the degradation derived from it are
/// fixed at creation. The detour fractions are route state, rewritten by the
/// insertion engine every time a new rider is placed on the route.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Rider {
    source: Point,
    destination: Point,
    trip_distance: f64,
    delta_bar: f64,
    k_delta_bar: f64,
    k_delta_max: Option<f64>,
    shared_price: Option<f64>,
    is_bootstrapped: bool,
    /// Detour fraction on the route before the newest rider is inserted
    pub actual_detour_without_insertion: f64,
    /// Detour fraction on the route after the newest rider is inserted
    pub actual_detour_with_insertion: f64,
}

impl Rider {
    /// Validates a rider whose prices are set by the firm.
    ///
    /// `degradation_multiplier` converts the rider's detour bound into the
    /// quality discount `k_delta_bar`.
    pub fn new(spec: RiderSpec, degradation_multiplier: f64) -> Result<Self, RiderError> {
        let RiderSpec {
            source,
            destination,
            delta_bar,
            k_delta_max,
            shared_price,
            detour_without_insertion,
        } = spec;

        if !source.is_finite() || !destination.is_finite() {
            return Err(RiderError::NonFiniteLocation);
        }

        let trip_distance = source.distance(&destination);
        // Every detour is normalized by the trip distance
        if trip_distance <= 0.0 {
            return Err(RiderError::ZeroLengthTrip);
        }

        let k_delta_bar = degradation(delta_bar, degradation_multiplier)?;

        if let Some(k) = k_delta_max {
            if !(k > 0.0 && k <= 1.0) {
                return Err(RiderError::InvalidMaxDegradation(k));
            }
        }

        if let Some(price) = shared_price {
            if !(price.is_finite() && price >= 0.0) {
                return Err(RiderError::InvalidSharedPrice(price));
            }
        }

        if !(detour_without_insertion.is_finite() && detour_without_insertion >= 0.0) {
            return Err(RiderError::InvalidDetour(detour_without_insertion));
        }

        Ok(Self {
            source,
            destination,
            trip_distance,
            delta_bar,
            k_delta_bar,
            k_delta_max,
            shared_price,
            is_bootstrapped: false,
            actual_detour_without_insertion: detour_without_insertion,
            actual_detour_with_insertion: detour_without_insertion,
        })
    }

    /// Validates the first rider on a route, whose pooled price is fixed exogenously.
    ///
    /// On top of the checks of [`Rider::new`], the agreed price must be present
    /// and cover the operating cost, and the rider must be willing to pool ex
    /// ante, i.e. a rider with the highest possible valuation must prefer
    /// the pooled ride at the detour bound over no ride at all:
    /// `sd * k_delta_bar * support.hi - sd * p_s * (1 + delta_bar) > 0`.
    pub fn bootstrapped(
        spec: RiderSpec,
        degradation_multiplier: f64,
        support: &Support,
        c_op: f64,
    ) -> Result<Self, RiderError> {
        let mut rider = Self::new(spec, degradation_multiplier)?;
        let price = rider.shared_price.ok_or(RiderError::MissingSharedPrice)?;

        if price < c_op {
            return Err(RiderError::SharedPriceBelowCost { price, c_op });
        }

        let slack = rider.ex_ante_ir_slack(support, price);
        if !(slack > 0.0) {
            return Err(RiderError::IrViolation { slack });
        }

        rider.is_bootstrapped = true;
        Ok(rider)
    }

    fn ex_ante_ir_slack(&self, support: &Support, price: f64) -> f64 {
        self.trip_distance * self.k_delta_bar * support.hi()
            - self.trip_distance * price * (1.0 + self.delta_bar)
    }

    /// Pickup location
    pub fn source(&self) -> Point {
        self.source
    }

    /// Drop-off location
    pub fn destination(&self) -> Point {
        self.destination
    }

    /// The direct distance from pickup to drop-off
    pub fn trip_distance(&self) -> f64 {
        self.trip_distance
    }

    /// The largest tolerated detour fraction
    pub fn delta_bar(&self) -> f64 {
        self.delta_bar
    }

    /// The quality discount at the detour bound
    pub fn k_delta_bar(&self) -> f64 {
        self.k_delta_bar
    }

    /// The maximum degradation value, if it was provided
    pub fn k_delta_max(&self) -> Option<f64> {
        self.k_delta_max
    }

    /// The agreed pooled price, if any
    pub fn shared_price(&self) -> Option<f64> {
        self.shared_price
    }

    /// Whether this rider was priced exogenously as the first rider on the route
    pub fn is_bootstrapped(&self) -> bool {
        self.is_bootstrapped
    }

    /// Records the pooled price this rider agreed to.
    ///
    /// Once set, this price is the one used when the rider's detour is
    /// re-priced by later insertions.
    pub fn set_shared_price(&mut self, price: f64) -> Result<(), RiderError> {
        if !(price.is_finite() && price >= 0.0) {
            return Err(RiderError::InvalidSharedPrice(price));
        }
        self.shared_price = Some(price);
        Ok(())
    }
}

/// Errors that can occur when validating a rider
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum RiderError {
    /// The detour bound or degradation multiplier is out of domain
    #[error("invalid rider: {0}")]
    Domain(#[from] DomainError),
    /// A pickup or drop-off coordinate is NaN or infinite
    #[error("Locations must be finite")]
    NonFiniteLocation,
    /// Pickup and drop-off coincide
    #[error("Trip distance must be positive")]
    ZeroLengthTrip,
    /// The maximum degradation value lies outside (0, 1]
    #[error("maximum degradation {0} lies outside (0, 1]")]
    InvalidMaxDegradation(f64),
    /// A pooled price is negative or not finite
    #[error("invalid shared price {0}")]
    InvalidSharedPrice(f64),
    /// An initial detour fraction is negative or not finite
    #[error("invalid detour fraction {0}")]
    InvalidDetour(f64),
    /// The bootstrapped rider must come with an agreed pooled price
    #[error("The first rider on a route needs a fixed shared price")]
    MissingSharedPrice,
    /// The bootstrapped rider's price does not cover the operating cost
    #[error("shared price {price} is below the operating cost {c_op}")]
    SharedPriceBelowCost {
        /// The agreed pooled price
        price: f64,
        /// The per-distance operating cost
        c_op: f64,
    },
    /// The bootstrapped rider would not pool even at the top of the valuation support
    #[error("ex ante individual rationality violated (slack {slack})")]
    IrViolation {
        /// The ex-ante IR value, which must be positive
        slack: f64,
    },
}
