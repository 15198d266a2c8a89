/// The pair of prices offered to an arriving rider, both quoted per unit of distance.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PricePair {
    /// The price of an exclusive ride
    pub p_x: f64,
    /// The price of a pooled ride
    pub p_s: f64,
}

impl PricePair {
    /// Creates a price pair
    pub const fn new(p_x: f64, p_s: f64) -> Self {
        Self { p_x, p_s }
    }
}

impl From<(f64, f64)> for PricePair {
    fn from((p_x, p_s): (f64, f64)) -> Self {
        Self { p_x, p_s }
    }
}
