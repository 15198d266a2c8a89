mod config;
mod degradation;
mod domain;
mod ledger;
mod point;
mod price;
mod rider;
mod support;

pub use config::{ConfigError, GridDensity, PricingConfig, RawPricingConfig, SolverType};
pub use degradation::degradation;
pub use domain::DomainError;
pub use ledger::{LedgerError, RouteLedger};
pub use point::Point;
pub use price::PricePair;
pub use rider::{Rider, RiderError, RiderSpec};
pub use support::{Support, inverse_virtual_valuation};

/// An insertion-ordered map.
///
/// Reports are consumed by plotting and sweep tooling that expects a stable
/// key order between runs, so we use `indexmap` with a fast, deterministic hasher.
pub type Map<K, V = f64> = indexmap::IndexMap<K, V, rustc_hash::FxBuildHasher>;
