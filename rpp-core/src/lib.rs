#![warn(missing_docs)]
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/README.md"))]

/// Core domain models for incremental ride-pooling pricing.
///
/// This module contains the riders, the route ledger they are admitted into,
/// the valuation and degradation models those riders are described by, and
/// the validated pricing configuration.
///
/// The models are primarily data structures with the validation needed to
/// uphold their invariants. The route geometry and the optimizers that act on
/// them live in `rpp-solver`.
pub mod models;

/// Interface traits for price optimizers.
///
/// This module contains the contract an optimizer implementation fulfils,
/// together with the outcome it reports, so that callers can swap between
/// implementations without touching the rest of the pipeline.
pub mod ports;
