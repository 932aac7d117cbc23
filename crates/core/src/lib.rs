//! TAGE conditional branch direction predictor core.
//!
//! This crate implements the engine of a TAgged GEometric-history (TAGE)
//! branch direction predictor: geometric-history tagged tables, compressed
//! history folding, prime/alternate prediction arbitration, useful-bit
//! management with periodic graceful reset, and allocation-on-misprediction.
//!
//! 1. **Predictor:** [`predictor::tage::TagePredictor`] (the TAGE engine) and
//!    [`predictor::gshare::GSharePredictor`] (a trivial calibration baseline),
//!    both behind the [`predictor::BranchPredictor`] trait.
//! 2. **Config:** [`config::Config`] — JSON-deserializable configuration for
//!    every tunable named in the predictor's data model.
//! 3. **Errors:** [`error::PredictorError`] — contract violations on the
//!    single-slot predict/update handshake.
//! 4. **Stats:** [`stats::PredictorStats`] — prediction accuracy accounting
//!    for a trace-replay harness.

/// Configuration for the predictor core (table sizes, history lengths, reset
/// interval) and its gshare calibration baseline.
pub mod config;
/// Contract-violation error type for the predict/update handshake.
pub mod error;
/// Branch predictor implementations and the common interface they share.
pub mod predictor;
/// Prediction accuracy accounting for a trace-replay harness.
pub mod stats;

/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// Contract-violation error type.
pub use crate::error::PredictorError;
/// The TAGE predictor engine.
pub use crate::predictor::tage::TagePredictor;
/// The checked single-slot predict/update wrapper around any `BranchPredictor`.
pub use crate::predictor::Predictor;
