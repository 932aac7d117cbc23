//! Contract-violation errors for the predict/update handshake.
//!
//! The TAGE engine itself is total over well-formed inputs: saturating
//! primitives make arithmetic-range violations impossible, and all storage
//! is preallocated at construction. The only failure mode is a *caller*
//! contract violation — calling `predict` while a handle is still
//! outstanding, or `update` with no outstanding handle (or the wrong one).
//! [`predictor::Predictor`](crate::predictor::Predictor) surfaces these as
//! `Result::Err` so a harness or test can assert on misuse instead of the
//! bare engine silently aborting.

use thiserror::Error;

/// Contract violation on the single-slot predict/update handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PredictorError {
    /// `predict` was called while a previous prediction handle was still
    /// outstanding (no matching `update` call yet).
    #[error("predict called while a prediction handle is still outstanding")]
    PredictWhilePending,

    /// `update` was called with no outstanding prediction handle.
    #[error("update called with no outstanding prediction handle")]
    UpdateWithoutPredict,

    /// `update` was called with a handle that does not match the most
    /// recently issued one (the scratch slot has capacity one).
    #[error("update called with a stale or mismatched prediction handle")]
    StaleHandle,
}
