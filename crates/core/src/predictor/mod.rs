//! Common interface shared by the TAGE engine and the gshare baseline.
//!
//! Direction prediction only — a BTB, return-address stack, or call/return
//! predictor is assumed to exist externally and is not this trait's concern.
//!
//! The predict/update handshake is stateful: a single outstanding prediction
//! handle must be consumed by a matching `update_branch` call before another
//! `predict_branch` may run. [`Predictor`] is the checked wrapper that turns
//! a violation of that contract into a `Result` instead of a debug-only
//! assertion.

pub mod gshare;
pub mod tage;

mod saturating;

use crate::error::PredictorError;

/// Set on [`BranchInfo::flags`] when the branch is a conditional branch.
///
/// Any other branch kind (unconditional jump, call, return) is not predicted
/// by this crate; `predict_branch` returns a fixed "taken" answer for it and
/// `update_branch` leaves all predictor state untouched.
pub const BR_CONDITIONAL: u32 = 1 << 0;

/// The static information about a branch instruction available at fetch time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BranchInfo {
    /// The branch instruction's address.
    pub address: u64,
    /// Bit flags describing the branch kind; see [`BR_CONDITIONAL`].
    pub flags: u32,
}

impl BranchInfo {
    /// Returns a [`BranchInfo`] for a conditional branch at `address`.
    pub fn conditional(address: u64) -> Self {
        Self { address, flags: BR_CONDITIONAL }
    }

    /// Whether this branch carries [`BR_CONDITIONAL`].
    pub fn is_conditional(&self) -> bool {
        self.flags & BR_CONDITIONAL != 0
    }
}

/// The result of one `predict_branch` call, consumed by the matching
/// `update_branch` call.
///
/// `token` is an implementation detail: it lets a predictor (or the checked
/// [`Predictor`] wrapper) detect that `update_branch` is being fed a handle
/// other than the one it most recently issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PredictionHandle {
    /// The predicted branch direction (`true` = taken).
    pub direction_prediction: bool,
    /// The predicted target address. Unused by this crate's predictors
    /// (direction-only); carried for a harness that layers a BTB on top.
    pub target_prediction: u64,
    pub(crate) token: u64,
}

/// The interface shared by every branch direction predictor in this crate.
///
/// `predict_branch` and `update_branch` form a single-slot handshake: the
/// scratch state a predictor computes while predicting (which tables hit,
/// which entry each table index names) lives only until the matching
/// `update_branch` call consumes it. A bare implementation is total over
/// well-formed call sequences but only *debug*-asserts on misuse; wrap it in
/// [`Predictor`] to get a checked, panic-free handshake that reports misuse
/// as `Result::Err`.
pub trait BranchPredictor {
    /// Predicts the direction (and, trivially, the target) of `info`.
    fn predict_branch(&mut self, info: &BranchInfo) -> PredictionHandle;

    /// Trains the predictor with the actual outcome of the branch described
    /// by `handle`, the handle most recently returned by `predict_branch`.
    fn update_branch(&mut self, handle: PredictionHandle, taken: bool, target: u64);
}

/// A checked single-slot predict/update wrapper around any [`BranchPredictor`].
///
/// Tracks whether a prediction handle is currently outstanding and rejects
/// calls that violate the handshake instead of letting the inner predictor's
/// debug assertions fire (or silently no-op in release builds).
#[derive(Debug, Clone)]
pub struct Predictor<P> {
    inner: P,
    pending_token: Option<u64>,
}

impl<P: BranchPredictor> Predictor<P> {
    /// Wraps `inner` with handshake checking. Starts in the idle state.
    pub fn new(inner: P) -> Self {
        Self { inner, pending_token: None }
    }

    /// Predicts `info`, or fails if a previous handle is still outstanding.
    pub fn predict(&mut self, info: &BranchInfo) -> Result<PredictionHandle, PredictorError> {
        if self.pending_token.is_some() {
            return Err(PredictorError::PredictWhilePending);
        }
        let handle = self.inner.predict_branch(info);
        self.pending_token = Some(handle.token);
        Ok(handle)
    }

    /// Trains on `handle`, or fails if no handle (or a different one) is
    /// outstanding.
    pub fn update(
        &mut self,
        handle: PredictionHandle,
        taken: bool,
        target: u64,
    ) -> Result<(), PredictorError> {
        match self.pending_token {
            None => Err(PredictorError::UpdateWithoutPredict),
            Some(token) if token != handle.token => Err(PredictorError::StaleHandle),
            Some(_) => {
                self.inner.update_branch(handle, taken, target);
                self.pending_token = None;
                Ok(())
            }
        }
    }

    /// Returns the wrapped predictor.
    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// Consumes the wrapper, returning the inner predictor.
    pub fn into_inner(self) -> P {
        self.inner
    }
}
