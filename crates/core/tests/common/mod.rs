//! Shared test infrastructure for the predictor test suite.
//!
//! Provides a small helper for feeding a predictor the same branch outcome
//! repeatedly, the pattern nearly every learning-convergence test needs.

use tage_core::predictor::{BranchInfo, BranchPredictor};

/// Trains `predictor` on `n` repetitions of the same observed outcome for
/// the conditional branch at `pc`.
pub fn train<P: BranchPredictor>(predictor: &mut P, pc: u64, taken: bool, n: usize) {
    let info = BranchInfo::conditional(pc);
    for _ in 0..n {
        let handle = predictor.predict_branch(&info);
        predictor.update_branch(handle, taken, 0);
    }
}
