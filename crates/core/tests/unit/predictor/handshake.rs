//! Single-slot predict/update handshake tests, through the checked
//! [`Predictor`] wrapper.

use tage_core::config::TageConfig;
use tage_core::error::PredictorError;
use tage_core::predictor::tage::TagePredictor;
use tage_core::predictor::{BranchInfo, Predictor};

fn wrapped() -> Predictor<TagePredictor> {
    Predictor::new(TagePredictor::new(&TageConfig::default()))
}

/// A normal predict-then-update cycle succeeds and leaves the slot idle.
#[test]
fn predict_then_update_succeeds() {
    let mut p = wrapped();
    let info = BranchInfo::conditional(0x1000);
    let handle = p.predict(&info).expect("predict should succeed from idle");
    assert!(p.update(handle, true, 0x1004).is_ok());
}

/// Calling `predict` twice without an intervening `update` is rejected.
#[test]
fn double_predict_is_rejected() {
    let mut p = wrapped();
    let info = BranchInfo::conditional(0x1000);
    p.predict(&info).unwrap();
    assert_eq!(p.predict(&info), Err(PredictorError::PredictWhilePending));
}

/// A second `update` with no intervening `predict` is rejected: the slot
/// went idle after the first `update` consumed its handle, so there is no
/// outstanding handle left to match against.
#[test]
fn update_with_no_outstanding_handle_is_rejected() {
    let mut p = wrapped();
    let info = BranchInfo::conditional(0x1000);
    let handle = p.predict(&info).unwrap();
    p.update(handle, true, 0).unwrap();
    assert_eq!(p.update(handle, true, 0), Err(PredictorError::UpdateWithoutPredict));
}

/// Sequential predict/update/predict/update cycles on different branches
/// each succeed independently.
#[test]
fn interleaved_branches_each_complete_their_own_cycle() {
    let mut p = wrapped();
    let a = BranchInfo::conditional(0x1000);
    let b = BranchInfo::conditional(0x2000);

    let ha = p.predict(&a).unwrap();
    p.update(ha, true, 0).unwrap();

    let hb = p.predict(&b).unwrap();
    p.update(hb, false, 0).unwrap();
}
