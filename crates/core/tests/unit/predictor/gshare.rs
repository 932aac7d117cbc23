//! gshare calibration baseline scenario tests.

use tage_core::config::GShareConfig;
use tage_core::predictor::gshare::GSharePredictor;
use tage_core::predictor::{BranchInfo, BranchPredictor};

use crate::common::train;

fn default_gshare() -> GSharePredictor {
    GSharePredictor::new(&GShareConfig::default())
}

/// A fresh Pattern History Table entry starts at the weakly-not-taken
/// counter value (1), so an unseen branch predicts not-taken.
#[test]
fn unseen_branch_predicts_not_taken() {
    let mut gshare = default_gshare();
    let handle = gshare.predict_branch(&BranchInfo::conditional(0x100));
    assert!(!handle.direction_prediction);
}

/// Training on "taken" pushes the counter up past the threshold.
#[test]
fn learns_taken_after_training() {
    let mut gshare = default_gshare();
    train(&mut gshare, 0x100, true, 3);
    let handle = gshare.predict_branch(&BranchInfo::conditional(0x100));
    assert!(handle.direction_prediction);
}

/// A non-conditional branch always predicts taken.
#[test]
fn unconditional_branch_predicts_taken() {
    let mut gshare = default_gshare();
    let info = BranchInfo { address: 0x200, flags: 0 };
    let handle = gshare.predict_branch(&info);
    assert!(handle.direction_prediction);
}
