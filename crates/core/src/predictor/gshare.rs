//! gshare calibration baseline.
//!
//! A global-history XOR-hashed Pattern History Table of 2-bit saturating
//! counters, direction prediction only. Useful as a cheap point of
//! comparison against the TAGE engine on the same trace.

use super::saturating::{sat_dec, sat_inc};
use super::{BranchInfo, BranchPredictor, PredictionHandle};
use crate::config::GShareConfig;

/// Saturating maximum for the 2-bit Pattern History Table counters.
const COUNTER_MAX: u8 = 3;

/// A gshare direction predictor.
#[derive(Debug, Clone)]
pub struct GSharePredictor {
    ghr: u64,
    pht: Vec<u8>,
    table_mask: u64,
    scratch: Option<(u64, u64, bool)>, // (token, pc, conditional)
    next_token: u64,
}

impl GSharePredictor {
    /// Builds a predictor from `config`.
    pub fn new(config: &GShareConfig) -> Self {
        let table_size = 1usize << config.table_bits;
        Self {
            ghr: 0,
            pht: vec![1; table_size],
            table_mask: (table_size as u64) - 1,
            scratch: None,
            next_token: 0,
        }
    }

    fn index(&self, pc: u64) -> usize {
        let pc_part = (pc >> 2) & self.table_mask;
        let ghr_part = self.ghr & self.table_mask;
        (pc_part ^ ghr_part) as usize
    }
}

impl BranchPredictor for GSharePredictor {
    fn predict_branch(&mut self, info: &BranchInfo) -> PredictionHandle {
        let token = self.next_token;
        self.next_token += 1;

        if !info.is_conditional() {
            self.scratch = Some((token, info.address, false));
            return PredictionHandle { direction_prediction: true, target_prediction: 0, token };
        }

        self.scratch = Some((token, info.address, true));
        let idx = self.index(info.address);
        let taken = self.pht[idx] >= 2;
        PredictionHandle { direction_prediction: taken, target_prediction: 0, token }
    }

    fn update_branch(&mut self, handle: PredictionHandle, taken: bool, _target: u64) {
        let Some((token, pc, conditional)) = self.scratch.take() else { return };
        if token != handle.token || !conditional {
            return;
        }

        let idx = self.index(pc);
        let counter = self.pht[idx];
        self.pht[idx] = if taken { sat_inc(counter, COUNTER_MAX) } else { sat_dec(counter) };
        self.ghr = (self.ghr << 1) | u64::from(taken);
    }
}
