//! Unit tests for the predictor implementations.

/// Scenario tests for the TAGE engine's direction prediction and training.
pub mod tage;

/// Scenario tests for the gshare calibration baseline.
pub mod gshare;

/// Tests for the checked single-slot predict/update handshake.
pub mod handshake;
