//! Saturating counter primitives.
//!
//! Every counter in the predictor — bimodal counters, tagged-table counters,
//! useful bits, and `altBetterCount` — is clamped with these two primitives.
//! Using them uniformly keeps every counter in range by construction;
//! nothing in this crate ever needs to check a counter's bounds after the
//! fact.

/// Returns `min(v + 1, max)`.
#[inline]
pub fn sat_inc(v: u8, max: u8) -> u8 {
    if v < max { v + 1 } else { v }
}

/// Returns `max(v - 1, 0)`.
#[inline]
pub fn sat_dec(v: u8) -> u8 {
    v.saturating_sub(1)
}
