//! Configuration for the TAGE predictor core and its gshare baseline.
//!
//! This module defines all configuration structures used to parameterize the
//! predictor. It provides:
//! 1. **Defaults:** The predictor's data-model constants as named constants.
//! 2. **Structures:** `Config`, wrapping one config struct per predictor.
//!
//! Configuration is supplied via JSON from a harness, or use `Config::default()`
//! to get the reference parameter set.

use serde::Deserialize;

/// Default configuration constants for the predictor.
///
/// These are the values used when a harness does not override a field.
mod defaults {
    /// Global History Register width, in bits.
    pub const GHR_BITS: usize = 131;

    /// Path History Register width, in bits.
    pub const PHR_BITS: usize = 16;

    /// log2 of the number of bimodal (base predictor) entries.
    pub const BIMODAL_LOG: usize = 14;

    /// log2 of the number of entries per tagged table.
    pub const TAGE_LOG: usize = 13;

    /// Number of tagged tables (geometric history banks).
    pub const NUM_TABLES: usize = 4;

    /// Tag width, in bits, for every tagged table entry.
    pub const TAG_BITS: usize = 9;

    /// Useful-bit reset period, in updates.
    pub const RESET_INTERVAL: u32 = 256 * 1024;

    /// Initial value of `altBetterCount` (out of a 4-bit saturating range).
    pub const ALT_BETTER_INIT: u8 = 8;

    /// Geometric history lengths per table, longest first (table 0 uses the
    /// most history, table 3 the least).
    pub const HISTORY_LENGTHS: [usize; 4] = [130, 44, 15, 5];

    /// Pattern History Table size (log2) for the gshare calibration baseline.
    pub const GSHARE_TABLE_BITS: usize = 12;
}

/// TAGE predictor configuration.
///
/// Every field has a default matching the predictor's reference
/// parameters, so a harness can deserialize a partial JSON object and
/// inherit the rest unchanged.
#[derive(Debug, Clone, Deserialize)]
pub struct TageConfig {
    /// Number of tagged tables (geometric history banks).
    #[serde(default = "TageConfig::default_num_tables")]
    pub num_tables: usize,

    /// Entries per tagged table (`2^tage_log`). Must be a power of two.
    #[serde(default = "TageConfig::default_table_size")]
    pub table_size: usize,

    /// Tag width, in bits, for every tagged table entry.
    #[serde(default = "TageConfig::default_tag_bits")]
    pub tag_bits: u32,

    /// log2 of the number of bimodal (base predictor) entries.
    #[serde(default = "TageConfig::default_bimodal_log")]
    pub bimodal_log: usize,

    /// Global History Register width, in bits.
    #[serde(default = "TageConfig::default_ghr_bits")]
    pub ghr_bits: usize,

    /// Path History Register width, in bits.
    #[serde(default = "TageConfig::default_phr_bits")]
    pub phr_bits: usize,

    /// Useful-bit reset period, in updates.
    #[serde(default = "TageConfig::default_reset_interval")]
    pub reset_interval: u32,

    /// Initial value of `altBetterCount`.
    #[serde(default = "TageConfig::default_alt_better_init")]
    pub alt_better_init: u8,

    /// Geometric history lengths per table, longest first.
    #[serde(default = "TageConfig::default_history_lengths")]
    pub history_lengths: Vec<usize>,
}

impl TageConfig {
    /// Returns the default number of tagged tables.
    fn default_num_tables() -> usize {
        defaults::NUM_TABLES
    }

    /// Returns the default number of entries per tagged table.
    fn default_table_size() -> usize {
        1 << defaults::TAGE_LOG
    }

    /// Returns the default tag width, in bits.
    fn default_tag_bits() -> u32 {
        defaults::TAG_BITS as u32
    }

    /// Returns the default bimodal table size (log2).
    fn default_bimodal_log() -> usize {
        defaults::BIMODAL_LOG
    }

    /// Returns the default Global History Register width, in bits.
    fn default_ghr_bits() -> usize {
        defaults::GHR_BITS
    }

    /// Returns the default Path History Register width, in bits.
    fn default_phr_bits() -> usize {
        defaults::PHR_BITS
    }

    /// Returns the default useful-bit reset interval.
    fn default_reset_interval() -> u32 {
        defaults::RESET_INTERVAL
    }

    /// Returns the default initial `altBetterCount`.
    fn default_alt_better_init() -> u8 {
        defaults::ALT_BETTER_INIT
    }

    /// Returns the default geometric history lengths, longest first.
    fn default_history_lengths() -> Vec<usize> {
        defaults::HISTORY_LENGTHS.to_vec()
    }
}

impl Default for TageConfig {
    fn default() -> Self {
        Self {
            num_tables: Self::default_num_tables(),
            table_size: Self::default_table_size(),
            tag_bits: Self::default_tag_bits(),
            bimodal_log: Self::default_bimodal_log(),
            ghr_bits: Self::default_ghr_bits(),
            phr_bits: Self::default_phr_bits(),
            reset_interval: Self::default_reset_interval(),
            alt_better_init: Self::default_alt_better_init(),
            history_lengths: Self::default_history_lengths(),
        }
    }
}

/// Configuration for the gshare calibration baseline.
#[derive(Debug, Clone, Deserialize)]
pub struct GShareConfig {
    /// log2 of the Pattern History Table size.
    #[serde(default = "GShareConfig::default_table_bits")]
    pub table_bits: usize,
}

impl GShareConfig {
    /// Returns the default Pattern History Table size (log2).
    fn default_table_bits() -> usize {
        defaults::GSHARE_TABLE_BITS
    }
}

impl Default for GShareConfig {
    fn default() -> Self {
        Self {
            table_bits: Self::default_table_bits(),
        }
    }
}

/// Root configuration structure.
///
/// # Examples
///
/// ```
/// use tage_core::config::Config;
///
/// let config = Config::default();
/// assert_eq!(config.tage.num_tables, 4);
/// assert_eq!(config.tage.history_lengths, vec![130, 44, 15, 5]);
/// ```
///
/// Deserializing a partial override from JSON:
///
/// ```
/// use tage_core::config::Config;
///
/// let json = r#"{"tage": {"reset_interval": 1024}}"#;
/// let config: Config = serde_json::from_str(json).unwrap();
/// assert_eq!(config.tage.reset_interval, 1024);
/// assert_eq!(config.tage.table_size, 8192);
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// TAGE predictor configuration.
    #[serde(default)]
    pub tage: TageConfig,
    /// gshare calibration baseline configuration.
    #[serde(default)]
    pub gshare: GShareConfig,
}
