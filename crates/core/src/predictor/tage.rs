//! The TAGE (TAgged GEometric-history) engine.
//!
//! A bimodal base table plus a bank of tagged tables indexed by
//! geometrically increasing history lengths. Each tagged table entry
//! carries a partial tag, a 3-bit prediction counter, and a 2-bit useful
//! bit. Predictions arbitrate between the longest-history table with a
//! tag match (the prime provider) and the next-longest match after it (the
//! alternate provider), falling back to the bimodal table when neither
//! tagged table hits.

use tracing::{debug, trace};

use super::saturating::{sat_dec, sat_inc};
use super::{BranchInfo, BranchPredictor, PredictionHandle};
use crate::config::TageConfig;

/// Saturating maximum for tagged-table counters (3 bits: 0..=7). Also used
/// directly as the alternate-prediction threshold: only a maximally
/// confident alternate counter predicts taken, not the weak-taken midpoint
/// a textbook TAGE would use for that role.
const CTR_MAX: u8 = 7;
/// Ctr value at or above which the *prime* provider's counter predicts
/// taken — half of [`CTR_MAX`], distinct from the alternate-prediction
/// threshold above.
const PRIME_PRED_CTR_THRESHOLD: u8 = 4;
/// Saturating maximum for useful bits (2 bits: 0..=3).
const USEFUL_MAX: u8 = 3;
/// Saturating maximum for `altBetterCount` (4 bits: 0..=15).
const ALT_BETTER_MAX: u8 = 15;
/// Saturating maximum for bimodal counters (2 bits: 0..=3).
const BIMODAL_MAX: u8 = 3;

/// Number of 64-bit words backing the Global History Register. 192 bits of
/// capacity comfortably covers the 131-bit default history width; `new`
/// asserts that `config.ghr_bits` fits within it.
const GHR_WORDS: usize = 3;

/// One entry of a tagged table: a prediction counter, a partial tag, and a
/// useful bit pair.
#[derive(Debug, Clone, Copy, Default)]
struct TageEntry {
    /// Saturating 3-bit counter; `>= PRIME_PRED_CTR_THRESHOLD` predicts taken
    /// when this entry is the prime provider.
    ctr: u8,
    /// Partial address tag used to detect table hits.
    tag: u16,
    /// Saturating 2-bit confidence counter, decayed by graceful reset.
    useful: u8,
}

/// A fixed-width shift register for the Global History Register, stored as
/// an array of 64-bit words with bit 0 as the most recently observed
/// direction (component C3).
#[derive(Debug, Clone)]
struct Ghr {
    words: [u64; GHR_WORDS],
}

impl Ghr {
    fn new() -> Self {
        Self { words: [0; GHR_WORDS] }
    }

    /// Reads bit `i` (0 = most recent). Bits beyond the register's physical
    /// capacity read as zero.
    fn bit_at(&self, i: usize) -> bool {
        let word = i / 64;
        if word >= GHR_WORDS {
            return false;
        }
        (self.words[word] >> (i % 64)) & 1 != 0
    }

    /// Shifts every bit up by one position and sets bit 0 to `bit`.
    fn shift_in(&mut self, bit: bool) {
        let mut carry = u64::from(bit);
        for word in &mut self.words {
            let next_carry = *word >> 63;
            *word = (*word << 1) | carry;
            carry = next_carry;
        }
    }
}

/// A folded (compressed) history register: an incrementally maintained fold
/// of a `orig_len`-bit window of the GHR into a `target_len`-bit value
/// (component C2, the PPM-style folded CSR).
#[derive(Debug, Clone)]
struct Chr {
    value: u32,
    orig_len: usize,
    target_len: usize,
}

impl Chr {
    fn new(orig_len: usize, target_len: usize) -> Self {
        Self { value: 0, orig_len, target_len }
    }

    /// Folds in `new_bit` (the bit just shifted into the GHR) and removes
    /// `outgoing_bit` (the bit that fell out of the `orig_len`-bit window).
    fn shift_in(&mut self, new_bit: bool, outgoing_bit: bool) {
        let t = self.target_len as u32;
        let mut v = (self.value << 1) | u32::from(new_bit);
        v ^= (v & (1 << t)) >> t;
        let pos = (self.orig_len % self.target_len) as u32;
        v ^= u32::from(outgoing_bit) << pos;
        v &= (1u32 << t) - 1;
        self.value = v;
    }
}

/// Per-request scratch populated by `predict_branch` and consumed by the
/// matching `update_branch`; lives for exactly one predict→update pair.
#[derive(Debug, Clone)]
struct Scratch {
    token: u64,
    conditional: bool,
    pc: u64,
    /// Table that provided the final prediction, or `num_tables` (sentinel)
    /// if no tagged table hit and the base predictor was used.
    prime_table: usize,
    /// Table that provided the alternate prediction, or `num_tables`.
    alt_table: usize,
    prime_pred: bool,
    alt_pred: bool,
    final_pred: bool,
    index: Vec<usize>,
    tag: Vec<u16>,
}

/// A TAGE conditional branch direction predictor.
#[derive(Debug, Clone)]
pub struct TagePredictor {
    bimodal: Vec<u8>,
    tables: Vec<Vec<TageEntry>>,
    geometric: Vec<usize>,
    tag_mask: u32,
    table_log: u32,
    ghr: Ghr,
    phr: u16,
    phr_mask: u16,
    comp_index: Vec<Chr>,
    comp_tag0: Vec<Chr>,
    comp_tag1: Vec<Chr>,
    alt_better_count: u8,
    clock: u32,
    clock_flip: bool,
    reset_interval: u32,
    scratch: Option<Scratch>,
    next_token: u64,
}

impl TagePredictor {
    /// Builds a predictor from `config`.
    ///
    /// The index/tag hash formulas in [`TagePredictor::hash`] are written for
    /// exactly four tagged tables; `config.num_tables` must be `4`.
    ///
    /// # Panics
    ///
    /// Panics if `config.num_tables != 4`, if `config.table_size` is not a
    /// power of two, if `config.history_lengths.len() != config.num_tables`,
    /// if `config.phr_bits` is not in `1..=16` (the path history register is
    /// stored as a 16-bit word), if `config.ghr_bits` exceeds the fixed
    /// global history register capacity, or if any `config.history_lengths`
    /// entry is longer than `config.ghr_bits`.
    pub fn new(config: &TageConfig) -> Self {
        assert_eq!(
            config.num_tables, 4,
            "the index/tag hash formulas are defined for exactly 4 tagged tables"
        );
        assert!(config.table_size.is_power_of_two(), "table_size must be a power of two");
        assert_eq!(
            config.history_lengths.len(),
            config.num_tables,
            "one history length per tagged table"
        );
        assert!(
            (1..=16).contains(&config.phr_bits),
            "phr_bits must be in 1..=16, got {}",
            config.phr_bits
        );
        let ghr_capacity = GHR_WORDS * 64;
        assert!(
            config.ghr_bits <= ghr_capacity,
            "ghr_bits ({}) exceeds the fixed global history register capacity of {ghr_capacity} bits",
            config.ghr_bits
        );
        assert!(
            config.history_lengths.iter().all(|&l| l <= config.ghr_bits),
            "history_lengths contains an entry longer than ghr_bits ({})",
            config.ghr_bits
        );

        let table_log = config.table_size.trailing_zeros();
        let tag_mask = (1u32 << config.tag_bits) - 1;
        let geometric = config.history_lengths.clone();
        let phr_mask: u16 =
            if config.phr_bits >= 16 { u16::MAX } else { (1u16 << config.phr_bits) - 1 };

        let comp_index = geometric.iter().map(|&l| Chr::new(l, table_log as usize)).collect();
        let comp_tag0 = geometric.iter().map(|&l| Chr::new(l, config.tag_bits as usize)).collect();
        let comp_tag1 = geometric
            .iter()
            .map(|&l| Chr::new(l, (config.tag_bits - 1) as usize))
            .collect();

        Self {
            bimodal: vec![2; 1 << config.bimodal_log],
            tables: vec![vec![TageEntry::default(); config.table_size]; config.num_tables],
            geometric,
            tag_mask,
            table_log,
            ghr: Ghr::new(),
            phr: 0,
            phr_mask,
            comp_index,
            comp_tag0,
            comp_tag1,
            alt_better_count: config.alt_better_init,
            clock: 0,
            clock_flip: false,
            reset_interval: config.reset_interval,
            scratch: None,
            next_token: 0,
        }
    }

    fn num_tables(&self) -> usize {
        self.tables.len()
    }

    /// Returns the tagged table that provided the most recent prediction, or
    /// `None` if that prediction fell through to the bimodal base predictor
    /// (including predictions for non-conditional branches).
    ///
    /// Valid only between a `predict_branch` call and its matching
    /// `update_branch`; used by a trace-replay harness for provider
    /// attribution, not consulted by the predictor itself.
    pub fn last_prime_table(&self) -> Option<usize> {
        self.scratch
            .as_ref()
            .filter(|s| s.conditional)
            .map(|s| s.prime_table)
            .filter(|&t| t < self.num_tables())
    }

    fn bimodal_index(&self, pc: u64) -> usize {
        (pc as usize) % self.bimodal.len()
    }

    fn base_prediction(&self, pc: u64) -> bool {
        self.bimodal[self.bimodal_index(pc)] > 1
    }

    /// Computes `(index[i], tag[i])` for every tagged table. Table 3's index
    /// formula deliberately XORs `compressedIndex[2]` rather than
    /// `compressedIndex[3]`.
    fn hash(&self, pc: u64) -> (Vec<usize>, Vec<u16>) {
        let l = self.table_log;
        let phr = u64::from(self.phr);
        let table_mask = (self.tables[0].len() - 1) as u64;

        let raw_index = [
            pc ^ (pc >> l) ^ u64::from(self.comp_index[0].value) ^ phr ^ (phr >> l),
            pc ^ (pc >> (l - 1)) ^ u64::from(self.comp_index[1].value) ^ phr,
            pc ^ (pc >> (l - 2)) ^ u64::from(self.comp_index[2].value) ^ (phr & 63),
            pc ^ (pc >> (l - 3)) ^ u64::from(self.comp_index[2].value) ^ (phr & 7),
        ];
        let index = raw_index.iter().map(|&v| (v & table_mask) as usize).collect();

        let tag = (0..self.num_tables())
            .map(|i| {
                let t = pc ^ u64::from(self.comp_tag0[i].value) ^ u64::from(self.comp_tag1[i].value);
                (t as u32 & self.tag_mask) as u16
            })
            .collect();

        (index, tag)
    }
}

impl BranchPredictor for TagePredictor {
    fn predict_branch(&mut self, info: &BranchInfo) -> PredictionHandle {
        let token = self.next_token;
        self.next_token += 1;

        if !info.is_conditional() {
            self.scratch = Some(Scratch {
                token,
                conditional: false,
                pc: info.address,
                prime_table: self.num_tables(),
                alt_table: self.num_tables(),
                prime_pred: true,
                alt_pred: true,
                final_pred: true,
                index: Vec::new(),
                tag: Vec::new(),
            });
            return PredictionHandle { direction_prediction: true, target_prediction: 0, token };
        }

        let pc = info.address;
        let n = self.num_tables();
        let (index, tag) = self.hash(pc);

        let mut prime_table = n;
        for i in 0..n {
            if self.tables[i][index[i]].tag == tag[i] {
                prime_table = i;
                break;
            }
        }

        let mut alt_table = n;
        if prime_table < n {
            for i in (prime_table + 1)..n {
                if self.tables[i][index[i]].tag == tag[i] {
                    alt_table = i;
                    break;
                }
            }
        }

        let base_pred = self.base_prediction(pc);
        let alt_pred = if alt_table == n {
            base_pred
        } else {
            self.tables[alt_table][index[alt_table]].ctr >= CTR_MAX
        };

        let (prime_pred, final_pred) = if prime_table < n {
            let entry = &self.tables[prime_table][index[prime_table]];
            let prime_pred = entry.ctr >= PRIME_PRED_CTR_THRESHOLD;
            let weak = entry.ctr == 3 || entry.ctr == 4;
            let distrusted = weak && entry.useful == 0 && self.alt_better_count >= 8;
            let final_pred = if distrusted { alt_pred } else { prime_pred };
            (prime_pred, final_pred)
        } else {
            (alt_pred, alt_pred)
        };

        if cfg!(feature = "always-trace") {
            trace!(pc, prime_table, alt_table, final_pred, "tage predict_branch");
        }

        self.scratch = Some(Scratch {
            token,
            conditional: true,
            pc,
            prime_table,
            alt_table,
            prime_pred,
            alt_pred,
            final_pred,
            index,
            tag,
        });

        PredictionHandle { direction_prediction: final_pred, target_prediction: 0, token }
    }

    fn update_branch(&mut self, handle: PredictionHandle, taken: bool, _target: u64) {
        debug_assert!(
            self.scratch.as_ref().is_some_and(|s| s.token == handle.token),
            "update called out of order or with a stale handle"
        );
        let Some(scratch) = self.scratch.take() else { return };
        if scratch.token != handle.token {
            return;
        }
        if !scratch.conditional {
            return;
        }

        let n = self.num_tables();
        let Scratch { pc, prime_table, alt_table: _, prime_pred, alt_pred, final_pred, index, tag, .. } =
            scratch;

        // Step A: train the providing table (or the base predictor).
        if prime_table < n {
            let idx = index[prime_table];
            if final_pred != alt_pred {
                let useful = self.tables[prime_table][idx].useful;
                self.tables[prime_table][idx].useful = if final_pred == taken {
                    sat_inc(useful, USEFUL_MAX)
                } else {
                    sat_dec(useful)
                };
            }
            let ctr = self.tables[prime_table][idx].ctr;
            self.tables[prime_table][idx].ctr =
                if taken { sat_inc(ctr, CTR_MAX) } else { sat_dec(ctr) };
        } else {
            let bidx = self.bimodal_index(pc);
            let ctr = self.bimodal[bidx];
            self.bimodal[bidx] = if taken { sat_inc(ctr, BIMODAL_MAX) } else { sat_dec(ctr) };
        }

        // Step B: altBetterCount tracking, evaluated against the
        // *post*-Step-A counter/useful values.
        let mut new_entry = false;
        if prime_table < n {
            let entry = self.tables[prime_table][index[prime_table]];
            if entry.useful == 0 && (entry.ctr == 3 || entry.ctr == 4) {
                new_entry = true;
                if prime_pred != alt_pred {
                    self.alt_better_count = if alt_pred == taken {
                        sat_inc(self.alt_better_count, ALT_BETTER_MAX)
                    } else {
                        sat_dec(self.alt_better_count)
                    };
                }
            }
        }

        // Step C: allocate a new entry on misprediction.
        let mispredicted = final_pred != taken;
        let attempt_alloc = !(new_entry && prime_pred == taken) && mispredicted && prime_table > 0;
        if attempt_alloc {
            let scan_limit = prime_table; // sentinel `n` scans every table.
            let mut allocated = false;
            for i in 0..scan_limit {
                let idx = index[i];
                if self.tables[i][idx].useful == 0 {
                    self.tables[i][idx].tag = tag[i];
                    self.tables[i][idx].useful = 0;
                    self.tables[i][idx].ctr = if taken { 4 } else { 3 };
                    allocated = true;
                    debug!(table = i, idx, pc, "tage allocated new entry");
                    break;
                }
            }
            if !allocated {
                for i in (0..scan_limit).rev() {
                    let idx = index[i];
                    self.tables[i][idx].useful = sat_dec(self.tables[i][idx].useful);
                }
            }
        }

        // Step D: periodic graceful reset of useful bits.
        self.clock += 1;
        if self.clock >= self.reset_interval {
            self.clock = 0;
            self.clock_flip = !self.clock_flip;
            let mask: u8 = if self.clock_flip { 0b01 } else { 0b10 };
            debug!(clock_flip = self.clock_flip, "tage graceful reset rollover");
            for table in &mut self.tables {
                for entry in table.iter_mut() {
                    entry.useful &= mask;
                }
            }
        }

        // Step E: history updates. Outgoing bits are read from the GHR
        // *before* the shift, at position `length - 1` (equivalently, the
        // bit at position `length` of the post-shift GHR).
        let outgoing: Vec<bool> = self.geometric.iter().map(|&l| self.ghr.bit_at(l - 1)).collect();
        self.ghr.shift_in(taken);
        for i in 0..n {
            self.comp_index[i].shift_in(taken, outgoing[i]);
            self.comp_tag0[i].shift_in(taken, outgoing[i]);
            self.comp_tag1[i].shift_in(taken, outgoing[i]);
        }
        self.phr = ((self.phr << 1) | (pc & 1) as u16) & self.phr_mask;
    }
}
