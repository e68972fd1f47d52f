//! Implements the transposition table.
//!
//! During its brute-force search the engine encounters the same
//! positions again and again, reached through different sequences of
//! moves. The transposition table remembers what was concluded about
//! a position the last time it was searched (how deeply, what value,
//! with which accuracy), so the work does not have to be redone, and
//! so the best move found back then can be tried first.

use crate::depth::Depth;
use crate::moves::Move;
use crate::value::Value;

/// The accuracy of a stored value.
pub type BoundType = u8;

/// The slot is empty.
pub const BOUND_NONE: BoundType = 0;

/// The value is a lower bound (the node failed high).
pub const BOUND_LOWER: BoundType = 0b01;

/// The value is an upper bound (the node failed low).
pub const BOUND_UPPER: BoundType = 0b10;

/// The value is exact.
pub const BOUND_EXACT: BoundType = BOUND_UPPER | BOUND_LOWER;

/// Stores information about a searched position.
#[derive(Clone, Copy)]
pub struct TtEntry {
    /// The Zobrist key of the position.
    pub key: u64,

    /// The depth to which the position was searched.
    pub depth: Depth,

    /// The value the search concluded, qualified by `bound`.
    ///
    /// `BOUND_LOWER` means the true value is at least this,
    /// `BOUND_UPPER` that it is at most this.
    pub value: Value,

    /// The accuracy of `value`.
    pub bound: BoundType,

    /// The best (or refutation) move found, or `Move::none()`.
    ///
    /// The move is returned on every key match, whatever the stored
    /// depth, so the search can always use it for move ordering.
    pub best_move: Move,

    /// The search generation the entry was stored in.
    pub generation: u16,
}

impl TtEntry {
    fn empty() -> TtEntry {
        TtEntry {
            key: 0,
            depth: 0,
            value: 0,
            bound: BOUND_NONE,
            best_move: Move::none(),
            generation: 0,
        }
    }
}

/// The default number of entries in the table.
const TT_DEFAULT_SIZE: usize = 1 << 18;

/// A fixed-size hash table mapping Zobrist keys to `TtEntry`
/// records.
///
/// The table is direct-mapped: each key hashes to exactly one slot.
/// On a collision the incumbent entry is kept only when it is from
/// the current search generation *and* deeper than the newcomer;
/// everything else is replaced. A generation counter, bumped once per
/// `go`, is what lets entries from earlier searches age out.
pub struct TranspositionTable {
    generation: u16,
    entries: Vec<TtEntry>,
}

impl TranspositionTable {
    /// Creates a new transposition table with the default size.
    pub fn new() -> TranspositionTable {
        TranspositionTable::with_size(TT_DEFAULT_SIZE)
    }

    /// Creates a new transposition table with at least `size`
    /// entries, rounded up to a power of two.
    pub fn with_size(size: usize) -> TranspositionTable {
        let size = size.max(1).next_power_of_two();
        TranspositionTable {
            generation: 0,
            entries: vec![TtEntry::empty(); size],
        }
    }

    /// Signals that a new search is about to begin.
    pub fn new_search(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    /// Removes all entries from the table.
    pub fn clear(&mut self) {
        let size = self.entries.len();
        self.entries.clear();
        self.entries.resize(size, TtEntry::empty());
        self.generation = 0;
    }

    /// Stores data for a position.
    ///
    /// When the slot already holds an entry for the same key and the
    /// new record carries no best move, the old move is preserved.
    pub fn store(&mut self, key: u64, depth: Depth, value: Value, bound: BoundType,
                 best_move: Move) {
        debug_assert!(bound != BOUND_NONE);
        let index = self.index(key);
        let generation = self.generation;
        let entry = &mut self.entries[index];

        if entry.bound != BOUND_NONE && entry.key != key && entry.generation == generation &&
           entry.depth > depth {
            // The incumbent is current and deeper, keep it.
            return;
        }
        let best_move = if best_move.is_none() && entry.key == key {
            entry.best_move
        } else {
            best_move
        };
        *entry = TtEntry {
            key,
            depth,
            value,
            bound,
            best_move,
            generation,
        };
    }

    /// Probes for data by key.
    ///
    /// A returned entry always has the probed key; whether its depth
    /// and bound allow a cutoff is the caller's decision.
    pub fn probe(&self, key: u64) -> Option<TtEntry> {
        let entry = &self.entries[self.index(key)];
        if entry.bound != BOUND_NONE && entry.key == key {
            Some(*entry)
        } else {
            None
        }
    }

    #[inline(always)]
    fn index(&self, key: u64) -> usize {
        (key & (self.entries.len() - 1) as u64) as usize
    }
}

impl Default for TranspositionTable {
    fn default() -> TranspositionTable {
        TranspositionTable::new()
    }
}
