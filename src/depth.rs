//! Defines the `Depth` type and its related constants.

/// Search depth in half-moves.
///
/// A value of this type gives the remaining nominal search depth: the
/// number of half-moves that should still be added to the current
/// line of play before the quiescence search takes over. Depth
/// reductions may push the remaining depth below zero near the
/// leaves, which is treated the same as reaching zero.
pub type Depth = i32;

/// The maximum requestable search depth.
pub const DEPTH_MAX: Depth = 99;

/// An upper bound on the distance from the root, in half-moves.
///
/// The killer-move table is sized by this bound, and the search stops
/// extending a line once it is reached.
pub const MAX_PLY: usize = 100;
