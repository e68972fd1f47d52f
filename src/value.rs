//! Defines the `Value` type and its related constants.

/// Evaluation value in centipawns.
///
/// Positive values mean that the position is favorable for the side
/// to move, negative values that it is favorable for the other side.
/// A value of `100` roughly means that the side to move is a pawn
/// ahead.
///
/// # Constants:
///
/// * `VALUE_MATE` designates a checkmate delivered on the board. A
///   forced mate `n` half-moves away from the root is scored
///   `VALUE_MATE - n` (or `-VALUE_MATE + n` for the side being
///   mated), so that shorter mates are always preferred.
///
/// * Values with a magnitude above `VALUE_MATE_THRESHOLD` can only be
///   mate scores, never static evaluations.
pub type Value = i32;

pub const VALUE_MATE: Value = 1_000_000;
pub const VALUE_MATE_THRESHOLD: Value = VALUE_MATE - 1000;
