//! Implements `BoardGeometry`.

use crate::bitsets::Bitboard;
use crate::board::{BLACK, WHITE};
use crate::files::file;
use crate::ranks::rank;
use crate::squares::Square;

/// Precomputed attack tables for the non-sliding pieces.
///
/// The tables are built once, on first use, by walking the fixed
/// offsets of each piece from every square and discarding the
/// off-board targets. Slider attacks depend on the occupancy and are
/// computed on the fly (see `bitsets::bb_rook_attacks` and
/// `bitsets::bb_bishop_attacks`).
pub struct BoardGeometry {
    /// The squares attacked by a knight standing on a given square.
    pub knight_attacks: [Bitboard; 64],

    /// The squares attacked by a king standing on a given square.
    pub king_attacks: [Bitboard; 64],

    /// The squares attacked by a pawn of a given color standing on a
    /// given square.
    ///
    /// ```text
    /// pawn_attacks[WHITE][F6]
    /// . . . . . . . .
    /// . . . . 1 . 1 .
    /// . . . . . P . .
    /// . . . . . . . .
    /// ```
    pub pawn_attacks: [[Bitboard; 64]; 2],
}

impl BoardGeometry {
    /// Creates and initializes a new instance.
    fn new() -> BoardGeometry {
        let mut g = BoardGeometry {
            knight_attacks: [0; 64],
            king_attacks: [0; 64],
            pawn_attacks: [[0; 64]; 2],
        };

        const KNIGHT_OFFSETS: [(isize, isize); 8] =
            [(1, 2), (2, 1), (2, -1), (1, -2), (-1, -2), (-2, -1), (-2, 1), (-1, 2)];
        const KING_OFFSETS: [(isize, isize); 8] =
            [(1, 0), (1, 1), (0, 1), (-1, 1), (-1, 0), (-1, -1), (0, -1), (1, -1)];

        for square in 0..64 {
            g.knight_attacks[square] = walk_offsets(square, &KNIGHT_OFFSETS);
            g.king_attacks[square] = walk_offsets(square, &KING_OFFSETS);
            g.pawn_attacks[WHITE][square] = walk_offsets(square, &[(-1, 1), (1, 1)]);
            g.pawn_attacks[BLACK][square] = walk_offsets(square, &[(-1, -1), (1, -1)]);
        }
        g
    }

    /// Returns a reference to the lazily initialized singleton
    /// instance.
    pub fn get() -> &'static BoardGeometry {
        lazy_static! {
            static ref GEOMETRY: BoardGeometry = BoardGeometry::new();
        }
        &GEOMETRY
    }
}

/// Collects the on-board targets reached by applying each
/// (file, rank) offset to a square.
fn walk_offsets(square: Square, offsets: &[(isize, isize)]) -> Bitboard {
    let r = rank(square) as isize;
    let f = file(square) as isize;
    let mut targets = 0;
    for &(df, dr) in offsets {
        let (rr, ff) = (r + dr, f + df);
        if (0..8).contains(&rr) && (0..8).contains(&ff) {
            targets |= 1u64 << (rr * 8 + ff);
        }
    }
    targets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::squares::*;

    #[test]
    fn test_knight_attacks() {
        let g = BoardGeometry::get();
        assert_eq!(g.knight_attacks[A1], 1 << B3 | 1 << C2);
        assert_eq!(g.knight_attacks[D4],
                   1 << B3 | 1 << B5 | 1 << C2 | 1 << C6 | 1 << E2 | 1 << E6 |
                   1 << F3 | 1 << F5);
    }

    #[test]
    fn test_king_attacks() {
        let g = BoardGeometry::get();
        assert_eq!(g.king_attacks[A1], 1 << A2 | 1 << B1 | 1 << B2);
        assert_eq!(crate::bitsets::pop_count(g.king_attacks[E4]), 8);
    }

    #[test]
    fn test_pawn_attacks() {
        let g = BoardGeometry::get();
        assert_eq!(g.pawn_attacks[WHITE][F6], 1 << E7 | 1 << G7);
        assert_eq!(g.pawn_attacks[WHITE][A2], 1 << B3);
        assert_eq!(g.pawn_attacks[BLACK][H7], 1 << G6);
        assert_eq!(g.pawn_attacks[BLACK][E2], 1 << D1 | 1 << F1);
        assert_eq!(g.pawn_attacks[WHITE][H8], 0);
    }
}
