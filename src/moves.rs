//! Defines data structures describing chess moves.

use std::fmt;
use crate::board::{Piece, PIECE_NONE};
use crate::castling_rights::CastlingRights;
use crate::squares::Square;
use crate::utils::square_notation;

/// Represents a move on the chessboard.
///
/// `Move` is a small value-semantic record and is passed around by
/// copy. The capture, promotion, en-passant and castling information
/// it carries must be consistent with the position the move is played
/// on; the move generator and the coordinate-notation parser are the
/// only places that construct moves.
///
/// Two moves are considered equal when their origin square,
/// destination square, played piece, and promoted piece coincide.
/// The captured piece and the flags are derived data and do not take
/// part in the comparison, which is what makes a move fetched from
/// the transposition table match its freshly generated counterpart.
#[derive(Clone, Copy, Debug)]
pub struct Move {
    /// The origin square of the played piece.
    pub orig_square: Square,

    /// The destination square of the played piece.
    pub dest_square: Square,

    /// The played piece. Castling is considered a king's move.
    pub piece: Piece,

    /// The captured piece, or `PIECE_NONE`.
    ///
    /// For en-passant captures this is the opponent's pawn even
    /// though it does not stand on `dest_square`.
    pub captured_piece: Piece,

    /// The piece the pawn promotes to, or `PIECE_NONE`.
    pub promoted_piece: Piece,

    /// Whether the move is an en-passant capture.
    pub is_enpassant: bool,

    /// Whether the move is a castling move (the king's two-square
    /// leg of it).
    pub is_castling: bool,
}

impl Move {
    /// Creates a normal move (possibly a capture).
    #[inline(always)]
    pub fn new(piece: Piece, orig_square: Square, dest_square: Square,
               captured_piece: Piece)
               -> Move {
        debug_assert!(piece != PIECE_NONE);
        debug_assert!(orig_square <= 63 && dest_square <= 63);
        debug_assert!(orig_square != dest_square);
        Move {
            orig_square,
            dest_square,
            piece,
            captured_piece,
            promoted_piece: PIECE_NONE,
            is_enpassant: false,
            is_castling: false,
        }
    }

    /// Creates a pawn promotion (possibly a capture).
    #[inline(always)]
    pub fn new_promotion(piece: Piece, orig_square: Square, dest_square: Square,
                         captured_piece: Piece, promoted_piece: Piece)
                         -> Move {
        debug_assert!(promoted_piece != PIECE_NONE);
        let mut m = Move::new(piece, orig_square, dest_square, captured_piece);
        m.promoted_piece = promoted_piece;
        m
    }

    /// Creates an en-passant capture.
    ///
    /// `captured_piece` is the opponent's pawn, standing one rank
    /// behind `dest_square` from the mover's point of view.
    #[inline(always)]
    pub fn new_enpassant(piece: Piece, orig_square: Square, dest_square: Square,
                         captured_piece: Piece)
                         -> Move {
        debug_assert!(captured_piece != PIECE_NONE);
        let mut m = Move::new(piece, orig_square, dest_square, captured_piece);
        m.is_enpassant = true;
        m
    }

    /// Creates a castling move (the king's two-square step).
    #[inline(always)]
    pub fn new_castling(piece: Piece, orig_square: Square, dest_square: Square) -> Move {
        let mut m = Move::new(piece, orig_square, dest_square, PIECE_NONE);
        m.is_castling = true;
        m
    }

    /// Creates an empty move instance.
    ///
    /// The returned instance compares unequal to every real move and
    /// is rendered as `0000`. It is used where a move slot is
    /// required but no move is available (empty transposition table
    /// entries, vacant killer slots).
    #[inline(always)]
    pub fn none() -> Move {
        Move {
            orig_square: 0,
            dest_square: 0,
            piece: PIECE_NONE,
            captured_piece: PIECE_NONE,
            promoted_piece: PIECE_NONE,
            is_enpassant: false,
            is_castling: false,
        }
    }

    /// Returns `true` for the empty move instance.
    #[inline(always)]
    pub fn is_none(&self) -> bool {
        self.piece == PIECE_NONE
    }

    /// Returns the coordinate notation of the move.
    ///
    /// Examples: `e2e4`, `e7e5`, `e1g1` (white short castling),
    /// `e7e8q` (promotion). The empty move is rendered as `0000`.
    pub fn notation(&self) -> String {
        use crate::board::kind_of;
        use crate::board::{KNIGHT, BISHOP, ROOK, QUEEN};

        if self.is_none() {
            return "0000".to_string();
        }
        let mut s = format!("{}{}",
                            square_notation(self.orig_square),
                            square_notation(self.dest_square));
        if self.promoted_piece != PIECE_NONE {
            s.push(match kind_of(self.promoted_piece) {
                QUEEN => 'q',
                ROOK => 'r',
                BISHOP => 'b',
                KNIGHT => 'n',
                _ => panic!("invalid promoted piece"),
            });
        }
        s
    }
}

impl PartialEq for Move {
    #[inline(always)]
    fn eq(&self, other: &Move) -> bool {
        self.orig_square == other.orig_square && self.dest_square == other.dest_square &&
        self.piece == other.piece && self.promoted_piece == other.promoted_piece
    }
}

impl Eq for Move {}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.notation())
    }
}

/// Holds everything needed to take a played move back.
///
/// The undo record is a snapshot of the move itself plus the bits of
/// board state that `Board::do_move` destroys: the castling rights,
/// the en-passant square, the halfmove clock, and the Zobrist key as
/// they were *before* the move was played. `Board::undo_move` applies
/// it to restore the exact prior position.
#[derive(Clone, Copy, Debug)]
pub struct UndoInfo {
    pub m: Move,
    pub castling_rights: CastlingRights,
    pub enpassant_square: Option<Square>,
    pub halfmove_clock: u16,
    pub key: u64,
}

/// The pre-move state destroyed by a null move.
#[derive(Clone, Copy, Debug)]
pub struct NullUndo {
    pub enpassant_square: Option<Square>,
    pub key: u64,
}
