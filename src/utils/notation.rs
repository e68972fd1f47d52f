//! Implements square and move notation.

use regex::Regex;
use crate::board::*;
use crate::files::file;
use crate::moves::Move;
use crate::movegen::is_two_file_king_step;
use crate::ranks::rank;
use crate::squares::Square;

/// Returns the algebraic notation for a given square.
pub fn square_notation(square: Square) -> &'static str {
    lazy_static! {
        static ref NOTATION: Vec<String> = (0..64)
            .map(|i| format!("{}{}",
                             ["a", "b", "c", "d", "e", "f", "g", "h"][file(i)],
                             ["1", "2", "3", "4", "5", "6", "7", "8"][rank(i)]))
            .collect();
    }
    NOTATION[square].as_str()
}

/// Parses a square's algebraic notation (lowercase only).
pub fn parse_square(s: &str) -> Option<Square> {
    lazy_static! {
        static ref RE: Regex = Regex::new(r"^[a-h][1-8]$").unwrap();
    }
    if RE.is_match(s) {
        let bytes = s.as_bytes();
        let file = (bytes[0] - b'a') as usize;
        let rank = (bytes[1] - b'1') as usize;
        Some(crate::squares::square(file, rank))
    } else {
        None
    }
}

/// Parses a move in coordinate notation against a position.
///
/// Examples: `a1a2`, `e7e8q` (promotion piece lowercase), with
/// castling given as the king's two-square move (`e1g1` and the
/// like).
///
/// The moving piece is resolved by inspecting the origin square. A
/// king moving exactly two files is marked as castling; a pawn moving
/// diagonally onto an empty square is marked as an en-passant capture
/// and the implicitly captured pawn is filled in.
///
/// Syntax problems are reported as `InvalidMoveSyntax`; a
/// syntactically fine move that names no piece of the side to move,
/// or a promotion of something other than a pawn, comes back as
/// `IllegalMove`. Full legality (king safety, castling and en-passant
/// preconditions) is *not* checked here; callers match the result
/// against the generated move list.
pub fn parse_uci_move(board: &Board, s: &str) -> Result<Move, EngineError> {
    lazy_static! {
        static ref RE: Regex = Regex::new(r"^([a-h][1-8])([a-h][1-8])([qrbn])?$").unwrap();
    }
    let captures = RE.captures(s).ok_or(EngineError::InvalidMoveSyntax)?;
    let orig_square = parse_square(captures.get(1).unwrap().as_str()).unwrap();
    let dest_square = parse_square(captures.get(2).unwrap().as_str()).unwrap();
    if orig_square == dest_square {
        return Err(EngineError::InvalidMoveSyntax);
    }

    let us = board.to_move;
    let piece = board.piece_at(orig_square);
    if piece == PIECE_NONE || color_of(piece) != us {
        return Err(EngineError::IllegalMove);
    }

    let mut captured_piece = board.piece_at(dest_square);
    if captured_piece != PIECE_NONE && color_of(captured_piece) == us {
        return Err(EngineError::IllegalMove);
    }

    let promoted_piece = match captures.get(3) {
        None => PIECE_NONE,
        Some(c) => {
            if kind_of(piece) != PAWN {
                return Err(EngineError::IllegalMove);
            }
            let kind = match c.as_str() {
                "q" => QUEEN,
                "r" => ROOK,
                "b" => BISHOP,
                "n" => KNIGHT,
                _ => unreachable!(),
            };
            piece_of(us, kind)
        }
    };

    let is_castling = kind_of(piece) == KING && is_two_file_king_step(orig_square, dest_square);

    let mut is_enpassant = false;
    if kind_of(piece) == PAWN && file(orig_square) != file(dest_square) &&
       captured_piece == PIECE_NONE {
        is_enpassant = true;
        captured_piece = piece_of(other(us), PAWN);
    }

    Ok(Move {
        orig_square,
        dest_square,
        piece,
        captured_piece,
        promoted_piece,
        is_enpassant,
        is_castling,
    })
}
