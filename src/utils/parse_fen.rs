//! Implements the `parse_fen` function.

use crate::bitsets::{BB_RANK_1, BB_RANK_8};
use crate::board::*;
use crate::castling_rights::{CastlingRights, KINGSIDE, QUEENSIDE};
use crate::files::*;
use crate::ranks::*;
use crate::squares::*;
use crate::utils::notation::parse_square;

/// Parses Forsyth-Edwards Notation (FEN).
///
/// A FEN string defines a particular position using only the ASCII
/// character set. It contains six whitespace-separated fields:
///
/// 1. Piece placement, described rank by rank starting with rank 8,
///    with `/` separating ranks. White pieces use upper-case letters
///    ("PNBRQK"), black pieces lower-case ("pnbrqk"), and digits 1
///    through 8 give runs of blank squares.
///
/// 2. Active color: "w" or "b".
///
/// 3. Castling availability: a subset of "KQkq", or "-".
///
/// 4. En-passant target square in algebraic notation, or "-".
///
/// 5. Halfmove clock: half-moves since the last pawn advance or
///    capture.
///
/// 6. Fullmove number, starting at 1 and incremented after black's
///    move.
///
/// The two trailing clock fields may be omitted and default to `0`
/// and `1`. Anything else that is malformed or inconsistent (bad
/// placement geometry, pawns on the back ranks, an en-passant square
/// on the wrong rank for the side to move, castling rights whose king
/// or rook has left its starting square) is rejected with
/// `EngineError::InvalidFen`, leaving no partially parsed state
/// behind.
pub fn parse_fen(s: &str) -> Result<Board, EngineError> {
    let fields: Vec<_> = s.split_whitespace().collect();
    if fields.len() < 4 || fields.len() > 6 {
        return Err(EngineError::InvalidFen);
    }

    let mut board = Board::new();
    parse_piece_placement(fields[0], &mut board)?;
    board.to_move = parse_active_color(fields[1])?;
    board.castling_rights = parse_castling_rights(fields[2])?;
    board.enpassant_square = if fields[3] == "-" {
        None
    } else {
        let square = parse_square(fields[3]).ok_or(EngineError::InvalidFen)?;
        match board.to_move {
            WHITE if rank(square) == RANK_6 => Some(square),
            BLACK if rank(square) == RANK_3 => Some(square),
            _ => return Err(EngineError::InvalidFen),
        }
    };
    board.halfmove_clock = if fields.len() > 4 {
        fields[4].parse().map_err(|_| EngineError::InvalidFen)?
    } else {
        0
    };
    board.fullmove_number = if fields.len() > 5 {
        match fields[5].parse() {
            Ok(n) if n >= 1 => n,
            _ => return Err(EngineError::InvalidFen),
        }
    } else {
        1
    };

    // Pawns can never stand on the back ranks.
    if (board.pieces[WHITE_PAWN] | board.pieces[BLACK_PAWN]) & (BB_RANK_1 | BB_RANK_8) != 0 {
        return Err(EngineError::InvalidFen);
    }

    // A castling right requires its king and rook on their starting
    // squares.
    for &(color, side, king_square, rook_square) in
        &[(WHITE, KINGSIDE, E1, H1),
          (WHITE, QUEENSIDE, E1, A1),
          (BLACK, KINGSIDE, E8, H8),
          (BLACK, QUEENSIDE, E8, A8)] {
        if board.castling_rights.can_castle(color, side) &&
           (board.pieces[piece_of(color, KING)] & 1 << king_square == 0 ||
            board.pieces[piece_of(color, ROOK)] & 1 << rook_square == 0) {
            return Err(EngineError::InvalidFen);
        }
    }

    board.update_occupancies();
    board.key = board.compute_key();
    Ok(board)
}

fn parse_piece_placement(s: &str, board: &mut Board) -> Result<(), EngineError> {
    // These are the possible productions in the grammar.
    enum Token {
        Piece(Piece),
        EmptySquares(usize),
        Separator,
    }

    // FEN describes the board starting from a8 and going toward h1.
    let mut file = FILE_A;
    let mut rank = RANK_8;

    for c in s.chars() {
        let token = match c {
            '/' => Token::Separator,
            '1'..='8' => Token::EmptySquares(c.to_digit(9).unwrap() as usize),
            _ => match char_to_piece(c) {
                PIECE_NONE => return Err(EngineError::InvalidFen),
                piece => Token::Piece(piece),
            },
        };
        match token {
            Token::Piece(piece) => {
                if file > 7 {
                    return Err(EngineError::InvalidFen);
                }
                board.pieces[piece] |= 1 << square(file, rank);
                file += 1;
            }
            Token::EmptySquares(n) => {
                file += n;
                if file > 8 {
                    return Err(EngineError::InvalidFen);
                }
            }
            Token::Separator => {
                if file == 8 && rank > 0 {
                    file = 0;
                    rank -= 1;
                } else {
                    return Err(EngineError::InvalidFen);
                }
            }
        }
    }

    // Make sure that all 64 squares were described.
    if file != 8 || rank != 0 {
        return Err(EngineError::InvalidFen);
    }
    Ok(())
}

fn parse_active_color(s: &str) -> Result<Color, EngineError> {
    match s {
        "w" => Ok(WHITE),
        "b" => Ok(BLACK),
        _ => Err(EngineError::InvalidFen),
    }
}

fn parse_castling_rights(s: &str) -> Result<CastlingRights, EngineError> {
    let mut rights = CastlingRights::new(0);
    if s != "-" {
        for c in s.chars() {
            let (color, side) = match c {
                'K' => (WHITE, KINGSIDE),
                'Q' => (WHITE, QUEENSIDE),
                'k' => (BLACK, KINGSIDE),
                'q' => (BLACK, QUEENSIDE),
                _ => return Err(EngineError::InvalidFen),
            };
            if !rights.grant(color, side) {
                return Err(EngineError::InvalidFen);
            }
        }
    }
    Ok(rights)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fen_rejections() {
        assert!(parse_fen("nbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1").is_err());
        assert!(parse_fen("rnbqkbnr1/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1").is_err());
        assert!(parse_fen("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBN b KQkq e3 0 1").is_err());
        assert!(parse_fen("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR/ b KQkq e3 0 1")
                    .is_err());
        assert!(parse_fen("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNRR b KQkq e3 0 1")
                    .is_err());
        assert!(parse_fen("rnbqkbnr/pppppppp/8/8/4P3/8/PPP01PPP/RNBQKBNR b KQkq e3 0 1").is_err());
        assert!(parse_fen("rnbqkbnr/pppppppp/8/8/4P3/8/PPP91PPP/RNBQKBNR b KQkq e3 0 1").is_err());
        assert!(parse_fen("rnbqkbnr/pppppppp/8/8/4P3/8/PPP*1PPP/RNBQKBNR b KQkq e3 0 1").is_err());
        assert!(parse_fen("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 * 1").is_err());
        assert!(parse_fen("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 *").is_err());
        assert!(parse_fen("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 0").is_err());
        assert!(parse_fen("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq xx 0 1").is_err());
        assert!(parse_fen("not a fen").is_err());
        assert!(parse_fen("").is_err());
    }

    #[test]
    fn test_parse_fen_acceptance() {
        assert!(parse_fen(START_FEN).is_ok());
        assert!(parse_fen("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1").is_ok());
        assert!(parse_fen("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b Kkq e3 0 1").is_ok());
        assert!(parse_fen("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b - e3 0 1").is_ok());
        assert!(parse_fen("k7/8/8/8/8/8/8/7K w - - 0 1").is_ok());
    }

    #[test]
    fn test_trailing_fields_default() {
        let board = parse_fen("k7/8/8/8/8/8/8/7K w - -").unwrap();
        assert_eq!(board.halfmove_clock, 0);
        assert_eq!(board.fullmove_number, 1);
        let board = parse_fen("k7/8/8/8/8/8/8/7K w - - 13").unwrap();
        assert_eq!(board.halfmove_clock, 13);
        assert_eq!(board.fullmove_number, 1);
    }

    #[test]
    fn test_enpassant_rank_validation() {
        // A white-to-move en-passant square must be on rank 6.
        assert!(parse_fen("k7/8/8/8/7P/8/8/7K w - h3 0 1").is_err());
        assert!(parse_fen("k7/8/8/7P/8/8/8/7K b - h4 0 1").is_err());
        assert!(parse_fen("8/8/8/6k1/7P/8/8/6RK b - h3 0 1").is_ok());
    }

    #[test]
    fn test_castling_placement_validation() {
        // The white king is not on e1, so no white right may be set.
        assert!(parse_fen("r3k2r/8/8/8/8/8/8/R4K1R w KQkq - 0 1").is_err());
        // The h8 rook is missing, so "k" may not be set.
        assert!(parse_fen("r3k3/8/8/8/8/8/8/R3K2R w KQkq - 0 1").is_err());
        assert!(parse_fen("r3k3/8/8/8/8/8/8/R3K2R w KQq - 0 1").is_ok());
    }

    #[test]
    fn test_pawns_on_back_ranks_rejected() {
        assert!(parse_fen("P6k/8/8/8/8/8/8/7K w - - 0 1").is_err());
        assert!(parse_fen("7k/8/8/8/8/8/8/p6K w - - 0 1").is_err());
    }
}
