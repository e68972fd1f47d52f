//! Implements the adapter-facing engine facade.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use crate::board::*;
use crate::depth::Depth;
use crate::evaluator;
use crate::movegen::{generate_moves, is_move_legal};
use crate::moves::Move;
use crate::search::{SearchLimits, SearchReport, Searcher};
use crate::utils::{divide, parse_uci_move, perft};
use crate::value::Value;

/// A stateful object binding a position to a searcher.
///
/// This is the surface a protocol adapter talks to: load a position,
/// apply moves in coordinate notation, search under limits (receiving
/// progress reports through a sink), stop, evaluate, and run perft
/// counts. All mutating operations either succeed or leave the
/// position untouched.
pub struct Engine {
    board: Board,
    searcher: Searcher,
}

impl Engine {
    /// Creates a new instance, set up with the standard starting
    /// position.
    pub fn new() -> Engine {
        Engine {
            board: Board::from_fen(START_FEN).unwrap(),
            searcher: Searcher::new(),
        }
    }

    /// Starts a new game: forgets all accumulated search state and
    /// resets the board to the starting position.
    pub fn new_game(&mut self) {
        self.searcher.clear();
        self.board = Board::from_fen(START_FEN).unwrap();
    }

    /// Returns the current position.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Loads a position from a FEN string and plays the given
    /// coordinate-notation moves on top of it.
    ///
    /// On any error the current position is left unchanged.
    pub fn set_position(&mut self, fen: &str, moves: &[String]) -> Result<(), EngineError> {
        let mut board = Board::from_fen(fen)?;
        for s in moves {
            apply_uci_move(&mut board, s)?;
        }
        self.board = board;
        Ok(())
    }

    /// Plays one move, given in coordinate notation, on the current
    /// position.
    ///
    /// The move is parsed, matched against the generated moves, and
    /// checked for full legality before anything is touched.
    pub fn do_uci_move(&mut self, s: &str) -> Result<(), EngineError> {
        apply_uci_move(&mut self.board, s)
    }

    /// Searches the current position under the given limits.
    ///
    /// Progress reports stream into `report`; the returned string is
    /// the best move in coordinate notation, or `0000` when the
    /// position is terminal (no legal moves).
    pub fn go(&mut self, limits: &SearchLimits,
              report: &mut dyn FnMut(&SearchReport)) -> String {
        match self.searcher.go(&self.board, limits, report) {
            Some(best_move) => best_move.notation(),
            None => "0000".to_string(),
        }
    }

    /// Returns a handle to the searcher's shared stop flag.
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        self.searcher.stop_flag()
    }

    /// Statically evaluates the current position, from the side to
    /// move's perspective.
    pub fn evaluate(&self) -> Value {
        evaluator::evaluate(&self.board)
    }

    /// Counts the legal move paths of a given depth from the current
    /// position.
    pub fn perft(&mut self, depth: Depth) -> u64 {
        perft(&mut self.board, depth)
    }

    /// Like `perft`, but reports the count below each root move too.
    pub fn divide(&mut self, depth: Depth) -> (Vec<(Move, u64)>, u64) {
        divide(&mut self.board, depth)
    }
}

impl Default for Engine {
    fn default() -> Engine {
        Engine::new()
    }
}

/// Parses a coordinate-notation move, validates it against the
/// position, and plays it.
fn apply_uci_move(board: &mut Board, s: &str) -> Result<(), EngineError> {
    let parsed = parse_uci_move(board, s)?;
    let mut moves = Vec::new();
    generate_moves(board, &mut moves);
    // Take the generated twin of the parsed move, so the capture and
    // flag fields are the authoritative ones.
    let m = moves.into_iter()
                 .find(|m| *m == parsed)
                 .ok_or(EngineError::IllegalMove)?;
    if !is_move_legal(board, m) {
        return Err(EngineError::IllegalMove);
    }
    board.do_move(m);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_moves() {
        let mut engine = Engine::new();
        engine.do_uci_move("e2e4").unwrap();
        engine.do_uci_move("e7e5").unwrap();
        assert_eq!(engine.board().piece_at(crate::squares::E4), WHITE_PAWN);
        assert_eq!(engine.board().piece_at(crate::squares::E5), BLACK_PAWN);
        assert_eq!(engine.board().to_move, WHITE);
    }

    #[test]
    fn test_illegal_moves_leave_position_unchanged() {
        let mut engine = Engine::new();
        let fen_before = engine.board().to_fen();

        assert_eq!(engine.do_uci_move("e2e5"), Err(EngineError::IllegalMove));
        assert_eq!(engine.do_uci_move("e7e5"), Err(EngineError::IllegalMove));
        assert_eq!(engine.do_uci_move("zzzz"), Err(EngineError::InvalidMoveSyntax));
        assert_eq!(engine.board().to_fen(), fen_before);

        // A move that leaves the own king in check is rejected too.
        engine.set_position("rnbqk1nr/pppp1ppp/8/8/1b6/2N5/PPP1PPPP/R1BQKBNR w KQkq - 0 1",
                            &[])
              .unwrap();
        let fen_before = engine.board().to_fen();
        assert_eq!(engine.do_uci_move("c3d5"), Err(EngineError::IllegalMove));
        assert_eq!(engine.board().to_fen(), fen_before);
    }

    #[test]
    fn test_set_position_with_moves() {
        let mut engine = Engine::new();
        engine.set_position(START_FEN,
                            &["e2e4".to_string(), "e7e5".to_string(), "g1f3".to_string()])
              .unwrap();
        assert_eq!(engine.board().to_move, BLACK);
        assert_eq!(engine.board().fullmove_number, 2);

        // A bad FEN leaves the old position in place.
        let fen_before = engine.board().to_fen();
        assert!(engine.set_position("garbage", &[]).is_err());
        assert_eq!(engine.board().to_fen(), fen_before);
    }

    #[test]
    fn test_castling_and_promotion_via_notation() {
        let mut engine = Engine::new();
        engine.set_position("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1", &[]).unwrap();
        engine.do_uci_move("e1g1").unwrap();
        assert_eq!(engine.board().piece_at(crate::squares::F1), WHITE_ROOK);

        engine.set_position("8/P6k/8/8/8/8/8/K7 w - - 0 1", &[]).unwrap();
        engine.do_uci_move("a7a8q").unwrap();
        assert_eq!(engine.board().piece_at(crate::squares::A8), WHITE_QUEEN);
    }

    #[test]
    fn test_new_game_resets() {
        let mut engine = Engine::new();
        engine.do_uci_move("e2e4").unwrap();
        engine.new_game();
        assert_eq!(engine.board().to_fen(), START_FEN);
    }

    #[test]
    fn test_perft_facade() {
        let mut engine = Engine::new();
        assert_eq!(engine.perft(1), 20);
        let (counts, total) = engine.divide(1);
        assert_eq!(counts.len(), 20);
        assert_eq!(total, 20);
        // Perft restores the position exactly.
        assert_eq!(engine.board().to_fen(), START_FEN);
    }
}
