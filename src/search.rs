//! Implements iterative-deepening alpha-beta game tree search.
//!
//! The searcher runs a negamax alpha-beta with a principal-variation
//! window, late-move reductions, null-move pruning, and a
//! capture-only quiescence search at the leaves. Move ordering is
//! driven by the transposition-table hint, MVV-LVA capture scores,
//! and two killer slots per ply. The whole search is synchronous and
//! single-threaded: the only cross-thread signal is a shared atomic
//! stop flag, polled periodically while searching.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use crate::board::*;
use crate::depth::*;
use crate::evaluator::{self, PIECE_VALUES};
use crate::movegen::{generate_captures, generate_moves};
use crate::moves::Move;
use crate::tt::*;
use crate::value::*;

/// The limits under which a search runs.
///
/// Whichever limit triggers first ends the search; `infinite` merely
/// means that no limit was requested and the search runs until the
/// stop flag is raised (or the maximum depth is exhausted).
#[derive(Clone, Debug)]
pub struct SearchLimits {
    /// The maximum depth to iterate to.
    pub depth: Depth,

    /// The wall-clock budget in milliseconds.
    pub movetime: Option<u64>,

    /// The maximum number of nodes to search.
    pub nodes: Option<u64>,

    /// Search until told to stop.
    pub infinite: bool,
}

impl Default for SearchLimits {
    fn default() -> SearchLimits {
        SearchLimits {
            depth: DEPTH_MAX,
            movetime: None,
            nodes: None,
            infinite: false,
        }
    }
}

/// A progress report from a search.
///
/// One report is emitted per completed iteration, with non-decreasing
/// `depth` values, followed by a final report carrying `done` and the
/// overall best move.
#[derive(Clone, Debug)]
pub struct SearchReport {
    /// The depth of the completed iteration.
    pub depth: Depth,

    /// The value of the root position, from the mover's perspective.
    pub value: Value,

    /// The number of nodes searched so far.
    pub searched_nodes: u64,

    /// The best move found so far.
    pub best_move: Move,

    /// Whether this is the final report of the search.
    pub done: bool,
}

/// Signals that the current search has hit one of its limits and
/// should be abandoned.
struct TerminatedSearch;

/// How many nodes are searched between two stop-condition polls.
const NODE_POLL_INTERVAL: u64 = 1024;

/// The quiescence search gives up after this many consecutive
/// capture plies.
const QS_MAX_DEPTH: Depth = 8;

/// Holds two killer moves for every ply.
///
/// A "killer move" is a quiet move that recently caused a beta
/// cut-off at the same distance from the root. Trying it early pays
/// off in sibling nodes. Registering a new killer shifts the old
/// first slot to the second.
struct KillerTable {
    slots: [[Move; 2]; MAX_PLY],
}

impl KillerTable {
    fn new() -> KillerTable {
        KillerTable { slots: [[Move::none(); 2]; MAX_PLY] }
    }

    fn register(&mut self, ply: usize, m: Move) {
        debug_assert!(ply < MAX_PLY);
        let pair = &mut self.slots[ply];
        if pair[0] != m {
            pair[1] = pair[0];
            pair[0] = m;
        }
    }

    #[inline]
    fn get(&self, ply: usize) -> [Move; 2] {
        debug_assert!(ply < MAX_PLY);
        self.slots[ply]
    }

    fn forget_all(&mut self) {
        for pair in self.slots.iter_mut() {
            *pair = [Move::none(); 2];
        }
    }
}

/// Performs iterative-deepening alpha-beta searches.
///
/// The searcher owns the transposition table and the killer table, so
/// they persist between consecutive `go` calls; `clear` resets both
/// for a new game. It never touches the caller's board: `go` works on
/// a private copy.
pub struct Searcher {
    tt: TranspositionTable,
    killers: KillerTable,
    stop_flag: Arc<AtomicBool>,
    searched_nodes: u64,
    deadline: Option<Instant>,
    node_limit: Option<u64>,
    completed_depth: Depth,
}

impl Searcher {
    /// Creates a new instance.
    pub fn new() -> Searcher {
        Searcher {
            tt: TranspositionTable::new(),
            killers: KillerTable::new(),
            stop_flag: Arc::new(AtomicBool::new(false)),
            searched_nodes: 0,
            deadline: None,
            node_limit: None,
            completed_depth: 0,
        }
    }

    /// Returns a handle to the shared stop flag.
    ///
    /// Another thread may store `true` into it at any time; the
    /// search observes the flag within a bounded number of nodes and
    /// abandons the iteration in progress. The searcher never resets
    /// the flag itself: a raised flag would otherwise be lost when
    /// `stop` races ahead of the `go` it aims at. Clearing it back to
    /// `false` is the flag owner's job once the stop has been served.
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        self.stop_flag.clone()
    }

    /// Forgets everything learned so far (transposition table and
    /// killer moves). Called when a new game starts.
    pub fn clear(&mut self) {
        self.tt.clear();
        self.killers.forget_all();
    }

    /// Searches a position under the given limits and returns the
    /// best move found, if any.
    ///
    /// For every completed iteration a `SearchReport` is pushed into
    /// `report`, followed by a final report with `done` set. The
    /// returned move is the best move of the deepest *completed*
    /// iteration; `None` means the position has no legal moves. The
    /// first iteration is always completed whatever the limits say,
    /// so a legal move is delivered whenever one exists.
    pub fn go(&mut self, board: &Board, limits: &SearchLimits,
              report: &mut dyn FnMut(&SearchReport)) -> Option<Move> {
        self.searched_nodes = 0;
        self.completed_depth = 0;
        self.deadline = limits.movetime.map(|ms| Instant::now() + Duration::from_millis(ms));
        self.node_limit = limits.nodes;
        self.tt.new_search();
        self.killers.forget_all();

        // The search mutates a private copy by make/undo; the
        // caller's board stays untouched even when an iteration is
        // abandoned halfway down a line.
        let mut board = board.clone();

        let mut best: Option<(Value, Move)> = None;
        let max_depth = limits.depth.max(1).min(DEPTH_MAX);
        for depth in 1..=max_depth {
            match self.root_search(&mut board, depth) {
                Ok(Some((value, best_move))) => {
                    self.completed_depth = depth;
                    best = Some((value, best_move));
                    report(&SearchReport {
                        depth,
                        value,
                        searched_nodes: self.searched_nodes,
                        best_move,
                        done: false,
                    });
                }
                Ok(None) => break,
                Err(TerminatedSearch) => break,
            }
            if self.stop_condition() {
                break;
            }
        }

        if let Some((value, best_move)) = best {
            report(&SearchReport {
                depth: self.completed_depth,
                value,
                searched_nodes: self.searched_nodes,
                best_move,
                done: true,
            });
            Some(best_move)
        } else {
            None
        }
    }

    /// Searches the root position to a given depth.
    ///
    /// Returns the value and best move of the iteration, or `None`
    /// when the position has no legal moves. The root keeps track of
    /// its own best move instead of trusting the transposition table,
    /// so a finished iteration always has a move to report.
    fn root_search(&mut self, board: &mut Board, depth: Depth)
                   -> Result<Option<(Value, Move)>, TerminatedSearch> {
        let mut alpha = -VALUE_MATE;
        let beta = VALUE_MATE;
        let tt_move = self.tt
                          .probe(board.key)
                          .map(|entry| entry.best_move)
                          .unwrap_or_else(Move::none);

        let mut moves = Vec::new();
        generate_moves(board, &mut moves);
        self.order_moves(&mut moves, tt_move, 0);

        let mut best: Option<(Value, Move)> = None;
        let mut moves_searched = 0;
        for m in moves {
            let undo = board.do_move(m);
            if board.in_check(other(board.to_move)) {
                board.undo_move(&undo);
                continue;
            }
            let value = if moves_searched == 0 {
                -self.alpha_beta(board, depth - 1, 1, -beta, -alpha, true)?
            } else {
                let reduction = if depth >= 3 && moves_searched >= 4 { 1 } else { 0 };
                let scout =
                    -self.alpha_beta(board, depth - 1 - reduction, 1, -alpha - 1, -alpha, true)?;
                if scout > alpha {
                    -self.alpha_beta(board, depth - 1, 1, -beta, -alpha, true)?
                } else {
                    scout
                }
            };
            board.undo_move(&undo);
            moves_searched += 1;

            if best.map_or(true, |(best_value, _)| value > best_value) {
                best = Some((value, m));
            }
            if value > alpha {
                alpha = value;
            }
        }

        if let Some((value, best_move)) = best {
            self.tt.store(board.key, depth, value, BOUND_EXACT, best_move);
            Ok(Some((value, best_move)))
        } else {
            Ok(None)
        }
    }

    /// The negamax alpha-beta recursion.
    ///
    /// `ply` is the distance from the root, `do_null` guards against
    /// two null moves in a row.
    fn alpha_beta(&mut self, board: &mut Board, depth: Depth, ply: usize, mut alpha: Value,
                  beta: Value, do_null: bool)
                  -> Result<Value, TerminatedSearch> {
        debug_assert!(alpha < beta);
        self.count_node()?;

        if self.is_repetition(board) {
            return Ok(0);
        }
        if ply >= MAX_PLY - 1 {
            return Ok(evaluator::evaluate(board));
        }

        // Probe the transposition table. An entry deep enough and
        // with the right bound ends the node; a shallower entry still
        // contributes its move to the ordering.
        let alpha_orig = alpha;
        let mut tt_move = Move::none();
        if let Some(entry) = self.tt.probe(board.key) {
            tt_move = entry.best_move;
            if entry.depth >= depth {
                if entry.bound == BOUND_EXACT ||
                   (entry.bound == BOUND_LOWER && entry.value >= beta) ||
                   (entry.bound == BOUND_UPPER && entry.value <= alpha) {
                    return Ok(entry.value);
                }
            }
        }

        if depth <= 0 {
            return self.quiescence(board, alpha, beta, 0);
        }

        // Null-move pruning: give the opponent a free turn with a
        // reduced depth and a zero window around beta. A fail-high
        // means the position is so strong that a real move will very
        // probably fail high too.
        let in_check = board.in_check(board.to_move);
        if do_null && depth >= 3 && !in_check {
            let undo = board.do_null();
            let value = -self.alpha_beta(board, depth - 3, ply + 1, -beta, -beta + 1, false)?;
            board.undo_null(&undo);
            if value >= beta {
                return Ok(beta);
            }
        }

        let mut moves = Vec::new();
        generate_moves(board, &mut moves);
        self.order_moves(&mut moves, tt_move, ply);

        let mut best_value = -VALUE_MATE;
        let mut best_move = Move::none();
        let mut moves_searched = 0;
        for m in moves {
            let undo = board.do_move(m);
            if board.in_check(other(board.to_move)) {
                board.undo_move(&undo);
                continue;
            }

            // Principal-variation search: the first legal move gets
            // the full window; later moves are scouted with a zero
            // window (and a one-ply reduction when they come late in
            // a deep node), re-searched in full only on a fail-high.
            let value = if moves_searched == 0 {
                -self.alpha_beta(board, depth - 1, ply + 1, -beta, -alpha, true)?
            } else {
                let reduction = if depth >= 3 && moves_searched >= 4 { 1 } else { 0 };
                let scout = -self.alpha_beta(board,
                                             depth - 1 - reduction,
                                             ply + 1,
                                             -alpha - 1,
                                             -alpha,
                                             true)?;
                if scout > alpha {
                    -self.alpha_beta(board, depth - 1, ply + 1, -beta, -alpha, true)?
                } else {
                    scout
                }
            };
            board.undo_move(&undo);
            moves_searched += 1;

            if value > best_value {
                best_value = value;
                best_move = m;
            }
            if value > alpha {
                alpha = value;
            }
            if alpha >= beta {
                if m.captured_piece == PIECE_NONE {
                    self.killers.register(ply, m);
                }
                break;
            }
        }

        // No legal moves: checkmate or stalemate. Mate scores carry
        // the distance from the root, so nearer mates score higher.
        if moves_searched == 0 {
            return Ok(if in_check { -VALUE_MATE + ply as Value } else { 0 });
        }

        let bound = if best_value <= alpha_orig {
            BOUND_UPPER
        } else if best_value >= beta {
            BOUND_LOWER
        } else {
            BOUND_EXACT
        };
        self.tt.store(board.key, depth, best_value, bound, best_move);
        Ok(best_value)
    }

    /// The quiescence search: extend capture sequences so the static
    /// evaluation is never taken in the middle of an exchange.
    fn quiescence(&mut self, board: &mut Board, mut alpha: Value, beta: Value, depth: Depth)
                  -> Result<Value, TerminatedSearch> {
        self.count_node()?;

        let stand_pat = evaluator::evaluate(board);
        if stand_pat >= beta {
            return Ok(beta);
        }
        if stand_pat > alpha {
            alpha = stand_pat;
        }
        if depth >= QS_MAX_DEPTH {
            return Ok(stand_pat);
        }

        let mut moves = Vec::new();
        generate_captures(board, &mut moves);
        for m in moves {
            let undo = board.do_move(m);
            if board.in_check(other(board.to_move)) {
                board.undo_move(&undo);
                continue;
            }
            let value = -self.quiescence(board, -beta, -alpha, depth + 1)?;
            board.undo_move(&undo);

            if value >= beta {
                return Ok(beta);
            }
            if value > alpha {
                alpha = value;
            }
        }
        Ok(alpha)
    }

    /// Sorts the generated moves, best candidates first.
    fn order_moves(&self, moves: &mut Vec<Move>, tt_move: Move, ply: usize) {
        let killers = self.killers.get(ply);
        moves.sort_by_key(|m| -score_move(*m, tt_move, &killers));
    }

    /// Registers one searched node and polls the stop condition every
    /// `NODE_POLL_INTERVAL` nodes.
    #[inline]
    fn count_node(&mut self) -> Result<(), TerminatedSearch> {
        self.searched_nodes += 1;
        if self.searched_nodes % NODE_POLL_INTERVAL == 0 && self.stop_condition() {
            return Err(TerminatedSearch);
        }
        Ok(())
    }

    /// Returns whether the search should stop now.
    ///
    /// The first iteration is exempt: without at least one completed
    /// iteration there would be no best move to fall back on.
    fn stop_condition(&self) -> bool {
        if self.completed_depth < 1 {
            return false;
        }
        if self.stop_flag.load(Ordering::Relaxed) {
            return true;
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return true;
            }
        }
        if let Some(limit) = self.node_limit {
            if self.searched_nodes >= limit {
                return true;
            }
        }
        false
    }

    /// Returns whether the current position repeats an earlier one.
    ///
    /// Game history is not tracked, so repetitions are never
    /// detected.
    fn is_repetition(&self, _board: &Board) -> bool {
        false
    }
}

impl Default for Searcher {
    fn default() -> Searcher {
        Searcher::new()
    }
}

/// Scores a move for ordering purposes.
///
/// The transposition-table move comes first, then the captures by
/// MVV-LVA (most valuable victim first, least valuable attacker
/// breaking ties), then the two killers of this ply, then the
/// promotions. Everything else keeps score 0; a history heuristic
/// could refine that.
fn score_move(m: Move, tt_move: Move, killers: &[Move; 2]) -> Value {
    if m == tt_move {
        return 10000;
    }
    if m.captured_piece != PIECE_NONE {
        return 9000 + PIECE_VALUES[kind_of(m.captured_piece)] -
               PIECE_VALUES[kind_of(m.piece)] / 10;
    }
    if m == killers[0] {
        return 8000;
    }
    if m == killers[1] {
        return 7999;
    }
    if m.promoted_piece != PIECE_NONE {
        return 7000 + PIECE_VALUES[kind_of(m.promoted_piece)];
    }
    0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::squares::*;

    fn search_to_depth(fen: &str, depth: Depth) -> (Option<Move>, Vec<SearchReport>) {
        let board = Board::from_fen(fen).unwrap();
        let mut searcher = Searcher::new();
        let limits = SearchLimits { depth, ..Default::default() };
        let mut reports = Vec::new();
        let best = searcher.go(&board, &limits, &mut |r| reports.push(r.clone()));
        (best, reports)
    }

    #[test]
    fn test_finds_mate_in_one() {
        let (best, reports) = search_to_depth("6k1/5ppp/8/8/8/8/5PPP/R5K1 w - - 0 1", 2);
        assert_eq!(best.unwrap().notation(), "a1a8");
        let last = reports.last().unwrap();
        assert!(last.done);
        assert!(last.value > VALUE_MATE_THRESHOLD);
    }

    #[test]
    fn test_reports_have_nondecreasing_depths() {
        let (best, reports) = search_to_depth(START_FEN, 3);
        assert!(best.is_some());
        let depths: Vec<_> = reports.iter().filter(|r| !r.done).map(|r| r.depth).collect();
        assert_eq!(depths, vec![1, 2, 3]);
        for pair in reports.windows(2) {
            assert!(pair[0].searched_nodes <= pair[1].searched_nodes);
        }
    }

    #[test]
    fn test_no_legal_moves_yields_none() {
        // Back-rank mate: black has no legal moves.
        let (best, reports) = search_to_depth("R5k1/5ppp/8/8/8/8/5PPP/6K1 b - - 0 1", 3);
        assert!(best.is_none());
        assert!(reports.is_empty());
    }

    #[test]
    fn test_single_reply_position() {
        // The checked black king has exactly one legal move.
        let (best, _) = search_to_depth("R6k/8/5K2/8/8/8/8/8 b - - 0 1", 2);
        assert_eq!(best.unwrap().notation(), "h8h7");
    }

    #[test]
    fn test_checkmated_mover_yields_none() {
        // The supported queen on f2 mates the white king.
        let (best, _) = search_to_depth("8/8/8/8/8/5k2/5q2/5K2 w - - 0 1", 2);
        assert!(best.is_none());
    }

    #[test]
    fn test_prefers_capturing_a_hanging_queen() {
        // The queen on d5 is loose; taking it is worth more than
        // anything else on the board.
        let (best, _) = search_to_depth("7k/8/8/3q4/8/8/3R4/7K w - - 0 1", 3);
        assert_eq!(best.unwrap().notation(), "d2d5");
    }

    #[test]
    fn test_stop_flag_still_delivers_a_move() {
        let board = Board::from_fen(START_FEN).unwrap();
        let mut searcher = Searcher::new();
        searcher.stop_flag().store(true, Ordering::Relaxed);
        let limits = SearchLimits { infinite: true, ..Default::default() };
        let mut reports = Vec::new();
        let best = searcher.go(&board, &limits, &mut |r| reports.push(r.clone()));
        assert!(best.is_some());
    }

    #[test]
    fn test_node_limit_is_respected_after_first_iteration() {
        let board = Board::from_fen(START_FEN).unwrap();
        let mut searcher = Searcher::new();
        let limits = SearchLimits {
            depth: DEPTH_MAX,
            nodes: Some(20_000),
            ..Default::default()
        };
        let mut last_nodes = 0;
        let best = searcher.go(&board, &limits, &mut |r| last_nodes = r.searched_nodes);
        assert!(best.is_some());
        // The limit may be overshot by at most one polling interval
        // per recursion level, not by whole iterations.
        assert!(last_nodes < 200_000);
    }

    #[test]
    fn test_killer_table_shifts() {
        let mut killers = KillerTable::new();
        let m1 = Move::new(WHITE_KNIGHT, G1, F3, PIECE_NONE);
        let m2 = Move::new(WHITE_KNIGHT, B1, C3, PIECE_NONE);
        killers.register(3, m1);
        assert_eq!(killers.get(3), [m1, Move::none()]);
        killers.register(3, m1);
        assert_eq!(killers.get(3), [m1, Move::none()]);
        killers.register(3, m2);
        assert_eq!(killers.get(3), [m2, m1]);
        assert_eq!(killers.get(4), [Move::none(), Move::none()]);
        killers.forget_all();
        assert_eq!(killers.get(3), [Move::none(), Move::none()]);
    }

    #[test]
    fn test_move_ordering_scores() {
        let tt_move = Move::new(WHITE_KNIGHT, G1, F3, PIECE_NONE);
        let killers = [Move::new(WHITE_PAWN, A2, A3, PIECE_NONE), Move::none()];

        assert_eq!(score_move(tt_move, tt_move, &killers), 10000);

        // Pawn takes queen outranks queen takes pawn.
        let pxq = Move::new(WHITE_PAWN, E4, D5, BLACK_QUEEN);
        let qxp = Move::new(WHITE_QUEEN, D1, D5, BLACK_PAWN);
        assert_eq!(score_move(pxq, tt_move, &killers), 9000 + 900 - 10);
        assert_eq!(score_move(qxp, tt_move, &killers), 9000 + 100 - 90);
        assert!(score_move(pxq, tt_move, &killers) > score_move(qxp, tt_move, &killers));

        assert_eq!(score_move(killers[0], tt_move, &killers), 8000);
        let promotion = Move::new_promotion(WHITE_PAWN, E7, E8, PIECE_NONE, WHITE_QUEEN);
        assert_eq!(score_move(promotion, tt_move, &killers), 7900);
        let quiet = Move::new(WHITE_KING, E1, E2, PIECE_NONE);
        assert_eq!(score_move(quiet, tt_move, &killers), 0);
    }
}
