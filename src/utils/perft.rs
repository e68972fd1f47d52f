//! Implements `perft` and `divide`.

use crate::board::{other, Board};
use crate::depth::Depth;
use crate::movegen::generate_moves;
use crate::moves::Move;

/// Performs move path enumeration.
///
/// `perft` walks the tree of strictly legal moves and counts the leaf
/// nodes at a given depth. The counts can be compared to
/// predetermined values to isolate move generation bugs. Nodes are
/// only counted at the final depth, so "higher" terminal nodes
/// (checkmates and stalemates above the horizon) are not counted.
pub fn perft(board: &mut Board, depth: Depth) -> u64 {
    if depth <= 0 {
        return 1;
    }
    let mut moves = Vec::new();
    generate_moves(board, &mut moves);
    let mut nodes = 0;
    for m in moves {
        let undo = board.do_move(m);
        if !board.in_check(other(board.to_move)) {
            nodes += perft(board, depth - 1);
        }
        board.undo_move(&undo);
    }
    nodes
}

/// Like `perft`, but also reports the node count below each legal
/// root move.
///
/// Returns the per-move counts plus the grand total.
pub fn divide(board: &mut Board, depth: Depth) -> (Vec<(Move, u64)>, u64) {
    let mut moves = Vec::new();
    generate_moves(board, &mut moves);
    let mut counts = Vec::new();
    let mut total = 0;
    for m in moves {
        let undo = board.do_move(m);
        if !board.in_check(other(board.to_move)) {
            let count = perft(board, depth - 1);
            counts.push((m, count));
            total += count;
        }
        board.undo_move(&undo);
    }
    (counts, total)
}
