//! Generally useful functions for implementing the engine.

mod board_geometry;
mod notation;
mod parse_fen;
mod perft;
mod zobrist_arrays;

pub use self::board_geometry::BoardGeometry;
pub use self::notation::{parse_square, parse_uci_move, square_notation};
pub use self::parse_fen::parse_fen;
pub use self::perft::{divide, perft};
pub use self::zobrist_arrays::ZobristArrays;
