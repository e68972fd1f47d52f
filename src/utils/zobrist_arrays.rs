//! Implements `ZobristArrays`.

/// Tables for calculating Zobrist hashes.
///
/// Zobrist hashing transforms a board position into a fixed-length
/// number with an equal distribution over all possible numbers. The
/// key property of the method is that two similar positions generate
/// entirely different hash numbers, which makes the numbers suitable
/// as transposition-table keys.
///
/// The tables are filled from a pseudo-random generator with a fixed
/// seed, so the key of any given position is identical from run to
/// run.
pub struct ZobristArrays {
    /// The constant with which the hash value is XOR-ed when black is
    /// to move.
    pub to_move: u64,

    /// Constants with which the hash value is XOR-ed when a given
    /// piece on a given square appears/disappears. The first row
    /// (`PIECE_NONE`) is all zeros.
    pub pieces: [[u64; 64]; 13],

    /// Constants with which the hash value is XOR-ed for the current
    /// castling rights mask (a value between 0 and 15).
    pub castling_rights: [u64; 16],

    /// Constants with which the hash value is XOR-ed when an
    /// en-passant square is set.
    pub enpassant_square: [u64; 64],
}

impl ZobristArrays {
    /// Creates and initializes a new instance.
    fn new() -> ZobristArrays {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};

        let mut rng = StdRng::seed_from_u64(0x00C0_FFEE_1234_5678);

        let to_move = rng.gen();
        let mut pieces = [[0; 64]; 13];
        let mut castling_rights = [0; 16];
        let mut enpassant_square = [0; 64];

        for piece in 1..13 {
            for square in 0..64 {
                pieces[piece][square] = rng.gen();
            }
        }
        for value in 0..16 {
            castling_rights[value] = rng.gen();
        }
        for square in 0..64 {
            enpassant_square[square] = rng.gen();
        }

        ZobristArrays {
            to_move,
            pieces,
            castling_rights,
            enpassant_square,
        }
    }

    /// Returns a reference to the lazily initialized singleton
    /// instance.
    pub fn get() -> &'static ZobristArrays {
        lazy_static! {
            static ref ARRAYS: ZobristArrays = ZobristArrays::new();
        }
        &ARRAYS
    }
}
