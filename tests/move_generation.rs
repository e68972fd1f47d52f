extern crate diomedes;

use diomedes::utils::perft;
use diomedes::Board;

const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq -";
const POSITION_3: &str = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - -";

fn assert_perft(fen: &str, expected: &[u64]) {
    let mut board = Board::from_fen(fen).unwrap();
    let fen_before = board.to_fen();
    for (i, &nodes) in expected.iter().enumerate() {
        let depth = (i + 1) as i32;
        assert_eq!(perft(&mut board, depth), nodes, "perft({}) of {}", depth, fen);
    }
    // Perft leaves the position exactly as it found it.
    assert_eq!(board.to_fen(), fen_before);
}

#[test]
fn perft_startpos() {
    assert_perft(diomedes::START_FEN, &[20, 400, 8_902, 197_281]);
}

#[test]
#[ignore]
fn perft_startpos_deep() {
    assert_perft(diomedes::START_FEN, &[20, 400, 8_902, 197_281, 4_865_609]);
}

#[test]
fn perft_kiwipete() {
    assert_perft(KIWIPETE, &[48, 2_039, 97_862]);
}

#[test]
fn perft_position_3() {
    assert_perft(POSITION_3, &[14, 191, 2_812, 43_238, 674_624]);
}
