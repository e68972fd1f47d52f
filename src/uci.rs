//! Handles the "Universal Chess Interface" protocol communication.
//!
//! The protocol is line-oriented text on stdio. A dedicated reader
//! thread forwards complete lines to the serving loop through a
//! channel, and raises the engine's shared stop flag the moment an
//! asynchronous `stop` (or `quit`) arrives. That is what allows a
//! search running synchronously on the serving thread to be
//! interrupted from the outside.

use std::io::{self, BufRead, BufWriter, Write};
use std::sync::atomic::Ordering;
use std::sync::mpsc::channel;
use std::thread;
use regex::Regex;
use crate::board::{START_FEN, WHITE};
use crate::depth::{Depth, DEPTH_MAX};
use crate::engine::Engine;
use crate::search::SearchLimits;

const VERSION: &str = "0.1";

/// A command from the GUI to the engine.
enum UciCommand {
    Uci,
    IsReady,
    UciNewGame,
    Position(PositionParams),
    Go(GoParams),
    Stop,
    Quit,
    Eval,
    Print,
    Perft(Depth),
    Divide(Depth),
}

/// Parameters for `UciCommand::Position`.
struct PositionParams {
    fen: String,
    moves: Vec<String>,
}

/// Parameters for `UciCommand::Go`.
#[derive(Default)]
struct GoParams {
    depth: Option<Depth>,
    movetime: Option<u64>,
    nodes: Option<u64>,
    infinite: bool,
}

/// Tries to interpret a line as a UCI command.
fn parse_uci_command(s: &str) -> Option<UciCommand> {
    lazy_static! {
        static ref RE: Regex = Regex::new(
            r"\b(ucinewgame|uci|isready|position|go|stop|quit|eval|print|perft|divide)\s*(?:\s(.*)|$)"
        ).unwrap();
    }
    let captures = RE.captures(s)?;
    let command = captures.get(1).unwrap().as_str();
    let params = captures.get(2).map(|m| m.as_str()).unwrap_or("");
    match command {
        "uci" => Some(UciCommand::Uci),
        "isready" => Some(UciCommand::IsReady),
        "ucinewgame" => Some(UciCommand::UciNewGame),
        "position" => parse_position_params(params).map(UciCommand::Position),
        "go" => Some(UciCommand::Go(parse_go_params(params))),
        "stop" => Some(UciCommand::Stop),
        "quit" => Some(UciCommand::Quit),
        "eval" => Some(UciCommand::Eval),
        "print" => Some(UciCommand::Print),
        "perft" => params.trim().parse().ok().map(UciCommand::Perft),
        "divide" => params.trim().parse().ok().map(UciCommand::Divide),
        _ => None,
    }
}

// A helper function for `parse_uci_command`. It parses parameters
// for the "position" command.
fn parse_position_params(s: &str) -> Option<PositionParams> {
    lazy_static! {
        static ref RE: Regex = Regex::new(
            format!(
                r"^(?:fen\s+(?P<fen>{})|startpos)(?:\s+moves(?P<moves>{}))?\s*$",
                r"[1-8KQRBNPkqrbnp/]+\s+[wb]\s+(?:[KQkq]{1,4}|-)\s+(?:[a-h][1-8]|-)(?:\s+\d+(?:\s+\d+)?)?",
                r"(?:\s+[a-h][1-8][a-h][1-8][qrbn]?)*",  // a possibly empty list of moves
            ).as_str()
        ).unwrap();
    }
    let captures = RE.captures(s)?;
    Some(PositionParams {
        fen: captures.name("fen")
                     .map(|m| m.as_str().to_string())
                     .unwrap_or_else(|| START_FEN.to_string()),
        moves: captures.name("moves")
                       .map(|m| m.as_str())
                       .unwrap_or("")
                       .split_whitespace()
                       .map(|x| x.to_string())
                       .collect(),
    })
}

// A helper function for `parse_uci_command`. It parses parameters
// for the "go" command.
fn parse_go_params(s: &str) -> GoParams {
    lazy_static! {
        static ref RE: Regex = Regex::new(
            r"\b(?P<keyword>depth|movetime|nodes|infinite)(?:\s+(?P<number>\d+))?(?:\s+|$)"
        ).unwrap();
    }
    let mut params = GoParams::default();
    for captures in RE.captures_iter(s) {
        let keyword = captures.name("keyword").unwrap().as_str();
        if keyword == "infinite" {
            params.infinite = true;
            continue;
        }
        if let Some(number) = captures.name("number") {
            match keyword {
                "depth" => params.depth = number.as_str().parse().ok(),
                "movetime" => params.movetime = number.as_str().parse().ok(),
                "nodes" => params.nodes = number.as_str().parse().ok(),
                _ => (),
            }
        }
    }
    params
}

/// The main UCI serving loop.
///
/// Reads commands from stdin and serves them until `quit` arrives or
/// stdin closes. Returns `Ok(())` on a normal shutdown.
pub fn run() -> io::Result<()> {
    let mut engine = Engine::new();
    let stop_flag = engine.stop_flag();
    let (tx, rx) = channel::<String>();

    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(_) => break,
            };
            // An asynchronous "stop" must reach the search without
            // waiting for the serving loop to become idle.
            match line.trim().split_whitespace().next() {
                Some("stop") | Some("quit") => stop_flag.store(true, Ordering::Relaxed),
                _ => (),
            }
            if tx.send(line).is_err() {
                break;
            }
        }
    });

    let stdout = io::stdout();
    let mut writer = BufWriter::new(stdout.lock());

    for line in rx {
        let command = match parse_uci_command(&line) {
            Some(command) => command,
            None => continue,
        };
        match command {
            UciCommand::Uci => {
                writeln!(writer, "id name Diomedes {}", VERSION)?;
                writeln!(writer, "id author the Diomedes developers")?;
                writeln!(writer, "uciok")?;
            }
            UciCommand::IsReady => {
                writeln!(writer, "readyok")?;
            }
            UciCommand::UciNewGame => {
                engine.new_game();
            }
            UciCommand::Position(params) => {
                if let Err(error) = engine.set_position(&params.fen, &params.moves) {
                    writeln!(writer, "info string {}", error)?;
                }
            }
            UciCommand::Go(params) => {
                let limits = SearchLimits {
                    depth: params.depth.unwrap_or(DEPTH_MAX),
                    movetime: params.movetime,
                    nodes: params.nodes,
                    infinite: params.infinite,
                };
                let best_move = engine.go(&limits, &mut |report| {
                    if !report.done {
                        let _ = writeln!(writer,
                                         "info depth {} score cp {} nodes {}",
                                         report.depth,
                                         report.value,
                                         report.searched_nodes);
                        let _ = writer.flush();
                    }
                });
                writeln!(writer, "bestmove {}", best_move)?;
            }
            UciCommand::Stop => {
                // The reader thread raised the flag when the line
                // came in; by the time the command is processed here,
                // any search it aimed at has already returned. Clear
                // the flag so the next search starts unhindered.
                engine.stop_flag().store(false, Ordering::Relaxed);
            }
            UciCommand::Quit => break,
            UciCommand::Eval => {
                writeln!(writer, "eval: {}", engine.evaluate())?;
            }
            UciCommand::Print => {
                write!(writer, "{}", engine.board())?;
                writeln!(writer, "FEN: {}", engine.board().to_fen())?;
                writeln!(writer,
                         "Side: {}",
                         if engine.board().to_move == WHITE { "white" } else { "black" })?;
            }
            UciCommand::Perft(depth) => {
                let nodes = engine.perft(depth);
                writeln!(writer, "perft {}: {} nodes", depth, nodes)?;
            }
            UciCommand::Divide(depth) => {
                let (counts, total) = engine.divide(depth);
                for (m, count) in counts {
                    writeln!(writer, "{}: {}", m, count)?;
                }
                writeln!(writer, "total: {}", total)?;
            }
        }
        writer.flush()?;
    }
    Ok(())
}
