use std::process::exit;

fn main() {
    exit(match diomedes::uci::run() {
        Ok(_) => 0,
        Err(_) => 1,
    })
}
