//! Zero Hunger assistance service.
//! Run with: cargo run --bin zero-hunger-server

use std::process::ExitCode;

use zero_hunger_assistant::start;

fn main() -> ExitCode {
    start::run_server()
}
