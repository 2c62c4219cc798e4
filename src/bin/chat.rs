//! Terminal chat client for the Zero Hunger assistance service.
//! Run with: cargo run --bin zero-hunger-chat

use std::process::ExitCode;

use zero_hunger_assistant::start;

fn main() -> ExitCode {
    start::run_chat()
}
