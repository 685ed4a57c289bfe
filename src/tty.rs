//! Terminal I/O utilities for CLI.
//!
//! Provides user prompting and terminal-only status lines.

use std::io::{self, BufRead, IsTerminal, Write};

/// Print `message` to stderr and read one line from stdin. End of input reads
/// as an empty answer.
pub fn prompt(message: &str) -> sidekick::Result<String> {
    eprint!("{}", message);
    io::stderr().flush().ok();

    let stdin = io::stdin();
    let mut line = String::new();
    stdin.lock().read_line(&mut line).map_err(|e| {
        sidekick::Error::new(
            sidekick::ErrorCode::InternalIoError,
            format!("Failed to read input: {}", e),
            serde_json::Value::Null,
        )
    })?;

    Ok(line.trim().to_string())
}

/// Ask a yes/no question. Only an explicit yes counts.
pub fn confirm(message: &str) -> sidekick::Result<bool> {
    let answer = prompt(&format!("{} (y/n) ", message))?;
    Ok(is_yes(&answer))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.to_lowercase().as_str(), "y" | "yes" | "s" | "sim")
}

/// Print status message to stderr if running in a terminal.
pub fn status(message: &str) {
    if io::stderr().is_terminal() {
        eprintln!("{}", message);
    }
}

// log_status! macro is defined in lib.rs (#[macro_export]) and available crate-wide.
