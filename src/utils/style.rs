//! ANSI styling for operator-facing output.

const GREEN: &str = "\x1b[92m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Clears the terminal and moves the cursor home.
pub const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Render `label` bold green.
pub fn emphasize(label: &str) -> String {
    format!("{}{}{}{}", GREEN, BOLD, label, RESET)
}
