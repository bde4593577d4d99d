//! Prompt helpers.

use std::io::Write;

pub const PROMPT: &str = "rangeline> ";

/// Redisplay the prompt after printing a hub message
pub fn redisplay_prompt() {
    print!("{}", PROMPT);
    std::io::stdout().flush().ok();
}
