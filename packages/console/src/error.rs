//! Error types for the operator console.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConsoleError {
    /// The hub could not be reached or the connection dropped
    #[error("Connection error: {0}")]
    Connection(String),

    /// The hub URL is not a WebSocket URL
    #[error("Invalid hub URL '{0}': expected ws:// or wss://")]
    InvalidUrl(String),

    /// The operator typed something that is not a console command
    #[error("Invalid command: {0}")]
    InvalidCommand(String),
}
