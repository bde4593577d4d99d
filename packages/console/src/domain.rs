//! Pure console decisions: what to send on connect and whether to reconnect.

use rangeline_server::domain::ClientMessage;

use crate::error::ConsoleError;

/// What the operator asked to watch from the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsoleOptions {
    pub url: String,
    pub events: Vec<String>,
    pub session: Option<String>,
    pub lane: Option<String>,
}

/// Messages sent right after every (re)connect so the hub restores the
/// console's subscriptions.
pub fn initial_messages(options: &ConsoleOptions) -> Vec<ClientMessage> {
    let mut messages = Vec::new();
    if !options.events.is_empty() {
        messages.push(ClientMessage::Subscribe {
            events: options.events.clone(),
        });
    }
    if options.session.is_some() || options.lane.is_some() {
        messages.push(ClientMessage::JoinSession {
            session_id: options.session.clone(),
            lane_id: options.lane.clone(),
        });
    }
    messages
}

pub fn validate_url(url: &str) -> Result<(), ConsoleError> {
    if url.starts_with("ws://") || url.starts_with("wss://") {
        Ok(())
    } else {
        Err(ConsoleError::InvalidUrl(url.to_string()))
    }
}

/// Check if the console should exit immediately based on the error type.
pub fn should_exit_immediately(error: &ConsoleError) -> bool {
    matches!(error, ConsoleError::InvalidUrl(_))
}

/// Check if the console should attempt to reconnect.
///
/// # Arguments
///
/// * `error` - The error that ended the last session
/// * `current_attempt` - Reconnection attempts made so far
/// * `max_attempts` - The maximum number of reconnection attempts allowed
pub fn should_attempt_reconnect(
    error: &ConsoleError,
    current_attempt: u32,
    max_attempts: u32,
) -> bool {
    if should_exit_immediately(error) {
        return false;
    }
    current_attempt < max_attempts
}
