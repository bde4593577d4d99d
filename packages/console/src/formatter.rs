//! Message formatting utilities for console display.

use rangeline_server::domain::{ServerMessage, SessionState, ShotRecord};
use rangeline_shared::time::timestamp_to_rfc3339;

const SEPARATOR: &str = "============================================================";

/// Message formatter for console display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Format any hub message for the operator.
    pub fn format(msg: &ServerMessage) -> String {
        match msg {
            ServerMessage::Connected { client_id } => {
                format!("\nConnected to hub as {}\n", client_id)
            }
            ServerMessage::Subscribed { events } => {
                format!("\n* subscribed: {}\n", join_or_none(events))
            }
            ServerMessage::Unsubscribed { events } => {
                format!("\n* unsubscribed: {}\n", join_or_none(events))
            }
            ServerMessage::SessionJoined {
                session_id,
                lane_id,
            } => format!(
                "\n* joined session {}{}\n",
                session_id.as_deref().unwrap_or("-"),
                lane_suffix(lane_id.as_deref())
            ),
            ServerMessage::SessionLeft {
                session_id,
                lane_id,
            } => format!(
                "\n* left session {}{}\n",
                session_id.as_deref().unwrap_or("-"),
                lane_suffix(lane_id.as_deref())
            ),
            ServerMessage::IrShot {
                session_id, shot, ..
            } => Self::format_shot(session_id, shot),
            ServerMessage::SessionStarted {
                session, timestamp, ..
            } => Self::format_session("STARTED", session, *timestamp),
            ServerMessage::SessionStopped {
                session, timestamp, ..
            } => Self::format_session("STOPPED", session, *timestamp),
            ServerMessage::Ping { timestamp } => {
                format!("\n. heartbeat at {}\n", timestamp_to_rfc3339(*timestamp))
            }
            ServerMessage::Pong { timestamp } => {
                format!("\n* pong at {}\n", timestamp_to_rfc3339(*timestamp))
            }
        }
    }

    /// Format one live shot as a single line
    ///
    /// # Arguments
    ///
    /// * `session_id` - The session the shot was routed to
    /// * `shot` - The recorded shot
    pub fn format_shot(session_id: &str, shot: &ShotRecord) -> String {
        format!(
            "\n[{}] #{} ({:.1}, {:.1}) at {}\n",
            session_id,
            shot.shot_number,
            shot.hit.x,
            shot.hit.y,
            timestamp_to_rfc3339(shot.hit.captured_at_millis.value())
        )
    }

    /// Format a session start/stop banner
    pub fn format_session(label: &str, session: &SessionState, timestamp: i64) -> String {
        let mut output = String::new();
        output.push('\n');
        output.push_str(SEPARATOR);
        output.push('\n');
        output.push_str(&format!(
            "Session {} {} ({})\n",
            session.session_id,
            label,
            session.firing_mode.as_str()
        ));
        output.push_str(&format!(
            "started at {}\n",
            timestamp_to_rfc3339(session.started_at_millis.value())
        ));
        if let Some(ended) = session.ended_at_millis {
            output.push_str(&format!("ended at {}\n", timestamp_to_rfc3339(ended.value())));
        }
        output.push_str(&format!("shots: {}\n", session.shots.len()));
        output.push_str(&format!("event at {}\n", timestamp_to_rfc3339(timestamp)));
        output.push_str(SEPARATOR);
        output.push('\n');
        output
    }
}

fn join_or_none(events: &[String]) -> String {
    if events.is_empty() {
        "(none)".to_string()
    } else {
        events.join(", ")
    }
}

fn lane_suffix(lane_id: Option<&str>) -> String {
    lane_id.map(|lane| format!(" on lane {}", lane)).unwrap_or_default()
}
