//! Operator input parsing.
//!
//! ```text
//! sub <topic>...           subscribe to topics (irShot, sessions)
//! unsub <topic>...         unsubscribe from topics
//! join <session> [lane]    join a session, optionally on a lane
//! leave [session]          leave the joined session
//! ping                     ask the hub for a pong
//! help                     show this list
//! quit                     exit the console
//! ```

use rangeline_server::domain::ClientMessage;

use crate::error::ConsoleError;

pub const HELP: &str = "\
Commands:
  sub <topic>...         subscribe to topics (irShot, sessions)
  unsub <topic>...       unsubscribe from topics
  join <session> [lane]  join a session, optionally on a lane
  leave [session]        leave the joined session
  ping                   ask the hub for a pong
  help                   show this list
  quit                   exit the console
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Send(ClientMessage),
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> Result<Command, ConsoleError> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Err(ConsoleError::InvalidCommand("empty input".to_string()));
    };
    let args: Vec<String> = words.map(str::to_string).collect();

    match verb.to_ascii_lowercase().as_str() {
        "sub" | "subscribe" => {
            require_args(verb, &args)?;
            Ok(Command::Send(ClientMessage::Subscribe { events: args }))
        }
        "unsub" | "unsubscribe" => {
            require_args(verb, &args)?;
            Ok(Command::Send(ClientMessage::Unsubscribe { events: args }))
        }
        "join" => match args.as_slice() {
            [session] => Ok(Command::Send(ClientMessage::JoinSession {
                session_id: Some(session.clone()),
                lane_id: None,
            })),
            [session, lane] => Ok(Command::Send(ClientMessage::JoinSession {
                session_id: Some(session.clone()),
                lane_id: Some(lane.clone()),
            })),
            _ => Err(ConsoleError::InvalidCommand(
                "usage: join <session> [lane]".to_string(),
            )),
        },
        "leave" => match args.as_slice() {
            [] => Ok(Command::Send(ClientMessage::LeaveSession {
                session_id: None,
                lane_id: None,
            })),
            [session] => Ok(Command::Send(ClientMessage::LeaveSession {
                session_id: Some(session.clone()),
                lane_id: None,
            })),
            _ => Err(ConsoleError::InvalidCommand(
                "usage: leave [session]".to_string(),
            )),
        },
        "ping" => Ok(Command::Send(ClientMessage::Ping)),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(ConsoleError::InvalidCommand(format!(
            "unknown command '{}' (type 'help')",
            other
        ))),
    }
}

fn require_args(verb: &str, args: &[String]) -> Result<(), ConsoleError> {
    if args.is_empty() {
        return Err(ConsoleError::InvalidCommand(format!(
            "usage: {} <topic>...",
            verb
        )));
    }
    Ok(())
}
