//! One WebSocket connection to the broadcast hub.

use futures_util::{Sink, SinkExt, StreamExt};
use rangeline_server::domain::{ClientMessage, ServerMessage};
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};

use crate::{
    command::{Command, HELP, parse_command},
    domain::{ConsoleOptions, initial_messages},
    error::ConsoleError,
    formatter::MessageFormatter,
    ui::redisplay_prompt,
};

/// Run one console session until the operator quits or the hub goes away.
///
/// `input_rx` carries operator lines; it outlives the session so a
/// reconnect keeps the same readline thread.
///
/// # Errors
///
/// Returns `ConsoleError::Connection` if the hub cannot be reached or the
/// connection drops.
pub async fn run_console_session(
    options: &ConsoleOptions,
    input_rx: &mut mpsc::UnboundedReceiver<String>,
) -> Result<(), ConsoleError> {
    let (ws_stream, _) = connect_async(options.url.as_str())
        .await
        .map_err(|e| ConsoleError::Connection(e.to_string()))?;

    tracing::info!("Connected to {}", options.url);
    println!("\nType 'help' for commands. Press Ctrl+C to exit.\n");

    let (mut write, mut read) = ws_stream.split();

    for msg in initial_messages(options) {
        send(&mut write, &msg).await?;
    }

    // Spawn a task to print hub messages
    let mut read_task = tokio::spawn(async move {
        while let Some(message) = read.next().await {
            match message {
                Ok(Message::Text(text)) => {
                    match serde_json::from_str::<ServerMessage>(&text) {
                        Ok(msg) => print!("{}", MessageFormatter::format(&msg)),
                        Err(_) => print!("\n? {}\n", text.as_str()),
                    }
                    redisplay_prompt();
                }
                Ok(Message::Close(_)) => {
                    tracing::info!("Hub closed the connection");
                    break;
                }
                Err(e) => {
                    tracing::warn!("WebSocket read error: {}", e);
                    break;
                }
                _ => {}
            }
        }
    });

    loop {
        tokio::select! {
            _ = &mut read_task => {
                return Err(ConsoleError::Connection("Connection lost".to_string()));
            }
            line = input_rx.recv() => {
                // Readline thread ended (Ctrl+C / Ctrl+D)
                let Some(line) = line else {
                    read_task.abort();
                    write.send(Message::Close(None)).await.ok();
                    return Ok(());
                };

                match parse_command(&line) {
                    Ok(Command::Send(msg)) => {
                        if let Err(e) = send(&mut write, &msg).await {
                            read_task.abort();
                            return Err(e);
                        }
                    }
                    Ok(Command::Help) => {
                        print!("\n{}", HELP);
                        redisplay_prompt();
                    }
                    Ok(Command::Quit) => {
                        read_task.abort();
                        write.send(Message::Close(None)).await.ok();
                        return Ok(());
                    }
                    Err(e) => {
                        println!("\n{}", e);
                        redisplay_prompt();
                    }
                }
            }
        }
    }
}

async fn send<S>(write: &mut S, msg: &ClientMessage) -> Result<(), ConsoleError>
where
    S: Sink<Message> + Unpin,
    S::Error: std::fmt::Display,
{
    let json = serde_json::to_string(msg).map_err(|e| ConsoleError::Connection(e.to_string()))?;
    write
        .send(Message::Text(json.into()))
        .await
        .map_err(|e| ConsoleError::Connection(e.to_string()))
}
