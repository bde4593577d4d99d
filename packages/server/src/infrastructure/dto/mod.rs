//! Data Transfer Objects (DTOs) for the HTTP control API.
//!
//! WebSocket frames use the domain `ClientMessage` / `ServerMessage` directly.

pub mod conversion;
pub mod http;
