//! HTTP / WebSocket surface.

mod error;
mod handler;
mod server;
mod signal;
pub mod state;

pub use error::ApiError;
pub use server::{Server, router};
pub use signal::shutdown_signal;
pub use state::AppState;
