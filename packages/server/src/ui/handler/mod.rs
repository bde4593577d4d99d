mod http;
mod websocket;

pub use http::{
    get_session, get_statistics, health_check, list_clients, list_sessions, record_shot,
    start_session, stop_session,
};
pub use websocket::websocket_handler;
