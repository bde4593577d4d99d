//! Operator console for the Rangeline broadcast hub.

pub mod command;
pub mod domain;
pub mod error;
pub mod formatter;
pub mod runner;
pub mod session;
pub mod ui;

pub use domain::ConsoleOptions;
pub use error::ConsoleError;
pub use runner::run_console;
