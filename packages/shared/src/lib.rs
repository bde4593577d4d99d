//! Shared utilities for the Rangeline server and console.

pub mod logger;
pub mod time;
