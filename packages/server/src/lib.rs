//! Rangeline live shot pipeline.
//!
//! Decodes infrared target-grid sensor lines, routes each hit to every active
//! live-grid training session, relays shots and session events to WebSocket
//! clients, and scores shot groups against a ring model.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
