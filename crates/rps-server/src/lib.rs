//! rps-server
//!
//! Multi-client async TCP server running timed rock-paper-scissors
//! rounds.

pub mod config;
pub mod error;
pub mod types;
pub mod server;

// these are internal modules, not re-exported
mod session;
mod round_task;
mod round_clock;
