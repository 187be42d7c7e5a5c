//! Core domain + workflow for the Drive Video Bot.
//!
//! This crate is intentionally framework-agnostic. Telegram / Google Drive /
//! SQLite live behind ports (traits) implemented in adapter crates.

pub mod config;
pub mod domain;
pub mod errors;
pub mod logging;
pub mod messages;
pub mod ports;
pub mod workflow;

pub use errors::{Error, Result};
