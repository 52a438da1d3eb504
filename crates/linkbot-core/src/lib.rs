//! Core domain + application logic for the URL shortener bot.
//!
//! This crate is intentionally framework-agnostic. Telegram and the yon.ir
//! shortening API live behind ports (traits) implemented in adapter crates.

pub mod config;
pub mod domain;
pub mod errors;
pub mod events;
pub mod logging;
pub mod messaging;
pub mod ports;
pub mod router;
pub mod session;
pub mod validation;

pub use errors::{Error, Result};
