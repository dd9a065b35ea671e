//! Core domain + application logic for the channel management service.
//!
//! This crate is intentionally framework-agnostic. Discord and the inbound HTTP
//! surface live behind ports (traits) implemented in adapter crates.

pub mod cleanup;
pub mod config;
pub mod domain;
pub mod errors;
pub mod logging;
pub mod permissions;
pub mod platform;
pub mod service;

#[cfg(test)]
pub(crate) mod testing;

pub use errors::{Error, Result};
