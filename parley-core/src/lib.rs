//! Core types for parley
//!
//! This crate provides the conversation log, the response cache, the
//! session event bus, configuration and logging shared by the other
//! parley crates.

pub mod bus;
pub mod cache;
pub mod config;
pub mod error;
pub mod logging;
pub mod session;
pub mod utils;

pub use error::{Error, Result};
