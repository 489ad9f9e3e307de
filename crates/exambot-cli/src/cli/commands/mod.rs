//! CLI command handlers.

pub mod config;
pub mod invoke;
pub mod serve;
pub mod webhook;
