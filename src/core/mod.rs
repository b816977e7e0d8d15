//! Core infrastructure: configuration, platform table, locking and output.

pub mod config;
pub mod lock;
pub mod output;
pub mod platform;
