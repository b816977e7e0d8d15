//! Common test utilities: archive fixtures and a mock download server.

#![allow(dead_code)]

mod fixtures;

pub use fixtures::*;
