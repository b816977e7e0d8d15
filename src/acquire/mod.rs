//! Acquire stage: getting the archive onto local disk.

pub mod download;

pub use download::download;
