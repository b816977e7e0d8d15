//! Internal utility modules shared by the fetch and install stages.

pub mod fs_utils;
pub mod progress;
