//! Install stage: unpacking archives and tracking completed installs.

pub mod archive;
pub mod deb;
pub mod discover;
pub mod extract;
pub mod marker;

pub use archive::install_from_archive;
pub use discover::find_executable;
pub use marker::{is_installed, mark_installed};
