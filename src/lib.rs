//! Fetch, cache and locate a prebuilt Graphviz `dot`
//!
//! The first call downloads the platform's archive, unpacks it under a
//! per-user cache directory and records the install with a marker file.
//! Later calls find the cached executable without touching the network.
//!
//! # Layout
//!
//! ```text
//! <base>/
//!   lock.file                  cross-process install lock
//!   bin/<platform>/            extracted tree (win32, linux)
//!   bin/<platform>/installed.crumb
//! ```
//!
//! # Example
//!
//! ```no_run
//! use static_graphviz::{Config, Resolver};
//!
//! let resolution = Resolver::new(Config::from_env()).resolve()?;
//! let status = resolution.command()?.args(["-Tsvg", "graph.dot"]).status();
//! # Ok::<(), static_graphviz::Error>(())
//! ```
//!
//! The process environment is never modified. [`Resolution::env`] and
//! [`PathUpdate::env`] describe the `PATH`/`LD_LIBRARY_PATH` prepends for the
//! caller to apply.

pub mod acquire;
pub mod core;
pub mod error;
pub mod install;
pub mod internal;
pub mod paths;
pub mod resolver;

pub use core::config::Config;
pub use core::platform::Platform;
pub use error::{Error, Result};
pub use paths::{EnvDelta, PathInjector, PathUpdate};
pub use resolver::{Resolution, Resolver};
