//! gott CLI library.
//!
//! Argument definitions, configuration and command implementations for the
//! `gott` binary.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands, TrackArgs};
pub use config::Config;
