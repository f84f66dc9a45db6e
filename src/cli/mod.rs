//! Command-line surface: argument parsing and file discovery paths.

pub mod args;
pub mod paths;

pub use args::{Cli, Commands};
