//! Terminal I/O for the interactive wizard.

pub mod cli;

pub use cli::{CliChannel, SessionEnd};
