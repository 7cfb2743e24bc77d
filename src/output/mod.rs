//! Console output for the CLI.

pub mod formatter;

pub use formatter::{MessageLevel, OutputFormatter};
