//! pdfbind: combine dropped PDF files and folders into a single document.
//!
//! The crate has a client half and a server half:
//!
//! - [`scan`] walks files and folders in drop order and hands out leaf files
//! - [`selection`] keeps the ordered list of admitted PDFs
//! - [`transport`] freezes the selection into a multipart upload
//! - [`merge`] composes the uploaded documents page by page
//! - [`server`] exposes the merge over HTTP
//!
//! The `pdfbind` binary wires both halves to a command line.

pub mod cli;
pub mod config;
mod error;
pub use error::*;
pub mod io;
pub mod logging;
pub mod merge;
pub mod ops;
pub mod output;
pub mod scan;
pub mod selection;
pub mod server;
pub mod transport;
pub(crate) mod utils;

#[cfg(test)]
mod test_support;

use crate::cli::{Cli, Command};
use crate::config::{ClientConfig, ServerConfig};
use crate::output::OutputFormatter;

/// Run the command described by `cli`.
pub async fn run(cli: Cli) -> Result<()> {
    match &cli.command {
        Command::Serve(args) => {
            let config = ServerConfig::try_from(args)?;
            server::serve(config).await
        }
        Command::Combine(args) => {
            let config = ClientConfig::try_from(args)?;
            let out = OutputFormatter::from_config(&config);
            ops::combine(&config, &out).await.map(|_| ())
        }
    }
}
