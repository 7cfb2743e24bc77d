//! CLI argument parsing for pdfbind.
//!
//! Two subcommands share one binary: `serve` runs the merge service and
//! `combine` plays the part of the upload page (scan, select, submit, save).
//!
//! # Examples
//!
//! ```no_run
//! use clap::Parser;
//! use pdfbind::cli::{Cli, Command};
//!
//! let cli = Cli::parse();
//! if let Command::Combine(args) = &cli.command {
//!     println!("Combining {} input(s)", args.inputs.len());
//! }
//! ```

use clap::{Args, Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::config::{
    ClientConfig, DEFAULT_BATCH_CAP, DEFAULT_LISTEN_ADDR, DEFAULT_MAX_UPLOAD_BYTES, ServerConfig,
};
use crate::error::{PdfBindError, Result};

/// Combine PDF files and folders into a single document.
#[derive(Parser, Debug)]
#[command(name = "pdfbind")]
#[command(version)]
#[command(about = "Combine PDF files and folders into a single document", long_about = None)]
#[command(author)]
pub struct Cli {
    /// Log filter (e.g. "info", "pdfbind=debug"); RUST_LOG takes precedence
    #[arg(long, global = true, env = "PDFBIND_LOG", value_name = "FILTER")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP merge service
    Serve(ServeArgs),

    /// Upload files and folders to a merge service and save the result
    ///
    /// Inputs are scanned in order; folders are walked depth-first and only
    /// PDF files are kept.
    ///
    /// Examples:
    ///   pdfbind combine chapter1.pdf appendix/ -n book
    ///   pdfbind combine 'scans/*.pdf' --remove 0 --dry-run
    Combine(CombineArgs),
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(short, long, env = "PDFBIND_ADDR", default_value = DEFAULT_LISTEN_ADDR)]
    pub addr: SocketAddr,

    /// Directory of static assets to serve at /
    #[arg(long, env = "PDFBIND_STATIC_DIR", value_name = "DIR")]
    pub static_dir: Option<PathBuf>,

    /// Maximum request body size in bytes
    #[arg(
        long,
        env = "PDFBIND_MAX_UPLOAD",
        value_name = "BYTES",
        default_value_t = DEFAULT_MAX_UPLOAD_BYTES
    )]
    pub max_upload: usize,

    /// Return the merged document without stream compression
    #[arg(long)]
    pub no_compress: bool,
}

#[derive(Args, Debug)]
pub struct CombineArgs {
    /// Files, folders or glob patterns, in order
    #[arg(required = true, value_name = "PATH")]
    pub inputs: Vec<String>,

    /// Name of the merged document (".pdf" is added if missing)
    #[arg(short, long, value_name = "NAME", default_value = "")]
    pub name: String,

    /// Directory the merged document is saved into
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Base URL of the merge service
    #[arg(short, long, env = "PDFBIND_SERVER", value_name = "URL")]
    pub server: Option<String>,

    /// Remove the selected file at INDEX before submitting (repeatable)
    ///
    /// Indices refer to the listing printed by --dry-run.
    #[arg(short, long, value_name = "INDEX")]
    pub remove: Vec<usize>,

    /// Scan and list the selection without uploading
    #[arg(long)]
    pub dry_run: bool,

    /// Entries requested per directory listing batch
    #[arg(long, value_name = "N", default_value_t = DEFAULT_BATCH_CAP)]
    pub batch_size: usize,

    /// Show detailed information about every file
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress all non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Cli {
    /// Log filter to install when none is given explicitly.
    pub fn log_filter(&self) -> String {
        if let Some(level) = &self.log_level {
            return level.clone();
        }
        match &self.command {
            Command::Serve(_) => "info".to_string(),
            Command::Combine(args) if args.verbose => "debug".to_string(),
            Command::Combine(_) => "warn".to_string(),
        }
    }
}

impl TryFrom<&ServeArgs> for ServerConfig {
    type Error = PdfBindError;

    fn try_from(args: &ServeArgs) -> Result<Self> {
        let config = ServerConfig {
            listen_addr: args.addr,
            static_dir: args.static_dir.clone(),
            max_upload_bytes: args.max_upload,
            compress: !args.no_compress,
        };
        config.validate()?;
        Ok(config)
    }
}

impl TryFrom<&CombineArgs> for ClientConfig {
    type Error = PdfBindError;

    fn try_from(args: &CombineArgs) -> Result<Self> {
        let defaults = ClientConfig::default();
        let config = ClientConfig {
            inputs: args.inputs.clone(),
            server_url: args.server.clone().unwrap_or(defaults.server_url),
            output_name: args.name.clone(),
            output_dir: args.output_dir.clone(),
            remove: args.remove.clone(),
            batch_cap: args.batch_size,
            success_reset: defaults.success_reset,
            dry_run: args.dry_run,
            verbose: args.verbose,
            quiet: args.quiet,
        };
        config.validate()?;
        Ok(config)
    }
}
