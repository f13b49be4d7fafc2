//! Scan subcommand for task-folders CLI

use crate::format::OutputFormat;
use clap::Args;
use std::path::PathBuf;

/// Arguments for the scan subcommand
#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Root directories to scan (defaults to the configured roots)
    #[arg(value_name = "ROOT")]
    pub roots: Vec<PathBuf>,

    /// Skip roots that cannot be read instead of failing
    #[arg(long)]
    pub skip_unreadable: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Markdown)]
    pub format: OutputFormat,
}
