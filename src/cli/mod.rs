//! CLI command definitions for task-folders
//!
//! This module defines the CLI structure using clap's derive macros.
//! The main entry point is the `Cli` struct which contains subcommands.

pub mod import;
pub mod scan;

use crate::format::OutputFormat;
use clap::{Args, Parser, Subcommand};
use import::ImportArgs;
use scan::ScanArgs;
use std::path::PathBuf;

/// Task folder catalog
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to database file (overrides config)
    #[arg(short, long, global = true)]
    pub database: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List task folders under the given roots (or the configured roots)
    Scan(ScanArgs),

    /// Record scanned task folders in the database
    Import(ImportArgs),

    /// List tasks, optionally filtered by label
    Tasks(TasksArgs),

    /// List labels
    Labels(LabelsArgs),
}

/// Arguments for the tasks subcommand
#[derive(Args, Debug)]
pub struct TasksArgs {
    /// Only tasks with a label of this exact name
    #[arg(long, conflicts_with = "label_id")]
    pub label: Option<String>,

    /// Only tasks with this label id
    #[arg(long)]
    pub label_id: Option<i64>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Markdown)]
    pub format: OutputFormat,
}

/// Arguments for the labels subcommand
#[derive(Args, Debug)]
pub struct LabelsArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Markdown)]
    pub format: OutputFormat,
}

/// Roots given on the command line win over configured roots.
pub fn resolve_roots(cli_roots: &[PathBuf], configured: &[PathBuf]) -> Vec<PathBuf> {
    if cli_roots.is_empty() {
        configured.to_vec()
    } else {
        cli_roots.to_vec()
    }
}
