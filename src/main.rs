//! Task folders CLI
//!
//! Scans task folder roots and manages the task catalog.

use anyhow::{Result, bail};
use clap::Parser;
use std::fs::OpenOptions;
use std::path::PathBuf;
use task_folders::cli::import::import_descriptors;
use task_folders::cli::{Cli, Command, LabelsArgs, TasksArgs, resolve_roots};
use task_folders::cli::scan::ScanArgs;
use task_folders::config::Config;
use task_folders::db::{self, Database};
use task_folders::format::{self, OutputFormat};
use task_folders::scanner;
use task_folders::types::TaskFolderDescriptor;
use tracing::{Level, warn};
use tracing_subscriber::FmtSubscriber;

fn init_logging(cli: &Cli) -> Result<()> {
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    match cli.log.as_str() {
        "0" | "off" => {
            // No logging
        }
        "1" | "stdout" => {
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(std::io::stdout)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        "2" | "stderr" => {
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(std::io::stderr)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        filename => {
            // Log to file (append mode)
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(filename)?;
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(file)
                .with_ansi(false)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }
    Ok(())
}

fn open_store(config: &Config) -> Result<Database> {
    config.ensure_db_dir()?;
    Ok(db::shared(&config.store.db_path)?)
}

fn scan_roots(roots: &[PathBuf], skip_unreadable: bool) -> Result<Vec<TaskFolderDescriptor>> {
    if roots.is_empty() {
        bail!("no roots given and none configured (scan.roots or TASK_FOLDERS_ROOTS)");
    }
    if !skip_unreadable {
        return Ok(scanner::scan_all(roots)?);
    }

    let mut found = Vec::new();
    for root in roots {
        match scanner::scan_root(root) {
            Ok(mut descs) => found.append(&mut descs),
            Err(e) => warn!(root = %root.display(), error = %e, "Skipping root"),
        }
    }
    Ok(found)
}

fn emit<T: serde::Serialize + ?Sized>(
    output: OutputFormat,
    value: &T,
    markdown: impl FnOnce() -> String,
) -> Result<()> {
    match output {
        OutputFormat::Json => println!("{}", format::to_json(value)?),
        OutputFormat::Markdown => print!("{}", markdown()),
    }
    Ok(())
}

fn run_scan(config: &Config, args: &ScanArgs) -> Result<()> {
    let roots = resolve_roots(&args.roots, &config.scan.roots);
    let descriptors = scan_roots(&roots, args.skip_unreadable)?;
    emit(args.format, &descriptors, || {
        format::format_descriptors_markdown(&descriptors)
    })
}

fn run_tasks(db: &Database, args: &TasksArgs) -> Result<()> {
    let tasks = match (&args.label, args.label_id) {
        (Some(name), _) => db.tasks_by_label_name(name)?,
        (None, Some(id)) => db.tasks_by_label_id(id)?,
        (None, None) => db.list_tasks()?,
    };
    emit(args.format, &tasks, || format::format_tasks_markdown(&tasks))
}

fn run_labels(db: &Database, args: &LabelsArgs) -> Result<()> {
    let labels = db.list_labels()?;
    emit(args.format, &labels, || format::format_labels_markdown(&labels))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    let mut config = Config::load_or_default(cli.config.as_deref())?;
    if let Some(db_path) = &cli.database {
        config.store.db_path = db_path.clone();
    }

    match &cli.command {
        Command::Scan(args) => run_scan(&config, args)?,
        Command::Import(args) => {
            let roots = resolve_roots(&args.roots, &config.scan.roots);
            let descriptors = scan_roots(&roots, false)?;
            let db = open_store(&config)?;
            let result = import_descriptors(&db, &descriptors, args.dry_run)?;
            if args.dry_run {
                println!(
                    "Would import {} task(s), {} already stored",
                    result.would_create, result.skipped
                );
            } else {
                println!(
                    "Imported {} task(s), {} already stored",
                    result.created.len(),
                    result.skipped
                );
            }
        }
        Command::Tasks(args) => {
            let db = open_store(&config)?;
            run_tasks(&db, args)?;
        }
        Command::Labels(args) => {
            let db = open_store(&config)?;
            run_labels(&db, args)?;
        }
    }

    Ok(())
}
