//! Task folder catalog library
//!
//! Discovers dated task folders on disk and keeps task, label and folder
//! metadata in a SQLite store.

pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod format;
pub mod scanner;
pub mod types;
