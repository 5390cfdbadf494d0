// relaychat/src/lib.rs
//! # relaychat CLI Application
//!
//! This crate provides the terminal front end for `relaychat-core`. Every
//! subcommand builds an in-memory roster from its arguments, runs the core
//! component it exercises, and prints the rendered result.

pub mod cli;
pub mod commands;
pub mod logger;
pub mod ui;

pub use commands::dispatch;
