//! Command-line front end for the wardline engine
//!
//! Reads reference data and patients from a directory of JSON files, runs
//! one command against a fresh [`Engine`](wardline_engine::Engine) and prints
//! JSON to stdout. Logs go to stderr.

pub mod cli;
pub mod commands;
pub mod config;
pub mod exposition;
pub mod logging;
pub mod scenario;
pub mod store;

pub use cli::{Cli, Command};
