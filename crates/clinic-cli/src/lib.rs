//! # clinic-cli
//!
//! The `clinic` binary: runs the API and handles the administrative chores
//! around it.
//!
//! - `serve [--memory] [--no-migrate]`: run the HTTP API
//! - `migrate`: apply database migrations
//! - `seed-admin`: create the configured admin account
//! - `config {path,get,set,init,export}`: inspect and edit configuration

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod cli;
pub mod commands;
pub mod config_handlers;
pub mod logging;

pub use cli::{Cli, Command, ConfigAction};
