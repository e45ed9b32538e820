//! Effective playing time CLI library.
//!
//! This crate provides the `et` command-line interface over the event store.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands, EffectiveArgs, ImportArgs, PausesArgs, StatsArgs};
pub use config::Config;
