//! CLI subcommand implementations.

pub mod effective;
pub mod import;
pub mod pauses;
pub mod stats;
mod util;

#[cfg(test)]
mod fixtures;
