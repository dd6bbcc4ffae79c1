//! CLI subcommand implementations.

pub mod pokemon;
pub mod seed;
pub mod serve;
pub mod stats;
