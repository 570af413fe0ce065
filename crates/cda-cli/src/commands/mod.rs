//! CLI command modules

pub mod config;
pub mod select;
pub mod simulate;
