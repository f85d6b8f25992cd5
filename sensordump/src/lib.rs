//! Sensordump CLI library target.
//!
//! The binary entry point is in `main.rs`; the modules live here so
//! `tests/*.rs` can drive argument parsing and the subcommands directly.

pub mod cli;
pub mod commands;
pub mod util;
