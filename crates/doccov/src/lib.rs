//! Library surface of the `doccov` command: argument parsing, configuration
//! loading and report rendering. The analysis itself lives in `doccov-core`.

pub mod cli;
pub mod config;
pub mod output;
