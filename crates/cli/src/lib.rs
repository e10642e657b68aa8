//! Library side of the `aa` binary, split out so integration tests and the
//! binary share one command implementation.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod output;
pub mod store;
pub mod styles;
