//! CLI command implementations

pub mod check;
pub mod completions;
pub mod config;
pub mod import;
pub mod init;
pub mod quote;
pub mod status;
pub mod validate;
pub mod zip;
