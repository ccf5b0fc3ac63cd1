//! Core module - project discovery, configuration and rate book loading

pub mod config;
pub mod loader;
pub mod project;

pub use config::Config;
pub use loader::LoadError;
pub use project::{Project, ProjectError};
