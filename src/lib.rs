//! rateq: shipping rate quotes from a plain-text rate book
//!
//! Warehouses, carrier channels, zone tables and per-tier rate sheets live
//! in YAML files; the quote engine prices a package on every channel and
//! explains every channel it had to exclude.

pub mod cli;
pub mod core;
pub mod rates;
pub mod yaml;
