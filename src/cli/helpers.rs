//! Shared helper functions for CLI commands

use miette::Result;

use crate::cli::GlobalOpts;
use crate::core::Project;

/// Locate the project from `--project` or by walking up from the current directory
pub fn discover_project(global: &GlobalOpts) -> Result<Project> {
    let project = match &global.project {
        Some(path) => Project::discover_from(path),
        None => Project::discover(),
    };
    project.map_err(|e| miette::miette!("{}", e))
}

/// Format a dollar amount with two decimals
pub fn format_money(amount: f64) -> String {
    format!("${:.2}", amount)
}

/// Format a weight with a fixed number of decimals
pub fn format_weight(weight: f64, decimals: usize) -> String {
    format!("{:.*} lb", decimals, weight)
}

/// Truncate a string to max_len characters, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Escape a string for CSV output
///
/// Handles commas, quotes, and newlines according to RFC 4180.
pub fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Replace characters that would break a TSV row
pub fn escape_tsv(s: &str) -> String {
    s.replace(['\t', '\n'], " ")
}
