//! `rateq validate` command - Check rate book files and their consistency

use console::style;
use miette::Result;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::path::Path;

use crate::cli::helpers::discover_project;
use crate::cli::GlobalOpts;
use crate::core::loader::{load_file, LoadError};
use crate::core::Project;
use crate::rates::{ChannelConfig, ComplianceRules, RateBook, RateSheet, Warehouse, ZoneTables};

#[derive(clap::Args, Debug)]
pub struct ValidateArgs {
    /// Strict mode - warnings become errors
    #[arg(long)]
    pub strict: bool,

    /// Show summary only, don't show individual results
    #[arg(long)]
    pub summary: bool,
}

#[derive(Default)]
struct ValidationStats {
    files_checked: usize,
    files_failed: usize,
    issues: usize,
    warnings: usize,
}

/// Gaps that do not corrupt quotes but leave a channel unpriceable
pub fn coverage_warnings(book: &RateBook) -> Vec<String> {
    let mut warnings = Vec::new();
    for tier in book.tiers() {
        for ch in &book.channels {
            match book.rates.sheet(tier, &ch.name) {
                None => warnings.push(format!("{}: no rate sheet for {}", tier, ch.name)),
                Some(sheet) => {
                    if sheet.prices.is_none()
                        && !sheet.has_split()
                        && (sheet.prices_residential.is_some() || sheet.prices_commercial.is_some())
                    {
                        warnings.push(format!(
                            "{}/{}: only one side of a residential/commercial split",
                            tier, ch.name
                        ));
                    }
                }
            }
        }
    }
    warnings
}

pub fn run(args: ValidateArgs, global: &GlobalOpts) -> Result<()> {
    let project = discover_project(global)?;
    let mut stats = ValidationStats::default();
    let show = !args.summary && !global.quiet;

    if show {
        println!("{} Validating rate book...\n", style("→").blue());
    }

    check_file::<BTreeMap<String, Warehouse>>(&project, &project.warehouses_path(), &mut stats, show);
    check_file::<Vec<ChannelConfig>>(&project, &project.channels_path(), &mut stats, show);
    check_file::<ComplianceRules>(&project, &project.compliance_path(), &mut stats, show);
    check_file::<ZoneTables>(&project, &project.zones_path(), &mut stats, show);
    for path in project.iter_rate_files() {
        check_file::<BTreeMap<String, RateSheet>>(&project, &path, &mut stats, show);
    }

    if stats.files_failed == 0 {
        let book = RateBook::load(&project)?;

        let issues = book.check_integrity();
        stats.issues = issues.len();
        if show {
            for issue in &issues {
                println!("{} {}", style("✗").red(), issue);
            }
        }

        let warnings = coverage_warnings(&book);
        stats.warnings = warnings.len();
        if show {
            for warning in &warnings {
                println!("{} {}", style("!").yellow(), warning);
            }
        }
    }

    println!();
    println!("{}", style("─".repeat(60)).dim());
    println!(
        "{}",
        style(format!(
            "Checked {} file(s): {} failed, {} integrity issue(s), {} warning(s)",
            stats.files_checked, stats.files_failed, stats.issues, stats.warnings
        ))
        .bold()
    );

    let failed = stats.files_failed > 0 || stats.issues > 0 || (args.strict && stats.warnings > 0);
    if failed {
        Err(miette::miette!("rate book validation failed"))
    } else {
        println!("{} Rate book is consistent", style("✓").green());
        Ok(())
    }
}

fn check_file<T: DeserializeOwned + 'static>(
    project: &Project,
    path: &Path,
    stats: &mut ValidationStats,
    show: bool,
) {
    stats.files_checked += 1;
    match load_file::<T>(project, path) {
        Ok(_) => {
            if show {
                println!("{} {}", style("✓").green(), project.relative(path));
            }
        }
        Err(err) => {
            stats.files_failed += 1;
            if show {
                println!("{} {}", style("✗").red(), project.relative(path));
                if matches!(err, LoadError::Yaml(_)) {
                    eprintln!("{:?}", miette::Report::new(err));
                } else {
                    println!("    {}", style(err).red());
                }
            }
        }
    }
}
