//! `rateq check` command - Compliance report for a package

use miette::Result;

use crate::cli::helpers::discover_project;
use crate::cli::output::{print_compliance, print_delimited, print_structured};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::loader::load_file;
use crate::core::Config;
use crate::rates::{ComplianceRules, ComplianceStatus, Package};

#[derive(clap::Args, Debug)]
pub struct CheckArgs {
    /// Length in inches
    #[arg(long, short = 'L')]
    pub length: f64,

    /// Width in inches
    #[arg(long, short = 'W')]
    pub width: f64,

    /// Height in inches
    #[arg(long, short = 'H')]
    pub height: f64,

    /// Actual weight in pounds
    #[arg(long)]
    pub weight: f64,
}

pub fn run(args: CheckArgs, global: &GlobalOpts) -> Result<()> {
    let project = discover_project(global)?;
    let config = Config::load_for(Some(&project));

    let pkg = Package::new(args.length, args.width, args.height, args.weight);
    if let Some((field, value)) = pkg.invalid_field() {
        return Err(miette::miette!("invalid {}: {}", field, value));
    }

    let rules: ComplianceRules = load_file(&project, &project.compliance_path())?;
    let report = rules.evaluate(&pkg);

    let format = global.format.resolve(config.default_format.as_deref());
    match format {
        OutputFormat::Auto => print_compliance(&report, &pkg),
        OutputFormat::Csv | OutputFormat::Tsv => {
            let rows: Vec<Vec<String>> = report
                .statuses
                .iter()
                .map(|(family, status)| {
                    let reasons = match status {
                        ComplianceStatus::Ok => String::new(),
                        ComplianceStatus::Failed { reasons } => reasons.join("; "),
                    };
                    let label = if status.is_failed() { "failed" } else { "ok" };
                    vec![family.clone(), label.to_string(), reasons]
                })
                .collect();
            print_delimited(&["family", "status", "reasons"], &rows, format);
        }
        OutputFormat::Json | OutputFormat::Yaml => print_structured(&report, format)?,
    }

    Ok(())
}
