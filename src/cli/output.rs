//! Rendering of quote outcomes and reports
//!
//! `auto` prints styled tables for a terminal; yaml/json emit the full
//! structure; csv/tsv emit one row per channel for spreadsheets and pipes.

use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::{escape_csv, escape_tsv, format_money, format_weight};
use crate::cli::OutputFormat;
use crate::rates::{
    ChannelResult, ComplianceReport, ComplianceStatus, Package, PriceTable, QuoteLineItem,
    QuoteOutcome,
};

/// Print a value as YAML or JSON
pub fn print_structured<T: Serialize>(value: &T, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(value).into_diagnostic()?);
        }
        _ => print!("{}", serde_yml::to_string(value).into_diagnostic()?),
    }
    Ok(())
}

/// Print delimited rows with a header
pub fn print_delimited(header: &[&str], rows: &[Vec<String>], format: OutputFormat) {
    let (sep, escape): (&str, fn(&str) -> String) = match format {
        OutputFormat::Tsv => ("\t", escape_tsv),
        _ => (",", escape_csv),
    };
    println!("{}", header.join(sep));
    for row in rows {
        let cells: Vec<String> = row.iter().map(|c| escape(c)).collect();
        println!("{}", cells.join(sep));
    }
}

fn channel_label(item: &QuoteLineItem) -> String {
    let mut label = item.channel.clone();
    if item.price_table != PriceTable::Shared {
        label.push_str(&format!(" [{}]", item.price_table));
    }
    if let Some(service) = &item.service {
        label.push('\n');
        label.push_str(&service.label);
    }
    label
}

fn surcharge_details(item: &QuoteLineItem) -> String {
    if item.surcharges.is_empty() {
        return "-".to_string();
    }
    item.surcharges
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render a quote outcome in the requested format
pub fn print_quote(
    outcome: &QuoteOutcome,
    pkg: &Package,
    show_excluded: bool,
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Json | OutputFormat::Yaml => print_structured(outcome, format),
        OutputFormat::Csv | OutputFormat::Tsv => {
            print_quote_rows(outcome, show_excluded, format);
            Ok(())
        }
        OutputFormat::Auto => {
            print_quote_table(outcome, pkg, show_excluded);
            Ok(())
        }
    }
}

fn print_quote_rows(outcome: &QuoteOutcome, show_excluded: bool, format: OutputFormat) {
    print_delimited(&QUOTE_HEADER, &quote_rows(outcome, show_excluded), format);
}

const QUOTE_HEADER: [&str; 8] = [
    "channel",
    "outcome",
    "zone",
    "billable_weight",
    "base",
    "surcharges",
    "total",
    "reason",
];

/// One row per priced channel, excluded channels on request, and a
/// `no_quotes` row carrying the causes when nothing was priced
fn quote_rows(outcome: &QuoteOutcome, show_excluded: bool) -> Vec<Vec<String>> {
    let mut rows: Vec<Vec<String>> = outcome
        .channels
        .iter()
        .filter_map(|result| match result {
            ChannelResult::Priced(item) => Some(vec![
                item.channel.clone(),
                "priced".to_string(),
                item.zone.to_string(),
                format!("{:.*}", item.weight_decimals, item.billable_weight),
                format!("{:.2}", item.base_price),
                format!("{:.2}", item.surcharge_total),
                format!("{:.2}", item.total),
                String::new(),
            ]),
            ChannelResult::Excluded(ex) if show_excluded => Some(vec![
                ex.channel.clone(),
                "excluded".to_string(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
                ex.reason.to_string(),
            ]),
            ChannelResult::Excluded(_) => None,
        })
        .collect();

    if let Some(empty) = &outcome.no_quotes {
        let causes: Vec<String> = empty.causes.iter().map(|c| c.to_string()).collect();
        let mut row = vec![String::new(), "no_quotes".to_string()];
        row.extend(std::iter::repeat(String::new()).take(5));
        row.push(causes.join("; "));
        rows.push(row);
    }
    rows
}

fn print_quote_table(outcome: &QuoteOutcome, pkg: &Package, show_excluded: bool) {
    println!(
        "{} {}×{}×{} in | actual {} lb | dim {:.2} lb | tier {} | {} | fuel {:.2}%",
        style("Package:").bold(),
        pkg.length,
        pkg.width,
        pkg.height,
        pkg.weight,
        outcome.dim_weight,
        style(&outcome.tier).cyan(),
        outcome.address,
        outcome.fuel_rate
    );
    for note in &outcome.compliance.notes {
        println!("{} {}", style("!").yellow(), style(note).yellow());
    }
    println!();

    if let Some(empty) = &outcome.no_quotes {
        println!("{}", style("No quotes available").red().bold());
        println!("Likely causes:");
        for cause in &empty.causes {
            println!("  {} {}", style("•").dim(), cause);
        }
        if !empty.exclusions.is_empty() {
            println!();
            for ex in &empty.exclusions {
                println!("  {} {}: {}", style("✗").red(), ex.channel, style(&ex.reason).dim());
            }
        }
        return;
    }

    let mut builder = Builder::default();
    builder.push_record(["Channel", "Zone", "Billable", "Base", "Surcharges", "Total"]);
    for item in outcome.priced() {
        builder.push_record([
            channel_label(item),
            format!("Z{}", item.zone),
            format_weight(item.billable_weight, item.weight_decimals),
            format_money(item.base_price),
            surcharge_details(item),
            format_money(item.total),
        ]);
    }
    println!("{}", builder.build().with(Style::rounded()));

    let excluded = outcome.excluded();
    if show_excluded && !excluded.is_empty() {
        println!();
        println!("{}", style("Excluded channels").bold());
        for ex in excluded {
            println!("  {} {}: {}", style("✗").red(), ex.channel, style(&ex.reason).dim());
        }
    }
}

/// Render a compliance report as a table
pub fn print_compliance(report: &ComplianceReport, pkg: &Package) {
    println!(
        "{} longest {} in | girth {} in | actual {} lb | dim {:.2} lb",
        style("Package:").bold(),
        pkg.longest(),
        pkg.girth(),
        pkg.weight,
        pkg.dim_weight()
    );
    println!();

    let mut builder = Builder::default();
    builder.push_record(["Family", "Status", "Reasons"]);
    for (family, status) in &report.statuses {
        let (label, reasons) = match status {
            ComplianceStatus::Ok => (style("ok").green().to_string(), String::new()),
            ComplianceStatus::Failed { reasons } => {
                (style("failed").red().to_string(), reasons.join("\n"))
            }
        };
        builder.push_record([family.clone(), label, reasons]);
    }
    println!("{}", builder.build().with(Style::rounded()));

    for note in &report.notes {
        println!("{} {}", style("!").yellow(), style(note).yellow());
    }
}
