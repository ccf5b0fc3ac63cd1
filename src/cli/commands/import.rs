//! `rateq import` command - Import carrier rate cards from CSV
//!
//! Carrier rate cards exported to CSV rarely start at the first line, so the
//! header row is located by content: it must hold a weight column (label
//! containing "weight" or "重量" and a unit, lb or oz) and one or more
//! "Zone N" columns.

use chrono::Utc;
use clap::{Subcommand, ValueEnum};
use console::style;
use csv::ReaderBuilder;
use miette::{IntoDiagnostic, Result};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

use crate::cli::helpers::discover_project;
use crate::cli::GlobalOpts;
use crate::core::loader::load_file;
use crate::rates::{ChannelConfig, RateRow, RateSheet, Zone};

/// Rows scanned when looking for the header
const HEADER_SCAN_ROWS: usize = 200;

const OUNCES_PER_POUND: f64 = 16.0;
const KG_PER_POUND: f64 = 0.453592;

#[derive(Subcommand, Debug)]
pub enum ImportCommands {
    /// Import a CSV rate card into a tier file
    Rates(ImportRatesArgs),
}

#[derive(clap::Args, Debug)]
pub struct ImportRatesArgs {
    /// CSV file to import
    pub file: PathBuf,

    /// Pricing tier to write (rates/<TIER>.yaml)
    #[arg(long, short = 't')]
    pub tier: String,

    /// Channel name from channels.yaml
    #[arg(long, short = 'c')]
    pub channel: String,

    /// Store as the residential or commercial list of a split sheet
    #[arg(long, value_enum)]
    pub split: Option<SplitSide>,

    /// Sheet fuel rate, as a fraction (0.16) or a percentage (16)
    #[arg(long)]
    pub fuel_rate: Option<f64>,

    /// Parse and report without writing
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SplitSide {
    Residential,
    Commercial,
}

#[derive(Debug, Error)]
pub enum RateImportError {
    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),

    #[error("no header row found (need a weight column with lb/oz and 'Zone N' columns)")]
    HeaderNotFound,

    #[error("fuel rate {0} is out of range (expected 0-1 or 0-100)")]
    FuelRate(f64),
}

/// Rows parsed from a rate card
#[derive(Debug, Default)]
pub struct ParsedRates {
    pub rows: Vec<RateRow>,

    /// Data rows ignored for lacking a weight or any positive price
    pub skipped: usize,
}

struct Header {
    row: usize,
    weight_col: usize,
    service_col: Option<usize>,
    zones: Vec<(Zone, usize)>,
}

/// Zone number from a "Zone 2" / "zone-02" style label
fn zone_label(cell: &str) -> Option<Zone> {
    let lower = cell.to_lowercase();
    let rest = &lower[lower.find("zone")? + 4..];
    let digits: String = rest
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok().map(Zone)
}

fn is_weight_label(cell: &str) -> bool {
    let lower = cell.to_lowercase();
    (lower.contains("weight") || lower.contains("重量")) && (lower.contains("lb") || lower.contains("oz"))
}

fn find_header(records: &[csv::StringRecord]) -> Option<Header> {
    records.iter().take(HEADER_SCAN_ROWS).enumerate().find_map(|(row, rec)| {
        let weight_col = rec.iter().position(is_weight_label)?;
        let zones: Vec<(Zone, usize)> = rec
            .iter()
            .enumerate()
            .filter_map(|(col, cell)| zone_label(cell).map(|z| (z, col)))
            .collect();
        if zones.is_empty() {
            return None;
        }
        let service_col = rec
            .iter()
            .position(|cell| cell.to_lowercase().contains("service"));
        Some(Header {
            row,
            weight_col,
            service_col,
            zones,
        })
    })
}

/// Every run of digits and dots that parses as a number
fn numbers_in(cell: &str) -> Vec<f64> {
    cell.split(|c: char| !(c.is_ascii_digit() || c == '.'))
        .filter_map(|s| s.parse::<f64>().ok())
        .collect()
}

/// Weight in pounds from a cell such as "8 oz", "1.5 lb", "2kg" or "101-150"
fn parse_weight(cell: &str, take_last: bool) -> Option<f64> {
    let nums = numbers_in(cell);
    let value = if take_last { nums.last() } else { nums.first() }.copied()?;
    let lower = cell.to_lowercase();
    let pounds = if lower.contains("oz") {
        value / OUNCES_PER_POUND
    } else if lower.contains("kg") {
        value / KG_PER_POUND
    } else {
        value
    };
    (pounds > 0.0).then_some(pounds)
}

/// Price from a cell, ignoring `$` and thousands separators; unparseable is 0
fn parse_price(cell: &str) -> f64 {
    cell.replace(['$', ','], "").trim().parse().unwrap_or(0.0)
}

/// Accept 0.16 or 16 for a 16% fuel rate; returns the fraction
pub fn normalize_fuel_rate(value: f64) -> Result<f64, RateImportError> {
    if !value.is_finite() || !(0.0..=100.0).contains(&value) {
        return Err(RateImportError::FuelRate(value));
    }
    Ok(if value > 1.0 { value / 100.0 } else { value })
}

/// Parse a CSV rate card.
///
/// `service_codes` is non-empty for size-tiered channels: the service cell
/// (the "service" column, or the first column) selects the code for its row
/// and later rows with a blank cell keep the previous code. Weight ranges
/// such as "101-150" price up to their upper bound.
pub fn parse_rate_csv<R: Read>(
    reader: R,
    service_codes: &[String],
) -> Result<ParsedRates, RateImportError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let records = rdr.records().collect::<Result<Vec<_>, _>>()?;

    let header = find_header(&records).ok_or(RateImportError::HeaderNotFound)?;
    let tiered = !service_codes.is_empty();
    let service_col = header.service_col.unwrap_or(0);
    let mut current_service = service_codes.first().cloned();

    let mut parsed = ParsedRates::default();
    for rec in &records[header.row + 1..] {
        if tiered {
            let cell = rec.get(service_col).unwrap_or("").to_uppercase();
            if let Some(code) = service_codes.iter().find(|c| cell.contains(c.as_str())) {
                current_service = Some(code.clone());
            }
        }

        let Some(w) = rec
            .get(header.weight_col)
            .and_then(|cell| parse_weight(cell, tiered))
        else {
            parsed.skipped += 1;
            continue;
        };

        let zones: BTreeMap<Zone, f64> = header
            .zones
            .iter()
            .filter_map(|&(zone, col)| {
                let price = parse_price(rec.get(col)?);
                (price > 0.0).then_some((zone, price))
            })
            .collect();
        if zones.is_empty() {
            parsed.skipped += 1;
            continue;
        }

        parsed.rows.push(RateRow {
            w,
            service: if tiered { current_service.clone() } else { None },
            zones,
        });
    }

    parsed.rows.sort_by(|a, b| a.w.total_cmp(&b.w));
    Ok(parsed)
}

pub fn run(cmd: ImportCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ImportCommands::Rates(args) => run_rates(args, global),
    }
}

fn run_rates(args: ImportRatesArgs, global: &GlobalOpts) -> Result<()> {
    let project = discover_project(global)?;

    let channels: Vec<ChannelConfig> = load_file(&project, &project.channels_path())?;
    let channel = channels
        .iter()
        .find(|c| c.name == args.channel)
        .ok_or_else(|| {
            let names: Vec<&str> = channels.iter().map(|c| c.name.as_str()).collect();
            miette::miette!(
                help = format!("known channels: {}", names.join(", ")),
                "unknown channel '{}'",
                args.channel
            )
        })?;
    let service_codes: Vec<String> = channel
        .service_tiers
        .as_ref()
        .map(|t| t.brackets.iter().map(|b| b.code.clone()).collect())
        .unwrap_or_default();

    let fuel_rate = args
        .fuel_rate
        .map(normalize_fuel_rate)
        .transpose()
        .into_diagnostic()?;

    let file = File::open(&args.file).into_diagnostic()?;
    let parsed = parse_rate_csv(BufReader::new(file), &service_codes).into_diagnostic()?;
    if parsed.rows.is_empty() {
        return Err(miette::miette!(
            "no priced rows found in {}",
            args.file.display()
        ));
    }
    debug!(rows = parsed.rows.len(), skipped = parsed.skipped, "parsed rate card");

    let target = match args.split {
        Some(SplitSide::Residential) => "prices_residential",
        Some(SplitSide::Commercial) => "prices_commercial",
        None => "prices",
    };

    if args.dry_run {
        println!(
            "{} {} row(s) parsed for {}/{} ({}), {} skipped",
            style("→").blue(),
            parsed.rows.len(),
            args.tier,
            channel.name,
            target,
            parsed.skipped
        );
        return Ok(());
    }

    let path = project.tier_path(&args.tier);
    let mut sheets: BTreeMap<String, RateSheet> = if path.exists() {
        load_file(&project, &path)?
    } else {
        BTreeMap::new()
    };

    let row_count = parsed.rows.len();
    let sheet = sheets.entry(channel.name.clone()).or_default();
    match args.split {
        Some(SplitSide::Residential) => sheet.prices_residential = Some(parsed.rows),
        Some(SplitSide::Commercial) => sheet.prices_commercial = Some(parsed.rows),
        None => sheet.prices = Some(parsed.rows),
    }
    if let Some(rate) = fuel_rate {
        sheet.fuel_rate = rate;
    }
    sheet.source = args
        .file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned());
    sheet.updated = Some(Utc::now());

    if args.split.is_some() && !sheet.has_split() && !global.quiet {
        println!(
            "{} {} needs both residential and commercial lists before the split applies",
            style("!").yellow(),
            channel.name
        );
    }

    let yaml = serde_yml::to_string(&sheets).into_diagnostic()?;
    std::fs::create_dir_all(project.rates_dir()).into_diagnostic()?;
    std::fs::write(
        &path,
        format!("# Rate sheets for tier {}: channel -> price rows\n{}", args.tier, yaml),
    )
    .into_diagnostic()?;

    println!(
        "{} Imported {} row(s) into {} {} {}",
        style("✓").green(),
        row_count,
        style(project.relative(&path)).cyan(),
        style("→").dim(),
        style(format!("{}.{}", channel.name, target)).yellow()
    );
    if parsed.skipped > 0 && !global.quiet {
        println!("  {} row(s) skipped (no weight or no positive price)", parsed.skipped);
    }

    Ok(())
}
