//! `rateq status` command - Rate book overview

use console::style;
use miette::Result;
use serde::Serialize;
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::{discover_project, truncate_str};
use crate::cli::output::{print_delimited, print_structured};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::Config;
use crate::rates::RateBook;

#[derive(clap::Args, Debug)]
pub struct StatusArgs {}

/// Row counts of one channel across the tiers
#[derive(Debug, Serialize)]
pub struct ChannelCoverage {
    pub channel: String,
    pub zone_source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compliance: Option<String>,
    pub warehouses: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Rows per tier, `None` where the tier has no sheet
    pub rows: Vec<Option<usize>>,
}

#[derive(Debug, Serialize)]
pub struct BookStatus {
    pub root: String,
    pub warehouses: usize,
    pub tiers: Vec<String>,
    pub zip_database: usize,
    pub remote_zips: usize,
    pub channels: Vec<ChannelCoverage>,
}

impl BookStatus {
    pub fn collect(book: &RateBook, root: String) -> Self {
        let tiers: Vec<String> = book.tiers().map(str::to_string).collect();
        let channels = book
            .channels
            .iter()
            .map(|ch| ChannelCoverage {
                channel: ch.name.clone(),
                zone_source: ch.zone_source.to_string(),
                compliance: ch.compliance.clone(),
                warehouses: ch.allow_wh.len(),
                notes: ch.notes.clone(),
                rows: tiers
                    .iter()
                    .map(|t| book.rates.sheet(t, &ch.name).map(|s| s.row_count()))
                    .collect(),
            })
            .collect();

        BookStatus {
            root,
            warehouses: book.warehouses.len(),
            tiers,
            zip_database: book.zones.gofo.zips.len(),
            remote_zips: book.zones.remote_zips.len(),
            channels,
        }
    }
}

pub fn run(_args: StatusArgs, global: &GlobalOpts) -> Result<()> {
    let project = discover_project(global)?;
    let config = Config::load_for(Some(&project));
    let book = RateBook::load(&project)?;
    let status = BookStatus::collect(&book, project.root().display().to_string());

    let format = global.format.resolve(config.default_format.as_deref());
    match format {
        OutputFormat::Json | OutputFormat::Yaml => print_structured(&status, format)?,
        OutputFormat::Csv | OutputFormat::Tsv => {
            let mut header = vec!["channel", "zone_source"];
            header.extend(status.tiers.iter().map(String::as_str));
            let rows: Vec<Vec<String>> = status
                .channels
                .iter()
                .map(|c| {
                    let mut row = vec![c.channel.clone(), c.zone_source.clone()];
                    row.extend(c.rows.iter().map(|r| r.map(|n| n.to_string()).unwrap_or_default()));
                    row
                })
                .collect();
            print_delimited(&header, &rows, format);
        }
        OutputFormat::Auto => print_dashboard(&status, &config),
    }

    Ok(())
}

fn print_dashboard(status: &BookStatus, config: &Config) {
    println!("{}", style("Rate Book Status").bold().underlined());
    println!("  {} {}", style("Root:").dim(), status.root);
    println!(
        "  {} {}   {} {}   {} {}",
        style("Warehouses:").dim(),
        status.warehouses,
        style("Channels:").dim(),
        status.channels.len(),
        style("Tiers:").dim(),
        status.tiers.join(", ")
    );
    println!(
        "  {} {} ZIPs   {} {}",
        style("GOFO database:").dim(),
        status.zip_database,
        style("Remote ZIPs:").dim(),
        status.remote_zips
    );
    if let Some(tier) = &config.default_tier {
        println!("  {} {}", style("Default tier:").dim(), tier);
    }
    println!();

    let mut builder = Builder::default();
    let mut header = vec!["Channel".to_string(), "Zones".to_string(), "Compliance".to_string()];
    header.extend(status.tiers.iter().cloned());
    header.push("Notes".to_string());
    builder.push_record(header);

    let mut gaps = 0;
    for c in &status.channels {
        let mut row = vec![
            c.channel.clone(),
            c.zone_source.clone(),
            c.compliance.clone().unwrap_or_else(|| "-".to_string()),
        ];
        for rows in &c.rows {
            match rows {
                Some(n) => row.push(n.to_string()),
                None => {
                    gaps += 1;
                    row.push("-".to_string());
                }
            }
        }
        row.push(c.notes.as_deref().map(|n| truncate_str(n, 40)).unwrap_or_default());
        builder.push_record(row);
    }
    println!("{}", builder.build().with(Style::rounded()));

    if gaps > 0 {
        println!(
            "{} {} channel/tier combination(s) without a rate sheet",
            style("!").yellow(),
            gaps
        );
    }
}
