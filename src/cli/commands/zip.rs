//! `rateq zip` command - Destination ZIP lookup

use console::style;
use miette::Result;
use serde::Serialize;
use std::collections::BTreeMap;
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::discover_project;
use crate::cli::output::{print_delimited, print_structured};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::loader::load_file;
use crate::core::Config;
use crate::rates::zone::ZipInfo;
use crate::rates::{Region, Warehouse, Zone, ZoneSource, ZoneTables};

#[derive(clap::Args, Debug)]
pub struct ZipArgs {
    /// Destination ZIP code
    pub zip: String,

    /// Origin warehouse (default: config default_warehouse, else every region)
    #[arg(long = "wh", short = 'w')]
    pub warehouse: Option<String>,
}

/// Zones one ZIP resolves to from one origin region
#[derive(Debug, Serialize)]
struct RegionZones {
    origin: Region,
    general: Zone,
    gofo: Zone,
    xlmiles: Zone,
}

#[derive(Debug, Serialize)]
struct ZipReport {
    zip: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<ZipInfo>,
    remote: bool,
    zones: Vec<RegionZones>,
}

fn region_zones(zones: &ZoneTables, zip: &str, origin: Region) -> RegionZones {
    RegionZones {
        origin,
        general: zones.resolve_source(zip, origin, ZoneSource::General),
        gofo: zones.resolve_source(zip, origin, ZoneSource::Gofo),
        xlmiles: zones.resolve_source(zip, origin, ZoneSource::Xlmiles),
    }
}

pub fn run(args: ZipArgs, global: &GlobalOpts) -> Result<()> {
    let project = discover_project(global)?;
    let config = Config::load_for(Some(&project));
    let zones: ZoneTables = load_file(&project, &project.zones_path())?;
    let zip = args.zip.trim().to_string();

    let origins = match args.warehouse.or(config.default_warehouse.clone()) {
        Some(code) => {
            let warehouses: BTreeMap<String, Warehouse> =
                load_file(&project, &project.warehouses_path())?;
            let wh = warehouses
                .get(&code)
                .ok_or_else(|| miette::miette!("unknown warehouse '{}'", code))?;
            vec![wh.region]
        }
        None => vec![Region::West, Region::Central, Region::East],
    };

    let report = ZipReport {
        location: zones.zip_info(&zip).cloned(),
        remote: zones.is_remote(&zip),
        zones: origins
            .into_iter()
            .map(|origin| region_zones(&zones, &zip, origin))
            .collect(),
        zip,
    };

    let format = global.format.resolve(config.default_format.as_deref());
    match format {
        OutputFormat::Json | OutputFormat::Yaml => print_structured(&report, format)?,
        OutputFormat::Csv | OutputFormat::Tsv => {
            let rows: Vec<Vec<String>> = report
                .zones
                .iter()
                .map(|z| {
                    vec![
                        report.zip.clone(),
                        z.origin.to_string(),
                        z.general.to_string(),
                        z.gofo.to_string(),
                        z.xlmiles.to_string(),
                        report.remote.to_string(),
                    ]
                })
                .collect();
            print_delimited(
                &["zip", "origin", "general", "gofo", "xlmiles", "remote"],
                &rows,
                format,
            );
        }
        OutputFormat::Auto => print_report(&report),
    }

    Ok(())
}

fn print_report(report: &ZipReport) {
    match &report.location {
        Some(info) => println!(
            "{} {}, {} (GOFO region {})",
            style(&report.zip).cyan().bold(),
            info.city,
            info.state,
            info.region
        ),
        None => println!(
            "{} {}",
            style(&report.zip).cyan().bold(),
            style("not in the GOFO ZIP database").dim()
        ),
    }
    if report.remote {
        println!("{} remote delivery area", style("!").yellow());
    }
    println!();

    let mut builder = Builder::default();
    builder.push_record(["Origin", "General", "GOFO", "XLmiles"]);
    for z in &report.zones {
        builder.push_record([
            z.origin.to_string(),
            format!("Z{}", z.general),
            format!("Z{}", z.gofo),
            format!("Z{}", z.xlmiles),
        ]);
    }
    println!("{}", builder.build().with(Style::rounded()));
}
