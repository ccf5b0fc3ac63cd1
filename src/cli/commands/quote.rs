//! `rateq quote` command - Quote a package on every channel

use miette::Result;
use tracing::debug;

use crate::cli::helpers::discover_project;
use crate::cli::output::print_quote;
use crate::cli::GlobalOpts;
use crate::core::Config;
use crate::rates::{AddressClass, Package, QuoteContext, QuoteEngine, RateBook};

#[derive(clap::Args, Debug)]
pub struct QuoteArgs {
    /// Destination ZIP code (5 digits)
    #[arg(long, short = 'z')]
    pub zip: String,

    /// Origin warehouse code (default: config default_warehouse)
    #[arg(long = "wh", short = 'w')]
    pub warehouse: Option<String>,

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

    /// Pricing tier (default: config default_tier, else the first tier)
    #[arg(long, short = 't')]
    pub tier: Option<String>,

    /// Commercial delivery address (default: residential)
    #[arg(long)]
    pub commercial: bool,

    /// Signature required
    #[arg(long)]
    pub signature: bool,

    /// Fuel surcharge in percent (default: config, else the tier's sheet rate)
    #[arg(long)]
    pub fuel: Option<f64>,

    /// Also list channels that could not be priced
    #[arg(long)]
    pub show_excluded: bool,
}

/// Check user input before it reaches the engine; all problems are reported together
pub fn validate_input(warehouse: Option<&str>, zip: &str, pkg: &Package) -> Vec<String> {
    let mut errors = Vec::new();

    if warehouse.map_or(true, |w| w.trim().is_empty()) {
        errors.push("warehouse is required (--wh or default_warehouse)".to_string());
    }
    if zip.len() != 5 || !zip.chars().all(|c| c.is_ascii_digit()) {
        errors.push(format!("ZIP must be exactly 5 digits, got '{}'", zip));
    }
    if !(pkg.weight > 0.0) {
        errors.push("weight must be greater than 0".to_string());
    }
    if !(pkg.length > 0.0 && pkg.width > 0.0 && pkg.height > 0.0) {
        errors.push("length, width and height must be greater than 0".to_string());
    }

    errors
}

/// Fuel percentage: flag, then config, then the tier's highest sheet rate, then 0
pub fn resolve_fuel_pct(flag: Option<f64>, config: &Config, book: &RateBook, tier: &str) -> f64 {
    flag.or(config.fuel_rate)
        .or_else(|| book.default_fuel_pct(tier))
        .unwrap_or(0.0)
}

/// Tier: flag, then config, then the first tier of the book
pub fn resolve_tier(flag: Option<String>, config: &Config, book: &RateBook) -> Option<String> {
    flag.or_else(|| config.default_tier.clone())
        .or_else(|| book.tiers().next().map(str::to_string))
}

pub fn run(args: QuoteArgs, global: &GlobalOpts) -> Result<()> {
    let project = discover_project(global)?;
    let config = Config::load_for(Some(&project));

    let pkg = Package::new(args.length, args.width, args.height, args.weight);
    let warehouse = args.warehouse.or_else(|| config.default_warehouse.clone());
    let zip = args.zip.trim().to_string();

    let errors = validate_input(warehouse.as_deref(), &zip, &pkg);
    if !errors.is_empty() {
        return Err(miette::miette!(
            help = "fix the inputs above and try again",
            "invalid quote request:\n  - {}",
            errors.join("\n  - ")
        ));
    }
    let warehouse = warehouse.unwrap_or_default();

    let book = RateBook::load_checked(&project)?;
    let tier = resolve_tier(args.tier, &config, &book)
        .ok_or_else(|| miette::miette!("rate book has no tiers"))?;
    let fuel_rate = resolve_fuel_pct(args.fuel, &config, &book, &tier);
    debug!(%tier, fuel_rate, %warehouse, %zip, "quote request");

    let ctx = QuoteContext {
        warehouse,
        zip,
        tier,
        address: if args.commercial {
            AddressClass::Commercial
        } else {
            AddressClass::Residential
        },
        signature: args.signature,
        fuel_rate,
    };

    let outcome = QuoteEngine::new(&book)
        .quote(&pkg, &ctx)
        .map_err(|e| miette::miette!(code = "rateq::quote::contract", "{}", e))?;

    let format = global.format.resolve(config.default_format.as_deref());
    print_quote(&outcome, &pkg, args.show_excluded, format)
}
