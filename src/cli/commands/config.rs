//! `rateq config` command - Configuration management

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::helpers::discover_project;
use crate::cli::GlobalOpts;
use crate::core::Config;

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective configuration values
    Show(ShowArgs),

    /// Set a configuration value
    Set(SetArgs),

    /// Remove a configuration value
    Unset(UnsetArgs),

    /// Show paths to configuration files
    Path,

    /// List all configuration keys
    Keys,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Show only this key's value
    pub key: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct SetArgs {
    /// Configuration key (see `rateq config keys`)
    pub key: String,

    /// Value to set
    pub value: String,

    /// Write to the global (user) config instead of the project config
    #[arg(long, short = 'g')]
    pub global: bool,
}

#[derive(clap::Args, Debug)]
pub struct UnsetArgs {
    /// Configuration key to remove
    pub key: String,

    /// Remove from the global (user) config instead of the project config
    #[arg(long, short = 'g')]
    pub global: bool,
}

const VALID_KEYS: &[(&str, &str)] = &[
    ("default_tier", "Pricing tier used when --tier is not given"),
    ("default_warehouse", "Origin warehouse used when --wh is not given"),
    ("fuel_rate", "Fuel surcharge percent (e.g. 16)"),
    ("default_format", "Output format (auto, yaml, json, tsv, csv)"),
];

pub fn run(cmd: ConfigCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ConfigCommands::Show(args) => run_show(args, global),
        ConfigCommands::Set(args) => run_set(args, global),
        ConfigCommands::Unset(args) => run_unset(args, global),
        ConfigCommands::Path => run_path(global),
        ConfigCommands::Keys => run_keys(),
    }
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let project = discover_project(global).ok();
    let config = Config::load_for(project.as_ref());

    if let Some(key) = &args.key {
        check_key(key)?;
        return match get_config_value(&config, key) {
            Some(v) => {
                println!("{}", v);
                Ok(())
            }
            None => Err(miette::miette!("key '{}' is not set", key)),
        };
    }

    println!("{}", style("Effective Configuration").bold().underlined());
    println!();
    for (key, _) in VALID_KEYS {
        print_config_value(key, get_config_value(&config, key).as_deref());
    }

    println!();
    println!("{}", style("Config sources (in priority order):").dim());
    println!("  1. Environment variables (RATEQ_TIER, RATEQ_WAREHOUSE, RATEQ_FUEL_RATE)");
    println!("  2. Project config (.rateq/config.yaml)");
    println!("  3. Global config (~/.config/rateq/config.yaml)");

    Ok(())
}

fn run_set(args: SetArgs, global: &GlobalOpts) -> Result<()> {
    check_key(&args.key)?;
    let path = target_path(args.global, global)?;
    let mut config = read_config(&path)?;

    match args.key.as_str() {
        "default_tier" => config.default_tier = Some(args.value.clone()),
        "default_warehouse" => config.default_warehouse = Some(args.value.clone()),
        "default_format" => config.default_format = Some(args.value.clone()),
        "fuel_rate" => {
            let pct: f64 = args.value.trim().parse().map_err(|_| {
                miette::miette!("fuel_rate must be a number, got '{}'", args.value)
            })?;
            if !pct.is_finite() || pct < 0.0 {
                return Err(miette::miette!("fuel_rate must be a non-negative percent"));
            }
            config.fuel_rate = Some(pct);
        }
        _ => {}
    }

    write_config(&path, &config)?;

    println!(
        "{} Set {} {} {} in {} config",
        style("✓").green(),
        style(&args.key).cyan(),
        style("→").dim(),
        style(&args.value).yellow(),
        scope(args.global)
    );
    Ok(())
}

fn run_unset(args: UnsetArgs, global: &GlobalOpts) -> Result<()> {
    check_key(&args.key)?;
    let path = target_path(args.global, global)?;
    if !path.exists() {
        return Err(miette::miette!(
            "config file does not exist: {}",
            path.display()
        ));
    }
    let mut config = read_config(&path)?;

    let removed = match args.key.as_str() {
        "default_tier" => config.default_tier.take().is_some(),
        "default_warehouse" => config.default_warehouse.take().is_some(),
        "fuel_rate" => config.fuel_rate.take().is_some(),
        "default_format" => config.default_format.take().is_some(),
        _ => false,
    };
    if !removed {
        return Err(miette::miette!("key '{}' not found in config", args.key));
    }

    write_config(&path, &config)?;
    println!(
        "{} Removed {} from {} config",
        style("✓").green(),
        style(&args.key).cyan(),
        scope(args.global)
    );
    Ok(())
}

fn run_path(global: &GlobalOpts) -> Result<()> {
    println!("{}", style("Configuration file paths:").bold());
    println!();

    let global_path = global_config_path()?;
    println!("  {} {}", style("Global:").cyan(), global_path.display());
    print_exists(&global_path);

    println!();
    match discover_project(global) {
        Ok(project) => {
            let path = project.config_path();
            println!("  {} {}", style("Project:").cyan(), path.display());
            print_exists(&path);
        }
        Err(_) => println!(
            "  {} {}",
            style("Project:").cyan(),
            style("(not in a rateq project)").dim()
        ),
    }
    Ok(())
}

fn run_keys() -> Result<()> {
    println!("{}", style("Available configuration keys:").bold());
    println!();
    for (key, description) in VALID_KEYS {
        println!("  {:<20} {}", style(key).cyan(), style(description).dim());
    }
    println!();
    println!(
        "{}",
        style("Use 'rateq config set <key> <value>' to set a value.").dim()
    );
    Ok(())
}

fn check_key(key: &str) -> Result<()> {
    if VALID_KEYS.iter().any(|(k, _)| *k == key) {
        return Ok(());
    }
    let keys: Vec<&str> = VALID_KEYS.iter().map(|(k, _)| *k).collect();
    Err(miette::miette!(
        help = format!("valid keys: {}", keys.join(", ")),
        "unknown config key '{}'",
        key
    ))
}

fn scope(global: bool) -> &'static str {
    if global {
        "global"
    } else {
        "project"
    }
}

fn global_config_path() -> Result<PathBuf> {
    Config::global_config_path()
        .ok_or_else(|| miette::miette!("could not determine global config directory"))
}

fn target_path(global_scope: bool, global: &GlobalOpts) -> Result<PathBuf> {
    if global_scope {
        global_config_path()
    } else {
        Ok(discover_project(global)?.config_path())
    }
}

fn read_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let content = fs::read_to_string(path).into_diagnostic()?;
    if content.trim().is_empty() {
        return Ok(Config::default());
    }
    serde_yml::from_str(&content)
        .map_err(|e| miette::miette!("failed to parse {}: {}", path.display(), e))
}

fn write_config(path: &Path, config: &Config) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).into_diagnostic()?;
    }
    let yaml = serde_yml::to_string(config).into_diagnostic()?;
    fs::write(path, yaml).into_diagnostic()
}

fn get_config_value(config: &Config, key: &str) -> Option<String> {
    match key {
        "default_tier" => config.default_tier.clone(),
        "default_warehouse" => config.default_warehouse.clone(),
        "fuel_rate" => config.fuel_rate.map(|v| v.to_string()),
        "default_format" => config.default_format.clone(),
        _ => None,
    }
}

fn print_config_value(key: &str, value: Option<&str>) {
    match value {
        Some(v) => println!("  {}: {}", style(key).cyan(), style(v).yellow()),
        None => println!("  {}: {}", style(key).cyan(), style("(not set)").dim()),
    }
}

fn print_exists(path: &Path) {
    if path.exists() {
        println!("         {}", style("(exists)").green());
    } else {
        println!("         {}", style("(not created)").dim());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_check() {
        assert!(check_key("default_tier").is_ok());
        assert!(check_key("author").is_err());
    }

    #[test]
    fn test_config_values() {
        let config = Config {
            fuel_rate: Some(16.5),
            default_tier: Some("T2".to_string()),
            ..Default::default()
        };
        assert_eq!(get_config_value(&config, "fuel_rate").as_deref(), Some("16.5"));
        assert_eq!(get_config_value(&config, "default_tier").as_deref(), Some("T2"));
        assert_eq!(get_config_value(&config, "default_format"), None);
    }

    #[test]
    fn test_read_write_config() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join("config.yaml");
        assert_eq!(read_config(&path).unwrap(), Config::default());

        let config = Config {
            default_warehouse: Some("91730".to_string()),
            ..Default::default()
        };
        write_config(&path, &config).unwrap();
        assert_eq!(read_config(&path).unwrap(), config);
    }
}
