//! Rate book loading
//!
//! Reads the plain-text YAML files of a project into an immutable
//! [`RateBook`]. Parse failures carry a source span so the CLI can point at
//! the offending line.

use miette::Diagnostic;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use crate::core::Project;
use crate::rates::{
    ChannelConfig, ComplianceRules, IntegrityIssue, RateBook, RateSheet, RateTables, Warehouse,
    ZoneTables,
};
use crate::yaml::{parse_yaml, YamlSyntaxError};

/// Errors raised while loading a rate book
#[derive(Debug, Error, Diagnostic)]
pub enum LoadError {
    #[error("missing rate book file {0}")]
    #[diagnostic(
        code(rateq::load::missing),
        help("run 'rateq init' to create the sample rate book")
    )]
    MissingFile(PathBuf),

    #[error("failed to read {path}: {source}")]
    #[diagnostic(code(rateq::load::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Yaml(#[from] YamlSyntaxError),

    #[error("no rate tiers found in {0}")]
    #[diagnostic(
        code(rateq::load::no_tiers),
        help("add one rates/<TIER>.yaml file per pricing tier")
    )]
    NoTiers(PathBuf),

    #[error("rate book has {} integrity problem(s):\n{}", .0.len(), format_issues(.0))]
    #[diagnostic(
        code(rateq::load::integrity),
        help("run 'rateq validate' for details")
    )]
    Integrity(Vec<IntegrityIssue>),
}

fn format_issues(issues: &[IntegrityIssue]) -> String {
    issues
        .iter()
        .map(|i| format!("  - {}", i))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Read and parse one YAML file
pub fn load_file<T: DeserializeOwned + 'static>(project: &Project, path: &Path) -> Result<T, LoadError> {
    if !path.exists() {
        return Err(LoadError::MissingFile(path.to_path_buf()));
    }
    let source = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_yaml(&source, &project.relative(path))?)
}

/// Load every tier file under rates/
pub fn load_rate_tables(project: &Project) -> Result<RateTables, LoadError> {
    let mut tables = RateTables::new();
    for path in project.iter_rate_files() {
        let Some(tier) = path.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
            continue;
        };
        let sheets: BTreeMap<String, RateSheet> = load_file(project, &path)?;
        debug!(tier = %tier, channels = sheets.len(), "loaded rate tier");
        tables.insert_tier(tier, sheets);
    }

    if tables.tiers().next().is_none() {
        return Err(LoadError::NoTiers(project.rates_dir()));
    }
    Ok(tables)
}

impl RateBook {
    /// Load the rate book of a project without checking integrity
    pub fn load(project: &Project) -> Result<Self, LoadError> {
        let warehouses: BTreeMap<String, Warehouse> =
            load_file(project, &project.warehouses_path())?;
        let channels: Vec<ChannelConfig> = load_file(project, &project.channels_path())?;
        let compliance: ComplianceRules = load_file(project, &project.compliance_path())?;
        let zones: ZoneTables = load_file(project, &project.zones_path())?;
        let rates = load_rate_tables(project)?;

        debug!(
            warehouses = warehouses.len(),
            channels = channels.len(),
            zips = zones.gofo.zips.len(),
            "loaded rate book"
        );

        Ok(RateBook {
            warehouses,
            channels,
            compliance,
            zones,
            rates,
        })
    }

    /// Load the rate book and refuse it if the configuration is inconsistent
    pub fn load_checked(project: &Project) -> Result<Self, LoadError> {
        let book = Self::load(project)?;
        let issues = book.check_integrity();
        if !issues.is_empty() {
            for issue in &issues {
                warn!(subject = %issue.subject, "{}", issue.message);
            }
            return Err(LoadError::Integrity(issues));
        }
        Ok(book)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_sample_rate_book_loads_clean() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();

        let book = RateBook::load_checked(&project).unwrap();
        assert_eq!(book.warehouses.len(), 8);
        assert_eq!(book.channels.len(), 10);
        assert_eq!(book.channels[0].name, "GOFO");
        assert_eq!(book.tiers().collect::<Vec<_>>(), vec!["T0", "T1", "T2", "T3"]);
        assert!(book.channel("XLmiles").unwrap().is_size_tiered());
        assert!((book.default_fuel_pct("T3").unwrap() - 16.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_file() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();
        std::fs::remove_file(project.zones_path()).unwrap();

        let err = RateBook::load(&project).unwrap_err();
        assert!(matches!(err, LoadError::MissingFile(_)));
    }

    #[test]
    fn test_yaml_error_names_file() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();
        std::fs::write(project.tier_path("T1"), "Ground:\n  prices:\n    - { zones: { 2: 1.0 } }\n")
            .unwrap();

        let err = RateBook::load(&project).unwrap_err();
        match err {
            LoadError::Yaml(e) => {
                assert!(e.to_string().contains("T1.yaml"));
                assert!(e.message().contains("missing field"));
                let help = e.help().map(|h| h.to_string());
                assert!(help.is_some_and(|h| h.contains("weight break")));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_no_tiers() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();
        for path in project.iter_rate_files().collect::<Vec<_>>() {
            std::fs::remove_file(path).unwrap();
        }
        assert!(matches!(
            RateBook::load(&project).unwrap_err(),
            LoadError::NoTiers(_)
        ));
    }

    #[test]
    fn test_integrity_failure_is_refused() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();
        let mut channels = std::fs::read_to_string(project.channels_path()).unwrap();
        channels.push_str("\n- name: Phantom\n  allow_wh: [\"99999\"]\n  compliance: nope\n");
        std::fs::write(project.channels_path(), channels).unwrap();

        assert!(RateBook::load(&project).is_ok());
        match RateBook::load_checked(&project).unwrap_err() {
            LoadError::Integrity(issues) => {
                assert_eq!(issues.len(), 2);
                assert!(issues.iter().all(|i| i.subject == "Phantom"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
