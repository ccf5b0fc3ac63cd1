//! Compliance families - size/weight eligibility shared by groups of channels

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::rates::package::{Package, SizeLimits};

/// Measurement an advisory threshold applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Weight,
    Length,
    Girth,
}

impl Metric {
    fn measure(&self, pkg: &Package) -> f64 {
        match self {
            Metric::Weight => pkg.weight,
            Metric::Length => pkg.longest(),
            Metric::Girth => pkg.girth(),
        }
    }
}

/// Informational note raised when a measurement falls in `(above, up_to]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Advisory {
    pub metric: Metric,
    pub above: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub up_to: Option<f64>,
    pub message: String,
}

impl Advisory {
    fn applies(&self, pkg: &Package) -> bool {
        let value = self.metric.measure(pkg);
        value > self.above && self.up_to.map_or(true, |max| value <= max)
    }
}

/// Compliance rule set loaded from `compliance.yaml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComplianceRules {
    #[serde(default)]
    pub families: BTreeMap<String, SizeLimits>,

    #[serde(default)]
    pub advisories: Vec<Advisory>,
}

/// Per-family status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ComplianceStatus {
    Ok,
    Failed { reasons: Vec<String> },
}

impl ComplianceStatus {
    pub fn is_failed(&self) -> bool {
        matches!(self, ComplianceStatus::Failed { .. })
    }
}

impl std::fmt::Display for ComplianceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ComplianceStatus::Ok => write!(f, "ok"),
            ComplianceStatus::Failed { reasons } => write!(f, "over limit ({})", reasons.join(", ")),
        }
    }
}

/// Evaluation of every family against one package
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComplianceReport {
    pub statuses: BTreeMap<String, ComplianceStatus>,
    pub notes: Vec<String>,
}

impl ComplianceReport {
    pub fn status(&self, family: &str) -> Option<&ComplianceStatus> {
        self.statuses.get(family)
    }

    /// True only when the family exists and is marked failed
    pub fn is_failed(&self, family: &str) -> bool {
        self.status(family).map_or(false, ComplianceStatus::is_failed)
    }
}

impl ComplianceRules {
    pub fn has_family(&self, family: &str) -> bool {
        self.families.contains_key(family)
    }

    pub fn evaluate(&self, pkg: &Package) -> ComplianceReport {
        let statuses = self
            .families
            .iter()
            .map(|(name, limits)| {
                let reasons = limits.violations(pkg);
                let status = if reasons.is_empty() {
                    ComplianceStatus::Ok
                } else {
                    ComplianceStatus::Failed { reasons }
                };
                (name.clone(), status)
            })
            .collect();

        let notes = self
            .advisories
            .iter()
            .filter(|a| a.applies(pkg))
            .map(|a| a.message.clone())
            .collect();

        ComplianceReport { statuses, notes }
    }
}
