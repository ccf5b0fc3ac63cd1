//! Rate book - the immutable configuration bundle the quote engine reads
//!
//! Everything a quote needs (warehouses, channels, compliance rules, zone
//! tables, rate sheets) is loaded once and then only borrowed.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::rates::channel::{ChannelConfig, ZoneSource};
use crate::rates::compliance::ComplianceRules;
use crate::rates::table::RateTables;
use crate::rates::zone::{Region, ZoneTables};

/// Origin warehouse
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Warehouse {
    pub name: String,
    pub region: Region,
}

/// A configuration-integrity problem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegrityIssue {
    /// What the problem is about (channel name, tier, file)
    pub subject: String,
    pub message: String,
}

impl std::fmt::Display for IntegrityIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.subject, self.message)
    }
}

#[derive(Debug, Clone)]
pub struct RateBook {
    pub warehouses: BTreeMap<String, Warehouse>,
    /// Channels in declaration order
    pub channels: Vec<ChannelConfig>,
    pub compliance: ComplianceRules,
    pub zones: ZoneTables,
    pub rates: RateTables,
}

impl RateBook {
    pub fn warehouse(&self, code: &str) -> Option<&Warehouse> {
        self.warehouses.get(code)
    }

    pub fn channel(&self, name: &str) -> Option<&ChannelConfig> {
        self.channels.iter().find(|c| c.name == name)
    }

    pub fn tiers(&self) -> impl Iterator<Item = &str> {
        self.rates.tiers()
    }

    /// Default fuel percentage for a tier: the highest sheet fuel rate × 100
    pub fn default_fuel_pct(&self, tier: &str) -> Option<f64> {
        self.rates.max_fuel_rate(tier).map(|r| r * 100.0)
    }

    /// Find configuration defects that would make quotes silently wrong
    pub fn check_integrity(&self) -> Vec<IntegrityIssue> {
        let mut issues = Vec::new();
        let mut issue = |subject: &str, message: String| {
            issues.push(IntegrityIssue {
                subject: subject.to_string(),
                message,
            })
        };

        let mut seen = HashSet::new();
        for ch in &self.channels {
            let name = ch.name.as_str();
            if !seen.insert(name) {
                issue(name, "duplicate channel name".to_string());
            }
            if !(ch.weight_precision.is_finite() && ch.weight_precision > 0.0) {
                issue(
                    name,
                    format!("weight_precision must be positive, got {}", ch.weight_precision),
                );
            }
            for wh in &ch.allow_wh {
                if !self.warehouses.contains_key(wh) {
                    issue(name, format!("allows unknown warehouse '{}'", wh));
                }
            }
            if let Some(family) = &ch.compliance {
                if !self.compliance.has_family(family) {
                    issue(name, format!("unknown compliance family '{}'", family));
                }
            }
            if let Some(tiers) = &ch.service_tiers {
                if tiers.brackets.is_empty() {
                    issue(name, "service_tiers has no brackets".to_string());
                }
            }
            if ch.fees.res < 0.0 || ch.fees.sig < 0.0 {
                issue(name, "fees must not be negative".to_string());
            }
            if ch.zone_source == ZoneSource::Gofo && self.zones.gofo.zips.is_empty() {
                issue(name, "uses gofo zones but the GOFO ZIP database is empty".to_string());
            }
        }

        for tier in self.rates.tiers() {
            let Some(sheets) = self.rates.tier_sheets(tier) else {
                continue;
            };
            for (channel, sheet) in sheets {
                let subject = format!("{}/{}", tier, channel);
                match self.channel(channel) {
                    None => issue(&subject, "rate sheet for unknown channel".to_string()),
                    Some(ch) => {
                        if ch.is_size_tiered() {
                            let lists = [
                                &sheet.prices,
                                &sheet.prices_residential,
                                &sheet.prices_commercial,
                            ];
                            let uncoded = lists
                                .into_iter()
                                .flatten()
                                .flatten()
                                .any(|row| row.service.is_none());
                            if uncoded {
                                issue(&subject, "size-tiered channel has rows without a service code".to_string());
                            }
                        }
                    }
                }
                if sheet.row_count() == 0 {
                    issue(&subject, "rate sheet has no rows".to_string());
                }
            }
        }

        issues
    }
}
