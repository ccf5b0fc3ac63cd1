//! Rate tables and base-price lookup
//!
//! A rate sheet holds, for one (tier, channel), either a single shared price
//! list or a residential/commercial pair. Each list is a set of weight-break
//! rows; a row's `w` is the ceiling weight it prices, so lookup picks the
//! smallest break at or above the billable weight.
//!
//! Zone columns are sparse. Standard rows fall back from the requested zone
//! to zone 8, then to the first positive price in zones 2..=9. Service-coded
//! rows fall back from the requested zone to zone 6 only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::rates::zone::Zone;

/// Tolerance applied at exact weight breaks
pub const WEIGHT_EPSILON: f64 = 0.001;

/// Fallback column for standard rows
pub const STANDARD_FALLBACK_ZONE: Zone = Zone(8);

/// Fallback column for service-coded rows
pub const SERVICE_FALLBACK_ZONE: Zone = Zone(6);

/// Zones scanned, in order, when neither the requested zone nor zone 8 is priced
pub const SCAN_ZONES: std::ops::RangeInclusive<u8> = 2..=9;

/// Delivery address class
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressClass {
    #[default]
    Residential,
    Commercial,
}

impl std::fmt::Display for AddressClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AddressClass::Residential => write!(f, "residential"),
            AddressClass::Commercial => write!(f, "commercial"),
        }
    }
}

/// One weight-break row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateRow {
    /// Weight break (lb)
    pub w: f64,

    /// Service code for size-tiered channels
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,

    /// Zone -> price
    #[serde(default)]
    pub zones: BTreeMap<Zone, f64>,
}

impl RateRow {
    pub fn new(w: f64, prices: &[(u8, f64)]) -> Self {
        Self {
            w,
            service: None,
            zones: prices.iter().map(|&(z, p)| (Zone(z), p)).collect(),
        }
    }

    pub fn with_service(mut self, code: impl Into<String>) -> Self {
        self.service = Some(code.into());
        self
    }

    pub fn price(&self, zone: Zone) -> Option<f64> {
        self.zones.get(&zone).copied()
    }

    fn covers(&self, weight: f64) -> bool {
        self.w >= weight - WEIGHT_EPSILON
    }

    /// Standard three-level zone fallback
    fn standard_price(&self, zone: Zone) -> Option<(f64, Zone)> {
        if let Some(p) = self.price(zone) {
            return Some((p, zone));
        }
        if let Some(p) = self.price(STANDARD_FALLBACK_ZONE) {
            return Some((p, STANDARD_FALLBACK_ZONE));
        }
        SCAN_ZONES
            .map(Zone)
            .find_map(|z| self.price(z).filter(|p| *p > 0.0).map(|p| (p, z)))
    }

    fn service_price(&self, zone: Zone) -> (f64, Zone) {
        self.price(zone)
            .map(|p| (p, zone))
            .or_else(|| self.price(SERVICE_FALLBACK_ZONE).map(|p| (p, SERVICE_FALLBACK_ZONE)))
            .unwrap_or((0.0, zone))
    }
}

/// Which list of a sheet priced a quote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceTable {
    Shared,
    Residential,
    Commercial,
}

impl std::fmt::Display for PriceTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PriceTable::Shared => write!(f, "shared"),
            PriceTable::Residential => write!(f, "residential"),
            PriceTable::Commercial => write!(f, "commercial"),
        }
    }
}

/// Prices for one channel in one tier
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RateSheet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prices: Option<Vec<RateRow>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prices_residential: Option<Vec<RateRow>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prices_commercial: Option<Vec<RateRow>>,

    /// Fuel surcharge rate detected for this sheet (fraction, e.g. 0.16)
    #[serde(default, skip_serializing_if = "is_zero")]
    pub fuel_rate: f64,

    /// Where the prices came from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,
}

fn is_zero(v: &f64) -> bool {
    *v == 0.0
}

impl RateSheet {
    pub fn shared(rows: Vec<RateRow>) -> Self {
        Self {
            prices: Some(rows),
            ..Default::default()
        }
    }

    pub fn split(residential: Vec<RateRow>, commercial: Vec<RateRow>) -> Self {
        Self {
            prices_residential: Some(residential),
            prices_commercial: Some(commercial),
            ..Default::default()
        }
    }

    pub fn has_split(&self) -> bool {
        self.prices_residential.is_some() && self.prices_commercial.is_some()
    }

    /// Resolve the row list for an address class.
    ///
    /// The split lists are used only when both exist; otherwise the shared
    /// list applies. Returns `None` when the resolved list is missing or empty.
    pub fn price_list(&self, address: AddressClass) -> Option<(&[RateRow], PriceTable)> {
        let (rows, table) = if self.has_split() {
            match address {
                AddressClass::Residential => {
                    (self.prices_residential.as_deref(), PriceTable::Residential)
                }
                AddressClass::Commercial => (self.prices_commercial.as_deref(), PriceTable::Commercial),
            }
        } else {
            (self.prices.as_deref(), PriceTable::Shared)
        };

        rows.filter(|r| !r.is_empty()).map(|r| (r, table))
    }

    /// Total number of rows across all lists
    pub fn row_count(&self) -> usize {
        [&self.prices, &self.prices_residential, &self.prices_commercial]
            .into_iter()
            .flatten()
            .map(Vec::len)
            .sum()
    }
}

/// Why a lookup produced no price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LookupFailure {
    NoPriceList,
    NoValidPrice { weight: f64, zone: Zone },
}

impl std::fmt::Display for LookupFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LookupFailure::NoPriceList => write!(f, "no price list"),
            LookupFailure::NoValidPrice { weight, zone } => {
                write!(f, "no valid price for weight={}, zone={}", weight, zone)
            }
        }
    }
}

/// A resolved base price
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceMatch {
    pub price: f64,
    /// Weight break of the selected row
    pub weight_break: f64,
    /// Zone column that supplied the price (may differ from the requested zone)
    pub zone_used: Zone,
    pub table: PriceTable,
}

/// Select a row and price from a row list.
///
/// With a service code, rows must carry that code; otherwise the service
/// field is ignored. Among covering rows the smallest weight break wins,
/// ties keeping list order. A price that is missing or not positive is no
/// price at all.
pub fn lookup_rows(
    rows: &[RateRow],
    weight: f64,
    zone: Zone,
    service: Option<&str>,
) -> Option<(f64, f64, Zone)> {
    let row = rows
        .iter()
        .filter(|r| r.covers(weight))
        .filter(|r| match service {
            Some(code) => r.service.as_deref() == Some(code),
            None => true,
        })
        .min_by(|a, b| a.w.total_cmp(&b.w))?;

    let (price, zone_used) = match service {
        Some(_) => row.service_price(zone),
        None => row.standard_price(zone)?,
    };

    (price > 0.0).then_some((price, row.w, zone_used))
}

/// Rate sheets keyed by tier, then channel name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RateTables {
    tiers: BTreeMap<String, BTreeMap<String, RateSheet>>,
}

impl RateTables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_tier(&mut self, tier: impl Into<String>, sheets: BTreeMap<String, RateSheet>) {
        self.tiers.insert(tier.into(), sheets);
    }

    pub fn insert(&mut self, tier: &str, channel: impl Into<String>, sheet: RateSheet) {
        self.tiers
            .entry(tier.to_string())
            .or_default()
            .insert(channel.into(), sheet);
    }

    pub fn has_tier(&self, tier: &str) -> bool {
        self.tiers.contains_key(tier)
    }

    pub fn tiers(&self) -> impl Iterator<Item = &str> {
        self.tiers.keys().map(String::as_str)
    }

    pub fn tier_sheets(&self, tier: &str) -> Option<&BTreeMap<String, RateSheet>> {
        self.tiers.get(tier)
    }

    pub fn sheet(&self, tier: &str, channel: &str) -> Option<&RateSheet> {
        self.tiers.get(tier)?.get(channel)
    }

    /// Highest sheet fuel rate in a tier, as a fraction
    pub fn max_fuel_rate(&self, tier: &str) -> Option<f64> {
        self.tiers
            .get(tier)?
            .values()
            .map(|s| s.fuel_rate)
            .filter(|r| *r > 0.0)
            .max_by(f64::total_cmp)
    }

    /// Base price for one channel
    pub fn lookup(
        &self,
        tier: &str,
        channel: &str,
        address: AddressClass,
        weight: f64,
        zone: Zone,
        service: Option<&str>,
    ) -> Result<PriceMatch, LookupFailure> {
        let (rows, table) = self
            .sheet(tier, channel)
            .and_then(|s| s.price_list(address))
            .ok_or(LookupFailure::NoPriceList)?;

        lookup_rows(rows, weight, zone, service)
            .map(|(price, weight_break, zone_used)| PriceMatch {
                price,
                weight_break,
                zone_used,
                table,
            })
            .ok_or(LookupFailure::NoValidPrice { weight, zone })
    }
}
