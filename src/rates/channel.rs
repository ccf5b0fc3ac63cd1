//! Channel configuration - one priced shipping service option

use serde::{Deserialize, Serialize};

use crate::rates::service::ServiceTiers;

/// How a channel charges fuel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FuelMode {
    /// No fuel line at all
    #[default]
    #[serde(rename = "none")]
    None,
    /// Fuel is built into the base price
    #[serde(rename = "included")]
    Included,
    /// Full fuel percentage on the pre-fuel subtotal
    #[serde(rename = "standard", alias = "percentage")]
    Standard,
    /// Fuel percentage at 85%
    #[serde(rename = "discount_85", alias = "discounted_percentage")]
    Discount85,
}

impl std::fmt::Display for FuelMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FuelMode::None => write!(f, "none"),
            FuelMode::Included => write!(f, "included"),
            FuelMode::Standard => write!(f, "standard"),
            FuelMode::Discount85 => write!(f, "discount_85"),
        }
    }
}

/// Which zone table a channel resolves zones against
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneSource {
    /// Regional 3-digit prefix ranges per origin region
    #[default]
    General,
    /// GOFO ZIP database and region matrix
    Gofo,
    /// XLmiles prefix ranges
    Xlmiles,
}

impl std::fmt::Display for ZoneSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ZoneSource::General => write!(f, "general"),
            ZoneSource::Gofo => write!(f, "gofo"),
            ZoneSource::Xlmiles => write!(f, "xlmiles"),
        }
    }
}

/// Flat accessorial fees
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FeeSchedule {
    /// Residential delivery fee
    #[serde(default)]
    pub res: f64,

    /// Signature fee
    #[serde(default)]
    pub sig: f64,
}

/// A configured channel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Unique channel name, also the key into rate sheets
    pub name: String,

    /// Warehouse codes this channel ships from
    #[serde(default)]
    pub allow_wh: Vec<String>,

    /// Billable weight rounding step (lb)
    #[serde(default = "default_precision")]
    pub weight_precision: f64,

    #[serde(default)]
    pub fees: FeeSchedule,

    #[serde(default)]
    pub fuel_mode: FuelMode,

    #[serde(default)]
    pub zone_source: ZoneSource,

    /// Compliance family gating this channel; none means never gated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compliance: Option<String>,

    /// Size/weight service brackets; present only on size-tiered channels
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_tiers: Option<ServiceTiers>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

fn default_precision() -> f64 {
    1.0
}

impl ChannelConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            allow_wh: Vec::new(),
            weight_precision: default_precision(),
            fees: FeeSchedule::default(),
            fuel_mode: FuelMode::default(),
            zone_source: ZoneSource::default(),
            compliance: None,
            service_tiers: None,
            notes: None,
        }
    }

    /// Does this channel ship from the given warehouse?
    pub fn allows(&self, warehouse: &str) -> bool {
        self.allow_wh.iter().any(|w| w == warehouse)
    }

    pub fn is_size_tiered(&self) -> bool {
        self.service_tiers.is_some()
    }

    /// Decimal places used when displaying this channel's billable weight
    pub fn weight_decimals(&self) -> usize {
        if self.weight_precision == 1.0 {
            0
        } else {
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_defaults_from_yaml() {
        let yaml = "name: USPS-YSD\nallow_wh: ['91730', '60632']\n";
        let ch: ChannelConfig = serde_yml::from_str(yaml).unwrap();
        assert_eq!(ch.weight_precision, 1.0);
        assert_eq!(ch.fuel_mode, FuelMode::None);
        assert_eq!(ch.zone_source, ZoneSource::General);
        assert!(ch.compliance.is_none());
        assert!(!ch.is_size_tiered());
        assert!(ch.allows("60632"));
        assert!(!ch.allows("08691"));
    }

    #[test]
    fn test_fuel_mode_names() {
        let m: FuelMode = serde_yml::from_str("discount_85").unwrap();
        assert_eq!(m, FuelMode::Discount85);
        let m: FuelMode = serde_yml::from_str("percentage").unwrap();
        assert_eq!(m, FuelMode::Standard);
        let m: FuelMode = serde_yml::from_str("discounted_percentage").unwrap();
        assert_eq!(m, FuelMode::Discount85);
        assert_eq!(serde_yml::to_string(&FuelMode::Discount85).unwrap().trim(), "discount_85");
    }

    #[test]
    fn test_weight_decimals() {
        let mut ch = ChannelConfig::new("FedEx-632-MT");
        assert_eq!(ch.weight_decimals(), 0);
        ch.weight_precision = 0.1;
        assert_eq!(ch.weight_decimals(), 1);
    }
}
