//! Zone resolution - destination ZIP to rate-table column key
//!
//! Each channel names a zone source. General and XLmiles zones come from
//! 3-digit ZIP prefix ranges (first match in declaration order); GOFO zones
//! come from a ZIP database mapping ZIPs to GOFO regions, crossed with the
//! origin warehouse's region.

use serde::de::{self, Unexpected, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::rates::book::Warehouse;
use crate::rates::channel::{ChannelConfig, ZoneSource};

/// Rate-table column key
///
/// Reads from an integer or a numeric string, since YAML writers quote
/// integer map keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Zone(pub u8);

struct ZoneVisitor;

impl Visitor<'_> for ZoneVisitor {
    type Value = Zone;

    fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("a zone number from 0 to 255")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Zone, E> {
        u8::try_from(v)
            .map(Zone)
            .map_err(|_| E::invalid_value(Unexpected::Unsigned(v), &self))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Zone, E> {
        u8::try_from(v)
            .map(Zone)
            .map_err(|_| E::invalid_value(Unexpected::Signed(v), &self))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Zone, E> {
        v.trim()
            .parse::<u8>()
            .map(Zone)
            .map_err(|_| E::invalid_value(Unexpected::Str(v), &self))
    }
}

impl<'de> Deserialize<'de> for Zone {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ZoneVisitor)
    }
}

impl std::fmt::Display for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Origin region of a warehouse
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Region {
    West,
    Central,
    East,
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Region::West => write!(f, "WEST"),
            Region::Central => write!(f, "CENTRAL"),
            Region::East => write!(f, "EAST"),
        }
    }
}

/// Destination region in the GOFO ZIP database
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GofoRegion {
    #[serde(rename = "WE")]
    West,
    #[serde(rename = "CE")]
    Central,
    #[serde(rename = "EA")]
    East,
}

impl std::fmt::Display for GofoRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GofoRegion::West => write!(f, "WE"),
            GofoRegion::Central => write!(f, "CE"),
            GofoRegion::East => write!(f, "EA"),
        }
    }
}

/// Inclusive 3-digit prefix range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefixRange {
    pub from: u16,
    pub to: u16,
    pub zone: Zone,
}

/// Ordered prefix ranges with a fallback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeTable {
    #[serde(default)]
    pub ranges: Vec<PrefixRange>,
    pub default: Zone,
}

impl RangeTable {
    pub fn lookup(&self, prefix: u16) -> Zone {
        self.ranges
            .iter()
            .find(|r| prefix >= r.from && prefix <= r.to)
            .map(|r| r.zone)
            .unwrap_or(self.default)
    }
}

/// ZIP location record from the GOFO database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZipInfo {
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    pub region: GofoRegion,
}

/// Origin region × destination GOFO region -> zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GofoLane {
    pub origin: Region,
    pub dest: GofoRegion,
    pub zone: Zone,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GofoTable {
    #[serde(default)]
    pub zips: BTreeMap<String, ZipInfo>,

    #[serde(default)]
    pub lanes: Vec<GofoLane>,

    /// Zone for ZIPs missing from the database or lanes missing from the matrix
    #[serde(default = "default_far_zone")]
    pub default: Zone,
}

impl Default for GofoTable {
    fn default() -> Self {
        Self {
            zips: BTreeMap::new(),
            lanes: Vec::new(),
            default: default_far_zone(),
        }
    }
}

fn default_far_zone() -> Zone {
    Zone(8)
}

/// All zone data loaded from `zones.yaml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneTables {
    /// Regional prefix tables for the general source
    #[serde(default)]
    pub general: BTreeMap<Region, RangeTable>,

    #[serde(default)]
    pub gofo: GofoTable,

    pub xlmiles: RangeTable,

    /// Remote-area delivery ZIPs (informational)
    #[serde(default)]
    pub remote_zips: BTreeSet<String>,

    /// Zone for ZIPs without a usable 3-digit prefix and for regions without a table
    #[serde(default = "default_far_zone")]
    pub fallback: Zone,
}

impl ZoneTables {
    /// Resolve the zone for a destination ZIP shipped from `origin` on `channel`
    pub fn resolve(&self, zip: &str, origin: &Warehouse, channel: &ChannelConfig) -> Zone {
        self.resolve_source(zip, origin.region, channel.zone_source)
    }

    pub fn resolve_source(&self, zip: &str, origin: Region, source: ZoneSource) -> Zone {
        let Some(prefix) = zip_prefix(zip) else {
            return self.fallback;
        };

        match source {
            ZoneSource::Gofo => self.resolve_gofo(zip, origin),
            ZoneSource::Xlmiles => self.xlmiles.lookup(prefix),
            ZoneSource::General => self
                .general
                .get(&origin)
                .map(|table| table.lookup(prefix))
                .unwrap_or(self.fallback),
        }
    }

    fn resolve_gofo(&self, zip: &str, origin: Region) -> Zone {
        self.gofo
            .zips
            .get(zip)
            .and_then(|info| {
                self.gofo
                    .lanes
                    .iter()
                    .find(|lane| lane.origin == origin && lane.dest == info.region)
            })
            .map(|lane| lane.zone)
            .unwrap_or(self.gofo.default)
    }

    pub fn zip_info(&self, zip: &str) -> Option<&ZipInfo> {
        self.gofo.zips.get(zip)
    }

    pub fn is_remote(&self, zip: &str) -> bool {
        self.remote_zips.contains(zip)
    }
}

/// Leading 3 digits of a ZIP, if present
fn zip_prefix(zip: &str) -> Option<u16> {
    zip.get(..3)?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tables() -> ZoneTables {
        serde_yml::from_str(
            r#"
general:
  WEST:
    ranges:
      - { from: 900, to: 935, zone: 2 }
      - { from: 936, to: 961, zone: 3 }
      - { from: 0, to: 199, zone: 8 }
    default: 7
  CENTRAL:
    ranges:
      - { from: 600, to: 629, zone: 2 }
    default: 5
gofo:
  zips:
    "90001": { city: Los Angeles, state: CA, region: WE }
    "10001": { city: New York, state: NY, region: EA }
  lanes:
    - { origin: WEST, dest: WE, zone: 2 }
    - { origin: WEST, dest: CE, zone: 5 }
xlmiles:
  ranges:
    - { from: 900, to: 935, zone: 2 }
    - { from: 400, to: 599, zone: 6 }
  default: 6
remote_zips: ["99501"]
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_general_ranges_first_match() {
        let t = tables();
        assert_eq!(t.resolve_source("91730", Region::West, ZoneSource::General), Zone(2));
        assert_eq!(t.resolve_source("95814", Region::West, ZoneSource::General), Zone(3));
        assert_eq!(t.resolve_source("10001", Region::West, ZoneSource::General), Zone(8));
        assert_eq!(t.resolve_source("75001", Region::West, ZoneSource::General), Zone(7));
    }

    #[test]
    fn test_region_without_table_uses_fallback() {
        let t = tables();
        assert_eq!(t.resolve_source("08691", Region::East, ZoneSource::General), Zone(8));
    }

    #[test]
    fn test_short_zip_uses_fallback() {
        let t = tables();
        assert_eq!(t.resolve_source("91", Region::Central, ZoneSource::General), Zone(8));
        assert_eq!(t.resolve_source("", Region::West, ZoneSource::Xlmiles), Zone(8));
    }

    #[test]
    fn test_gofo_matrix() {
        let t = tables();
        assert_eq!(t.resolve_source("90001", Region::West, ZoneSource::Gofo), Zone(2));
        // lane WEST->EA not declared
        assert_eq!(t.resolve_source("10001", Region::West, ZoneSource::Gofo), Zone(8));
        // zip not in database
        assert_eq!(t.resolve_source("60632", Region::West, ZoneSource::Gofo), Zone(8));
    }

    #[test]
    fn test_xlmiles() {
        let t = tables();
        assert_eq!(t.resolve_source("91730", Region::West, ZoneSource::Xlmiles), Zone(2));
        assert_eq!(t.resolve_source("45001", Region::West, ZoneSource::Xlmiles), Zone(6));
        assert_eq!(t.resolve_source("70001", Region::West, ZoneSource::Xlmiles), Zone(6));
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let t = tables();
        for zip in ["91730", "10001", "60632", "9", "abcde"] {
            let a = t.resolve_source(zip, Region::West, ZoneSource::General);
            let b = t.resolve_source(zip, Region::West, ZoneSource::General);
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_zip_info_and_remote() {
        let t = tables();
        assert_eq!(t.zip_info("90001").unwrap().city, "Los Angeles");
        assert!(t.is_remote("99501"));
        assert!(!t.is_remote("90001"));
    }

    #[test]
    fn test_zone_reads_integer_or_string() {
        let keys: BTreeMap<Zone, f64> = serde_yml::from_str("2: 1.5\n\"8\": 2.5\n").unwrap();
        assert_eq!(keys.get(&Zone(2)), Some(&1.5));
        assert_eq!(keys.get(&Zone(8)), Some(&2.5));

        let zone: Zone = serde_json::from_str("7").unwrap();
        assert_eq!(zone, Zone(7));
        assert!(serde_yml::from_str::<Zone>("300").is_err());
        assert!(serde_yml::from_str::<Zone>("\"north\"").is_err());
    }
}
